//! Rigid polygon bodies
//!
//! A [`Body`] owns its polygon, its motion state and an optional typed
//! payload. The payload type `I` is chosen by the caller, usually a closed
//! enum of body categories, so handlers and game code discriminate by
//! pattern matching. Dropping the body drops the payload.
//!
//! # Infinite Mass
//!
//! A mass of [`INFINITE_MASS`] marks an immovable body (walls, ground,
//! spring anchors). Its inverse mass is zero, so impulses and forces never
//! change its velocity and the scene does not integrate it.

use super::color::Rgb;
use super::polygon::Polygon;
use super::types::Vector2;

/// Sentinel mass for immovable bodies.
pub const INFINITE_MASS: f64 = f64::INFINITY;

/// A simulated rigid polygon.
#[derive(Debug, Clone)]
pub struct Body<I = ()> {
    shape: Polygon,
    centroid: Vector2,
    velocity: Vector2,
    /// Angular velocity (radians per time unit)
    rotation_speed: f64,
    /// Accumulated orientation (radians) implied by the shape's rotations
    angle: f64,
    mass: f64,
    color: Rgb,
    info: Option<I>,
    removed: bool,
}

impl<I> Body<I> {
    /// Create a body at rest with no payload.
    ///
    /// `mass` must be positive (or [`INFINITE_MASS`]) and `shape` must have
    /// at least three vertices; both are checked in debug builds only.
    pub fn new(shape: Polygon, mass: f64, color: Rgb) -> Self {
        debug_assert!(mass > 0.0, "body mass must be positive, got {mass}");
        debug_assert!(shape.len() >= 3, "body shape needs at least 3 vertices");
        let centroid = shape.centroid();
        Self {
            shape,
            centroid,
            velocity: Vector2::ZERO,
            rotation_speed: 0.0,
            angle: 0.0,
            mass,
            color,
            info: None,
            removed: false,
        }
    }

    /// Create a body at rest carrying `info`.
    pub fn with_info(shape: Polygon, mass: f64, color: Rgb, info: I) -> Self {
        let mut body = Self::new(shape, mass, color);
        body.info = Some(info);
        body
    }

    // === Accessors ===

    pub fn shape(&self) -> &Polygon {
        &self.shape
    }

    pub fn centroid(&self) -> Vector2 {
        self.centroid
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    /// Orientation accumulated through `rotate`/`set_rotation` (radians).
    pub fn rotation(&self) -> f64 {
        self.angle
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn info(&self) -> Option<&I> {
        self.info.as_ref()
    }

    pub fn info_mut(&mut self) -> Option<&mut I> {
        self.info.as_mut()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_immovable(&self) -> bool {
        self.mass.is_infinite()
    }

    /// `1 / mass`, or zero for an infinite-mass body.
    pub fn inverse_mass(&self) -> f64 {
        if self.mass.is_infinite() { 0.0 } else { 1.0 / self.mass }
    }

    /// Centroid-to-centroid distance.
    pub fn distance(&self, other: &Body<I>) -> f64 {
        self.centroid.distance(other.centroid)
    }

    /// `m |v|^2 / 2`; zero for immovable bodies.
    pub fn kinetic_energy(&self) -> f64 {
        if self.is_immovable() {
            return 0.0;
        }
        self.mass * self.velocity.length_squared() / 2.0
    }

    // === Mutators ===

    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    pub fn set_rotation_speed(&mut self, rotation_speed: f64) {
        self.rotation_speed = rotation_speed;
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn set_info(&mut self, info: I) {
        self.info = Some(info);
    }

    pub fn take_info(&mut self) -> Option<I> {
        self.info.take()
    }

    /// Move the body so its centroid lands on `centroid`.
    pub fn set_centroid(&mut self, centroid: Vector2) {
        self.translate(centroid - self.centroid);
    }

    /// Shift the shape and centroid by `offset`.
    pub fn translate(&mut self, offset: Vector2) {
        self.shape.translate(offset);
        self.centroid += offset;
    }

    /// Rotate counter-clockwise about the centroid by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        self.shape.rotate(angle, self.centroid);
        self.angle += angle;
    }

    /// Rotate to an absolute orientation.
    pub fn set_rotation(&mut self, angle: f64) {
        self.rotate(angle - self.angle);
    }

    /// Replace the shape, keeping the current centroid.
    ///
    /// The new shape is translated so its own centroid sits on the body's
    /// centroid; its orientation is taken as-is and the rotation resets.
    pub fn set_shape(&mut self, mut shape: Polygon) {
        debug_assert!(shape.len() >= 3, "body shape needs at least 3 vertices");
        shape.translate(self.centroid - shape.centroid());
        self.shape = shape;
        self.angle = 0.0;
    }

    /// Flag for removal at the end of the current frame. Idempotent.
    ///
    /// Nothing is freed here, so in-flight iteration over the scene's bodies
    /// stays valid.
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Instantaneous velocity change `impulse / mass`.
    pub fn apply_impulse(&mut self, impulse: Vector2) {
        self.velocity += impulse * self.inverse_mass();
    }

    /// Apply `force` for `dt`: `velocity += force / mass * dt`.
    pub fn apply_force(&mut self, force: Vector2, dt: f64) {
        self.velocity += force * (self.inverse_mass() * dt);
    }

    /// Advance position and orientation by one step of `dt`.
    ///
    /// Immovable bodies stay where they are.
    pub fn integrate(&mut self, dt: f64) {
        if self.is_immovable() {
            return;
        }
        self.translate(self.velocity * dt);
        if self.rotation_speed != 0.0 {
            self.rotate(self.rotation_speed * dt);
        }
    }
}
