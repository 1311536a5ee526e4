//! Interactions (force creators)
//!
//! Every behavior a scene evaluates per frame is one [`Interaction`]
//! variant holding its own typed configuration and the handles of the
//! bodies it depends on. Variants fall into two phases:
//!
//! - [`Phase::Field`] - evaluated unconditionally once per tick
//!   (gravity, spring, drag, normal force, radial tether)
//! - [`Phase::Collision`] - evaluated only when the two dependency bodies'
//!   shapes overlap; the handler receives the collision axis
//!
//! All continuous forces change velocity as `dv = F / m * dt`. Infinite-mass
//! bodies have zero inverse mass and never accelerate.
//!
//! # Built-in Formulas
//!
//! | Interaction | Effect |
//! |---|---|
//! | Newtonian gravity | `F = G m1 m2 / r^2` along the centroid line |
//! | Uniform gravity | `dv = g * dt` on one body |
//! | Spring | `F = -k (c1 - c2)` |
//! | Drag | `F = -gamma * v` |
//! | Normal force | removes the velocity component driving into a surface |
//! | Physics collision | impulse `J = -(1 + e) v_rel / (1/m1 + 1/m2)` |

use std::fmt;

use tracing::trace;

use super::body::Body;
use super::collision::find_collision;
use super::scene::{BodyHandle, Bodies};
use super::types::Vector2;

/// Pickup callback: `(player, pickup)`. Runs before the pickup is removed.
pub type UpgradeFn<I> = Box<dyn FnMut(&mut Body<I>, &Body<I>)>;

/// Custom collision response: `(body1, body2, axis)`.
pub type CollisionHandler<I> = Box<dyn FnMut(&mut Body<I>, &mut Body<I>, Vector2)>;

/// When an interaction runs within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Every tick, before collisions
    Field,
    /// Only on shape overlap, after all fields
    Collision,
}

/// A registered behavior bound to one or two bodies.
pub enum Interaction<I> {
    /// Pairwise inverse-square attraction.
    NewtonianGravity { constant: f64, bodies: [BodyHandle; 2] },
    /// Constant acceleration field on a single body (no reaction).
    UniformGravity { acceleration: Vector2, body: BodyHandle },
    /// Hookean spring pulling the two centroids together.
    Spring { constant: f64, bodies: [BodyHandle; 2] },
    /// Linear drag opposing velocity.
    Drag { gamma: f64, body: BodyHandle },
    /// Keeps `bodies[0]` from driving into the surface `bodies[1]`.
    NormalForce { bodies: [BodyHandle; 2] },
    /// Removes flagged bodies once their centroids drift more than `radius`
    /// apart. Ignores shape overlap.
    RadialDestructive {
        bodies: [BodyHandle; 2],
        radius: f64,
        destroy: [bool; 2],
    },
    /// Impulse-based bounce with elasticity `0..=1`.
    PhysicsCollision { elasticity: f64, bodies: [BodyHandle; 2] },
    /// Removes flagged bodies after `hits_before_destruct` overlapping ticks.
    DestructiveCollision {
        bodies: [BodyHandle; 2],
        destroy: [bool; 2],
        hits_before_destruct: u32,
        hits: u32,
    },
    /// `bodies = [player, pickup]`; the pickup is removed and the player
    /// upgraded through the injected callback.
    Pickup {
        bodies: [BodyHandle; 2],
        upgrade: UpgradeFn<I>,
    },
    /// Caller-supplied collision response.
    Custom {
        bodies: [BodyHandle; 2],
        handler: CollisionHandler<I>,
    },
}

impl<I> Interaction<I> {
    pub fn phase(&self) -> Phase {
        match self {
            Self::NewtonianGravity { .. }
            | Self::UniformGravity { .. }
            | Self::Spring { .. }
            | Self::Drag { .. }
            | Self::NormalForce { .. }
            | Self::RadialDestructive { .. } => Phase::Field,
            Self::PhysicsCollision { .. }
            | Self::DestructiveCollision { .. }
            | Self::Pickup { .. }
            | Self::Custom { .. } => Phase::Collision,
        }
    }

    /// Bodies this interaction reads or writes. If any of them is removed,
    /// the interaction is dropped at the next purge.
    pub fn dependencies(&self) -> &[BodyHandle] {
        match self {
            Self::UniformGravity { body, .. } | Self::Drag { body, .. } => std::slice::from_ref(body),
            Self::NewtonianGravity { bodies, .. }
            | Self::Spring { bodies, .. }
            | Self::NormalForce { bodies }
            | Self::RadialDestructive { bodies, .. }
            | Self::PhysicsCollision { bodies, .. }
            | Self::DestructiveCollision { bodies, .. }
            | Self::Pickup { bodies, .. }
            | Self::Custom { bodies, .. } => bodies,
        }
    }

    pub fn depends_on(&self, handle: BodyHandle) -> bool {
        self.dependencies().contains(&handle)
    }

    /// Short variant name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewtonianGravity { .. } => "newtonian_gravity",
            Self::UniformGravity { .. } => "uniform_gravity",
            Self::Spring { .. } => "spring",
            Self::Drag { .. } => "drag",
            Self::NormalForce { .. } => "normal_force",
            Self::RadialDestructive { .. } => "radial_destructive",
            Self::PhysicsCollision { .. } => "physics_collision",
            Self::DestructiveCollision { .. } => "destructive_collision",
            Self::Pickup { .. } => "pickup",
            Self::Custom { .. } => "custom_collision",
        }
    }

    /// Evaluate once for a tick of length `dt`.
    ///
    /// Does nothing if a dependency is missing or already removed, so a
    /// body flagged earlier in the same tick is never touched again.
    pub fn apply(&mut self, arena: &mut Bodies<I>, dt: f64) {
        if !arena.all_live(self.dependencies()) {
            return;
        }

        match self {
            Self::UniformGravity { acceleration, body } => {
                if let Some(body) = arena.get_mut(*body) {
                    accelerate(body, *acceleration, dt);
                }
            }
            Self::Drag { gamma, body } => {
                if let Some(body) = arena.get_mut(*body) {
                    drag(*gamma, body, dt);
                }
            }
            Self::NewtonianGravity { constant, bodies: [a, b] } => {
                if let Some((a, b)) = arena.pair_mut(*a, *b) {
                    newtonian_gravity(*constant, a, b, dt);
                }
            }
            Self::Spring { constant, bodies: [a, b] } => {
                if let Some((a, b)) = arena.pair_mut(*a, *b) {
                    spring(*constant, a, b, dt);
                }
            }
            Self::NormalForce { bodies: [body, surface] } => {
                if let Some((body, surface)) = arena.pair_mut(*body, *surface) {
                    normal_force(body, surface);
                }
            }
            Self::RadialDestructive { bodies: [a, b], radius, destroy } => {
                if let Some((a, b)) = arena.pair_mut(*a, *b) {
                    radial_destructive(a, b, *radius, *destroy);
                }
            }
            Self::PhysicsCollision { elasticity, bodies: [h1, h2] } => {
                let Some((a, b)) = arena.pair_mut(*h1, *h2) else { return };
                let info = find_collision(a.shape(), b.shape());
                if info.collided {
                    trace!(first = %h1, second = %h2, "physics collision");
                    physics_collision(*elasticity, a, b, info.axis);
                }
            }
            Self::DestructiveCollision {
                bodies: [h1, h2],
                destroy,
                hits_before_destruct,
                hits,
            } => {
                let Some((a, b)) = arena.pair_mut(*h1, *h2) else { return };
                if find_collision(a.shape(), b.shape()).collided {
                    trace!(first = %h1, second = %h2, hits = *hits + 1, "destructive collision");
                    *hits += 1;
                    if *hits >= *hits_before_destruct {
                        destroy_flagged(a, b, *destroy);
                    }
                }
            }
            Self::Pickup { bodies: [h1, h2], upgrade } => {
                let Some((player, pickup)) = arena.pair_mut(*h1, *h2) else { return };
                if find_collision(player.shape(), pickup.shape()).collided {
                    trace!(player = %h1, pickup = %h2, "pickup");
                    upgrade(player, &*pickup);
                    pickup.mark_removed();
                }
            }
            Self::Custom { bodies: [h1, h2], handler } => {
                let Some((a, b)) = arena.pair_mut(*h1, *h2) else { return };
                let info = find_collision(a.shape(), b.shape());
                if info.collided {
                    trace!(first = %h1, second = %h2, "custom collision");
                    handler(a, b, info.axis);
                }
            }
        }
    }
}

impl<I> fmt::Debug for Interaction<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("kind", &self.name())
            .field("bodies", &self.dependencies())
            .finish()
    }
}

// ============================================================================
// Built-in behaviors
// ============================================================================

/// `dv = acceleration * dt`, skipped for immovable bodies.
fn accelerate<I>(body: &mut Body<I>, acceleration: Vector2, dt: f64) {
    if body.is_immovable() {
        return;
    }
    body.set_velocity(body.velocity() + acceleration * dt);
}

/// Newtonian attraction between two centroids.
///
/// Coincident centroids are a singularity; the step is skipped instead of
/// writing NaN into both velocities. Pairing a finite body with an
/// infinite-mass attractor is a precondition violation.
pub fn newtonian_gravity<I>(constant: f64, a: &mut Body<I>, b: &mut Body<I>, dt: f64) {
    let offset = b.centroid() - a.centroid();
    let dist_sq = offset.length_squared();
    if dist_sq == 0.0 {
        return;
    }
    let direction = offset / dist_sq.sqrt();
    // Per-body accelerations avoid inf * 0 when one side is immovable
    accelerate(a, direction * (constant * b.mass() / dist_sq), dt);
    accelerate(b, -direction * (constant * a.mass() / dist_sq), dt);
}

/// Hookean spring: `F1 = -k (c1 - c2)`, `F2 = -F1`.
pub fn spring<I>(constant: f64, a: &mut Body<I>, b: &mut Body<I>, dt: f64) {
    let force = (a.centroid() - b.centroid()) * -constant;
    a.apply_force(force, dt);
    b.apply_force(-force, dt);
}

/// Linear drag `F = -gamma * v`.
pub fn drag<I>(gamma: f64, body: &mut Body<I>, dt: f64) {
    let force = body.velocity() * -gamma;
    body.apply_force(force, dt);
}

/// Cancel the part of `body`'s velocity (relative to `surface`) that drives
/// it into `surface` while the two overlap.
pub fn normal_force<I>(body: &mut Body<I>, surface: &Body<I>) {
    let info = find_collision(body.shape(), surface.shape());
    if !info.collided {
        return;
    }
    let relative = body.velocity() - surface.velocity();
    let into_surface = relative.dot(info.axis);
    if into_surface > 0.0 {
        body.set_velocity(body.velocity() - info.axis * into_surface);
    }
}

/// Elastic/inelastic impulse along `axis` (unit, from `a` toward `b`).
///
/// Bodies already separating are left alone so a pair that stays
/// geometrically overlapping for several ticks is not kicked repeatedly.
/// Two immovable bodies produce no impulse.
pub fn physics_collision<I>(elasticity: f64, a: &mut Body<I>, b: &mut Body<I>, axis: Vector2) {
    let inverse_mass_sum = a.inverse_mass() + b.inverse_mass();
    if inverse_mass_sum == 0.0 {
        return;
    }
    let closing = (b.velocity() - a.velocity()).dot(axis);
    if closing > 0.0 {
        return;
    }
    let impulse = -(1.0 + elasticity) * closing / inverse_mass_sum;
    a.apply_impulse(-axis * impulse);
    b.apply_impulse(axis * impulse);
}

/// Remove flagged bodies when their centroids are more than `radius` apart.
pub fn radial_destructive<I>(a: &mut Body<I>, b: &mut Body<I>, radius: f64, destroy: [bool; 2]) {
    if a.distance(b) > radius {
        destroy_flagged(a, b, destroy);
    }
}

fn destroy_flagged<I>(a: &mut Body<I>, b: &mut Body<I>, destroy: [bool; 2]) {
    if destroy[0] {
        a.mark_removed();
    }
    if destroy[1] {
        b.mark_removed();
    }
}
