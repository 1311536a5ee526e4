//! Scene
//!
//! Owns every body and every registered interaction, and runs the per-frame
//! algorithm.
//!
//! # Storage
//!
//! Bodies live in an insertion-ordered arena of `(BodyHandle, Body)` pairs
//! with a handle-to-slot index beside it. Handles are monotonically
//! increasing ids that are never reused, so a handle to a purged body simply
//! stops resolving instead of aliasing a newer body.
//!
//! # Tick
//!
//! ```text
//! tick(dt)
//!   1. field interactions      (registration order)
//!   2. collision interactions  (SAT, then handler on overlap)
//!   3. integrate               (non-removed, finite-mass bodies)
//!   4. purge                   (removed bodies + dependent interactions)
//! ```
//!
//! Removal during steps 1 and 2 only flags the body. Interactions that
//! depend on a flagged body are skipped for the rest of the tick and dropped
//! at the purge.
//!
//! # Example
//!
//! ```ignore
//! use polyarcade_engine::physics::{Body, Polygon, Rgb, Scene, Vector2};
//!
//! let mut scene: Scene = Scene::new();
//! let ball = scene.add_body(Body::new(Polygon::regular(1.0, 16), 1.0, Rgb::RED));
//! scene.add_uniform_gravity(ball, Vector2::new(0.0, -9.8))?;
//! scene.tick(0.016);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use super::body::Body;
use super::clock::TimeSource;
use super::config::SimulationConfig;
use super::error::SceneError;
use super::forces::{CollisionHandler, Interaction, Phase, UpgradeFn};
use super::types::Vector2;

// ============================================================================
// Handles
// ============================================================================

/// Stable identifier for a body within one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(u64);

impl BodyHandle {
    /// Build a handle from a raw id. Only useful for tests and logging; a
    /// fabricated handle resolves to nothing unless the scene issued it.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

// ============================================================================
// Body arena
// ============================================================================

/// Insertion-ordered body storage addressed by [`BodyHandle`].
#[derive(Debug)]
pub struct Bodies<I> {
    entries: Vec<(BodyHandle, Body<I>)>,
    slots: HashMap<BodyHandle, usize>,
}

impl<I> Default for Bodies<I> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<I> Bodies<I> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.slots.contains_key(&handle)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body<I>> {
        self.slots.get(&handle).map(|&slot| &self.entries[slot].1)
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body<I>> {
        self.slots.get(&handle).map(|&slot| &mut self.entries[slot].1)
    }

    /// Mutable access to two distinct bodies at once.
    ///
    /// Returns `None` if either handle is unknown or both name the same body.
    pub fn pair_mut(
        &mut self,
        first: BodyHandle,
        second: BodyHandle,
    ) -> Option<(&mut Body<I>, &mut Body<I>)> {
        let a = *self.slots.get(&first)?;
        let b = *self.slots.get(&second)?;
        if a == b {
            return None;
        }
        if a < b {
            let (low, high) = self.entries.split_at_mut(b);
            Some((&mut low[a].1, &mut high[0].1))
        } else {
            let (low, high) = self.entries.split_at_mut(a);
            Some((&mut high[0].1, &mut low[b].1))
        }
    }

    /// True when every handle resolves to a body that is not flagged removed.
    pub fn all_live(&self, handles: &[BodyHandle]) -> bool {
        handles
            .iter()
            .all(|&h| self.get(h).is_some_and(|body| !body.is_removed()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body<I>)> + '_ {
        self.entries.iter().map(|(h, body)| (*h, body))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut Body<I>)> + '_ {
        self.entries.iter_mut().map(|(h, body)| (*h, body))
    }

    fn push(&mut self, handle: BodyHandle, body: Body<I>) {
        self.slots.insert(handle, self.entries.len());
        self.entries.push((handle, body));
    }

    fn remove_at(&mut self, index: usize) -> (BodyHandle, Body<I>) {
        let entry = self.entries.remove(index);
        self.reindex();
        entry
    }

    /// Drop every flagged body, keeping the survivors' order.
    fn drain_removed(&mut self) -> HashSet<BodyHandle> {
        let removed: HashSet<BodyHandle> = self
            .entries
            .iter()
            .filter(|(_, body)| body.is_removed())
            .map(|(h, _)| *h)
            .collect();
        if !removed.is_empty() {
            self.entries.retain(|(_, body)| !body.is_removed());
            self.reindex();
        }
        removed
    }

    fn reindex(&mut self) {
        self.slots.clear();
        for (slot, (handle, _)) in self.entries.iter().enumerate() {
            self.slots.insert(*handle, slot);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }
}

// ============================================================================
// Scene
// ============================================================================

/// A self-contained simulation: bodies, interactions and a frame counter.
pub struct Scene<I = ()> {
    bodies: Bodies<I>,
    interactions: Vec<Interaction<I>>,
    next_id: u64,
    frame: u64,
}

impl<I> Default for Scene<I> {
    fn default() -> Self {
        Self {
            bodies: Bodies::default(),
            interactions: Vec::new(),
            next_id: 0,
            frame: 0,
        }
    }
}

impl<I> fmt::Debug for Scene<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("bodies", &self.bodies.len())
            .field("interactions", &self.interactions.len())
            .field("frame", &self.frame)
            .finish()
    }
}

impl<I> Scene<I> {
    pub fn new() -> Self {
        Self::default()
    }

    // === Bodies ===

    /// Add a body and return its handle. Bodies keep insertion order.
    pub fn add_body(&mut self, body: Body<I>) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.push(handle, body);
        handle
    }

    /// Remove the body at `index` immediately, along with every interaction
    /// that depends on it.
    pub fn remove_body(&mut self, index: usize) -> Result<Body<I>, SceneError> {
        let len = self.bodies.len();
        if index >= len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        let (handle, mut body) = self.bodies.remove_at(index);
        body.mark_removed();
        self.drop_interactions_of(&HashSet::from([handle]));
        Ok(body)
    }

    /// Remove a body by handle. `None` if the handle does not resolve.
    pub fn remove_by_handle(&mut self, handle: BodyHandle) -> Option<Body<I>> {
        let index = self.index_of(handle)?;
        self.remove_body(index).ok()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn get_body(&self, index: usize) -> Option<&Body<I>> {
        self.bodies.entries.get(index).map(|(_, body)| body)
    }

    pub fn get_body_mut(&mut self, index: usize) -> Option<&mut Body<I>> {
        self.bodies.entries.get_mut(index).map(|(_, body)| body)
    }

    pub fn handle_at(&self, index: usize) -> Option<BodyHandle> {
        self.bodies.entries.get(index).map(|(h, _)| *h)
    }

    pub fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.bodies.slots.get(&handle).copied()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body<I>> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body<I>> {
        self.bodies.get_mut(handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Bodies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body<I>)> + '_ {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut Body<I>)> + '_ {
        self.bodies.iter_mut()
    }

    pub fn bodies(&self) -> &Bodies<I> {
        &self.bodies
    }

    // === Interactions ===

    /// Register an interaction after checking its dependencies are live and,
    /// for pair interactions, distinct.
    pub fn register(&mut self, interaction: Interaction<I>) -> Result<(), SceneError> {
        let deps = interaction.dependencies();
        for &handle in deps {
            if !self.bodies.all_live(&[handle]) {
                return Err(SceneError::UnknownBody(handle));
            }
        }
        if let [a, b] = deps {
            if a == b {
                return Err(SceneError::SelfInteraction(*a));
            }
        }
        self.interactions.push(interaction);
        Ok(())
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    pub fn interactions(&self) -> &[Interaction<I>] {
        &self.interactions
    }

    pub fn add_newtonian_gravity(
        &mut self,
        constant: f64,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Result<(), SceneError> {
        self.register(Interaction::NewtonianGravity {
            constant,
            bodies: [a, b],
        })
    }

    pub fn add_uniform_gravity(
        &mut self,
        body: BodyHandle,
        acceleration: Vector2,
    ) -> Result<(), SceneError> {
        self.register(Interaction::UniformGravity { acceleration, body })
    }

    pub fn add_spring(&mut self, constant: f64, a: BodyHandle, b: BodyHandle) -> Result<(), SceneError> {
        self.register(Interaction::Spring {
            constant,
            bodies: [a, b],
        })
    }

    pub fn add_drag(&mut self, gamma: f64, body: BodyHandle) -> Result<(), SceneError> {
        self.register(Interaction::Drag { gamma, body })
    }

    /// Keep `body` from moving into `surface`.
    pub fn add_normal_force(&mut self, body: BodyHandle, surface: BodyHandle) -> Result<(), SceneError> {
        self.register(Interaction::NormalForce {
            bodies: [body, surface],
        })
    }

    pub fn add_physics_collision(
        &mut self,
        elasticity: f64,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Result<(), SceneError> {
        debug_assert!((0.0..=1.0).contains(&elasticity), "elasticity must be within 0..=1");
        self.register(Interaction::PhysicsCollision {
            elasticity,
            bodies: [a, b],
        })
    }

    /// Destroy both bodies on their first overlap.
    pub fn add_destructive_collision(&mut self, a: BodyHandle, b: BodyHandle) -> Result<(), SceneError> {
        self.add_destructive_collision_after(a, b, [true, true], 1)
    }

    /// Destroy the flagged bodies once they have overlapped on `hits` ticks.
    pub fn add_destructive_collision_after(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
        destroy: [bool; 2],
        hits: u32,
    ) -> Result<(), SceneError> {
        self.register(Interaction::DestructiveCollision {
            bodies: [a, b],
            destroy,
            hits_before_destruct: hits.max(1),
            hits: 0,
        })
    }

    pub fn add_radial_destructive(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
        radius: f64,
        destroy: [bool; 2],
    ) -> Result<(), SceneError> {
        self.register(Interaction::RadialDestructive {
            bodies: [a, b],
            radius,
            destroy,
        })
    }

    pub fn add_pickup(
        &mut self,
        player: BodyHandle,
        pickup: BodyHandle,
        upgrade: impl FnMut(&mut Body<I>, &Body<I>) + 'static,
    ) -> Result<(), SceneError> {
        let upgrade: UpgradeFn<I> = Box::new(upgrade);
        self.register(Interaction::Pickup {
            bodies: [player, pickup],
            upgrade,
        })
    }

    /// Register an arbitrary collision handler for a pair.
    pub fn add_collision(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
        handler: impl FnMut(&mut Body<I>, &mut Body<I>, Vector2) + 'static,
    ) -> Result<(), SceneError> {
        let handler: CollisionHandler<I> = Box::new(handler);
        self.register(Interaction::Custom {
            bodies: [a, b],
            handler,
        })
    }

    // === Frame ===

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance the simulation by `dt`.
    pub fn tick(&mut self, dt: f64) {
        self.run_phase(Phase::Field, dt);
        self.run_phase(Phase::Collision, dt);

        for (_, body) in self.bodies.iter_mut() {
            if !body.is_removed() {
                body.integrate(dt);
            }
        }

        self.purge();
        self.frame += 1;
    }

    /// Pull elapsed time from `clock`, scale it per `config` and tick.
    /// Returns the simulated `dt`.
    pub fn advance(&mut self, clock: &mut impl TimeSource, config: &SimulationConfig) -> f64 {
        let dt = config.scaled_dt(clock.elapsed());
        self.tick(dt);
        dt
    }

    /// Drop every body and interaction. Handles issued so far stay retired.
    pub fn clear(&mut self) {
        debug!(
            bodies = self.bodies.len(),
            interactions = self.interactions.len(),
            "Scene cleared"
        );
        self.bodies.clear();
        self.interactions.clear();
    }

    fn run_phase(&mut self, phase: Phase, dt: f64) {
        let bodies = &mut self.bodies;
        for interaction in self.interactions.iter_mut().filter(|i| i.phase() == phase) {
            interaction.apply(bodies, dt);
        }
    }

    fn purge(&mut self) {
        let removed = self.bodies.drain_removed();
        if removed.is_empty() {
            return;
        }
        let dropped = self.drop_interactions_of(&removed);
        debug!(
            frame = self.frame,
            bodies = removed.len(),
            interactions = dropped,
            "Purged removed bodies"
        );
    }

    fn drop_interactions_of(&mut self, removed: &HashSet<BodyHandle>) -> usize {
        let before = self.interactions.len();
        self.interactions
            .retain(|i| !i.dependencies().iter().any(|h| removed.contains(h)));
        before - self.interactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::INFINITE_MASS;
    use crate::physics::clock::FixedStep;
    use crate::physics::color::Rgb;
    use crate::physics::polygon::Polygon;
    use crate::physics::types::{VEC_TOLERANCE, VecExt};

    fn square_at(x: f64, y: f64, mass: f64) -> Body {
        let mut body = Body::new(Polygon::rect(2.0, 2.0), mass, Rgb::WHITE);
        body.set_centroid(Vector2::new(x, y));
        body
    }

    #[test]
    fn test_handles_are_unique_and_ordered() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        let b = scene.add_body(square_at(5.0, 0.0, 1.0));
        assert_ne!(a, b);
        assert_eq!(scene.handle_at(0), Some(a));
        assert_eq!(scene.handle_at(1), Some(b));
        assert_eq!(scene.body_count(), 2);
    }

    #[test]
    fn test_handles_not_reused_after_removal() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        scene.remove_body(0).unwrap();
        let b = scene.add_body(square_at(0.0, 0.0, 1.0));
        assert_ne!(a, b);
        assert!(!scene.contains(a));
        assert!(scene.body(a).is_none());
    }

    #[test]
    fn test_remove_body_out_of_range() {
        let mut scene: Scene = Scene::new();
        scene.add_body(square_at(0.0, 0.0, 1.0));
        assert_eq!(
            scene.remove_body(3).unwrap_err(),
            SceneError::IndexOutOfRange { index: 3, len: 1 }
        );
    }

    #[test]
    fn test_remove_body_drops_dependent_interactions() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        let b = scene.add_body(square_at(5.0, 0.0, 1.0));
        let c = scene.add_body(square_at(9.0, 0.0, 1.0));
        scene.add_spring(1.0, a, b).unwrap();
        scene.add_drag(0.5, c).unwrap();
        assert_eq!(scene.interaction_count(), 2);

        let removed = scene.remove_by_handle(b).unwrap();
        assert!(removed.is_removed());
        assert_eq!(scene.interaction_count(), 1);
        assert_eq!(scene.index_of(c), Some(1));
    }

    #[test]
    fn test_register_rejects_unknown_and_self() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        let ghost = BodyHandle::from_raw(42);
        assert_eq!(scene.add_drag(1.0, ghost), Err(SceneError::UnknownBody(ghost)));
        assert_eq!(scene.add_spring(1.0, a, a), Err(SceneError::SelfInteraction(a)));
        assert_eq!(scene.interaction_count(), 0);
    }

    #[test]
    fn test_tick_integrates_velocity() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        scene.body_mut(a).unwrap().set_velocity(Vector2::new(2.0, -1.0));
        scene.tick(0.5);
        let centroid = scene.body(a).unwrap().centroid();
        assert!(centroid.is_close(Vector2::new(1.0, -0.5), VEC_TOLERANCE));
        assert_eq!(scene.frame(), 1);
    }

    #[test]
    fn test_infinite_mass_body_is_not_integrated() {
        let mut scene: Scene = Scene::new();
        let wall = scene.add_body(square_at(0.0, 0.0, INFINITE_MASS));
        scene.body_mut(wall).unwrap().set_velocity(Vector2::new(1.0, 0.0));
        scene.tick(1.0);
        assert_eq!(scene.body(wall).unwrap().centroid(), Vector2::ZERO);
    }

    #[test]
    fn test_destructive_collision_purges_both() {
        let mut scene: Scene = Scene::new();
        let bullet = scene.add_body(square_at(0.0, 0.0, 1.0));
        let target = scene.add_body(square_at(1.0, 0.0, 1.0));
        let bystander = scene.add_body(square_at(10.0, 0.0, 1.0));
        scene.add_destructive_collision(bullet, target).unwrap();
        scene.add_drag(1.0, bullet).unwrap();

        scene.tick(0.01);
        assert_eq!(scene.body_count(), 1);
        assert_eq!(scene.handle_at(0), Some(bystander));
        assert_eq!(scene.interaction_count(), 0);
    }

    #[test]
    fn test_destructive_collision_waits_for_threshold() {
        let mut scene: Scene = Scene::new();
        let ball = scene.add_body(square_at(0.0, 0.0, 1.0));
        let brick = scene.add_body(square_at(1.0, 0.0, INFINITE_MASS));
        scene
            .add_destructive_collision_after(ball, brick, [false, true], 3)
            .unwrap();

        scene.tick(0.01);
        scene.tick(0.01);
        assert!(scene.contains(brick));
        scene.tick(0.01);
        assert!(!scene.contains(brick));
        assert!(scene.contains(ball));
    }

    #[test]
    fn test_flagged_body_skipped_by_later_interactions() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        let b = scene.add_body(square_at(1.0, 0.0, 1.0));
        scene.add_destructive_collision_after(a, b, [true, false], 1).unwrap();
        // Would push `b` if it still ran after `a` was flagged
        scene
            .add_collision(a, b, |_, second, _| second.set_velocity(Vector2::new(100.0, 0.0)))
            .unwrap();

        scene.tick(0.1);
        assert!(!scene.contains(a));
        assert!(scene.body(b).unwrap().centroid().is_close(Vector2::new(1.0, 0.0), VEC_TOLERANCE));
    }

    #[test]
    fn test_radial_destructive_runs_before_collisions() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        let b = scene.add_body(square_at(1.0, 0.0, 1.0));
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let inner = calls.clone();
        scene
            .add_collision(a, b, move |_, _, _| inner.set(inner.get() + 1))
            .unwrap();
        scene.add_radial_destructive(a, b, 0.5, [false, true]).unwrap();

        scene.tick(0.1);
        assert_eq!(calls.get(), 0);
        assert!(!scene.contains(b));
    }

    #[test]
    fn test_pickup_upgrades_player_and_removes_pickup() {
        let mut scene: Scene<u32> = Scene::new();
        let player = scene.add_body(Body::with_info(Polygon::rect(2.0, 2.0), 1.0, Rgb::GREEN, 1));
        let mut power = Body::with_info(Polygon::rect(1.0, 1.0), 1.0, Rgb::YELLOW, 5);
        power.set_centroid(Vector2::new(1.0, 0.0));
        let pickup = scene.add_body(power);

        scene
            .add_pickup(player, pickup, |player, pickup| {
                let bonus = pickup.info().copied().unwrap_or(0);
                if let Some(level) = player.info_mut() {
                    *level += bonus;
                }
            })
            .unwrap();

        scene.tick(0.01);
        assert!(!scene.contains(pickup));
        assert_eq!(scene.body(player).unwrap().info(), Some(&6));
        assert_eq!(scene.interaction_count(), 0);
    }

    #[test]
    fn test_custom_collision_receives_axis() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        let b = scene.add_body(square_at(0.0, 1.5, 1.0));
        scene
            .add_collision(a, b, |_, second, axis| second.set_velocity(axis))
            .unwrap();
        scene.tick(0.0);
        assert!(scene.body(b).unwrap().velocity().is_close(Vector2::Y, VEC_TOLERANCE));
    }

    #[test]
    fn test_clear_keeps_handles_retired() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        scene.add_drag(1.0, a).unwrap();
        scene.clear();
        assert_eq!(scene.body_count(), 0);
        assert_eq!(scene.interaction_count(), 0);
        let b = scene.add_body(square_at(0.0, 0.0, 1.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_advance_uses_clock_and_config() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        scene.body_mut(a).unwrap().set_velocity(Vector2::X);
        let config = SimulationConfig {
            time_scale: 50.0,
            ..SimulationConfig::default()
        };
        let dt = scene.advance(&mut FixedStep(0.01), &config);
        assert!((dt - 0.5).abs() < 1e-12);
        assert!(scene.body(a).unwrap().centroid().is_close(Vector2::new(0.5, 0.0), VEC_TOLERANCE));
    }

    #[test]
    fn test_pair_mut_rejects_same_handle() {
        let mut scene: Scene = Scene::new();
        let a = scene.add_body(square_at(0.0, 0.0, 1.0));
        let b = scene.add_body(square_at(3.0, 0.0, 1.0));
        let mut bodies = std::mem::take(&mut scene.bodies);
        assert!(bodies.pair_mut(a, a).is_none());
        let (second, first) = bodies.pair_mut(b, a).unwrap();
        assert_eq!(first.centroid(), Vector2::ZERO);
        assert!(second.centroid().is_close(Vector2::new(3.0, 0.0), VEC_TOLERANCE));
    }
}
