//! Scene Tests - Deferred Purge and Infinite Mass
//!
//! End-to-end checks of the tick algorithm through the public API.

use std::cell::Cell;
use std::rc::Rc;

use polyarcade_engine::physics::{
    Body, BodyHandle, FixedStep, INFINITE_MASS, Polygon, Rgb, Scene, SimulationConfig, Vector2,
};

fn square(scene: &mut Scene<&'static str>, tag: &'static str, mass: f64, at: Vector2) -> BodyHandle {
    let mut body = Body::with_info(Polygon::rect(2.0, 2.0), mass, Rgb::WHITE, tag);
    body.set_centroid(at);
    scene.add_body(body)
}

// ============================================================================
// Deferred Purge
// ============================================================================

#[test]
fn test_flagged_body_not_read_later_in_same_tick() {
    let mut scene = Scene::new();
    let bullet = square(&mut scene, "bullet", 1.0, Vector2::ZERO);
    let target = square(&mut scene, "target", 1.0, Vector2::new(1.0, 0.0));
    let witness = square(&mut scene, "witness", 1.0, Vector2::new(0.5, 0.5));

    // Registered first, so it flags the bullet before the custom handler runs
    scene.add_destructive_collision(bullet, target).unwrap();

    let reads = Rc::new(Cell::new(0));
    let counter = Rc::clone(&reads);
    scene
        .add_collision(bullet, witness, move |_, _, _| counter.set(counter.get() + 1))
        .unwrap();

    scene.tick(0.1);

    assert_eq!(reads.get(), 0, "handler saw a flagged body");
    assert!(!scene.contains(bullet));
    assert!(!scene.contains(target));
    assert!(scene.contains(witness));
    assert_eq!(scene.body_count(), 1);
    assert_eq!(scene.interaction_count(), 0);
}

#[test]
fn test_removed_body_is_not_integrated() {
    let mut scene = Scene::new();
    let a = square(&mut scene, "a", 1.0, Vector2::ZERO);
    let b = square(&mut scene, "b", 1.0, Vector2::new(1.5, 0.0));
    scene.body_mut(a).unwrap().set_velocity(Vector2::new(100.0, 0.0));

    let seen = Rc::new(Cell::new(None));
    let recorder = Rc::clone(&seen);
    scene
        .add_collision(a, b, move |first, _, _| {
            first.mark_removed();
            recorder.set(Some(first.centroid()));
        })
        .unwrap();

    scene.tick(0.1);
    assert_eq!(seen.get(), Some(Vector2::ZERO));
    assert!(scene.body(a).is_none());
    assert_eq!(scene.body(b).unwrap().centroid(), Vector2::new(1.5, 0.0));
}

#[test]
fn test_survivors_keep_order_after_purge() {
    let mut scene = Scene::new();
    let handles: Vec<_> = (0..5)
        .map(|i| square(&mut scene, "row", 1.0, Vector2::new(10.0 * i as f64, 0.0)))
        .collect();
    scene.body_mut(handles[1]).unwrap().mark_removed();
    scene.body_mut(handles[3]).unwrap().mark_removed();

    scene.tick(0.01);

    let remaining: Vec<_> = scene.iter().map(|(h, _)| h).collect();
    assert_eq!(remaining, vec![handles[0], handles[2], handles[4]]);
    assert_eq!(scene.index_of(handles[4]), Some(2));
}

#[test]
fn test_scene_keeps_ticking_after_everything_is_destroyed() {
    let mut scene = Scene::new();
    let a = square(&mut scene, "a", 1.0, Vector2::ZERO);
    let b = square(&mut scene, "b", 1.0, Vector2::new(1.0, 0.0));
    scene.add_destructive_collision(a, b).unwrap();

    for _ in 0..10 {
        scene.tick(0.1);
    }
    assert_eq!(scene.body_count(), 0);
    assert_eq!(scene.frame(), 10);
}

// ============================================================================
// Infinite Mass
// ============================================================================

#[test]
fn test_infinite_mass_body_is_never_moved() {
    let mut scene = Scene::new();
    let wall = square(&mut scene, "wall", INFINITE_MASS, Vector2::ZERO);
    let ball = square(&mut scene, "ball", 2.0, Vector2::new(5.0, 0.0));
    let other = square(&mut scene, "other", 3.0, Vector2::new(0.0, 6.0));
    scene.body_mut(ball).unwrap().set_velocity(Vector2::new(-4.0, 0.0));
    scene.body_mut(wall).unwrap().set_velocity(Vector2::ZERO);

    scene.add_uniform_gravity(other, Vector2::new(0.0, -9.8)).unwrap();
    scene.add_spring(2.0, wall, ball).unwrap();
    scene.add_drag(1.0, wall).unwrap();
    scene.add_uniform_gravity(wall, Vector2::new(0.0, -9.8)).unwrap();
    scene.add_physics_collision(1.0, wall, ball).unwrap();
    scene.add_physics_collision(1.0, other, wall).unwrap();

    let start = scene.body(wall).unwrap().centroid();
    for _ in 0..2000 {
        scene.tick(0.005);
        let body = scene.body(wall).unwrap();
        assert_eq!(body.centroid(), start);
        assert_eq!(body.velocity(), Vector2::ZERO);
    }
    // The other body fell onto the wall and bounced
    assert_ne!(scene.body(other).unwrap().centroid(), Vector2::new(0.0, 6.0));
}

#[test]
fn test_ball_bounces_off_infinite_wall() {
    let mut scene = Scene::new();
    let wall = square(&mut scene, "wall", INFINITE_MASS, Vector2::ZERO);
    let ball = square(&mut scene, "ball", 1.0, Vector2::new(2.5, 0.0));
    scene.body_mut(ball).unwrap().set_velocity(Vector2::new(-10.0, 0.0));
    scene.add_physics_collision(1.0, wall, ball).unwrap();

    for _ in 0..20 {
        scene.tick(0.01);
    }
    let v = scene.body(ball).unwrap().velocity();
    assert!((v.x - 10.0).abs() < 1e-9, "expected reflection, got {v}");
}

// ============================================================================
// Driving From A Time Source
// ============================================================================

#[test]
fn test_advance_uses_scaled_clock() {
    let mut scene = Scene::new();
    let ball = square(&mut scene, "ball", 1.0, Vector2::ZERO);
    scene.body_mut(ball).unwrap().set_velocity(Vector2::new(1.0, 0.0));

    let config = SimulationConfig::from_json_str(r#"{ "time_scale": 50.0 }"#).unwrap();
    let mut clock = FixedStep(0.01);
    let mut total = 0.0;
    for _ in 0..10 {
        total += scene.advance(&mut clock, &config);
    }

    assert!((total - 5.0).abs() < 1e-9);
    assert!((scene.body(ball).unwrap().centroid().x - 5.0).abs() < 1e-9);
    assert_eq!(scene.body(ball).unwrap().info(), Some(&"ball"));
}
