//! Movement: интеграция движения на плоскости XY
//!
//! Скорость тела = intent (MovementInput × MovementSpeed) + knockback
//! (PhysicsBody::velocity). Knockback затухает экспоненциально.
//! Мёртвые и снаряды сюда не попадают (снаряды двигает combat).

use bevy::prelude::*;

use crate::combat::{Dead, Projectile};
use crate::components::{MovementInput, MovementSpeed, PhysicsBody};
use crate::config::CombatConfig;
use crate::schedule::SimulationSet;

/// Система: интеграция позиции (Move set)
///
/// Работает в FixedUpdate, `Time` = fixed delta.
pub fn integrate_movement(
    mut query: Query<
        (&mut Transform, Option<&MovementInput>, Option<&MovementSpeed>, Option<&mut PhysicsBody>),
        (Without<Dead>, Without<Projectile>),
    >,
    config: Res<CombatConfig>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut transform, input, speed, body) in query.iter_mut() {
        let mut velocity = match (input, speed) {
            (Some(input), Some(speed)) => input.direction.normalize_or_zero() * speed.speed,
            _ => Vec2::ZERO,
        };

        if let Some(mut body) = body {
            velocity += body.velocity;
            body.damp(config.knockback_damping, delta);
        }

        if velocity != Vec2::ZERO {
            transform.translation += (velocity * delta).extend(0.0);
        }
    }
}

/// Movement Plugin
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, integrate_movement.in_set(SimulationSet::Move));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn movement_app() -> App {
        let mut app = App::new();
        app.init_resource::<CombatConfig>()
            .init_resource::<Time>()
            .add_systems(Update, integrate_movement);
        app
    }

    fn step(app: &mut App, secs: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(secs));
        app.update();
    }

    #[test]
    fn test_intent_moves_at_speed() {
        let mut app = movement_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                MovementInput { direction: Vec2::new(3.0, 0.0) },
                MovementSpeed { speed: 2.0 },
            ))
            .id();

        step(&mut app, 0.5);

        let position = app.world().get::<Transform>(entity).unwrap().translation;
        assert!((position.x - 1.0).abs() < 1e-5);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn test_dead_do_not_move() {
        let mut app = movement_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                MovementInput { direction: Vec2::X },
                MovementSpeed::default(),
                Dead,
            ))
            .id();

        step(&mut app, 0.5);
        assert_eq!(app.world().get::<Transform>(entity).unwrap().translation, Vec3::ZERO);
    }

    #[test]
    fn test_knockback_applied_and_decays() {
        let mut app = movement_app();
        let mut body = PhysicsBody::new(1.0);
        body.apply_impulse(Vec2::new(4.0, 0.0));
        let entity = app.world_mut().spawn((Transform::default(), body)).id();

        step(&mut app, 0.1);

        let position = app.world().get::<Transform>(entity).unwrap().translation;
        assert!((position.x - 0.4).abs() < 1e-5);
        let velocity = app.world().get::<PhysicsBody>(entity).unwrap().velocity;
        assert!(velocity.x < 4.0 && velocity.x > 0.0);
    }
}
