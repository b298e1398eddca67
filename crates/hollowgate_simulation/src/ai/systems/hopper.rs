//! Hopper AI system (pulsed movement).

use bevy::prelude::*;

use crate::ai::{random_patrol_point, BrainContext, Hopper, TargetSnapshot};
use crate::combat::Dead;
use crate::components::{HomePosition, MovementInput};
use crate::schedule::SimClock;
use crate::DeterministicRng;

/// Система: Hopper → MovementInput (Think set)
pub fn hopper_ai(
    mut hoppers: Query<(Entity, &mut Hopper, &mut MovementInput, &Transform, &HomePosition), Without<Dead>>,
    snapshot: Res<TargetSnapshot>,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
) {
    for (entity, mut hopper, mut input, transform, home) in hoppers.iter_mut() {
        let ctx = BrainContext {
            now: clock.now,
            position: transform.translation.truncate(),
            target: snapshot.position,
        };

        let previous_mode = hopper.mode;
        let patrol_radius = hopper.patrol_radius;
        input.direction = hopper.tick(&ctx, || random_patrol_point(&mut rng.rng, home.0, patrol_radius));

        if hopper.mode != previous_mode {
            crate::log(&format!("🐸 Hopper {:?}: {:?} → {:?}", entity, previous_mode, hopper.mode));
        }
    }
}
