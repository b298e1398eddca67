//! Combat system module
//!
//! ECS ответственность:
//! - Damageable contract: hostile (raw) и player (mitigation + неуязвимость) пути
//! - Attack profiles + Attack Scheduler (cooldown per entity × profile)
//! - Projectiles: spawn, движение, contact resolution, TTL
//! - Contact damage (hopper), смерть, деспавн, внешние sinks
//!
//! Presentation layer получает только события: ProjectileSpawned,
//! CombatFeedback, DamageDealt, EntityDied.

use bevy::prelude::*;

pub mod contact;
pub mod damage;
pub mod damageable;
pub mod hooks;
pub mod profile;
pub mod projectile;
pub mod scheduler;


// Re-export основных типов
pub use contact::{apply_contact_damage, resolve_contact, ContactBody, ContactDamage, ContactResolution, ContactTarget};
pub use damage::{
    apply_damage_requests, apply_heal_requests, despawn_after_timeout, handle_deaths, CombatFeedback, DamageDealt,
    DamageRequest, DamageSource, Dead, DespawnAfter, EntityDied, FeedbackCue, HealRequest,
};
pub use damageable::{mitigate_damage, DamageOutcome, Damageable, HostileVitals, PlayerVitals};
pub use hooks::{CombatHooks, GameOverSink, ProgressSink};
pub use profile::{AttackLoadout, AttackProfile, AttackProfileId};
pub use projectile::{
    expire_projectiles, move_projectiles, resolve_projectile_contacts, spawn_projectiles, Projectile,
    ProjectileSpawnRequest, ProjectileSpawned,
};
pub use scheduler::AttackScheduler;

use crate::config::CombatConfig;
use crate::schedule::SimulationSet;

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate по фазам тика:
/// 1. move_projectiles (Move)
/// 2. spawn_projectiles (Attack): после AI, снаряд этого тика не двигается
/// 3. resolve_projectile_contacts → apply_contact_damage (Collide)
/// 4. apply_damage_requests → apply_heal_requests (Damage)
/// 5. handle_deaths (Death)
/// 6. expire_projectiles → despawn_after_timeout (Cleanup)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CombatConfig>().init_resource::<CombatHooks>();

        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<HealRequest>()
            .add_event::<CombatFeedback>()
            .add_event::<ProjectileSpawnRequest>()
            .add_event::<ProjectileSpawned>();

        app.add_systems(
            FixedUpdate,
            (
                move_projectiles.in_set(SimulationSet::Move),
                spawn_projectiles.in_set(SimulationSet::Attack),
                (resolve_projectile_contacts, apply_contact_damage)
                    .chain()
                    .in_set(SimulationSet::Collide),
                (apply_damage_requests, apply_heal_requests)
                    .chain()
                    .in_set(SimulationSet::Damage),
                handle_deaths.in_set(SimulationSet::Death),
                (expire_projectiles, despawn_after_timeout)
                    .chain()
                    .in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
