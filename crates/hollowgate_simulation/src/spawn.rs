//! Blueprints и спавн участников боя.
//!
//! Blueprint проверяется целиком до спавна: entity с невалидными данными
//! (нет позиции, нулевое здоровье, ссылка на несуществующий профиль)
//! в мир не попадает вообще.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::{AIConfig, AIState, BossPhase, DesignatedTarget, Hopper, RadialBurst};
use crate::combat::{AttackLoadout, AttackProfile, AttackProfileId, AttackScheduler, ContactBody, ContactDamage, ContactTarget};
use crate::components::{
    EnemyKind, Health, HomePosition, MovementInput, MovementSpeed, PhysicsBody, Player, PlayerGuard, Team,
};
use crate::config::{ArenaConfig, CombatConfig};
use crate::error::{ConfigError, SpawnError};
use crate::DeterministicRng;

pub use crate::ai::AfterAttack;

const PLAYER_KIND: &str = "player";

fn default_body_radius() -> f32 {
    0.4
}

fn default_mass() -> f32 {
    1.0
}

fn default_player_speed() -> f32 {
    3.0
}

/// Tuning стрелка (и основной атаки босса)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedTuning {
    /// Имя профиля основной атаки в `attacks`
    pub primary: String,
    pub windup_secs: f32,
    pub winddown_secs: f32,
    pub patrol_pause_secs: f32,
    #[serde(default)]
    pub after_attack: AfterAttack,
}

/// Radial loop босса в Phase2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialTuning {
    pub profile: String,
    pub shots: u32,
    pub shot_interval_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossTuning {
    pub attack: RangedTuning,
    pub radial: RadialTuning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopperTuning {
    pub hop_interval_secs: f32,
    pub hop_duration_secs: f32,
    pub contact_damage: u32,
}

/// Вариант поведения врага
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Archetype {
    Ranged(RangedTuning),
    Boss(BossTuning),
    Hopper(HopperTuning),
}

/// Описание врага (TOML `[[enemies]]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyBlueprint {
    pub kind: String,
    #[serde(default)]
    pub spawn: Option<[f32; 2]>,
    pub max_health: u32,
    pub speed: f32,
    pub detection_radius: f32,
    pub patrol_radius: f32,
    #[serde(default = "default_body_radius")]
    pub body_radius: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default)]
    pub attacks: Vec<AttackProfile>,
    pub archetype: Archetype,
}

/// Описание игрока (TOML `[player]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBlueprint {
    #[serde(default)]
    pub spawn: Option<[f32; 2]>,
    pub max_health: u32,
    #[serde(default)]
    pub defense: u32,
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    #[serde(default = "default_body_radius")]
    pub body_radius: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
}

fn check_position(kind: &str, spawn: Option<[f32; 2]>) -> Result<Vec2, SpawnError> {
    let Some([x, y]) = spawn else {
        return Err(SpawnError::MissingSpawnPosition { kind: kind.to_string() });
    };
    if !x.is_finite() || !y.is_finite() {
        return Err(SpawnError::NonFiniteSpawnPosition {
            kind: kind.to_string(),
            x,
            y,
        });
    }
    Ok(Vec2::new(x, y))
}

fn check_values(kind: &str, values: &[(&'static str, f32)]) -> Result<(), SpawnError> {
    for &(name, value) in values {
        if !value.is_finite() || value < 0.0 {
            return Err(SpawnError::InvalidValue {
                kind: kind.to_string(),
                name,
                value,
            });
        }
    }
    Ok(())
}

fn check_ranged(kind: &str, tuning: &RangedTuning) -> Result<(), SpawnError> {
    check_values(
        kind,
        &[
            ("windup_secs", tuning.windup_secs),
            ("winddown_secs", tuning.winddown_secs),
            ("patrol_pause_secs", tuning.patrol_pause_secs),
        ],
    )
}

impl EnemyBlueprint {
    /// Проверка до спавна (все ошибки фатальны для этого entity)
    pub fn validate(&self) -> Result<(), SpawnError> {
        check_position(&self.kind, self.spawn)?;
        if self.max_health == 0 {
            return Err(SpawnError::ZeroMaxHealth { kind: self.kind.clone() });
        }
        check_values(
            &self.kind,
            &[
                ("speed", self.speed),
                ("detection_radius", self.detection_radius),
                ("patrol_radius", self.patrol_radius),
                ("body_radius", self.body_radius),
                ("mass", self.mass),
            ],
        )?;

        for profile in &self.attacks {
            if let Some(reason) = profile.invalid_reason() {
                return Err(SpawnError::InvalidProfile {
                    kind: self.kind.clone(),
                    profile: profile.name.clone(),
                    reason,
                });
            }
        }

        match &self.archetype {
            Archetype::Ranged(tuning) => {
                check_ranged(&self.kind, tuning)?;
                self.profile_id(&tuning.primary)?;
            }
            Archetype::Boss(tuning) => {
                check_ranged(&self.kind, &tuning.attack)?;
                self.profile_id(&tuning.attack.primary)?;
                self.profile_id(&tuning.radial.profile)?;
                // Один профиль = один cooldown слот в AttackScheduler
                if tuning.radial.profile == tuning.attack.primary {
                    return Err(SpawnError::InvalidProfile {
                        kind: self.kind.clone(),
                        profile: tuning.radial.profile.clone(),
                        reason: "radial profile must differ from primary",
                    });
                }
                check_values(&self.kind, &[("shot_interval_secs", tuning.radial.shot_interval_secs)])?;
                if tuning.radial.shots == 0 {
                    return Err(SpawnError::InvalidProfile {
                        kind: self.kind.clone(),
                        profile: tuning.radial.profile.clone(),
                        reason: "radial burst needs at least one shot",
                    });
                }
            }
            Archetype::Hopper(tuning) => {
                check_values(
                    &self.kind,
                    &[
                        ("hop_interval_secs", tuning.hop_interval_secs),
                        ("hop_duration_secs", tuning.hop_duration_secs),
                    ],
                )?;
            }
        }

        Ok(())
    }

    fn profile_id(&self, name: &str) -> Result<AttackProfileId, SpawnError> {
        self.attacks
            .iter()
            .position(|profile| profile.name == name)
            .map(AttackProfileId)
            .ok_or_else(|| SpawnError::UnknownProfile {
                kind: self.kind.clone(),
                profile: name.to_string(),
            })
    }

    fn ai_config(&self, tuning: &RangedTuning, config: &CombatConfig) -> Result<AIConfig, SpawnError> {
        Ok(AIConfig {
            detection_radius: self.detection_radius,
            patrol_radius: self.patrol_radius,
            patrol_pause_secs: tuning.patrol_pause_secs,
            arrive_distance: config.patrol_arrive_distance,
            patrol_leg_timeout_secs: config.patrol_leg_timeout_secs,
            windup_secs: tuning.windup_secs,
            winddown_secs: tuning.winddown_secs,
            after_attack: tuning.after_attack,
            primary: Some(self.profile_id(&tuning.primary)?),
        })
    }
}

impl PlayerBlueprint {
    pub fn validate(&self) -> Result<(), SpawnError> {
        check_position(PLAYER_KIND, self.spawn)?;
        if self.max_health == 0 {
            return Err(SpawnError::ZeroMaxHealth {
                kind: PLAYER_KIND.to_string(),
            });
        }
        check_values(
            PLAYER_KIND,
            &[
                ("speed", self.speed),
                ("body_radius", self.body_radius),
                ("mass", self.mass),
            ],
        )
    }
}

/// Спавнит врага по blueprint (Commands, применяется при flush)
pub fn spawn_enemy(
    commands: &mut Commands,
    blueprint: &EnemyBlueprint,
    config: &CombatConfig,
) -> Result<Entity, SpawnError> {
    blueprint.validate()?;
    let position = check_position(&blueprint.kind, blueprint.spawn)?;

    let mut entity_commands = commands.spawn((
        Name::new(blueprint.kind.clone()),
        Transform::from_translation(position.extend(0.0)),
        HomePosition(position),
        Health::new(blueprint.max_health),
        Team::Hostile,
        EnemyKind(blueprint.kind.clone()),
        MovementInput::default(),
        MovementSpeed { speed: blueprint.speed },
        PhysicsBody::new(blueprint.mass),
        ContactBody::new(blueprint.body_radius, ContactTarget::DamageablePhysical),
    ));

    match &blueprint.archetype {
        Archetype::Ranged(tuning) => {
            entity_commands.insert((
                AIState::default(),
                blueprint.ai_config(tuning, config)?,
                AttackLoadout::new(blueprint.attacks.clone()),
                AttackScheduler::default(),
            ));
        }
        Archetype::Boss(tuning) => {
            let radial_id = blueprint.profile_id(&tuning.radial.profile)?;
            entity_commands.insert((
                AIState::default(),
                blueprint.ai_config(&tuning.attack, config)?,
                AttackLoadout::new(blueprint.attacks.clone()),
                AttackScheduler::default(),
                BossPhase::new(RadialBurst::new(
                    radial_id,
                    tuning.radial.shots,
                    tuning.radial.shot_interval_secs,
                )),
            ));
        }
        Archetype::Hopper(tuning) => {
            entity_commands.insert((
                Hopper::new(
                    blueprint.detection_radius,
                    blueprint.patrol_radius,
                    tuning.hop_interval_secs,
                    tuning.hop_duration_secs,
                ),
                ContactDamage {
                    amount: tuning.contact_damage,
                },
            ));
        }
    }

    let entity = entity_commands.id();
    crate::logger::log_info(&format!(
        "👾 Spawned enemy {:?} `{}` at {:?} ({} HP)",
        entity, blueprint.kind, position, blueprint.max_health
    ));
    Ok(entity)
}

/// Спавнит игрока и назначает его целью для AI
pub fn spawn_player(commands: &mut Commands, blueprint: &PlayerBlueprint) -> Result<Entity, SpawnError> {
    blueprint.validate()?;
    let position = check_position(PLAYER_KIND, blueprint.spawn)?;

    let entity = commands
        .spawn((
            Name::new(PLAYER_KIND),
            Player,
            Transform::from_translation(position.extend(0.0)),
            Health::new(blueprint.max_health),
            PlayerGuard::new(blueprint.defense),
            Team::Player,
            MovementInput::default(),
            MovementSpeed { speed: blueprint.speed },
            PhysicsBody::new(blueprint.mass),
            ContactBody::new(blueprint.body_radius, ContactTarget::DamageablePhysical),
        ))
        .id();

    commands.insert_resource(DesignatedTarget(Some(entity)));

    crate::logger::log_info(&format!(
        "🧍 Spawned player {:?} at {:?} ({} HP, defense {})",
        entity, position, blueprint.max_health, blueprint.defense
    ));
    Ok(entity)
}

/// Entities, созданные `spawn_arena`
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedArena {
    pub player: Entity,
    pub enemies: Vec<Entity>,
}

/// Загружает арену в мир: tuning, seed, игрок, враги.
///
/// Валидация целиком до спавна: при ошибке мир не меняется.
pub fn spawn_arena(world: &mut World, arena: &ArenaConfig) -> Result<SpawnedArena, ConfigError> {
    arena.validate()?;

    world.insert_resource(arena.combat.clone());
    world.insert_resource(DeterministicRng::new(arena.seed));

    let spawned = {
        let mut commands = world.commands();
        let player = spawn_player(&mut commands, &arena.player)?;
        let enemies = arena
            .enemies
            .iter()
            .map(|blueprint| spawn_enemy(&mut commands, blueprint, &arena.combat))
            .collect::<Result<Vec<_>, _>>()?;
        SpawnedArena { player, enemies }
    };
    world.flush();

    Ok(spawned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::profile::test_profile;

    fn archer() -> EnemyBlueprint {
        EnemyBlueprint {
            kind: "archer".to_string(),
            spawn: Some([1.0, 2.0]),
            max_health: 20,
            speed: 1.0,
            detection_radius: 6.0,
            patrol_radius: 2.0,
            body_radius: 0.4,
            mass: 1.0,
            attacks: vec![test_profile("arrow", 1.0)],
            archetype: Archetype::Ranged(RangedTuning {
                primary: "arrow".to_string(),
                windup_secs: 0.2,
                winddown_secs: 0.2,
                patrol_pause_secs: 0.5,
                after_attack: AfterAttack::Idle,
            }),
        }
    }

    #[test]
    fn test_valid_blueprint() {
        assert_eq!(archer().validate(), Ok(()));
    }

    #[test]
    fn test_missing_spawn_rejected() {
        let blueprint = EnemyBlueprint { spawn: None, ..archer() };
        assert!(matches!(
            blueprint.validate(),
            Err(SpawnError::MissingSpawnPosition { .. })
        ));

        let blueprint = EnemyBlueprint {
            spawn: Some([f32::NAN, 0.0]),
            ..archer()
        };
        assert!(matches!(
            blueprint.validate(),
            Err(SpawnError::NonFiniteSpawnPosition { .. })
        ));
    }

    #[test]
    fn test_zero_health_rejected() {
        let blueprint = EnemyBlueprint { max_health: 0, ..archer() };
        assert!(matches!(blueprint.validate(), Err(SpawnError::ZeroMaxHealth { .. })));
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let blueprint = EnemyBlueprint {
            attacks: vec![test_profile("fireball", 1.0)],
            ..archer()
        };
        assert_eq!(
            blueprint.validate(),
            Err(SpawnError::UnknownProfile {
                kind: "archer".to_string(),
                profile: "arrow".to_string(),
            })
        );
    }

    #[test]
    fn test_negative_radius_rejected() {
        let blueprint = EnemyBlueprint {
            detection_radius: -1.0,
            ..archer()
        };
        assert!(matches!(
            blueprint.validate(),
            Err(SpawnError::InvalidValue { name: "detection_radius", .. })
        ));
    }

    #[test]
    fn test_boss_radial_shares_primary_rejected() {
        let mut boss = ArenaConfig::demo().enemies[1].clone();
        let Archetype::Boss(tuning) = &mut boss.archetype else {
            panic!("demo enemy #1 is the boss");
        };
        tuning.radial.profile = tuning.attack.primary.clone();

        assert_eq!(
            boss.validate(),
            Err(SpawnError::InvalidProfile {
                kind: "bone_king".to_string(),
                profile: "spear".to_string(),
                reason: "radial profile must differ from primary",
            })
        );
    }

    #[test]
    fn test_invalid_spawn_leaves_world_untouched() {
        let mut world = World::new();
        let mut arena = ArenaConfig::demo();
        arena.enemies[1].max_health = 0;

        assert!(spawn_arena(&mut world, &arena).is_err());
        assert_eq!(world.query::<&Health>().iter(&world).count(), 0);
    }

    #[test]
    fn test_spawn_demo_arena() {
        let mut world = World::new();
        let spawned = spawn_arena(&mut world, &ArenaConfig::demo()).expect("demo arena spawns");

        assert_eq!(spawned.enemies.len(), 3);
        assert_eq!(world.resource::<DesignatedTarget>().0, Some(spawned.player));
        assert!(world.get::<PlayerGuard>(spawned.player).is_some());
        assert!(world.get::<BossPhase>(spawned.enemies[1]).is_some());
        assert!(world.get::<Hopper>(spawned.enemies[2]).is_some());
        assert!(world.get::<AIState>(spawned.enemies[2]).is_none());
    }
}
