//! Tuning и описание арены (TOML)
//!
//! `CombatConfig`: глобальные константы боя (Resource).
//! `ArenaConfig`: полный сценарий: seed, tuning, игрок, враги.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::AttackProfile;
use crate::error::ConfigError;
use crate::spawn::{
    AfterAttack, Archetype, BossTuning, EnemyBlueprint, HopperTuning, PlayerBlueprint, RadialTuning,
    RangedTuning,
};

/// Глобальные боевые константы
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Окно неуязвимости игрока после попадания (секунды)
    pub player_invincibility_secs: f32,
    /// Длительность damage flash (секунды), стартует вместе с неуязвимостью
    pub damage_flash_secs: f32,
    /// Задержка деспавна мёртвого врага (death animation)
    pub enemy_despawn_delay_secs: f32,
    /// Задержка деспавна мёртвого игрока
    pub player_despawn_delay_secs: f32,
    /// Затухание knockback скорости (1/сек)
    pub knockback_damping: f32,
    /// Радиус коллайдера снаряда
    pub projectile_radius: f32,
    /// Дистанция "дошли до patrol точки"
    pub patrol_arrive_distance: f32,
    /// Дедлайн одного patrol перехода (точка недостижима → пауза)
    pub patrol_leg_timeout_secs: f32,
    /// Частота fixed tick (Hz)
    pub tick_hz: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player_invincibility_secs: 0.5,
            damage_flash_secs: 0.1,
            enemy_despawn_delay_secs: 1.0,
            player_despawn_delay_secs: 2.0,
            knockback_damping: 8.0,
            projectile_radius: 0.15,
            patrol_arrive_distance: 0.1,
            patrol_leg_timeout_secs: 5.0,
            tick_hz: 60.0,
        }
    }
}

impl CombatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("player_invincibility_secs", self.player_invincibility_secs),
            ("damage_flash_secs", self.damage_flash_secs),
            ("enemy_despawn_delay_secs", self.enemy_despawn_delay_secs),
            ("player_despawn_delay_secs", self.player_despawn_delay_secs),
            ("knockback_damping", self.knockback_damping),
            ("projectile_radius", self.projectile_radius),
            ("patrol_arrive_distance", self.patrol_arrive_distance),
            ("patrol_leg_timeout_secs", self.patrol_leg_timeout_secs),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite and non-negative, got {}", value),
                });
            }
        }

        if !self.tick_hz.is_finite() || self.tick_hz <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "tick_hz",
                reason: format!("must be positive, got {}", self.tick_hz),
            });
        }

        Ok(())
    }
}

/// Полный сценарий арены для headless прогона
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default)]
    pub combat: CombatConfig,
    pub player: PlayerBlueprint,
    #[serde(default)]
    pub enemies: Vec<EnemyBlueprint>,
}

fn default_seed() -> u64 {
    42
}

impl ArenaConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let arena: ArenaConfig = toml::from_str(source)?;
        arena.validate()?;
        Ok(arena)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Проверяет tuning и все blueprints до того, как что-то попадёт в мир
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.combat.validate()?;
        self.player.validate()?;
        for enemy in &self.enemies {
            enemy.validate()?;
        }
        Ok(())
    }

    /// Встроенная демо-арена: стрелок, босс и прыгающий слайм
    pub fn demo() -> Self {
        let bolt = AttackProfile {
            name: "bolt".to_string(),
            payload: "projectiles/bolt".to_string(),
            speed: 6.0,
            damage: 2,
            knockback: 1.5,
            cooldown_secs: 1.5,
            perpendicular: false,
            lifetime_secs: 3.0,
        };
        let spear = AttackProfile {
            name: "spear".to_string(),
            payload: "projectiles/spear".to_string(),
            speed: 8.0,
            damage: 3,
            knockback: 3.0,
            cooldown_secs: 2.0,
            perpendicular: true,
            lifetime_secs: 3.0,
        };
        let orb = AttackProfile {
            name: "orb".to_string(),
            payload: "projectiles/orb".to_string(),
            speed: 4.0,
            damage: 1,
            knockback: 0.0,
            cooldown_secs: 3.0,
            perpendicular: false,
            lifetime_secs: 4.0,
        };

        Self {
            seed: default_seed(),
            ticks: Some(1800),
            combat: CombatConfig::default(),
            player: PlayerBlueprint {
                spawn: Some([0.0, 0.0]),
                max_health: 10,
                defense: 2,
                speed: 3.0,
                body_radius: 0.4,
                mass: 1.0,
            },
            enemies: vec![
                EnemyBlueprint {
                    kind: "skeleton_archer".to_string(),
                    spawn: Some([6.0, 1.0]),
                    max_health: 30,
                    speed: 1.5,
                    detection_radius: 8.0,
                    patrol_radius: 2.0,
                    body_radius: 0.4,
                    mass: 1.0,
                    attacks: vec![bolt],
                    archetype: Archetype::Ranged(RangedTuning {
                        primary: "bolt".to_string(),
                        windup_secs: 0.3,
                        winddown_secs: 0.3,
                        patrol_pause_secs: 1.0,
                        after_attack: AfterAttack::Chasing,
                    }),
                },
                EnemyBlueprint {
                    kind: "bone_king".to_string(),
                    spawn: Some([-5.0, 4.0]),
                    max_health: 100,
                    speed: 1.0,
                    detection_radius: 12.0,
                    patrol_radius: 1.0,
                    body_radius: 0.8,
                    mass: 4.0,
                    attacks: vec![spear, orb],
                    archetype: Archetype::Boss(BossTuning {
                        attack: RangedTuning {
                            primary: "spear".to_string(),
                            windup_secs: 0.5,
                            winddown_secs: 0.4,
                            patrol_pause_secs: 1.5,
                            after_attack: AfterAttack::Idle,
                        },
                        radial: RadialTuning {
                            profile: "orb".to_string(),
                            shots: 8,
                            shot_interval_secs: 0.05,
                        },
                    }),
                },
                EnemyBlueprint {
                    kind: "slime".to_string(),
                    spawn: Some([3.0, -3.0]),
                    max_health: 12,
                    speed: 2.5,
                    detection_radius: 5.0,
                    patrol_radius: 2.0,
                    body_radius: 0.35,
                    mass: 0.5,
                    attacks: Vec::new(),
                    archetype: Archetype::Hopper(HopperTuning {
                        hop_interval_secs: 1.0,
                        hop_duration_secs: 0.3,
                        contact_damage: 1,
                    }),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combat_config_default() {
        let config = CombatConfig::default();
        assert_eq!(config.player_invincibility_secs, 0.5);
        assert_eq!(config.tick_hz, 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_combat_config_rejects_negative() {
        let config = CombatConfig {
            damage_flash_secs: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "damage_flash_secs", .. })
        ));
    }

    #[test]
    fn test_demo_arena_is_valid() {
        assert!(ArenaConfig::demo().validate().is_ok());
    }

    #[test]
    fn test_parse_arena_toml() {
        let source = r#"
            seed = 7

            [combat]
            player_invincibility_secs = 0.75

            [player]
            spawn = [0.0, 0.0]
            max_health = 10
            defense = 6

            [[enemies]]
            kind = "slime"
            spawn = [2.0, 0.0]
            max_health = 5
            speed = 2.0
            detection_radius = 4.0
            patrol_radius = 1.0

            [enemies.archetype]
            type = "hopper"
            hop_interval_secs = 1.0
            hop_duration_secs = 0.25
            contact_damage = 1

            [[enemies]]
            kind = "archer"
            spawn = [-3.0, 1.0]
            max_health = 20
            speed = 1.0
            detection_radius = 6.0
            patrol_radius = 2.0

            [[enemies.attacks]]
            name = "arrow"
            payload = "projectiles/arrow"
            speed = 5.0
            damage = 2
            cooldown_secs = 1.0
            perpendicular = true

            [enemies.archetype]
            type = "ranged"
            primary = "arrow"
            windup_secs = 0.2
            winddown_secs = 0.2
            patrol_pause_secs = 0.5
        "#;

        let arena = ArenaConfig::from_toml_str(source).expect("valid arena");
        assert_eq!(arena.seed, 7);
        assert_eq!(arena.combat.player_invincibility_secs, 0.75);
        // Незаданные поля берутся из Default
        assert_eq!(arena.combat.damage_flash_secs, 0.1);
        assert_eq!(arena.player.defense, 6);
        assert_eq!(arena.enemies.len(), 2);
        assert!(matches!(arena.enemies[0].archetype, Archetype::Hopper(_)));
        assert_eq!(arena.enemies[1].attacks[0].lifetime_secs, 5.0);
    }

    #[test]
    fn test_parse_rejects_missing_spawn() {
        let source = r#"
            [player]
            max_health = 10
        "#;
        assert!(matches!(
            ArenaConfig::from_toml_str(source),
            Err(ConfigError::Spawn(crate::error::SpawnError::MissingSpawnPosition { .. }))
        ));
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(
            ArenaConfig::from_toml_str("player = 5"),
            Err(ConfigError::Parse(_))
        ));
    }
}
