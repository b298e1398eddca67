//! FSM AI components (state machine, config) + чистая функция переходов.
//!
//! `Idle(patrol) → Chasing → Attacking → (Dead)`
//!
//! Все ожидания: timestamps (`until`, `fire_at`, `give_up_at`), а не
//! корутины: каждое ожидание имеет явный дедлайн или условие выхода.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{AttackLoadout, AttackProfileId, AttackScheduler};

/// Шаг патрулирования внутри Idle
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum PatrolLeg {
    /// Нужна новая patrol точка
    Pick,
    /// Идём к точке; `give_up_at`: аварийный выход, если точка недостижима
    Moving { destination: Vec2, give_up_at: f32 },
    /// Пауза после прибытия
    Pausing { until: f32 },
}

/// Фаза атаки: wind-up до выстрела, wind-down после
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum AttackStage {
    WindUp { fire_at: f32 },
    WindDown { until: f32 },
}

/// AI FSM состояния
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Idle: патрулирование вокруг HomePosition
    Idle { leg: PatrolLeg },

    /// Chasing: цель в радиусе обнаружения
    Chasing,

    /// Attacking: движение заблокировано, направление зафиксировано на `aim`
    Attacking {
        profile: AttackProfileId,
        aim: Vec2,
        stage: AttackStage,
    },

    /// Dead: терминальное, AI отключен
    Dead,
}

impl Default for AIState {
    fn default() -> Self {
        Self::Idle { leg: PatrolLeg::Pick }
    }
}

/// Куда возвращаться после wind-down (зависит от варианта врага)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
#[serde(rename_all = "snake_case")]
pub enum AfterAttack {
    #[default]
    Idle,
    Chasing,
}

/// Параметры AI
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AIConfig {
    pub detection_radius: f32,
    pub patrol_radius: f32,
    /// Пауза после прибытия в patrol точку (секунды)
    pub patrol_pause_secs: f32,
    pub arrive_distance: f32,
    /// Сколько максимум идём к одной patrol точке
    pub patrol_leg_timeout_secs: f32,
    pub windup_secs: f32,
    pub winddown_secs: f32,
    pub after_attack: AfterAttack,
    /// Основная атака (None: враг только патрулирует/преследует)
    pub primary: Option<AttackProfileId>,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            detection_radius: 6.0,
            patrol_radius: 2.0,
            patrol_pause_secs: 1.0,
            arrive_distance: 0.1,
            patrol_leg_timeout_secs: 5.0,
            windup_secs: 0.3,
            winddown_secs: 0.3,
            after_attack: AfterAttack::Idle,
            primary: None,
        }
    }
}

/// Что AI видит на этом тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrainContext {
    pub now: f32,
    pub position: Vec2,
    /// Позиция назначенной цели (None: цели нет)
    pub target: Option<Vec2>,
}

impl BrainContext {
    /// Цель, если она в радиусе обнаружения
    pub fn target_within(&self, radius: f32) -> Option<Vec2> {
        self.target
            .filter(|target| target.distance_squared(self.position) <= radius * radius)
    }
}

impl AIState {
    pub fn is_dead(&self) -> bool {
        matches!(self, AIState::Dead)
    }

    /// Один шаг FSM. Побочный эффект только один: `TryFire` на scheduler.
    ///
    /// `patrol_point` зовётся лишь при выборе новой patrol точки.
    pub fn next(
        &self,
        ctx: &BrainContext,
        config: &AIConfig,
        scheduler: &mut AttackScheduler,
        loadout: &AttackLoadout,
        mut patrol_point: impl FnMut() -> Vec2,
    ) -> AIState {
        let now = ctx.now;

        match *self {
            AIState::Dead => AIState::Dead,

            AIState::Idle { leg } => {
                if ctx.target_within(config.detection_radius).is_some() {
                    return AIState::Chasing;
                }

                let leg = match leg {
                    PatrolLeg::Pick => PatrolLeg::Moving {
                        destination: patrol_point(),
                        give_up_at: now + config.patrol_leg_timeout_secs,
                    },
                    PatrolLeg::Moving { destination, give_up_at } => {
                        let arrived = ctx.position.distance(destination) <= config.arrive_distance;
                        if arrived || now >= give_up_at {
                            PatrolLeg::Pausing {
                                until: now + config.patrol_pause_secs,
                            }
                        } else {
                            leg
                        }
                    }
                    PatrolLeg::Pausing { until } if now >= until => PatrolLeg::Moving {
                        destination: patrol_point(),
                        give_up_at: now + config.patrol_leg_timeout_secs,
                    },
                    PatrolLeg::Pausing { .. } => leg,
                };
                AIState::Idle { leg }
            }

            AIState::Chasing => {
                let Some(target) = ctx.target_within(config.detection_radius) else {
                    return AIState::default();
                };

                let Some(id) = config.primary else {
                    return AIState::Chasing;
                };
                let Some(profile) = loadout.get(id) else {
                    return AIState::Chasing;
                };

                if scheduler.try_fire_profile(id, profile, now) {
                    AIState::Attacking {
                        profile: id,
                        aim: target,
                        stage: AttackStage::WindUp {
                            fire_at: now + config.windup_secs,
                        },
                    }
                } else {
                    AIState::Chasing
                }
            }

            AIState::Attacking { stage, .. } => {
                // Цель пропала посреди атаки → патруль
                if ctx.target.is_none() {
                    return AIState::default();
                }

                match stage {
                    // Выстрел и переход в WindDown делает ai_attack_execution
                    AttackStage::WindUp { .. } => *self,
                    AttackStage::WindDown { until } if now >= until => match config.after_attack {
                        AfterAttack::Idle => AIState::default(),
                        AfterAttack::Chasing => AIState::Chasing,
                    },
                    AttackStage::WindDown { .. } => *self,
                }
            }
        }
    }
}

/// Случайная точка в круге `radius` вокруг `home` (равномерно по площади)
pub fn random_patrol_point(rng: &mut impl Rng, home: Vec2, radius: f32) -> Vec2 {
    if radius <= 0.0 {
        return home;
    }
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = radius * rng.gen::<f32>().sqrt();
    home + Vec2::from_angle(angle) * distance
}
