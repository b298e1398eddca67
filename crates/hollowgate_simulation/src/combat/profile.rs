//! Attack profiles: неизменяемое описание атаки
//!
//! Профиль копируется в снаряд по значению при спавне: снаряд не держит
//! ссылок на стрелка и переживает его деспавн.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Описание одной атаки (payload, скорость, урон, cooldown)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
pub struct AttackProfile {
    /// Имя профиля внутри loadout (на него ссылается AI tuning)
    pub name: String,
    /// Prefab id снаряда для presentation layer
    pub payload: String,
    /// Скорость полёта (units/sec)
    pub speed: f32,
    /// Урон при попадании
    pub damage: u32,
    /// Сила knockback (0 = без отталкивания)
    #[serde(default)]
    pub knockback: f32,
    /// Минимальный интервал между запусками (секунды)
    pub cooldown_secs: f32,
    /// Спрайт нарисован боком → визуал повёрнут на +90°
    #[serde(default)]
    pub perpendicular: bool,
    /// Время жизни снаряда без попадания (секунды)
    #[serde(default = "default_lifetime_secs")]
    pub lifetime_secs: f32,
}

fn default_lifetime_secs() -> f32 {
    5.0
}

impl AttackProfile {
    /// Возвращает причину, если профиль не годится для симуляции
    pub fn invalid_reason(&self) -> Option<&'static str> {
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Some("speed must be finite and non-negative");
        }
        if !self.knockback.is_finite() || self.knockback < 0.0 {
            return Some("knockback must be finite and non-negative");
        }
        if !self.cooldown_secs.is_finite() || self.cooldown_secs < 0.0 {
            return Some("cooldown must be finite and non-negative");
        }
        if !self.lifetime_secs.is_finite() || self.lifetime_secs <= 0.0 {
            return Some("lifetime must be finite and positive");
        }
        None
    }
}

/// Индекс профиля в `AttackLoadout` конкретного entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct AttackProfileId(pub usize);

/// Набор атак entity (0..N профилей)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AttackLoadout {
    pub profiles: Vec<AttackProfile>,
}

impl AttackLoadout {
    pub fn new(profiles: Vec<AttackProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, id: AttackProfileId) -> Option<&AttackProfile> {
        self.profiles.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<AttackProfileId> {
        self.profiles
            .iter()
            .position(|profile| profile.name == name)
            .map(AttackProfileId)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn test_profile(name: &str, cooldown_secs: f32) -> AttackProfile {
    AttackProfile {
        name: name.to_string(),
        payload: format!("projectiles/{}", name),
        speed: 5.0,
        damage: 3,
        knockback: 0.0,
        cooldown_secs,
        perpendicular: false,
        lifetime_secs: 2.0,
    }
}
