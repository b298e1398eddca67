//! Attack Scheduler: cooldown gate per (entity, profile)
//!
//! Вместо таймера, который тикает вниз каждый кадр, храним
//! `next_eligible` timestamp на каждый профиль. Профили полностью
//! независимы: radial burst босса не блокирует его основную атаку.

use bevy::prelude::*;

use super::profile::{AttackProfile, AttackProfileId};

/// Cooldown state одного entity (приватный для владельца)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AttackScheduler {
    /// next_eligible[profile]: раньше этого момента профиль не стреляет
    next_eligible: Vec<f32>,
}

impl AttackScheduler {
    /// Момент, с которого профиль снова доступен (None = ещё ни разу не стрелял)
    pub fn next_eligible(&self, id: AttackProfileId) -> Option<f32> {
        self.next_eligible
            .get(id.0)
            .copied()
            .filter(|time| time.is_finite())
    }

    pub fn is_ready(&self, id: AttackProfileId, now: f32) -> bool {
        self.next_eligible(id).is_none_or(|next| now >= next)
    }

    /// TryFire: при `now < next_eligible` молча отказывает и НЕ сбрасывает cooldown.
    /// Иначе ставит `next_eligible = now + cooldown` и разрешает атаку.
    pub fn try_fire(&mut self, id: AttackProfileId, cooldown_secs: f32, now: f32) -> bool {
        if !self.is_ready(id, now) {
            return false;
        }

        if self.next_eligible.len() <= id.0 {
            self.next_eligible.resize(id.0 + 1, f32::NEG_INFINITY);
        }
        self.next_eligible[id.0] = now + cooldown_secs.max(0.0);
        true
    }

    pub fn try_fire_profile(&mut self, id: AttackProfileId, profile: &AttackProfile, now: f32) -> bool {
        self.try_fire(id, profile.cooldown_secs, now)
    }
}
