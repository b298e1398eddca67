//! Hopper: простой враг: два режима (Patrolling/Chasing), без стрельбы.
//!
//! Движение импульсное: прыжок длительностью `hop_duration` каждые
//! `hop_interval` секунд. Урон наносится касанием (ContactDamage).

use bevy::prelude::*;

use super::fsm::BrainContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum HopperMode {
    #[default]
    Patrolling,
    Chasing,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Hopper {
    pub mode: HopperMode,
    pub detection_radius: f32,
    /// Радиус patrol точек вокруг HomePosition
    pub patrol_radius: f32,
    pub hop_interval: f32,
    pub hop_duration: f32,
    /// Момент следующего прыжка
    pub next_hop_at: f32,
    /// Конец текущего прыжка
    pub hop_until: f32,
    /// Направление текущего прыжка
    pub heading: Vec2,
}

impl Hopper {
    pub fn new(detection_radius: f32, patrol_radius: f32, hop_interval: f32, hop_duration: f32) -> Self {
        Self {
            mode: HopperMode::Patrolling,
            detection_radius,
            patrol_radius,
            hop_interval,
            hop_duration,
            next_hop_at: 0.0,
            hop_until: 0.0,
            heading: Vec2::ZERO,
        }
    }

    pub fn is_hopping(&self, now: f32) -> bool {
        now < self.hop_until
    }

    /// Шаг: обновляет режим, при необходимости начинает прыжок.
    /// Возвращает направление движения на этот тик (ноль между прыжками).
    pub fn tick(&mut self, ctx: &BrainContext, mut patrol_point: impl FnMut() -> Vec2) -> Vec2 {
        let target = ctx.target_within(self.detection_radius);
        self.mode = if target.is_some() {
            HopperMode::Chasing
        } else {
            HopperMode::Patrolling
        };

        if ctx.now >= self.next_hop_at {
            let destination = target.unwrap_or_else(&mut patrol_point);
            self.heading = (destination - ctx.position).normalize_or_zero();
            self.hop_until = ctx.now + self.hop_duration;
            self.next_hop_at = ctx.now + self.hop_interval;
        }

        if self.is_hopping(ctx.now) {
            self.heading
        } else {
            Vec2::ZERO
        }
    }
}
