//! Boss Phase: ортогональное к AIState измерение.
//!
//! Phase1 → Phase2 один раз, когда health ≤ max/2. На входе в Phase2
//! запускается независимый radial loop: залп из N снарядов по кругу,
//! выпущенных с под-интервалом, затем cooldown профиля и снова залп.
//! Loop живёт до смерти и отменяется в death transition.

use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::combat::{AttackProfileId, AttackScheduler};
use crate::components::Health;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum Phase {
    #[default]
    Phase1,
    Phase2,
}

/// Текущий залп
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Volley {
    /// Индекс следующего выстрела в залпе
    pub next_shot: u32,
    pub next_shot_at: f32,
}

/// Radial attack loop (свой профиль → свой cooldown в AttackScheduler)
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct RadialBurst {
    pub profile: AttackProfileId,
    pub shots: u32,
    pub shot_interval: f32,
    pub volley: Option<Volley>,
}

impl RadialBurst {
    pub fn new(profile: AttackProfileId, shots: u32, shot_interval: f32) -> Self {
        Self {
            profile,
            shots,
            shot_interval,
            volley: None,
        }
    }

    /// Направление i-го снаряда залпа (равномерно по углу)
    pub fn shot_direction(&self, shot: u32) -> Vec2 {
        Vec2::from_angle(TAU * shot as f32 / self.shots.max(1) as f32)
    }

    /// Продвигает loop до `now`, возвращает направления снарядов этого тика
    ///
    /// Новый залп стартует только через `TryFire` профиля; пока залп идёт,
    /// следующий не начинается.
    pub fn tick(&mut self, now: f32, scheduler: &mut AttackScheduler, cooldown_secs: f32) -> Vec<Vec2> {
        let mut directions = Vec::new();
        if self.shots == 0 {
            return directions;
        }

        if self.volley.is_none() {
            if !scheduler.try_fire(self.profile, cooldown_secs, now) {
                return directions;
            }
            self.volley = Some(Volley {
                next_shot: 0,
                next_shot_at: now,
            });
        }

        while let Some(mut volley) = self.volley {
            if volley.next_shot_at > now {
                break;
            }
            directions.push(self.shot_direction(volley.next_shot));
            volley.next_shot += 1;
            volley.next_shot_at += self.shot_interval;

            self.volley = (volley.next_shot < self.shots).then_some(volley);
        }

        directions
    }
}

/// Фаза босса + radial loop
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BossPhase {
    pub phase: Phase,
    /// Активный loop (Some только в Phase2 и пока жив)
    pub radial: Option<RadialBurst>,
    /// Шаблон loop, копируется при входе в Phase2
    pub radial_template: RadialBurst,
}

impl BossPhase {
    pub fn new(radial_template: RadialBurst) -> Self {
        Self {
            phase: Phase::Phase1,
            radial: None,
            radial_template,
        }
    }

    /// Проверка порога. true: именно сейчас вошли в Phase2 (ровно один раз).
    pub fn observe(&mut self, health: &Health) -> bool {
        if self.phase == Phase::Phase2 || !health.is_alive() || !health.is_at_or_below_half() {
            return false;
        }

        self.phase = Phase::Phase2;
        self.radial = Some(self.radial_template.clone());
        true
    }

    /// Death transition: loop останавливается насовсем
    pub fn cancel(&mut self) {
        self.radial = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMARY: AttackProfileId = AttackProfileId(0);
    const RADIAL: AttackProfileId = AttackProfileId(1);

    fn boss_phase() -> BossPhase {
        BossPhase::new(RadialBurst::new(RADIAL, 4, 0.1))
    }

    #[test]
    fn test_phase2_entered_once() {
        let mut phase = boss_phase();
        let mut health = Health::new(100);

        health.reduce(49);
        assert!(!phase.observe(&health));
        assert_eq!(phase.phase, Phase::Phase1);

        health.reduce(1);
        assert!(phase.observe(&health));
        assert_eq!(phase.phase, Phase::Phase2);
        assert!(phase.radial.is_some());

        // Heal выше порога: Phase2 остаётся, повторного входа нет
        health.heal(30);
        assert!(!phase.observe(&health));
        health.reduce(40);
        assert!(!phase.observe(&health));
        assert_eq!(phase.phase, Phase::Phase2);
    }

    #[test]
    fn test_dead_boss_does_not_enter_phase2() {
        let mut phase = boss_phase();
        let mut health = Health::new(100);
        health.reduce(100);

        assert!(!phase.observe(&health));
        assert_eq!(phase.phase, Phase::Phase1);
    }

    #[test]
    fn test_volley_spacing_and_angles() {
        let mut burst = RadialBurst::new(RADIAL, 4, 0.1);
        let mut scheduler = AttackScheduler::default();

        let first = burst.tick(1.0, &mut scheduler, 2.0);
        assert_eq!(first.len(), 1);
        assert!((first[0] - Vec2::X).length() < 1e-5);

        // Под-интервал ещё не прошёл
        assert!(burst.tick(1.05, &mut scheduler, 2.0).is_empty());

        let second = burst.tick(1.1, &mut scheduler, 2.0);
        assert_eq!(second.len(), 1);
        assert!((second[0] - Vec2::Y).length() < 1e-5);

        // Пропуск тиков: догоняем оставшиеся выстрелы
        let rest = burst.tick(1.35, &mut scheduler, 2.0);
        assert_eq!(rest.len(), 2);
        assert!(burst.volley.is_none());

        // Следующий залп только после cooldown (от старта предыдущего)
        assert!(burst.tick(2.5, &mut scheduler, 2.0).is_empty());
        assert_eq!(burst.tick(3.0, &mut scheduler, 2.0).len(), 1);
    }

    #[test]
    fn test_radial_independent_from_primary() {
        let mut burst = RadialBurst::new(RADIAL, 2, 0.0);
        let mut scheduler = AttackScheduler::default();
        assert!(scheduler.try_fire(PRIMARY, 10.0, 0.0));

        // Нулевой под-интервал → весь залп за один тик
        assert_eq!(burst.tick(0.0, &mut scheduler, 1.0).len(), 2);
        assert!(!scheduler.is_ready(PRIMARY, 0.5));
    }

    #[test]
    fn test_cancel_stops_loop() {
        let mut phase = boss_phase();
        let mut health = Health::new(10);
        health.reduce(5);
        phase.observe(&health);

        phase.cancel();
        assert!(phase.radial.is_none());
    }
}
