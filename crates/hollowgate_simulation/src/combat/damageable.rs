//! Damageable contract и damage resolver (player + hostile paths)
//!
//! Две формулы сознательно разные:
//! - Hostile: raw damage, без защиты и без неуязвимости
//! - Player: `max(1, round(raw * 6 / (6 + defense)))` + окно неуязвимости
//!
//! Оба пути: урон < 0 отклоняется целиком, health не уходит ниже 0,
//! повторный вызов на мёртвом entity: no-op (смерть ровно один раз).

use crate::components::{Health, PlayerGuard};

/// Масштаб defense в формуле mitigation (defense == 6 → половина урона)
pub const DEFENSE_SCALE: f64 = 6.0;

/// Результат одного TakeDamage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Отрицательный урон: отклонён
    Rejected,
    /// Entity уже мёртв
    AlreadyDead,
    /// Игрок в окне неуязвимости: вызов полностью проигнорирован
    Invincible,
    /// Урон применён, entity жив
    Applied { applied: u32, remaining: u32 },
    /// Этот вызов перевёл health в 0 (ровно один раз за жизнь)
    Killed { applied: u32 },
}

impl DamageOutcome {
    pub fn is_lethal(&self) -> bool {
        matches!(self, DamageOutcome::Killed { .. })
    }

    /// Сколько health реально снято
    pub fn applied(&self) -> u32 {
        match self {
            DamageOutcome::Applied { applied, .. } | DamageOutcome::Killed { applied } => *applied,
            _ => 0,
        }
    }

    /// Был ли вызов "засчитан" (mutation + feedback)
    pub fn landed(&self) -> bool {
        matches!(self, DamageOutcome::Applied { .. } | DamageOutcome::Killed { .. })
    }
}

/// Capability: всё, что может получать урон
pub trait Damageable {
    /// `now`: `SimClock::now`, нужен для окон неуязвимости
    fn take_damage(&mut self, amount: i32, now: f32) -> DamageOutcome;

    fn is_dead(&self) -> bool;
}

/// Player mitigation: `max(1, round(raw * 6 / (6 + defense)))`
///
/// - defense = 0 → raw (rounded)
/// - defense = 6 → raw / 2
/// - raw = 0 → 1 (chip damage floor)
pub fn mitigate_damage(raw: u32, defense: u32) -> u32 {
    let scaled = f64::from(raw) * DEFENSE_SCALE / (DEFENSE_SCALE + f64::from(defense));
    // round(): half away from zero
    (scaled.round() as u32).max(1)
}

fn finish(health: &Health, applied: u32) -> DamageOutcome {
    if health.is_alive() {
        DamageOutcome::Applied {
            applied,
            remaining: health.current,
        }
    } else {
        DamageOutcome::Killed { applied }
    }
}

/// Hostile damage path: raw damage без mitigation
pub struct HostileVitals<'a> {
    pub health: &'a mut Health,
}

impl Damageable for HostileVitals<'_> {
    fn take_damage(&mut self, amount: i32, _now: f32) -> DamageOutcome {
        if !self.health.is_alive() {
            return DamageOutcome::AlreadyDead;
        }
        let Ok(amount) = u32::try_from(amount) else {
            return DamageOutcome::Rejected;
        };

        let applied = self.health.reduce(amount);
        finish(self.health, applied)
    }

    fn is_dead(&self) -> bool {
        !self.health.is_alive()
    }
}

/// Player damage path: неуязвимость → mitigation → health → окна
pub struct PlayerVitals<'a> {
    pub health: &'a mut Health,
    pub guard: &'a mut PlayerGuard,
    pub invincibility_secs: f32,
    pub flash_secs: f32,
}

impl Damageable for PlayerVitals<'_> {
    fn take_damage(&mut self, amount: i32, now: f32) -> DamageOutcome {
        if !self.health.is_alive() {
            return DamageOutcome::AlreadyDead;
        }
        // В окне: ни mitigation, ни flash, ни перезапуска окна
        if self.guard.is_invincible(now) {
            return DamageOutcome::Invincible;
        }
        let Ok(raw) = u32::try_from(amount) else {
            return DamageOutcome::Rejected;
        };

        let final_damage = mitigate_damage(raw, self.guard.defense);
        let applied = self.health.reduce(final_damage);

        // Flash и неуязвимость стартуют одновременно
        self.guard.flash_until = Some(now + self.flash_secs);
        self.guard.invincible_until = Some(now + self.invincibility_secs);

        finish(self.health, applied)
    }

    fn is_dead(&self) -> bool {
        !self.health.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_vitals<'a>(health: &'a mut Health, guard: &'a mut PlayerGuard) -> PlayerVitals<'a> {
        PlayerVitals {
            health,
            guard,
            invincibility_secs: 0.5,
            flash_secs: 0.1,
        }
    }

    #[test]
    fn test_mitigation_formula() {
        assert_eq!(mitigate_damage(10, 0), 10);
        assert_eq!(mitigate_damage(10, 6), 5);
        assert_eq!(mitigate_damage(0, 0), 1); // floor = 1
        assert_eq!(mitigate_damage(1, 100), 1);
        // 3 * 6 / 10 = 1.8 → 2
        assert_eq!(mitigate_damage(3, 4), 2);
        // 5 * 6 / 12 = 2.5 → 3 (half away from zero)
        assert_eq!(mitigate_damage(5, 6), 3);
    }

    #[test]
    fn test_hostile_raw_damage_sequence() {
        let mut health = Health::new(100);
        let mut vitals = HostileVitals { health: &mut health };

        assert_eq!(
            vitals.take_damage(15, 0.0),
            DamageOutcome::Applied { applied: 15, remaining: 85 }
        );
        assert_eq!(
            vitals.take_damage(15, 0.0),
            DamageOutcome::Applied { applied: 15, remaining: 70 }
        );
        assert_eq!(vitals.take_damage(80, 0.0), DamageOutcome::Killed { applied: 70 });
        assert!(vitals.is_dead());

        // Смерть ровно один раз
        assert_eq!(vitals.take_damage(10, 0.0), DamageOutcome::AlreadyDead);
        assert_eq!(health.current, 0);
    }

    #[test]
    fn test_negative_damage_rejected() {
        let mut health = Health::new(20);
        let mut vitals = HostileVitals { health: &mut health };
        assert_eq!(vitals.take_damage(-5, 0.0), DamageOutcome::Rejected);
        assert_eq!(health.current, 20);

        let mut health = Health::new(20);
        let mut guard = PlayerGuard::new(0);
        let mut vitals = player_vitals(&mut health, &mut guard);
        assert_eq!(vitals.take_damage(-5, 0.0), DamageOutcome::Rejected);
        // Отклонённый урон не открывает окно неуязвимости
        assert_eq!(guard.invincible_until, None);
        assert_eq!(health.current, 20);
    }

    #[test]
    fn test_zero_damage_hostile_is_noop_hit() {
        let mut health = Health::new(5);
        let mut vitals = HostileVitals { health: &mut health };
        assert_eq!(
            vitals.take_damage(0, 0.0),
            DamageOutcome::Applied { applied: 0, remaining: 5 }
        );
    }

    #[test]
    fn test_player_mitigation_and_invincibility() {
        let mut health = Health::new(10);
        let mut guard = PlayerGuard::new(6);

        {
            let mut vitals = player_vitals(&mut health, &mut guard);
            assert_eq!(
                vitals.take_damage(10, 1.0),
                DamageOutcome::Applied { applied: 5, remaining: 5 }
            );
        }
        assert_eq!(guard.invincible_until, Some(1.5));
        assert_eq!(guard.flash_until, Some(1.1));

        {
            // Внутри окна: полностью игнорируется, окно не продлевается
            let mut vitals = player_vitals(&mut health, &mut guard);
            assert_eq!(vitals.take_damage(10, 1.2), DamageOutcome::Invincible);
        }
        assert_eq!(health.current, 5);
        assert_eq!(guard.invincible_until, Some(1.5));

        {
            // Окно истекло
            let mut vitals = player_vitals(&mut health, &mut guard);
            assert_eq!(vitals.take_damage(10, 1.5), DamageOutcome::Killed { applied: 5 });
        }
        assert_eq!(health.current, 0);
    }

    #[test]
    fn test_player_zero_damage_still_hurts() {
        let mut health = Health::new(3);
        let mut guard = PlayerGuard::new(0);
        let mut vitals = player_vitals(&mut health, &mut guard);
        assert_eq!(
            vitals.take_damage(0, 0.0),
            DamageOutcome::Applied { applied: 1, remaining: 2 }
        );
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(DamageOutcome::Killed { applied: 3 }.is_lethal());
        assert_eq!(DamageOutcome::Invincible.applied(), 0);
        assert!(!DamageOutcome::Rejected.landed());
        assert!(DamageOutcome::Applied { applied: 0, remaining: 1 }.landed());
    }
}
