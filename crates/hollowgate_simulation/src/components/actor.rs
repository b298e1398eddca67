//! Базовые компоненты участников боя: Health, PlayerGuard, Team, EnemyKind

use bevy::prelude::*;

/// Здоровье участника боя
///
/// Инвариант: 0 ≤ current ≤ max.
/// `current == 0`: терминальное состояние: heal больше не действует.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Вычитает `amount` с clamp в 0, возвращает реально снятое значение
    pub fn reduce(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.current);
        self.current -= applied;
        applied
    }

    /// Лечение (clamp в max). Мёртвых не воскрешает.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let healed = amount.min(self.max - self.current);
        self.current += healed;
        healed
    }

    /// current ≤ max/2 (без потери точности на нечётном max)
    pub fn is_at_or_below_half(&self) -> bool {
        u64::from(self.current) * 2 <= u64::from(self.max)
    }

    /// Доля здоровья 0.0..=1.0 (для итоговой сводки и HUD)
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }
}

/// Player-specific защита: defense stat + окна неуязвимости и вспышки.
///
/// Оба окна: timestamps в секундах `SimClock::now`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerGuard {
    pub defense: u32,
    pub invincible_until: Option<f32>,
    pub flash_until: Option<f32>,
}

impl PlayerGuard {
    pub fn new(defense: u32) -> Self {
        Self {
            defense,
            ..Default::default()
        }
    }

    pub fn is_invincible(&self, now: f32) -> bool {
        self.invincible_until.is_some_and(|until| now < until)
    }

    pub fn is_flashing(&self, now: f32) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }
}

/// Сторона конфликта. Снаряды и contact damage не бьют свою сторону.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Team {
    Player,
    Hostile,
}

impl Team {
    pub fn is_hostile_to(self, other: Team) -> bool {
        self != other
    }
}

/// Тип врага (id для статистики/ачивок)
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct EnemyKind(pub String);

/// Точка спавна: центр патрулирования
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HomePosition(pub Vec2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_reduce() {
        let mut health = Health::new(100);
        assert_eq!(health.reduce(30), 30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        assert_eq!(health.reduce(100), 70); // Clamp в 0
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.reduce(50);

        assert_eq!(health.heal(30), 30);
        assert_eq!(health.current, 80);

        assert_eq!(health.heal(100), 20); // Clamped to max
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_heal_does_not_revive() {
        let mut health = Health::new(10);
        health.reduce(10);

        assert_eq!(health.heal(5), 0);
        assert_eq!(health.current, 0);
    }

    #[test]
    fn test_half_threshold() {
        let mut health = Health::new(100);
        health.reduce(49);
        assert!(!health.is_at_or_below_half());
        health.reduce(1);
        assert!(health.is_at_or_below_half());

        let mut odd = Health::new(7);
        odd.reduce(3); // 4 > 3.5
        assert!(!odd.is_at_or_below_half());
        odd.reduce(1); // 3 ≤ 3.5
        assert!(odd.is_at_or_below_half());
    }

    #[test]
    fn test_health_fraction() {
        let mut health = Health::new(10);
        assert_eq!(health.fraction(), 1.0);
        health.reduce(5);
        assert_eq!(health.fraction(), 0.5);
        health.reduce(5);
        assert_eq!(health.fraction(), 0.0);
    }

    #[test]
    fn test_guard_windows() {
        let mut guard = PlayerGuard::new(6);
        assert!(!guard.is_invincible(0.0));

        guard.invincible_until = Some(1.5);
        assert!(guard.is_invincible(1.0));
        assert!(guard.is_invincible(1.49));
        assert!(!guard.is_invincible(1.5));
    }

    #[test]
    fn test_team_hostility() {
        assert!(Team::Player.is_hostile_to(Team::Hostile));
        assert!(!Team::Hostile.is_hostile_to(Team::Hostile));
    }
}
