//! Movement компоненты: intent, скорость, knockback тело

use bevy::prelude::*;

/// Желаемое направление движения на этот тик (пишет AI)
///
/// Нулевой вектор: стоим на месте.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MovementInput {
    pub direction: Vec2,
}

impl MovementInput {
    pub fn stop(&mut self) {
        self.direction = Vec2::ZERO;
    }
}

/// Скорость движения (units/sec)
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 2.0 }
    }
}

/// Физическое тело: принимает impulse (knockback), скорость затухает со временем.
///
/// Наличие компонента = "Physical" capability для contact resolution.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    pub mass: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass: 1.0,
        }
    }
}

impl PhysicsBody {
    pub fn new(mass: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass,
        }
    }

    /// velocity += impulse / mass (масса ≤ 0 трактуется как 1)
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        let mass = if self.mass > 0.0 { self.mass } else { 1.0 };
        self.velocity += impulse / mass;
    }

    /// Экспоненциальное затухание knockback скорости
    pub fn damp(&mut self, damping: f32, delta: f32) {
        self.velocity *= (-damping * delta).exp();
        if self.velocity.length_squared() < 1e-6 {
            self.velocity = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_scaled_by_mass() {
        let mut body = PhysicsBody::new(2.0);
        body.apply_impulse(Vec2::new(4.0, 0.0));
        assert_eq!(body.velocity, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_zero_mass_fallback() {
        let mut body = PhysicsBody::new(0.0);
        body.apply_impulse(Vec2::new(0.0, 3.0));
        assert_eq!(body.velocity, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn test_damping_settles_to_zero() {
        let mut body = PhysicsBody::default();
        body.apply_impulse(Vec2::new(5.0, 0.0));

        body.damp(8.0, 1.0 / 60.0);
        assert!(body.velocity.x < 5.0 && body.velocity.x > 0.0);

        for _ in 0..600 {
            body.damp(8.0, 1.0 / 60.0);
        }
        assert_eq!(body.velocity, Vec2::ZERO);
    }
}
