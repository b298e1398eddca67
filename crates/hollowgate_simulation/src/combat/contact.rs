//! Contact resolution: что происходит, когда снаряд касается тела.
//!
//! Capabilities тела не взаимоисключающие:
//! - Damageable → урон
//! - Physical → knockback impulse
//! - Obstacle → снаряд просто гасится
//! - Sensor → снаряд пролетает насквозь

use bevy::prelude::*;

use crate::combat::damage::{DamageRequest, DamageSource, Dead};
use crate::combat::projectile::Projectile;
use crate::components::Team;

/// Тип тела для contact resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ContactTarget {
    /// Получает урон, без knockback
    Damageable,
    /// Получает урон и knockback
    DamageablePhysical,
    /// Стена/препятствие: гасит снаряд
    Obstacle,
    /// Триггер-зона: снаряд не замечает
    Sensor,
}

impl ContactTarget {
    pub fn is_damageable(self) -> bool {
        matches!(self, ContactTarget::Damageable | ContactTarget::DamageablePhysical)
    }

    pub fn is_physical(self) -> bool {
        matches!(self, ContactTarget::DamageablePhysical | ContactTarget::Obstacle)
    }

    /// Гасит ли касание снаряд
    pub fn blocks_projectiles(self) -> bool {
        self != ContactTarget::Sensor
    }
}

/// Круглый коллайдер на плоскости XY
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ContactBody {
    pub radius: f32,
    pub target: ContactTarget,
}

impl ContactBody {
    pub fn new(radius: f32, target: ContactTarget) -> Self {
        Self { radius, target }
    }

    pub fn overlaps(&self, position: Vec2, other_radius: f32, other_position: Vec2) -> bool {
        let reach = self.radius + other_radius;
        position.distance_squared(other_position) <= reach * reach
    }
}

/// Что сделать с целью и снарядом после касания
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResolution {
    pub damage: Option<u32>,
    pub impulse: Option<Vec2>,
    pub consumes_projectile: bool,
}

/// Чистая функция: снаряд × тело → урон, impulse, судьба снаряда
///
/// Impulse направлен от снаряда к цели (если позиции совпадают, то по
/// направлению полёта) и масштабирован силой knockback.
pub fn resolve_contact(
    projectile: &Projectile,
    projectile_position: Vec2,
    target: ContactTarget,
    target_position: Vec2,
) -> ContactResolution {
    let damage = target.is_damageable().then_some(projectile.damage);

    let impulse = (target.is_physical() && target.is_damageable() && projectile.knockback > 0.0).then(|| {
        (target_position - projectile_position).normalize_or(projectile.direction) * projectile.knockback
    });

    ContactResolution {
        damage,
        impulse,
        consumes_projectile: target.blocks_projectiles(),
    }
}

/// Урон при касании (hopper и прочие "тела-ловушки")
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ContactDamage {
    pub amount: u32,
}

/// System: contact damage каждый тик, пока тела перекрываются (Collide set)
///
/// Игрок с окном неуязвимости просто проигнорирует лишние запросы.
pub fn apply_contact_damage(
    attackers: Query<(Entity, &Transform, &ContactBody, &ContactDamage, &Team), Without<Dead>>,
    targets: Query<(Entity, &Transform, &ContactBody, &Team), (Without<Dead>, Without<Projectile>)>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    for (attacker, attacker_transform, attacker_body, contact, attacker_team) in attackers.iter() {
        let attacker_position = attacker_transform.translation.truncate();

        for (target, target_transform, target_body, target_team) in targets.iter() {
            if target == attacker || !attacker_team.is_hostile_to(*target_team) {
                continue;
            }
            if !target_body.target.is_damageable() {
                continue;
            }

            let target_position = target_transform.translation.truncate();
            if attacker_body.overlaps(attacker_position, target_body.radius, target_position) {
                damage_requests.write(DamageRequest {
                    target,
                    amount: i32::try_from(contact.amount).unwrap_or(i32::MAX),
                    source: DamageSource::Contact,
                    attacker: Some(attacker),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt(knockback: f32) -> Projectile {
        Projectile::initialize(Vec2::X, 5.0, 4, knockback, false)
    }

    #[test]
    fn test_damageable_physical_gets_damage_and_impulse() {
        let resolution = resolve_contact(
            &bolt(2.0),
            Vec2::ZERO,
            ContactTarget::DamageablePhysical,
            Vec2::new(0.0, 1.0),
        );

        assert_eq!(resolution.damage, Some(4));
        assert_eq!(resolution.impulse, Some(Vec2::new(0.0, 2.0)));
        assert!(resolution.consumes_projectile);
    }

    #[test]
    fn test_damageable_only_no_impulse() {
        let resolution = resolve_contact(&bolt(2.0), Vec2::ZERO, ContactTarget::Damageable, Vec2::X);
        assert_eq!(resolution.damage, Some(4));
        assert_eq!(resolution.impulse, None);
    }

    #[test]
    fn test_obstacle_consumes_without_damage() {
        let resolution = resolve_contact(&bolt(2.0), Vec2::ZERO, ContactTarget::Obstacle, Vec2::X);
        assert_eq!(resolution.damage, None);
        assert_eq!(resolution.impulse, None);
        assert!(resolution.consumes_projectile);
    }

    #[test]
    fn test_sensor_is_ignored() {
        let resolution = resolve_contact(&bolt(2.0), Vec2::ZERO, ContactTarget::Sensor, Vec2::X);
        assert_eq!(resolution.damage, None);
        assert!(!resolution.consumes_projectile);
    }

    #[test]
    fn test_coincident_positions_use_travel_direction() {
        let resolution = resolve_contact(&bolt(3.0), Vec2::ONE, ContactTarget::DamageablePhysical, Vec2::ONE);
        assert_eq!(resolution.impulse, Some(Vec2::new(3.0, 0.0)));
    }

    #[test]
    fn test_overlap() {
        let body = ContactBody::new(0.5, ContactTarget::Damageable);
        assert!(body.overlaps(Vec2::ZERO, 0.5, Vec2::new(1.0, 0.0)));
        assert!(!body.overlaps(Vec2::ZERO, 0.5, Vec2::new(1.01, 0.0)));
    }
}
