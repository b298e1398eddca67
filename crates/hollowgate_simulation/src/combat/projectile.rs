//! Projectile entity: полностью ECS-managed снаряд
//!
//! Lifecycle:
//! - Attack set: `ProjectileSpawnRequest` → entity + `ProjectileSpawned` (для presentation)
//! - Move set: линейное движение `direction * speed * dt`
//! - Collide set: касание тела → contact resolution → despawn
//! - Cleanup set: TTL истёк без попадания → despawn
//!
//! Снаряд хранит копии значений профиля и Team стрелка. Деспавн стрелка
//! на летящий снаряд не влияет.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::combat::contact::{resolve_contact, ContactBody};
use crate::combat::damage::{DamageRequest, DamageSource, Dead};
use crate::combat::profile::AttackProfile;
use crate::components::{PhysicsBody, Team};
use crate::config::CombatConfig;
use crate::schedule::SimClock;

/// Допуск на float-накопление fixed времени при проверке TTL
const EXPIRY_EPSILON: f32 = 1e-4;

/// Летящий снаряд
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    /// Нормализованное направление полёта
    pub direction: Vec2,
    pub speed: f32,
    pub damage: u32,
    pub knockback: f32,
    /// Спрайт повёрнут на +90°
    pub perpendicular: bool,
    /// Сторона стрелка (своих не бьёт). None: бьёт всех.
    pub team: Option<Team>,
    /// Только для атрибуции урона, стрелок может быть уже деспавнен
    pub shooter: Option<Entity>,
    /// Тик спавна: в этом же тике коллизии не резолвятся
    pub spawned_tick: u64,
    /// Момент истечения TTL (SimClock::now)
    pub expires_at: f32,
    /// Уже попал (ждёт деспавна)
    pub resolved: bool,
}

impl Projectile {
    /// Initialize: нулевое направление → вдоль +X
    pub fn initialize(direction: Vec2, speed: f32, damage: u32, knockback: f32, perpendicular: bool) -> Self {
        Self {
            direction: direction.normalize_or(Vec2::X),
            speed,
            damage,
            knockback,
            perpendicular,
            team: None,
            shooter: None,
            spawned_tick: 0,
            expires_at: f32::INFINITY,
            resolved: false,
        }
    }

    /// Привязка к моменту запуска (стрелок, team, тик, TTL)
    pub fn launched(
        mut self,
        shooter: Option<Entity>,
        team: Option<Team>,
        tick: u64,
        now: f32,
        lifetime_secs: f32,
    ) -> Self {
        self.shooter = shooter;
        self.team = team;
        self.spawned_tick = tick;
        self.expires_at = now + lifetime_secs;
        self
    }

    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    /// Угол спрайта (радианы): по направлению полёта, +90° если perpendicular
    pub fn visual_angle(&self) -> f32 {
        let angle = self.direction.y.atan2(self.direction.x);
        if self.perpendicular {
            angle + FRAC_PI_2
        } else {
            angle
        }
    }

    pub fn is_expired(&self, now: f32) -> bool {
        now + EXPIRY_EPSILON >= self.expires_at
    }

    /// Минимум один тик жизни + один резолв на снаряд
    pub fn can_collide(&self, tick: u64) -> bool {
        !self.resolved && tick > self.spawned_tick
    }

    /// Попадёт ли по телу этой стороны
    pub fn can_hit(&self, team: Option<Team>) -> bool {
        match (self.team, team) {
            (Some(own), Some(other)) => own.is_hostile_to(other),
            _ => true,
        }
    }
}

/// Запрос на спавн снаряда (AI → Attack set)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileSpawnRequest {
    pub shooter: Option<Entity>,
    /// Prefab id для presentation layer
    pub payload: String,
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: u32,
    pub knockback: f32,
    pub perpendicular: bool,
    pub lifetime_secs: f32,
    pub team: Option<Team>,
}

impl ProjectileSpawnRequest {
    /// Копирует значения профиля (снаряд не ссылается на стрелка)
    pub fn from_profile(
        profile: &AttackProfile,
        shooter: Option<Entity>,
        origin: Vec2,
        direction: Vec2,
        team: Option<Team>,
    ) -> Self {
        Self {
            shooter,
            payload: profile.payload.clone(),
            origin,
            direction,
            speed: profile.speed,
            damage: profile.damage,
            knockback: profile.knockback,
            perpendicular: profile.perpendicular,
            lifetime_secs: profile.lifetime_secs,
            team,
        }
    }
}

/// Событие: снаряд появился в мире (presentation инстанцирует payload)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileSpawned {
    pub entity: Entity,
    pub shooter: Option<Entity>,
    pub payload: String,
    pub position: Vec2,
    /// Угол спрайта вокруг Z (радианы)
    pub rotation: f32,
}

/// System: спавн снарядов из запросов (Attack set)
pub fn spawn_projectiles(
    mut commands: Commands,
    mut requests: EventReader<ProjectileSpawnRequest>,
    mut spawned_events: EventWriter<ProjectileSpawned>,
    clock: Res<SimClock>,
) {
    for request in requests.read() {
        let projectile = Projectile::initialize(
            request.direction,
            request.speed,
            request.damage,
            request.knockback,
            request.perpendicular,
        )
        .launched(request.shooter, request.team, clock.tick, clock.now, request.lifetime_secs);

        let rotation = projectile.visual_angle();
        let transform = Transform::from_translation(request.origin.extend(0.0))
            .with_rotation(Quat::from_rotation_z(rotation));

        let entity = commands.spawn((projectile, transform)).id();

        crate::logger::log(&format!(
            "🚀 Projectile {:?} ({}) spawned at {:?} by {:?}",
            entity, request.payload, request.origin, request.shooter
        ));

        spawned_events.write(ProjectileSpawned {
            entity,
            shooter: request.shooter,
            payload: request.payload.clone(),
            position: request.origin,
            rotation,
        });
    }
}

/// System: линейное движение снарядов (Move set)
pub fn move_projectiles(mut projectiles: Query<(&Projectile, &mut Transform)>, time: Res<Time>) {
    let delta = time.delta_secs();
    for (projectile, mut transform) in projectiles.iter_mut() {
        if projectile.resolved {
            continue;
        }
        transform.translation += (projectile.velocity() * delta).extend(0.0);
    }
}

/// System: projectile-vs-body (Collide set)
///
/// Из всех перекрытых тел выбирается ближайшее (равенство → меньший
/// entity index). Один снаряд = максимум одно попадание.
pub fn resolve_projectile_contacts(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &Transform)>,
    mut bodies: Query<
        (Entity, &Transform, &ContactBody, Option<&Team>, Option<&mut PhysicsBody>),
        (Without<Dead>, Without<Projectile>),
    >,
    mut damage_requests: EventWriter<DamageRequest>,
    clock: Res<SimClock>,
    config: Res<CombatConfig>,
) {
    for (projectile_entity, mut projectile, projectile_transform) in projectiles.iter_mut() {
        if !projectile.can_collide(clock.tick) {
            continue;
        }
        let projectile_position = projectile_transform.translation.truncate();

        let mut closest: Option<(f32, Entity)> = None;
        for (body_entity, body_transform, body, team, _) in bodies.iter() {
            if !body.target.blocks_projectiles() || !projectile.can_hit(team.copied()) {
                continue;
            }
            let body_position = body_transform.translation.truncate();
            if !body.overlaps(body_position, config.projectile_radius, projectile_position) {
                continue;
            }

            let distance = body_position.distance_squared(projectile_position);
            let is_closer = match closest {
                None => true,
                Some((best_distance, best_entity)) => {
                    distance < best_distance
                        || (distance == best_distance && body_entity.index() < best_entity.index())
                }
            };
            if is_closer {
                closest = Some((distance, body_entity));
            }
        }

        let Some((_, target)) = closest else {
            continue;
        };
        let Ok((_, body_transform, body, _, physics)) = bodies.get_mut(target) else {
            continue;
        };

        let resolution = resolve_contact(
            &projectile,
            projectile_position,
            body.target,
            body_transform.translation.truncate(),
        );

        if let Some(damage) = resolution.damage {
            damage_requests.write(DamageRequest {
                target,
                amount: i32::try_from(damage).unwrap_or(i32::MAX),
                source: DamageSource::Projectile,
                attacker: projectile.shooter,
            });
        }
        if let (Some(impulse), Some(mut physics)) = (resolution.impulse, physics) {
            physics.apply_impulse(impulse);
        }

        if resolution.consumes_projectile {
            crate::logger::log(&format!(
                "🎯 Projectile {:?} hit {:?} (damage {:?})",
                projectile_entity, target, resolution.damage
            ));
            projectile.resolved = true;
            commands.entity(projectile_entity).try_despawn();
        }
    }
}

/// System: TTL (Cleanup set)
pub fn expire_projectiles(
    mut commands: Commands,
    projectiles: Query<(Entity, &Projectile)>,
    clock: Res<SimClock>,
) {
    for (entity, projectile) in projectiles.iter() {
        if !projectile.resolved && projectile.is_expired(clock.now) {
            crate::logger::log(&format!("⏱️ Projectile {:?} expired", entity));
            commands.entity(entity).try_despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_initialize_normalizes_direction() {
        let projectile = Projectile::initialize(Vec2::new(3.0, 4.0), 10.0, 1, 0.0, false);
        assert!((projectile.direction.length() - 1.0).abs() < 1e-6);
        assert!((projectile.velocity() - Vec2::new(6.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let projectile = Projectile::initialize(Vec2::ZERO, 1.0, 1, 0.0, false);
        assert_eq!(projectile.direction, Vec2::X);
    }

    #[test]
    fn test_visual_angle() {
        let up = Projectile::initialize(Vec2::Y, 1.0, 1, 0.0, false);
        assert!((up.visual_angle() - FRAC_PI_2).abs() < 1e-6);

        let sideways = Projectile::initialize(Vec2::Y, 1.0, 1, 0.0, true);
        assert!((sideways.visual_angle() - PI).abs() < 1e-6);
    }

    #[test]
    fn test_one_tick_minimum_lifetime() {
        let projectile = Projectile::initialize(Vec2::X, 1.0, 1, 0.0, false).launched(None, None, 10, 1.0, 2.0);
        assert!(!projectile.can_collide(10));
        assert!(projectile.can_collide(11));
    }

    #[test]
    fn test_launched_binds_shooter() {
        let shooter = Entity::from_raw(7);
        let projectile =
            Projectile::initialize(Vec2::X, 1.0, 1, 0.0, false).launched(Some(shooter), Some(Team::Hostile), 3, 0.5, 1.0);

        assert_eq!(projectile.shooter, Some(shooter));
        assert_eq!(projectile.team, Some(Team::Hostile));
        assert_eq!(projectile.spawned_tick, 3);
        assert_eq!(projectile.expires_at, 1.5);
    }

    #[test]
    fn test_expiry() {
        let projectile = Projectile::initialize(Vec2::X, 1.0, 1, 0.0, false).launched(None, None, 0, 1.0, 2.0);
        assert!(!projectile.is_expired(2.9));
        assert!(projectile.is_expired(3.0));
        // float накопление 1/60
        assert!(projectile.is_expired(2.99999));
    }

    #[test]
    fn test_team_filter() {
        let hostile = Projectile::initialize(Vec2::X, 1.0, 1, 0.0, false).launched(
            None,
            Some(Team::Hostile),
            0,
            0.0,
            1.0,
        );
        assert!(hostile.can_hit(Some(Team::Player)));
        assert!(!hostile.can_hit(Some(Team::Hostile)));
        assert!(hostile.can_hit(None));
    }

    #[test]
    fn test_request_copies_profile() {
        let profile = crate::combat::profile::test_profile("bolt", 1.0);
        let request = ProjectileSpawnRequest::from_profile(&profile, None, Vec2::ZERO, Vec2::X, Some(Team::Hostile));
        assert_eq!(request.payload, "projectiles/bolt");
        assert_eq!(request.damage, profile.damage);
        assert_eq!(request.lifetime_secs, profile.lifetime_secs);
    }
}
