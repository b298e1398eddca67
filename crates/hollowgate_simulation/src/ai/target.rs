//! Target registry: кого преследуют враги.
//!
//! Вместо глобального поиска "найди игрока" AI читает snapshot позиции
//! назначенной цели, обновляемый раз в тик (Sense set).

use bevy::prelude::*;

use crate::combat::Dead;

/// Назначенная цель для всех hostile AI (обычно игрок)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesignatedTarget(pub Option<Entity>);

/// Позиция цели на текущий тик. None: цели нет (деспавн/смерть).
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetSnapshot {
    pub entity: Option<Entity>,
    pub position: Option<Vec2>,
}

/// System: обновляет TargetSnapshot (Sense set)
pub fn refresh_target_snapshot(
    designated: Res<DesignatedTarget>,
    mut snapshot: ResMut<TargetSnapshot>,
    targets: Query<&Transform, Without<Dead>>,
) {
    let position = designated
        .0
        .and_then(|entity| targets.get(entity).ok())
        .map(|transform| transform.translation.truncate());

    if snapshot.position.is_some() && position.is_none() {
        crate::logger::log(&format!("👻 Target {:?} lost (gone or dead)", designated.0));
    }

    *snapshot = TargetSnapshot {
        entity: designated.0,
        position,
    };
}
