//! Player marker component

use bevy::prelude::*;

/// Marker component для player-controlled entity
///
/// Player идёт через mitigated damage path (`PlayerGuard`), враги через raw.
/// AI системы игрока не трогают: движение игрока приходит извне (input layer).
///
/// # Single-player
/// Обычно только один entity имеет этот компонент, он же `DesignatedTarget`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;
