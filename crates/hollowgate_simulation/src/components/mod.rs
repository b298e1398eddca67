//! ECS Components для боевых entity
//!
//! Организация по доменам:
//! - actor: здоровье, защита игрока, сторона, тип врага, точка спавна
//! - movement: movement intent, скорость, knockback тело
//! - player: player marker

pub mod actor;
pub mod movement;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use player::*;
