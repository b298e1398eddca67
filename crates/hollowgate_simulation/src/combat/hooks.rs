//! Внешние sinks: прогресс (убийства по типу врага) и game over.
//!
//! Ядро не знает, кто по ту сторону: статистика, ачивки, UI.
//! Незарегистрированный sink → warning в лог, без паники.

use bevy::prelude::*;

/// Получает событие "убит враг такого типа"
pub trait ProgressSink: Send + Sync {
    fn record_kill(&self, kind: &str);
}

/// Получает событие "игрок погиб"
pub trait GameOverSink: Send + Sync {
    fn game_over(&self);
}

/// Зарегистрированные sinks (Resource)
#[derive(Resource, Default)]
pub struct CombatHooks {
    progress: Option<Box<dyn ProgressSink>>,
    game_over: Option<Box<dyn GameOverSink>>,
}

impl CombatHooks {
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn with_game_over(mut self, sink: impl GameOverSink + 'static) -> Self {
        self.game_over = Some(Box::new(sink));
        self
    }

    pub fn set_progress(&mut self, sink: Box<dyn ProgressSink>) {
        self.progress = Some(sink);
    }

    pub fn set_game_over(&mut self, sink: Box<dyn GameOverSink>) {
        self.game_over = Some(sink);
    }

    pub fn record_kill(&self, kind: &str) {
        match &self.progress {
            Some(sink) => sink.record_kill(kind),
            None => crate::logger::log_warning(&format!(
                "⚠️ No progress sink registered, kill of `{}` not recorded",
                kind
            )),
        }
    }

    pub fn game_over(&self) {
        match &self.game_over {
            Some(sink) => sink.game_over(),
            None => crate::logger::log_warning("⚠️ No game over sink registered"),
        }
    }
}
