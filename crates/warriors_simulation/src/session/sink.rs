//! Persistence sink (fire-and-forget)
//!
//! Хост подключает свою реализацию `SessionSink` (аккаунт, лидерборд)
//! через `SessionSinkHandle`. Симуляция не ждёт подтверждения: ошибка
//! логируется как warning и отбрасывается.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use thiserror::Error;

/// Какой счётчик статистики меняется
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Kill,
    Win,
    Loss,
}

impl StatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Kill => "kill",
            StatKind::Win => "win",
            StatKind::Loss => "loss",
        }
    }
}

/// Событие для persistence сервиса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Stat { kind: StatKind, delta: i64 },
    FinalScore(i64),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("session service unavailable: {0}")]
    Unavailable(String),

    #[error("session service rejected {event:?}: {reason}")]
    Rejected { event: SessionEvent, reason: String },
}

pub trait SessionSink: Send + Sync {
    fn record(&self, event: SessionEvent) -> Result<(), SinkError>;
}

/// Sink по умолчанию: только лог
pub struct LogSink;

impl SessionSink for LogSink {
    fn record(&self, event: SessionEvent) -> Result<(), SinkError> {
        match event {
            SessionEvent::Stat { kind, delta } => {
                crate::logger::log_info(&format!("Session: stat {} {:+}", kind.as_str(), delta))
            }
            SessionEvent::FinalScore(score) => crate::logger::log_info(&format!("Session: final score {}", score)),
        }
        Ok(())
    }
}

/// Sink в памяти (CLI summary, тесты)
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<SessionEvent>>,
}

impl MemorySink {
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl SessionSink for MemorySink {
    fn record(&self, event: SessionEvent) -> Result<(), SinkError> {
        self.events
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink poisoned".into()))?
            .push(event);
        Ok(())
    }
}

/// Resource: подключённый sink
#[derive(Resource, Clone)]
pub struct SessionSinkHandle(pub Arc<dyn SessionSink>);

impl Default for SessionSinkHandle {
    fn default() -> Self {
        Self(Arc::new(LogSink))
    }
}

impl SessionSinkHandle {
    pub fn new(sink: Arc<dyn SessionSink>) -> Self {
        Self(sink)
    }

    /// Fire-and-forget: ошибка логируется и не попадает в симуляцию
    pub fn send(&self, event: SessionEvent) {
        if let Err(err) = self.0.record(event) {
            crate::logger::log_warning(&format!("Session: sink failed: {}", err));
        }
    }
}
