use super::{progress::RunState, response::RunSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// События запуска, которые фоновая задача отправляет в канал.
/// Отрисовкой занимается получатель (консоль, GUI, тест).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEvent {
    /// Запуск начат
    Started {
        run_id: String,
        account: String,
        file: String,
    },

    /// Переход в новое состояние; progress не убывает
    StateChanged { state: RunState, progress: u8 },

    /// Сообщение для журнала
    Log {
        level: EventLevel,
        message: String,
        at: DateTime<Utc>,
    },

    /// Запуск завершен без критических ошибок
    Completed { summary: RunSummary },

    /// Нечего обрабатывать (пустой входной файл)
    NothingToProcess { message: String },

    /// Запуск провален
    Failed { message: String, error_count: usize },
}

impl RunEvent {
    pub fn log(level: EventLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::log(EventLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(EventLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::log(EventLevel::Error, message)
    }
}
