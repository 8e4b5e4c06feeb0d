use contracts::usecases::u508_unarchive_ozon_products::{EventLevel, RunEvent, RunState};
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// Канал событий запуска: фоновая задача только пишет, отображение только читает.
///
/// Каждое сообщение журнала дублируется в tracing. Закрытый получатель не
/// считается ошибкой: запуск доводится до конца.
pub struct EventSink {
    sender: Option<UnboundedSender<RunEvent>>,
    progress: AtomicU8,
}

impl EventSink {
    pub fn new(sender: UnboundedSender<RunEvent>) -> Self {
        Self {
            sender: Some(sender),
            progress: AtomicU8::new(0),
        }
    }

    /// Сток без получателя (только tracing)
    pub fn detached() -> Self {
        Self {
            sender: None,
            progress: AtomicU8::new(0),
        }
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    pub fn log(&self, level: EventLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            EventLevel::Info => tracing::info!("{}", message),
            EventLevel::Warn => tracing::warn!("{}", message),
            EventLevel::Error => tracing::error!("{}", message),
        }
        self.emit(RunEvent::log(level, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(EventLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(EventLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(EventLevel::Error, message);
    }

    /// Переход в новое состояние. Прогресс никогда не уменьшается.
    pub fn transition(&self, state: RunState) {
        let target = state.progress().unwrap_or(0);
        let previous = self.progress.fetch_max(target, Ordering::AcqRel);
        let progress = previous.max(target);
        tracing::debug!("Run state -> {} ({}%)", state, progress);
        self.emit(RunEvent::StateChanged { state, progress });
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_even_when_failing() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = EventSink::new(tx);

        sink.transition(RunState::Loading);
        sink.transition(RunState::Fetching);
        sink.transition(RunState::Failed);

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let RunEvent::StateChanged { state, progress } = event {
                seen.push((state, progress));
            }
        }
        assert_eq!(
            seen,
            vec![
                (RunState::Loading, 0),
                (RunState::Fetching, 10),
                (RunState::Failed, 10),
            ]
        );
        assert_eq!(sink.progress(), 10);
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let sink = EventSink::new(tx);
        sink.info("nobody listens");
        sink.transition(RunState::Done);
        assert_eq!(sink.progress(), 100);
    }
}
