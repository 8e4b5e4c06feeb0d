use serde::{Deserialize, Serialize};

/// Состояние запуска восстановления
///
/// Переходы строго последовательные:
/// Idle → Loading → Fetching → Classifying → Restoring → Reporting → Done.
/// В Failed можно попасть из любого состояния.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Loading,
    Fetching,
    Classifying,
    Restoring,
    Reporting,
    Done,
    Failed,
}

impl RunState {
    /// Значение прогресса (0..=100) при входе в состояние.
    /// Для Failed значения нет: прогресс остается на последнем достигнутом.
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Idle | Self::Loading => Some(0),
            Self::Fetching => Some(10),
            Self::Classifying => Some(50),
            Self::Restoring => Some(70),
            Self::Reporting => Some(90),
            Self::Done => Some(100),
            Self::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Fetching => "fetching",
            Self::Classifying => "classifying",
            Self::Restoring => "restoring",
            Self::Reporting => "reporting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_grows_along_the_happy_path() {
        let path = [
            RunState::Loading,
            RunState::Fetching,
            RunState::Classifying,
            RunState::Restoring,
            RunState::Reporting,
            RunState::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].progress() < pair[1].progress());
        }
        assert_eq!(RunState::Done.progress(), Some(100));
        assert_eq!(RunState::Failed.progress(), None);
    }

    #[test]
    fn terminal_states() {
        assert!(RunState::Done.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Restoring.is_terminal());
    }
}
