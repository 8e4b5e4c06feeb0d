use super::product::ProductRecord;
use serde::{Deserialize, Serialize};

/// Заголовок отчета result.xlsx
pub const REPORT_HEADER: [&str; 7] = [
    "offer_id",
    "product_id",
    "status_before",
    "archived",
    "is_autoarchived",
    "action",
    "error",
];

/// Значение ячеек для товаров, которых нет в ответе API
pub const NOT_FOUND_MARKER: &str = "NOT_FOUND";

pub const NOT_FOUND_ERROR: &str = "Товар не найден в API";

/// Действие, принятое по товару
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportAction {
    /// Товар будет восстановлен из архива
    ToUnarchive,
    Skipped,
    /// Архивирован площадкой, восстанавливать нельзя
    SkippedAutoarchived,
    SkippedNotArchived,
    NotFound,
}

impl ReportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToUnarchive => "TO_UNARCHIVE",
            Self::Skipped => "SKIPPED",
            Self::SkippedAutoarchived => "SKIPPED_AUTOARCHIVED",
            Self::SkippedNotArchived => "SKIPPED_NOT_ARCHIVED",
            Self::NotFound => NOT_FOUND_MARKER,
        }
    }
}

impl std::fmt::Display for ReportAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Строка отчета. После добавления в отчет не изменяется.
///
/// Для NOT_FOUND поля product_id / status_before / archived / is_autoarchived
/// пустые и выводятся в отчет как `NOT_FOUND`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub offer_id: String,
    pub product_id: Option<i64>,
    pub status_before: Option<String>,
    pub archived: Option<bool>,
    pub is_autoarchived: Option<bool>,
    pub action: ReportAction,
    pub error: String,
}

impl ReportRow {
    pub fn from_record(record: &ProductRecord, action: ReportAction) -> Self {
        Self {
            offer_id: record.display_offer_id().to_string(),
            product_id: record.product_id,
            status_before: Some(record.status_name.clone()),
            archived: Some(record.is_archived),
            is_autoarchived: Some(record.is_autoarchived),
            action,
            error: String::new(),
        }
    }

    pub fn not_found(offer_id: impl Into<String>) -> Self {
        Self {
            offer_id: offer_id.into(),
            product_id: None,
            status_before: None,
            archived: None,
            is_autoarchived: None,
            action: ReportAction::NotFound,
            error: NOT_FOUND_ERROR.to_string(),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_as_report_text() {
        let json = serde_json::to_string(&ReportAction::SkippedAutoarchived).unwrap();
        assert_eq!(json, "\"SKIPPED_AUTOARCHIVED\"");
        assert_eq!(ReportAction::ToUnarchive.to_string(), "TO_UNARCHIVE");
        assert_eq!(ReportAction::NotFound.as_str(), "NOT_FOUND");
    }

    #[test]
    fn not_found_row_has_no_product_data() {
        let row = ReportRow::not_found("C-1");
        assert_eq!(row.offer_id, "C-1");
        assert_eq!(row.product_id, None);
        assert_eq!(row.archived, None);
        assert_eq!(row.action, ReportAction::NotFound);
        assert_eq!(row.error, NOT_FOUND_ERROR);
    }
}
