use serde::{Deserialize, Serialize};

/// Итог успешного запуска
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,

    /// Всего offer_id во входном файле (с дубликатами)
    pub processed: usize,

    /// Товаров получено из API
    pub found: usize,

    /// Товаров отправлено на восстановление
    pub restore_requested: usize,

    pub fetch_errors: usize,
    pub restore_errors: usize,

    /// Путь к сохраненному отчету
    pub report_path: String,
}

/// Результат запуска, не завершившегося ошибкой
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Во входном файле нет ни одного offer_id: запросов и отчета нет
    NothingToProcess,

    Completed(RunSummary),
}
