use super::batch::{self, BatchResult, ChunkError};
use super::classifier;
use super::event_sink::EventSink;
use super::offer_loader::{self, FileFormatError};
use super::ozon_api_client::CatalogApi;
use super::report_writer::{self, ReportError};
use crate::shared::config::ConfigError;
use contracts::domain::a001_seller_account::Account;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u508_unarchive_ozon_products::{
    RunEvent, RunOutcome, RunState, RunSummary, UnarchiveOzonProducts,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Сколько ошибок чанков показывать пользователю при провале запуска
const SHOWN_FETCH_ERRORS: usize = 5;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot load offer ids: {0}")]
    FileFormat(#[from] FileFormatError),

    #[error("failed to fetch products: {} request(s) failed", .errors.len())]
    FetchFailed { errors: Vec<ChunkError> },

    #[error("failed to write report: {0}")]
    Report(#[from] ReportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("another run is already in progress")]
    AlreadyRunning,

    #[error("background task failed: {0}")]
    Worker(String),
}

impl RunError {
    /// Количество ошибок для итогового уведомления
    pub fn error_count(&self) -> usize {
        match self {
            Self::FetchFailed { errors } => errors.len(),
            _ => 1,
        }
    }
}

/// Executor для UseCase восстановления товаров из архива
///
/// Один вызов [`UnarchiveExecutor::run`] проходит состояния
/// Loading → Fetching → Classifying → Restoring → Reporting → Done
/// и сообщает о ходе работы через [`EventSink`].
#[derive(Clone)]
pub struct UnarchiveExecutor {
    api: Arc<dyn CatalogApi>,
}

impl UnarchiveExecutor {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    pub async fn run(
        &self,
        account: &Account,
        input: &Path,
        sink: &EventSink,
    ) -> Result<RunOutcome, RunError> {
        let run_id = Uuid::new_v4().to_string();
        tracing::info!(
            "Starting {} run {} for account '{}' with {}",
            UnarchiveOzonProducts::full_name(),
            run_id,
            account.name,
            input.display()
        );
        sink.emit(RunEvent::Started {
            run_id: run_id.clone(),
            account: account.name.clone(),
            file: input.display().to_string(),
        });

        // Loading
        sink.transition(RunState::Loading);
        sink.info("=== НАЧАЛО ОБРАБОТКИ ===");
        sink.info("Загружаем файл...");
        let offer_ids = match offer_loader::read_offer_ids(input) {
            Ok(offer_ids) => offer_ids,
            Err(e) => return Err(Self::fail(sink, RunError::FileFormat(e))),
        };
        sink.info(format!("Найдено {} товаров для проверки.", offer_ids.len()));

        if offer_ids.is_empty() {
            let message = "В файле не найдено offer_id.".to_string();
            sink.info(message.clone());
            sink.transition(RunState::Done);
            sink.emit(RunEvent::NothingToProcess { message });
            return Ok(RunOutcome::NothingToProcess);
        }

        // Fetching
        sink.transition(RunState::Fetching);
        let fetched = batch::fetch_products(&*self.api, account, &offer_ids, sink).await;

        if fetched.items.is_empty() && !fetched.errors.is_empty() {
            sink.error("❌ Не удалось получить данные о товарах");
            for error in fetched.errors.iter().take(SHOWN_FETCH_ERRORS) {
                sink.error(format!("Ошибка: {}", error));
            }
            return Err(Self::fail(
                sink,
                RunError::FetchFailed {
                    errors: fetched.errors,
                },
            ));
        }
        sink.info(format!("Получено данных о {} товарах", fetched.items.len()));

        // Classifying
        sink.transition(RunState::Classifying);
        let (mut rows, to_unarchive) = classifier::classify_all(&fetched.items, sink);

        // Restoring
        sink.transition(RunState::Restoring);
        let restored = if to_unarchive.is_empty() {
            sink.info("Нет товаров для восстановления.");
            BatchResult::default()
        } else {
            sink.info(format!("Восстанавливаем {} товаров...", to_unarchive.len()));
            let restored =
                batch::restore_products(&*self.api, account, &to_unarchive, sink).await;
            if !restored.errors.is_empty() {
                sink.warn(format!("Ошибки при восстановлении: {}", restored.errors.len()));
            }
            restored
        };

        // Reporting
        sink.transition(RunState::Reporting);
        rows.extend(classifier::not_found_rows(&offer_ids, &fetched.items));
        let report_path = report_writer::report_path_for(input);
        if let Err(e) = report_writer::write_report(&report_path, &rows) {
            return Err(Self::fail(sink, RunError::Report(e)));
        }

        sink.transition(RunState::Done);
        let summary = RunSummary {
            run_id,
            processed: offer_ids.len(),
            found: fetched.items.len(),
            restore_requested: to_unarchive.len(),
            fetch_errors: fetched.errors.len(),
            restore_errors: restored.errors.len(),
            report_path: report_path.display().to_string(),
        };

        sink.info("=== ЗАВЕРШЕНО ===");
        sink.info(format!("Всего товаров обработано: {}", summary.processed));
        sink.info(format!("Найдено в API: {}", summary.found));
        sink.info(format!("Восстановлено: {}", summary.restore_requested));
        sink.info(format!("Результат сохранён в {}", summary.report_path));
        sink.emit(RunEvent::Completed {
            summary: summary.clone(),
        });

        tracing::info!("Unarchive run {} completed", summary.run_id);
        Ok(RunOutcome::Completed(summary))
    }

    fn fail(sink: &EventSink, error: RunError) -> RunError {
        let message = format!("Критическая ошибка: {}", error);
        sink.error(message.clone());
        sink.transition(RunState::Failed);
        sink.emit(RunEvent::Failed {
            message,
            error_count: error.error_count(),
        });
        error
    }
}
