use super::event_sink::EventSink;
use super::executor::{RunError, UnarchiveExecutor};
use super::ozon_api_client::{CatalogApi, TestConnectionResult};
use crate::shared::config::Config;
use contracts::usecases::u508_unarchive_ozon_products::{
    RunEvent, RunOutcome, RunState, UnarchiveRequest,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Интервал, с которым отображение забирает события из канала
pub const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Флаг активного запуска; снимается при завершении фоновой задачи
struct ActiveRunGuard(Arc<AtomicBool>);

impl ActiveRunGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for ActiveRunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Запущенный в фоне запуск: канал событий и задача с итогом
pub struct RunHandle {
    pub events: UnboundedReceiver<RunEvent>,
    pub task: JoinHandle<Result<RunOutcome, RunError>>,
}

impl RunHandle {
    /// Забирать события каждые 100 мс, пока фоновая задача не закроет канал,
    /// затем вернуть итог запуска.
    ///
    /// Если задача упала (panic), отображение все равно получает FAILED.
    pub async fn drain<F>(mut self, mut on_event: F) -> Result<RunOutcome, RunError>
    where
        F: FnMut(&RunEvent),
    {
        let mut interval = time::interval(EVENT_POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_progress = 0;

        'poll: loop {
            interval.tick().await;
            loop {
                match self.events.try_recv() {
                    Ok(event) => {
                        if let RunEvent::StateChanged { progress, .. } = &event {
                            last_progress = *progress;
                        }
                        on_event(&event);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'poll,
                }
            }
        }

        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                let error = RunError::Worker(e.to_string());
                tracing::error!("Unarchive task aborted: {}", error);
                on_event(&RunEvent::StateChanged {
                    state: RunState::Failed,
                    progress: last_progress,
                });
                on_event(&RunEvent::Failed {
                    message: format!("Критическая ошибка: {}", error),
                    error_count: error.error_count(),
                });
                Err(error)
            }
        }
    }
}

/// Точка входа для отображения: выбор магазина, запуск восстановления, тест API.
///
/// Одновременно допускается только один запуск восстановления.
pub struct UnarchiveService {
    config: Arc<Config>,
    api: Arc<dyn CatalogApi>,
    executor: UnarchiveExecutor,
    active: Arc<AtomicBool>,
}

impl UnarchiveService {
    pub fn new(config: Arc<Config>, api: Arc<dyn CatalogApi>) -> Self {
        Self {
            config,
            executor: UnarchiveExecutor::new(Arc::clone(&api)),
            api,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn account_names(&self) -> Vec<String> {
        self.config
            .account_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Запустить восстановление в фоновой задаче tokio
    pub fn start_run(&self, request: UnarchiveRequest) -> Result<RunHandle, RunError> {
        let account = self
            .config
            .find_account(Some(&request.account_name))?
            .clone();

        let guard = ActiveRunGuard::acquire(&self.active).ok_or_else(|| {
            tracing::warn!("Rejected run request: another run is in progress");
            RunError::AlreadyRunning
        })?;

        let (sender, events) = mpsc::unbounded_channel();
        let executor = self.executor.clone();
        let input = PathBuf::from(&request.file_path);

        let task = tokio::spawn(async move {
            let _guard = guard;
            let sink = EventSink::new(sender);
            let result = executor.run(&account, &input, &sink).await;
            if let Err(e) = &result {
                tracing::error!("Unarchive run failed: {}", e);
            }
            result
        });

        Ok(RunHandle { events, task })
    }

    /// Тест соединения в фоновой задаче (не блокируется активным запуском)
    pub fn start_connection_test(
        &self,
        account_name: &str,
    ) -> Result<JoinHandle<TestConnectionResult>, RunError> {
        let account = self.config.find_account(Some(account_name))?.clone();
        let api = Arc::clone(&self.api);
        Ok(tokio::spawn(async move {
            let result = api.test_connection(&account).await;
            tracing::info!(
                "Connection test for '{}': success={} status={:?}",
                account.name,
                result.success,
                result.status
            );
            result
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::ApiConfig;
    use crate::usecases::u508_unarchive_ozon_products::ozon_api_client::ApiError;
    use async_trait::async_trait;
    use contracts::domain::a001_seller_account::Account;
    use contracts::usecases::u508_unarchive_ozon_products::ProductRecord;
    use tokio::sync::Notify;

    /// Каталог, который держит первый запрос до сигнала
    struct GatedCatalog {
        gate: Notify,
    }

    #[async_trait]
    impl CatalogApi for GatedCatalog {
        async fn fetch_product_info(
            &self,
            _account: &Account,
            _offer_ids: &[String],
        ) -> Result<Vec<ProductRecord>, ApiError> {
            self.gate.notified().await;
            Ok(Vec::new())
        }

        async fn unarchive_products(
            &self,
            _account: &Account,
            _product_ids: &[i64],
        ) -> Result<serde_json::Value, ApiError> {
            Ok(serde_json::Value::Null)
        }

        async fn test_connection(&self, _account: &Account) -> TestConnectionResult {
            TestConnectionResult::from_status(401)
        }
    }

    /// Каталог, который падает с panic на первом же запросе
    struct PanickingCatalog;

    #[async_trait]
    impl CatalogApi for PanickingCatalog {
        async fn fetch_product_info(
            &self,
            _account: &Account,
            _offer_ids: &[String],
        ) -> Result<Vec<ProductRecord>, ApiError> {
            panic!("catalog exploded")
        }

        async fn unarchive_products(
            &self,
            _account: &Account,
            _product_ids: &[i64],
        ) -> Result<serde_json::Value, ApiError> {
            Ok(serde_json::Value::Null)
        }

        async fn test_connection(&self, _account: &Account) -> TestConnectionResult {
            TestConnectionResult::from_status(200)
        }
    }

    fn config() -> Arc<Config> {
        Arc::new(Config {
            accounts: vec![Account::new("Shop", "1", "key")],
            api: ApiConfig::default(),
        })
    }

    fn input_file(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("offers.csv");
        std::fs::write(&path, "offer_id\nA\n").unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn second_run_is_rejected_while_first_is_active() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(GatedCatalog { gate: Notify::new() });
        let service = UnarchiveService::new(config(), catalog.clone());
        let request = UnarchiveRequest {
            account_name: "Shop".into(),
            file_path: input_file(&dir),
        };

        let first = service.start_run(request.clone()).unwrap();
        assert!(service.is_running());
        assert!(matches!(
            service.start_run(request.clone()),
            Err(RunError::AlreadyRunning)
        ));

        catalog.gate.notify_one();
        let outcome = first.drain(|_| {}).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert!(!service.is_running());

        catalog.gate.notify_one();
        let again = service.start_run(request).unwrap();
        assert!(again.drain(|_| {}).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_account_is_rejected_before_start() {
        let catalog = Arc::new(GatedCatalog {
            gate: Notify::new(),
        });
        let service = UnarchiveService::new(config(), catalog);
        let result = service.start_run(UnarchiveRequest {
            account_name: "Other".into(),
            file_path: "offers.xlsx".into(),
        });
        assert!(matches!(result, Err(RunError::Config(_))));
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn connection_test_runs_in_background() {
        let catalog = Arc::new(GatedCatalog {
            gate: Notify::new(),
        });
        let service = UnarchiveService::new(config(), catalog);
        let result = service.start_connection_test("Shop").unwrap().await.unwrap();
        assert_eq!(result.status, Some(401));
        assert!(!result.success);
    }

    #[tokio::test]
    async fn drain_delivers_events_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(GatedCatalog { gate: Notify::new() });
        let service = UnarchiveService::new(config(), catalog.clone());
        catalog.gate.notify_one();

        let handle = service
            .start_run(UnarchiveRequest {
                account_name: "Shop".into(),
                file_path: input_file(&dir),
            })
            .unwrap();

        let mut events = Vec::new();
        handle.drain(|event| events.push(event.clone())).await.unwrap();

        assert!(matches!(events.first(), Some(RunEvent::Started { .. })));
        assert!(matches!(events.last(), Some(RunEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn worker_panic_is_reported_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let service = UnarchiveService::new(config(), Arc::new(PanickingCatalog));

        let handle = service
            .start_run(UnarchiveRequest {
                account_name: "Shop".into(),
                file_path: input_file(&dir),
            })
            .unwrap();

        let mut events = Vec::new();
        let result = handle.drain(|event| events.push(event.clone())).await;

        assert!(matches!(result, Err(RunError::Worker(_))));
        assert!(!service.is_running());
        let n = events.len();
        assert!(matches!(
            events[n - 2],
            RunEvent::StateChanged {
                state: RunState::Failed,
                progress: 10
            }
        ));
        assert!(matches!(
            events[n - 1],
            RunEvent::Failed { error_count: 1, .. }
        ));
    }
}
