use super::event_sink::EventSink;
use super::ozon_api_client::{ApiError, CatalogApi};
use contracts::domain::a001_seller_account::Account;
use contracts::usecases::u508_unarchive_ozon_products::{ProductRecord, CHUNK_SIZE};

/// Ошибка одного чанка: позиции first..=last (с 1) во входном списке
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkError {
    pub chunk_index: usize,
    pub first: usize,
    pub last: usize,
    pub error: ApiError,
}

impl std::fmt::Display for ChunkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "items {}-{}: {}", self.first, self.last, self.error)
    }
}

/// Итог пакетной операции. Частичный результат пригоден к использованию,
/// даже если часть чанков завершилась ошибкой.
#[derive(Debug)]
pub struct BatchResult<T> {
    pub items: Vec<T>,
    pub errors: Vec<ChunkError>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Границы чанка (с 1, включительно) для сообщений журнала
fn chunk_bounds(chunk_index: usize, chunk_len: usize) -> (usize, usize) {
    let first = chunk_index * CHUNK_SIZE + 1;
    (first, first + chunk_len - 1)
}

/// Запросить состояние товаров по offer_id, по 100 штук за запрос.
///
/// Ошибка чанка записывается и обработка продолжается со следующего чанка.
pub async fn fetch_products(
    api: &dyn CatalogApi,
    account: &Account,
    offer_ids: &[String],
    sink: &EventSink,
) -> BatchResult<ProductRecord> {
    let mut result = BatchResult::default();
    sink.info(format!("Начинаем проверку {} товаров...", offer_ids.len()));

    for (chunk_index, chunk) in offer_ids.chunks(CHUNK_SIZE).enumerate() {
        let (first, last) = chunk_bounds(chunk_index, chunk.len());
        sink.info(format!("Запрос товаров {}-{}...", first, last));

        match api.fetch_product_info(account, chunk).await {
            Ok(batch) => {
                sink.info(format!("Получено {} товаров", batch.len()));
                result.items.extend(batch);
            }
            Err(error) => {
                sink.error(format!("Ошибка запроса товаров {}-{}: {}", first, last, error));
                result.errors.push(ChunkError {
                    chunk_index,
                    first,
                    last,
                    error,
                });
            }
        }

        sink.info(format!(
            "Проверено {} из {} товаров",
            result.items.len(),
            offer_ids.len()
        ));
    }

    if !result.errors.is_empty() {
        sink.warn(format!("Обнаружены ошибки: {}", result.errors.len()));
    }

    result
}

/// Восстановить товары из архива по product_id, по 100 штук за запрос.
///
/// Любой успешный ответ считается успехом для всего чанка.
pub async fn restore_products(
    api: &dyn CatalogApi,
    account: &Account,
    product_ids: &[i64],
    sink: &EventSink,
) -> BatchResult<serde_json::Value> {
    let mut result = BatchResult::default();

    for (chunk_index, chunk) in product_ids.chunks(CHUNK_SIZE).enumerate() {
        let (first, last) = chunk_bounds(chunk_index, chunk.len());
        sink.info(format!("Восстанавливаем товары {}-{}...", first, last));

        match api.unarchive_products(account, chunk).await {
            Ok(response) => {
                sink.info("Батч восстановлен");
                result.items.push(response);
            }
            Err(error) => {
                sink.error(format!(
                    "Ошибка при восстановлении батча {}-{}: {}",
                    first, last, error
                ));
                result.errors.push(ChunkError {
                    chunk_index,
                    first,
                    last,
                    error,
                });
            }
        }
    }

    result
}
