use serde::{Deserialize, Serialize};

/// Запрос на восстановление товаров из архива
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnarchiveRequest {
    /// Имя магазина из конфигурации
    pub account_name: String,

    /// Путь к файлу со списком offer_id
    pub file_path: String,
}
