use serde::{Deserialize, Serialize};

/// Состояние товара, полученное из /v3/product/info/list
///
/// Живет только в памяти в пределах одного запуска.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Артикул продавца; None, если API его не вернул
    pub offer_id: Option<String>,

    /// Внутренний ID товара в OZON (нужен для восстановления)
    pub product_id: Option<i64>,

    /// Статус товара до обработки (statuses.status_name)
    pub status_name: String,

    pub is_archived: bool,

    /// Товар архивирован самой площадкой
    pub is_autoarchived: bool,
}

/// Подпись для товара без offer_id в ответе API
pub const UNKNOWN_OFFER_ID: &str = "unknown";

impl ProductRecord {
    /// offer_id для отчета и журнала
    pub fn display_offer_id(&self) -> &str {
        self.offer_id.as_deref().unwrap_or(UNKNOWN_OFFER_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_offer_id_is_displayed_as_unknown() {
        let record = ProductRecord {
            offer_id: None,
            product_id: Some(1),
            status_name: "unknown".into(),
            is_archived: false,
            is_autoarchived: false,
        };
        assert_eq!(record.display_offer_id(), UNKNOWN_OFFER_ID);
    }
}
