pub mod events;
pub mod product;
pub mod progress;
pub mod report;
pub mod request;
pub mod response;

pub use events::{EventLevel, RunEvent};
pub use product::{ProductRecord, UNKNOWN_OFFER_ID};
pub use progress::RunState;
pub use report::{ReportAction, ReportRow};
pub use request::UnarchiveRequest;
pub use response::{RunOutcome, RunSummary};

/// Максимальное количество идентификаторов в одном запросе к OZON API
pub const CHUNK_SIZE: usize = 100;

use crate::usecases::common::UseCaseMetadata;

pub struct UnarchiveOzonProducts;

impl UseCaseMetadata for UnarchiveOzonProducts {
    fn usecase_index() -> &'static str {
        "u508"
    }

    fn usecase_name() -> &'static str {
        "unarchive_ozon_products"
    }

    fn display_name() -> &'static str {
        "Восстановление товаров OZON из архива"
    }

    fn description() -> &'static str {
        "Проверка товаров по списку offer_id и восстановление архивных через OZON Seller API"
    }
}
