pub mod batch;
pub mod classifier;
pub mod event_sink;
pub mod executor;
pub mod offer_loader;
pub mod ozon_api_client;
pub mod report_writer;
pub mod service;

pub use event_sink::EventSink;
pub use executor::{RunError, UnarchiveExecutor};
pub use ozon_api_client::{ApiError, CatalogApi, OzonApiClient, TestConnectionResult};
pub use service::{RunHandle, UnarchiveService};
