//! Application use cases

pub mod notify;
pub mod reload;

pub use notify::{NotifyError, NotifyUseCase};
pub use reload::{CatalogReloader, ReloadSummary};
