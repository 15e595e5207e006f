// Seocho-gu Voucher Map - Core Library
// Exposes the data model, loader, selection state and renderer for the
// terminal dashboard, the web server and tests

pub mod config;
pub mod loader;
pub mod logging;
pub mod merchant;
pub mod render;
pub mod selection;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{Basemap, BasemapInfo, Config};
pub use loader::{load, load_report, DataLoadError, LoadReport, MalformedReason, MalformedRecord};
pub use merchant::{Dataset, MerchantRecord, VoucherType};
pub use render::{
    aggregate, filter, render, to_card_list, to_map_layer, CardColumns, DerivedView, Kpis,
    MapPoint,
};
pub use selection::{Action, FilterSelection, SelectionState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
