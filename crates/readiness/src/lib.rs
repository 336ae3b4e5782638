pub mod catalog;
pub mod export;
mod mailto;
pub mod store;
pub mod validation;

pub use catalog::ControlCatalog;
pub use export::{
    build_early_access_link, build_early_access_message, build_handoff_link, build_handoff_message,
    build_snapshot_export, export_filename, export_slug, render_export_json,
    EARLY_ACCESS_ADDRESS,
};
pub use store::ReadinessStore;
