//! Core library surface for the bookstore inventory manager.
//!
//! The binary only wires these pieces together; tests and any other tooling
//! can drive the same store and menu directly.
pub mod db;
pub mod error;
pub mod logging;
pub mod menu;
pub mod models;
pub mod ui;

/// Convenience re-exports for opening and closing the embedded SQLite store.
pub use db::{close_store, ensure_schema, ensure_schema_at};

pub use error::InventoryError;
pub use models::{Book, BookField, BookUpdate, NewBook, Selection};

/// The menu state machine and the two front-ends that drive it.
pub use menu::{Session, Step};
pub use ui::{run_app, run_plain, App};
