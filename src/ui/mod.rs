//! Terminal front-ends. Both drive the same [`crate::menu::Session`]; the
//! full-screen one is used on an interactive terminal, the plain one when
//! input is piped in.

mod app;
mod helpers;
mod plain;
mod terminal;

pub use app::App;
pub use plain::run_plain;
pub use terminal::run_app;
