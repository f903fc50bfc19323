//! Terminal front-end for coinchat: chat panel, lookups panel and command palette.

pub mod app;
pub mod components;
pub mod handlers;
pub mod state;
pub mod utils;

pub use app::App;
