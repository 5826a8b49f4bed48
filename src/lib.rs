pub mod banner;
pub mod clock;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod net;
pub mod renderer;
pub mod services;
pub mod state;
pub mod storage;

// Convenient re-exports (so call sites can do `sprawl::Registry`, etc.)
pub use commands::dispatch;
pub use state::{
    machine::ConnState,
    registry::Registry,
    session::Session,
};
