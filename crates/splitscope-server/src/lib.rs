//! splitscope server — axum HTTP API over the correlation core.

pub mod cli;
pub mod livesplit;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use livesplit::LiveSplitProxy;
pub use state::{create_router, serve, AppState, SharedState};
