//! HTTP API for external control and observation (the front-end's view)
//!
//! - POST /session/connect - Open a live session
//! - POST /session/disconnect - Tear the session down
//! - POST /session/text - Send a typed message
//! - POST /session/outfit/dismiss - Clear the outfit card
//! - GET /session/state - State machine position + amplitude
//! - GET /session/transcript - Accumulated transcript
//! - GET /session/outfit - Latest outfit suggestion
//! - GET /session/stats - Session counters
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
