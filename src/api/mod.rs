//! HTTP and WebSocket surface of the dashboard server.
//!
//! REST handlers read from the shared `EntityStore` and route writes
//! through `CoreState`, which persists them and publishes the resulting
//! delta to every `/ws` connection.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
pub mod websocket;

pub use router::dashboard_router;
pub use server::{start_dashboard_server, DashboardServer, DashboardSession, ServerError};
pub use types::ApiContext;
