//! # Roster HTTP API
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/students` - Student CRUD, assignments, grades
//! - `/api/courses` - Course CRUD
//! - `/api/maintenance/reconcile` - Pull dangling student ids from courses

pub mod errors;
pub mod response;
pub mod routes;
pub mod server;

pub use errors::{ApiError, ApiResult};
pub use routes::roster_routes;
pub use server::HttpServer;
