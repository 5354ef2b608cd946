//! Company Registry REST Service
//!
//! Exposes the company resource over HTTP.
//!
//! ## Endpoints
//!
//! - `POST /api/v1/company` - Create a company (bearer token required)
//! - `PATCH /api/v1/company/:company_id` - Partial update (bearer token required)
//! - `DELETE /api/v1/company/:company_id` - Soft delete (bearer token required)
//! - `GET /api/v1/company/:company_id` - Read a company (public)
//! - `GET /api/v1/token` - Issue a development access token
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod auth;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::{require_bearer, AuthSubject};
pub use middleware::access_log;
pub use routes::create_router;
pub use state::ServiceState;
