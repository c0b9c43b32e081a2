//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the span)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting (auth POST routes only)

pub mod auth;
pub mod flash;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use flash::{push_flash, take_flashes};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
