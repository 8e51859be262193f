//! Folio Infrastructure Library
//!
//! Shared infrastructure used by the API crate:
//! - Rate limiting (per-identifier windowed counters)
//! - Middleware (request ID)
//! - Telemetry initialization

pub mod middleware;
pub mod rate_limit;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use rate_limit::{
    HttpRateLimiter, PolicyParseError, RateLimitPolicy, RateLimitRejection, RateLimitStatus,
    RateWindow,
};
pub use telemetry::{init_telemetry, LogFormat};
