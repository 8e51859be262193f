//! Rate limiting service
//!
//! Fixed-window counters keyed by `(policy, identifier)`. A policy may carry
//! several windows (e.g. 5 per hour and 20 per day); a request is admitted only
//! when every window still has room.

pub use limiter::{HttpRateLimiter, RateLimitRejection, RateLimitStatus};
pub use policy::{PolicyParseError, RateLimitPolicy, RateWindow, MAX_PERIOD};

mod limiter;
mod policy;
