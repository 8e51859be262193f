//! Form endpoint handlers
//!
//! Every handler runs the same prelude before any side effect: the route's rate
//! limit (middleware), storage availability (503), body parsing (400) and field
//! validation (400 with per-field details).

pub mod contact;
pub mod resume;
pub mod subscribe;
