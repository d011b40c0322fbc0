//! Built-in middleware stages.
//!
//! None of these are installed automatically; register the ones a service
//! needs with `Router::use_middleware`. A typical order is:
//!
//! 1. [`request_id`] - generate/propagate request ID
//! 2. [`logging`] - request span and completion log
//! 3. [`recovery`] - convert panics into 500s
//! 4. [`timeout`] - fail requests exceeding a deadline

pub mod logging;
pub mod recovery;
pub mod request_id;
pub mod timeout;

pub use logging::LoggingMiddleware;
pub use recovery::RecoveryMiddleware;
pub use request_id::{RequestId, RequestIdMiddleware, REQUEST_ID_HEADER};
pub use timeout::TimeoutMiddleware;
