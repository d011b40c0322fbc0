//! Panic recovery middleware.
//!
//! Converts a panic anywhere below it in the chain into
//! [`HandlerError::Panic`], which the transport renders as a 500 without
//! exposing the panic message. The panic is logged at `error`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use hodos_core::{Handler, HandlerError, Request};

use crate::middleware::Middleware;

/// Middleware that catches handler panics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryMiddleware;

impl RecoveryMiddleware {
    /// Creates a recovery middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Middleware for RecoveryMiddleware {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn wrap(&self, next: Handler) -> Handler {
        Handler::new(move |request: Request| {
            let next = next.clone();
            async move {
                // A handler may panic while building its future as well as while polling it.
                let future = match panic::catch_unwind(AssertUnwindSafe(|| next.call(request))) {
                    Ok(future) => future,
                    Err(payload) => return Err(recovered(payload.as_ref())),
                };

                match AssertUnwindSafe(future).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => Err(recovered(payload.as_ref())),
                }
            }
        })
    }
}

fn recovered(payload: &(dyn Any + Send)) -> HandlerError {
    let message = panic_message(payload);
    tracing::error!(panic = %message, "handler panicked");
    HandlerError::panic(message)
}
