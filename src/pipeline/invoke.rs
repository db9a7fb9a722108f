//! Dynamic invocation of fixture code.
//!
//! Every factory and method call goes through [`invoke`], which contains panics and wraps the
//! cause in an [`InvocationError`]. Reporting peels those wrappers off again with
//! [`innermost_cause`] so the recorded reason is the fixture's own error.

use std::any::Any;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use testdriver_core::ErrorCategory;

use crate::errors::BoxError;
use crate::pipeline::context::TestFailure;

/// Wrapper around any failure raised by invoked fixture code.
#[derive(Debug, Error)]
#[error("invocation of `{target}` failed")]
pub struct InvocationError {
    pub target: String,
    #[source]
    pub cause: BoxError,
}

/// A panic caught while running fixture code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PanicError {
    pub message: String,
}

impl PanicError {
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "fixture code panicked".to_string()
        };
        Self { message }
    }
}

/// Run `call`, turning an error or a panic into an [`InvocationError`] naming `target`.
pub fn invoke<R>(target: &str, call: impl FnOnce() -> Result<R, BoxError>) -> Result<R, InvocationError> {
    let cause = match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(cause)) => cause,
        Err(payload) => Box::new(PanicError::from_payload(payload)) as BoxError,
    };
    Err(InvocationError {
        target: target.to_string(),
        cause,
    })
}

/// Walk `source()` while the current error is an [`InvocationError`].
pub fn innermost_cause<'e>(err: &'e (dyn Error + 'static)) -> &'e (dyn Error + 'static) {
    let mut current = err;
    while current.is::<InvocationError>() {
        match current.source() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// What a failed phase records on its scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub reason: String,
    pub detail: String,
    pub category: ErrorCategory,
    pub error_detail: String,
}

impl FailureRecord {
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let inner = innermost_cause(err);
        let mut reason = inner.to_string();
        if reason.is_empty() {
            reason = "fixture code failed without a message".to_string();
        }

        let mut detail = format!("{inner:?}");
        let mut source = inner.source();
        while let Some(cause) = source {
            detail.push_str(&format!("\ncaused by: {cause}"));
            source = cause.source();
        }

        match inner.downcast_ref::<TestFailure>() {
            Some(failure) => Self {
                reason,
                detail,
                category: failure.category,
                error_detail: failure.detail.clone(),
            },
            None => Self {
                reason,
                detail,
                category: ErrorCategory::Unresolved,
                error_detail: String::new(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct Root;

    #[test]
    fn nested_wrappers_are_peeled() {
        let inner = invoke::<()>("inner", || Err(Box::new(Root))).unwrap_err();
        let outer = invoke::<()>("outer", || Err(Box::new(inner))).unwrap_err();
        assert_eq!(outer.to_string(), "invocation of `outer` failed");
        assert_eq!(innermost_cause(&outer).to_string(), "disk on fire");
    }

    #[test]
    fn panics_become_failures() {
        let err = invoke::<()>("boom", || panic!("exploded with {}", 42)).unwrap_err();
        let record = FailureRecord::from_error(&err);
        assert_eq!(record.reason, "exploded with 42");
        assert_eq!(record.category, ErrorCategory::Unresolved);
    }

    #[test]
    fn test_failure_category_is_carried() {
        let err = invoke::<()>("t", || {
            Err(Box::new(
                TestFailure::new("wrong total")
                    .with_category(ErrorCategory::Product)
                    .with_detail("expected 4"),
            ))
        })
        .unwrap_err();
        let record = FailureRecord::from_error(&err);
        assert_eq!(record.reason, "wrong total");
        assert_eq!(record.category, ErrorCategory::Product);
        assert_eq!(record.error_detail, "expected 4");
    }

    #[test]
    fn success_passes_value_through() {
        assert_eq!(invoke("ok", || Ok(7)).unwrap(), 7);
    }
}
