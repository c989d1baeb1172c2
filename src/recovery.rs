//! Panic containment for tool execution.
//!
//! A panicking transform must never take the server down or leak its message
//! to the caller; it becomes an `Error::Internal` and is logged here.

use crate::types::{Error, Result};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run `operation`, converting a panic into `Error::Internal`.
///
/// ```
/// use devtools_core::recovery::with_recovery;
///
/// let value = with_recovery(|| Ok(21 * 2), "answer").unwrap();
/// assert_eq!(value, 42);
/// ```
pub fn with_recovery<F, T>(operation: F, operation_name: &str) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    match catch_unwind(AssertUnwindSafe(operation)) {
        Ok(result) => result,
        Err(payload) => {
            let panic_msg = panic_message(payload.as_ref());
            tracing::error!(
                "panic_recovered: operation={}, panic={}",
                operation_name,
                panic_msg
            );
            Err(Error::internal(format!(
                "Panic in {}: {}",
                operation_name, panic_msg
            )))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic (no message)".to_string()
    }
}
