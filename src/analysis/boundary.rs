use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::AnalysisError;

/// Run `f`, converting a panic into [`AnalysisError::Internal`].
pub fn with_panic_boundary<F, T>(f: F) -> Result<T, AnalysisError>
where
    F: FnOnce() -> Result<T, AnalysisError>,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(AnalysisError::Internal {
            message: panic_message(payload.as_ref()),
        })
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}
