//! HTTP handlers

pub mod assessment;
pub mod health;
pub mod soil;

pub use assessment::*;
pub use health::*;
pub use soil::*;

use validator::Validate;

use crate::error::{AppError, AppResult};

/// Run derive-based validation and lift the first failing field into an
/// `AppError::Validation`
pub(crate) fn validate_input<T: Validate>(input: &T) -> AppResult<()> {
    let Err(errors) = input.validate() else {
        return Ok(());
    };

    let field_errors = errors.field_errors();
    let first = field_errors
        .into_iter()
        .min_by_key(|(field, _)| *field)
        .and_then(|(field, errs)| errs.first().map(|e| (field, e)));

    match first {
        Some((field, error)) => {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("invalid value ({})", error.code));
            Err(AppError::validation(field, message))
        }
        None => Err(AppError::validation("body", "invalid request")),
    }
}
