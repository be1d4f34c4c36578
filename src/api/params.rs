//! Query parameter validation

use std::ops::RangeInclusive;

use super::ApiError;

/// Parse an integer parameter, using `default` when absent
pub(super) fn integer(
    value: Option<&str>,
    default: i64,
    invalid: &'static str,
) -> Result<i64, ApiError> {
    value.map_or(Ok(default), |v| {
        v.trim().parse().map_err(|_| ApiError::BadRequest(invalid))
    })
}

/// Check that `n` lies in `range` and narrow it to the handler's type
pub(super) fn within<T: TryFrom<i64>>(
    n: i64,
    range: RangeInclusive<i64>,
    out_of_range: &'static str,
) -> Result<T, ApiError> {
    if !range.contains(&n) {
        return Err(ApiError::BadRequest(out_of_range));
    }
    T::try_from(n).map_err(|_| ApiError::BadRequest(out_of_range))
}

/// Treat empty strings as missing
pub(super) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
