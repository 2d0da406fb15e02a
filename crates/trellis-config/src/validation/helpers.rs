//! Shared range-validation helpers.

/// Bounds for every timeout in the config, in milliseconds.
pub(crate) const TIMEOUT_MIN_MS: u64 = 100;
pub(crate) const TIMEOUT_MAX_MS: u64 = 600_000;

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
