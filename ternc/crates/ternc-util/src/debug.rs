//! Diagnostic environment toggles.
//!
//! Two environment variables affect behavior, both purely diagnostic:
//!
//! - `DEBUG` - an integer verbosity level (0 when unset or unparsable);
//! - `TERNC_SHOW_CONSTRAINTS` - when set, the generator logs every
//!   constraint it emits together with its source location.
//!
//! Both are read once, on first use.

use once_cell::sync::Lazy;

static VERBOSITY: Lazy<u32> = Lazy::new(|| {
    std::env::var("DEBUG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
});

static SHOW_CONSTRAINTS: Lazy<bool> = Lazy::new(|| std::env::var("TERNC_SHOW_CONSTRAINTS").is_ok());

/// The `DEBUG` verbosity level.
#[inline]
pub fn verbosity() -> u32 {
    *VERBOSITY
}

/// Whether generated constraints should be logged as they are appended.
#[inline]
pub fn show_constraints() -> bool {
    *SHOW_CONSTRAINTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_are_stable() {
        // Reading twice must yield the same cached values.
        assert_eq!(verbosity(), verbosity());
        assert_eq!(show_constraints(), show_constraints());
    }
}
