#[cfg(feature = "metrics")]
use std::time::Instant;

/// Runs `f` and, when the `metrics` feature is enabled, logs how long it took.
#[cfg(feature = "metrics")]
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let tt = Instant::now();
    let val = f();

    log::debug!("{label}: {}", humantime::format_duration(tt.elapsed()));

    val
}

#[cfg(not(feature = "metrics"))]
#[inline(always)]
pub fn measure<T>(_label: &str, f: impl FnOnce() -> T) -> T {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_value_through() {
        assert_eq!(123, measure("test", || 123));
    }
}
