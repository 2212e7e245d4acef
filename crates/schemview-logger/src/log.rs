use crate::severity::LogSeverity;
use crate::systime::now;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable holding the initial threshold.
pub const LOG_ENV: &str = "SCHEMVIEW_LOG";

static MIN_SEVERITY: Lazy<AtomicU8> = Lazy::new(|| {
    let initial = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.parse::<LogSeverity>().ok())
        .unwrap_or(LogSeverity::Info);
    AtomicU8::new(initial as u8)
});

pub fn min_severity() -> LogSeverity {
    LogSeverity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
}

pub fn set_min_severity(severity: LogSeverity) {
    MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
}

/// Writes `[SEVERITY] <local time> msg` to stderr when `log_severity` is at
/// or above the current threshold. Stdout is left to program output.
pub fn log(msg: String, log_severity: LogSeverity) {
    if log_severity >= min_severity() {
        eprintln!("[{}] {} {}", log_severity, now(), msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_round_trip() {
        let before = min_severity();
        set_min_severity(LogSeverity::Error);
        assert_eq!(min_severity(), LogSeverity::Error);
        log("suppressed".to_owned(), LogSeverity::Debug);
        set_min_severity(before);
        assert_eq!(min_severity(), before);
    }
}
