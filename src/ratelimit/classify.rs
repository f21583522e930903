//! Rate-limit error classification
//!
//! The provider signals failures through free-text messages only, so
//! rate limits have to be recognized by pattern. The heuristic is
//! deliberately confined to this one function; swap it here to make it
//! provider-aware without touching the cooldown state machine.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches "retry in 32.35s" and similar provider retry hints
static RETRY_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)retry in ([0-9]+(?:\.[0-9]+)?)").expect("valid regex"));

/// Upper bound on any cooldown derived from a retry hint; anything
/// larger in the provider text is noise, not a usable wait time
const MAX_WAIT_SECS: u64 = 60 * 60;

/// Cooldown tunables
#[derive(Clone, Debug)]
pub struct CooldownConfig {
    /// Wait applied when the provider gives no explicit retry hint
    pub fallback_secs: u64,

    /// Safety margin added on top of an explicit retry hint
    pub buffer_secs: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            fallback_secs: 30,
            buffer_secs: 1,
        }
    }
}

/// Outcome of classifying a gateway error message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The provider is rate limiting; wait this many seconds
    RateLimited { wait_secs: u64 },

    /// Any other failure; retryable immediately
    Generic,
}

/// Classify a gateway error message
///
/// An explicit "retry in N" hint wins and gets the safety buffer added;
/// otherwise "429" or "quota" in the text marks a rate limit with the
/// fallback wait; everything else is a generic error.
pub fn classify(message: &str, config: &CooldownConfig) -> ErrorClass {
    if let Some(captures) = RETRY_HINT.captures(message) {
        if let Ok(seconds) = captures[1].parse::<f64>() {
            // The hint is free text; an absurd value must not overflow
            // the addition or produce an unusable deadline
            let wait_secs = (seconds.ceil() as u64)
                .saturating_add(config.buffer_secs)
                .min(MAX_WAIT_SECS.max(config.fallback_secs));
            return ErrorClass::RateLimited { wait_secs };
        }
    }

    if message.contains("429") || message.contains("quota") {
        return ErrorClass::RateLimited {
            wait_secs: config.fallback_secs,
        };
    }

    ErrorClass::Generic
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CooldownConfig {
        CooldownConfig::default()
    }

    #[test]
    fn test_retry_hint_adds_buffer() {
        let class = classify("429 Please retry in 12.5s", &config());
        assert_eq!(class, ErrorClass::RateLimited { wait_secs: 14 });
    }

    #[test]
    fn test_retry_hint_whole_seconds() {
        let class = classify("Please retry in 30s.", &config());
        assert_eq!(class, ErrorClass::RateLimited { wait_secs: 31 });
    }

    #[test]
    fn test_retry_hint_case_insensitive() {
        let class = classify("RETRY IN 2.1 seconds", &config());
        assert_eq!(class, ErrorClass::RateLimited { wait_secs: 4 });
    }

    #[test]
    fn test_quota_without_hint_uses_fallback() {
        let class = classify("quota exceeded", &config());
        assert_eq!(class, ErrorClass::RateLimited { wait_secs: 30 });
    }

    #[test]
    fn test_429_without_hint_uses_fallback() {
        let class = classify("Error 429: Too Many Requests", &config());
        assert_eq!(class, ErrorClass::RateLimited { wait_secs: 30 });
    }

    #[test]
    fn test_other_errors_are_generic() {
        assert_eq!(classify("network timeout", &config()), ErrorClass::Generic);
        assert_eq!(classify("internal server error", &config()), ErrorClass::Generic);
        assert_eq!(classify("", &config()), ErrorClass::Generic);
    }

    #[test]
    fn test_huge_retry_hint_is_clamped() {
        let class = classify("retry in 99999999999999999999999s", &config());
        assert_eq!(
            class,
            ErrorClass::RateLimited {
                wait_secs: MAX_WAIT_SECS
            }
        );
    }

    #[test]
    fn test_hint_near_u64_max_does_not_overflow() {
        let message = format!("retry in {}s", u64::MAX);
        let class = classify(&message, &config());
        assert_eq!(
            class,
            ErrorClass::RateLimited {
                wait_secs: MAX_WAIT_SECS
            }
        );
    }

    #[test]
    fn test_custom_fallback_and_buffer() {
        let config = CooldownConfig {
            fallback_secs: 10,
            buffer_secs: 2,
        };
        assert_eq!(
            classify("quota exceeded", &config),
            ErrorClass::RateLimited { wait_secs: 10 }
        );
        assert_eq!(
            classify("retry in 1.2s", &config),
            ErrorClass::RateLimited { wait_secs: 4 }
        );
    }
}
