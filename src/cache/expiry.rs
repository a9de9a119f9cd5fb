//! Expiration Policy
//!
//! Pure functions deciding whether an entry is live at a given instant, and
//! the clock the engine reads "now" from. Expiration is evaluated lazily on
//! read; nothing here touches storage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// == Policy ==
/// Returns true when `expires_at` is set and not after `now`.
///
/// Boundary condition: an entry expiring exactly at `now` is expired.
pub fn is_expired(expires_at: Option<f64>, now: f64) -> bool {
    matches!(expires_at, Some(expires) if expires <= now)
}

/// Computes the expiration instant for a write made at `now`.
///
/// A missing, zero or negative TTL means the entry never expires.
pub fn expires_at(now: f64, ttl_seconds: Option<f64>) -> Option<f64> {
    ttl_seconds.filter(|ttl| *ttl > 0.0).map(|ttl| now + ttl)
}

/// Returns true when `expires_at` is absent or strictly after `created_at`.
///
/// A TTL too small to change `created_at` in floating point would produce
/// an entry that is dead on arrival.
pub fn is_after(expires_at: Option<f64>, created_at: f64) -> bool {
    expires_at.map_or(true, |expires| expires > created_at)
}

// == Clock ==
/// Source of the current time in fractional seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        current_timestamp()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    pub fn set(&self, now: f64) {
        self.bits.store(now.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in fractional seconds.
pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_expiry_never_expires() {
        assert!(!is_expired(None, 0.0));
        assert!(!is_expired(None, f64::MAX));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        assert!(!is_expired(Some(100.0), 99.999));
        assert!(is_expired(Some(100.0), 100.0));
        assert!(is_expired(Some(100.0), 100.001));
    }

    #[test]
    fn test_expires_at_ignores_non_positive_ttl() {
        assert_eq!(expires_at(10.0, None), None);
        assert_eq!(expires_at(10.0, Some(0.0)), None);
        assert_eq!(expires_at(10.0, Some(-5.0)), None);
        assert_eq!(expires_at(10.0, Some(1.5)), Some(11.5));
    }

    #[test]
    fn test_is_after_rejects_vanishing_ttl() {
        let now = 1_700_000_000.0;
        assert!(is_after(None, now));
        assert!(is_after(expires_at(now, Some(1.0)), now));
        assert!(!is_after(expires_at(now, Some(1e-12)), now));
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000.0);
        assert_eq!(clock.now(), 1_000.0);

        clock.advance(2.5);
        assert_eq!(clock.now(), 1_002.5);

        clock.set(5.0);
        assert_eq!(clock.now(), 5.0);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800.0);
    }
}
