//! Monotonic clock trait

/// Millisecond tick counter
///
/// The counter wraps at `u32::MAX`; every consumer compares timestamps
/// with `wrapping_sub`.
pub trait MonotonicClock {
    fn now_ms(&self) -> u32;
}
