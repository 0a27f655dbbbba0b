//! Interval policy: decides whether a wake takes a photo.
//!
//! Pure functions only.  The device sleeps a fixed keep-alive interval
//! between every wake, so "time since the last photo" is measured in
//! wakes.  The threshold is rounded *up* so the real gap between photos
//! is never shorter than the configured photo interval.

/// What a wake is going to do.  Computed fresh every wake, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeClassification {
    KeepAliveWake,
    PhotoWake,
}

/// `ceil(photo_interval / keep_alive_interval)`.
///
/// A zero keep-alive interval is a configuration error caught by
/// [`IntervalConfig::validate`](crate::config::IntervalConfig::validate);
/// here it degrades to "photo every wake".
pub fn wakes_needed_for_photo(photo_interval_secs: u32, keep_alive_interval_secs: u32) -> u32 {
    if keep_alive_interval_secs == 0 {
        return 1;
    }
    photo_interval_secs.div_ceil(keep_alive_interval_secs)
}

/// First boot always photographs; otherwise once enough wakes have passed.
/// There is deliberately no upper bound: overshooting still triggers.
pub fn is_photo_wake(first_boot: bool, wakes_since_last_photo: u32, wakes_needed: u32) -> bool {
    first_boot || wakes_since_last_photo >= wakes_needed
}

pub fn classify(first_boot: bool, wakes_since_last_photo: u32, wakes_needed: u32) -> WakeClassification {
    if is_photo_wake(first_boot, wakes_since_last_photo, wakes_needed) {
        WakeClassification::PhotoWake
    } else {
        WakeClassification::KeepAliveWake
    }
}
