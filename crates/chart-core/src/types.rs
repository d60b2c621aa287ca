// File: crates/chart-core/src/types.rs
// Summary: Shared types and constants (time units, default surface size).

/// Bucket timestamp in seconds since the Unix epoch.
pub type Timestamp = i64;

/// Bucket width in seconds.
pub type Period = i64;

/// Default surface width in pixels.
pub const WIDTH: i32 = 1024;
/// Default surface height in pixels.
pub const HEIGHT: i32 = 640;

/// Sentinel lower bound of a store that has never been fetched.
pub const UNFETCHED_MIN: Timestamp = Timestamp::MAX;
/// Sentinel upper bound of a store that has never been fetched.
pub const UNFETCHED_MAX: Timestamp = Timestamp::MIN;

/// Round `time` to the nearest multiple of `period`.
/// Contract: `period > 0`.
pub fn periodize(time: Timestamp, period: Period) -> Timestamp {
    ((time as f64 / period as f64) + 0.5).floor() as Timestamp * period
}

/// Current wall-clock time in seconds.
pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp()
}
