//! Battery level model.
//!
//! The robot reports its supply voltage; the server wants a level between
//! `0.0` and `1.0`.  A 3S lithium pack is assumed: 12.6 V full, 11.4 V empty,
//! linear in between.

/// Voltage at or above which the pack is reported full.
pub const FULL_VOLTAGE: f64 = 12.6;

/// Voltage at or below which the pack is reported empty.
pub const EMPTY_VOLTAGE: f64 = 11.4;

/// Level reported when the sensor is present but the reading fails.
pub const FALLBACK_LEVEL: f64 = 0.8;

/// Bounds of the simulated level used when no sensor is attached.
pub const SIMULATED_MIN_LEVEL: f64 = 0.7;
pub const SIMULATED_MAX_LEVEL: f64 = 1.0;

/// Converts a supply voltage into a level in `[0.0, 1.0]`, rounded to two
/// decimals.
///
/// Non-finite readings map to [`FALLBACK_LEVEL`].
///
/// ```rust
/// use dobot_core::domain::battery::level_from_voltage;
///
/// assert_eq!(level_from_voltage(12.0), 0.5);
/// assert_eq!(level_from_voltage(13.1), 1.0);
/// ```
pub fn level_from_voltage(voltage: f64) -> f64 {
    if !voltage.is_finite() {
        return FALLBACK_LEVEL;
    }
    if voltage >= FULL_VOLTAGE {
        return 1.0;
    }
    if voltage <= EMPTY_VOLTAGE {
        return 0.0;
    }
    round_level((voltage - EMPTY_VOLTAGE) / (FULL_VOLTAGE - EMPTY_VOLTAGE))
}

/// Clamps to `[0.0, 1.0]` and rounds to two decimals.
pub fn round_level(level: f64) -> f64 {
    ((level.clamp(0.0, 1.0)) * 100.0).round() / 100.0
}
