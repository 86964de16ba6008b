//! 12-hour projection of the 24-hour value kept by the RTC.

/// Wraps an hour that has run past the end of the day back to midnight.
///
/// Values of 24 and above become 0, everything else is left alone. The
/// controller uses this as the overflow rule for hours written back to the
/// RTC, and [`to_display_hour`] applies it first so a corrupt register shows
/// as midnight rather than as garbage.
pub fn wrap_hour(hours: u8) -> u8 {
    if hours >= 24 {
        0
    } else {
        hours
    }
}

/// Projects a 24-hour value onto the 12-hour face of the display.
///
/// 13-23 become 1-11; 0-12 pass through unchanged, so midnight shows as 0
/// and noon as 12.
pub fn to_display_hour(hours: u8) -> u8 {
    match wrap_hour(hours) {
        h if h > 12 => h - 12,
        h => h,
    }
}
