//! Wall-clock time as the clock sees it, and its register form.
//!
//! [`WallTime`] is always valid: hours 0-23, minutes and seconds 0-59. It is
//! built fresh from the registers on every tick and never cached. [`RawTime`]
//! is the packed form about to be written to the RTC.

use chrono::{NaiveTime, Timelike};

use crate::codec::{self, CodecError};
use crate::format::{to_display_hour, wrap_hour};
use crate::{Hours, HourFormat, Minutes, Seconds};

/// A time of day, hours in 24-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl WallTime {
    /// Creates a `WallTime`, rejecting out-of-range fields.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, CodecError> {
        if hours > codec::MAX_HOUR
            || minutes > codec::MAX_MINUTE_SECOND
            || seconds > codec::MAX_MINUTE_SECOND
        {
            return Err(CodecError::OutOfRange);
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Decodes the three raw registers.
    ///
    /// All three must decode before anything is returned. An hour past 23
    /// (a corrupt register, or the chip left in 12-hour mode) wraps to 0.
    pub fn from_registers(hours: u8, minutes: u8, seconds: u8) -> Result<Self, CodecError> {
        let hours = wrap_hour(codec::decode(hours)?);
        let minutes = codec::decode(minutes)?;
        let seconds = codec::decode(seconds)?;
        debug!("decoded h={} m={} s={}", hours, minutes, seconds);
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Hours, 0-23.
    pub fn hours(&self) -> u8 {
        self.hours
    }

    /// Minutes, 0-59.
    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    /// Seconds, 0-59.
    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Hours as shown on the 12-hour display.
    pub fn display_hour(&self) -> u8 {
        to_display_hour(self.hours)
    }

    /// Packs the time into register form, oscillator start bit set.
    pub fn to_registers(&self) -> Result<RawTime, CodecError> {
        let mut hours = Hours::from(codec::encode_hour(self.hours)?);
        hours.set_hour_format(HourFormat::TwentyFourHour);
        let minutes = Minutes::from(codec::encode(self.minutes)?);
        let mut seconds = Seconds::from(codec::encode(self.seconds)?);
        seconds.set_oscillator_start(true);
        Ok(RawTime {
            hours,
            minutes,
            seconds,
        })
    }
}

impl From<NaiveTime> for WallTime {
    fn from(time: NaiveTime) -> Self {
        // chrono keeps leap seconds in the nanoseconds, so second() is 0-59
        Self {
            hours: wrap_hour(time.hour() as u8),
            minutes: time.minute() as u8,
            seconds: time.second() as u8,
        }
    }
}

impl From<WallTime> for NaiveTime {
    fn from(time: WallTime) -> Self {
        NaiveTime::from_hms_opt(
            u32::from(time.hours),
            u32::from(time.minutes),
            u32::from(time.seconds),
        )
        .unwrap_or(NaiveTime::MIN)
    }
}

impl core::fmt::Display for WallTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// The three time registers, packed and ready to write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTime {
    /// Hours register, 24-hour mode
    pub hours: Hours,
    /// Minutes register
    pub minutes: Minutes,
    /// Seconds register with the oscillator start bit
    pub seconds: Seconds,
}

/// Supplies the wall-clock time the RTC is set to at startup.
pub trait WallTimeSource {
    /// The current time of day.
    fn initial_time(&mut self) -> NaiveTime;
}

impl WallTimeSource for NaiveTime {
    fn initial_time(&mut self) -> NaiveTime {
        *self
    }
}

impl<F: FnMut() -> NaiveTime> WallTimeSource for F {
    fn initial_time(&mut self) -> NaiveTime {
        self()
    }
}
