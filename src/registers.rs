//! Register definitions and bitfield structures for the MCP7940N RTC.
//!
//! Only the timekeeping registers the clock needs are modelled: seconds,
//! minutes, hours and the weekday register (which carries the oscillator
//! status flag).

use bitfield::bitfield;

/// Register addresses for the MCP7940N RTC.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59) plus oscillator start bit
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x02,
    /// Weekday register (1-7) plus oscillator status bits
    Weekday = 0x03,
}

/// The three time fields the clock reads and writes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Hours field
    Hour,
    /// Minutes field
    Minute,
    /// Seconds field
    Second,
}

impl From<Field> for RegAddr {
    fn from(field: Field) -> Self {
        match field {
            Field::Hour => RegAddr::Hours,
            Field::Minute => RegAddr::Minutes,
            Field::Second => RegAddr::Seconds,
        }
    }
}

/// Hour format selected by bit 6 of the hours register.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for HourFormat {
    /// Creates an `HourFormat` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => HourFormat::TwentyFourHour,
            1 => HourFormat::TwelveHour,
            _ => panic!("Invalid value for HourFormat: {}", v),
        }
    }
}
impl From<HourFormat> for u8 {
    fn from(v: HourFormat) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59) with BCD encoding and the oscillator start bit.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Oscillator start (ST), must be set for the clock to run
    pub oscillator_start, set_oscillator_start: 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

#[cfg(feature = "defmt")]
impl defmt::Format for Seconds {
    fn format(&self, f: defmt::Formatter) {
        let seconds = 10 * self.ten_seconds() + self.seconds();
        defmt::write!(f, "Seconds({}s", seconds);
        if self.oscillator_start() {
            defmt::write!(f, ", ST");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Minutes register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

#[cfg(feature = "defmt")]
impl defmt::Format for Minutes {
    fn format(&self, f: defmt::Formatter) {
        let minutes = 10 * self.ten_minutes() + self.minutes();
        defmt::write!(f, "Minutes({}m)", minutes);
    }
}

bitfield! {
    /// Hours register with format selection and BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Hour format (12/24 hour)
    pub from into HourFormat, hour_format, set_hour_format: 6, 6;
    /// Tens place of hours (0-2 in 24-hour mode)
    pub ten_hours, set_ten_hours: 5, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

#[cfg(feature = "defmt")]
impl defmt::Format for Hours {
    fn format(&self, f: defmt::Formatter) {
        let hours = 10 * self.ten_hours() + self.hours();
        match self.hour_format() {
            HourFormat::TwentyFourHour => defmt::write!(f, "Hours({}h 24h)", hours),
            HourFormat::TwelveHour => defmt::write!(f, "Hours({}h 12h)", hours),
        }
    }
}

bitfield! {
    /// Weekday register with oscillator status flags.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Weekday(u8);
    impl Debug;
    /// Oscillator running (OSCRUN), set by hardware
    pub oscillator_running, _: 5;
    /// Primary power failed since the flag was last cleared
    pub power_failed, set_power_failed: 4;
    /// Battery backup enabled
    pub battery_enable, set_battery_enable: 3;
    /// Day of week (1-7)
    pub weekday, set_weekday: 2, 0;
}
from_register_u8!(Weekday);

#[cfg(feature = "defmt")]
impl defmt::Format for Weekday {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Weekday({}", self.weekday());
        if self.oscillator_running() {
            defmt::write!(f, ", OSCRUN");
        }
        if self.power_failed() {
            defmt::write!(f, ", PWRFAIL");
        }
        defmt::write!(f, ")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_format_conversions() {
        assert_eq!(HourFormat::from(0), HourFormat::TwentyFourHour);
        assert_eq!(HourFormat::from(1), HourFormat::TwelveHour);
        assert_eq!(u8::from(HourFormat::TwentyFourHour), 0);
        assert_eq!(u8::from(HourFormat::TwelveHour), 1);
    }

    #[test]
    #[should_panic(expected = "Invalid value for HourFormat: 2")]
    fn test_invalid_hour_format_conversion() {
        let _ = HourFormat::from(2);
    }

    #[test]
    fn test_field_register_addresses() {
        assert_eq!(RegAddr::from(Field::Second) as u8, 0x00);
        assert_eq!(RegAddr::from(Field::Minute) as u8, 0x01);
        assert_eq!(RegAddr::from(Field::Hour) as u8, 0x02);
    }

    #[test]
    fn test_seconds_register_conversions() {
        let seconds = Seconds::from(0xD9); // 59 seconds, oscillator running
        assert!(seconds.oscillator_start());
        assert_eq!(seconds.ten_seconds(), 5);
        assert_eq!(seconds.seconds(), 9);
        assert_eq!(u8::from(seconds), 0xD9);

        let mut seconds = Seconds::from(0x30);
        assert!(!seconds.oscillator_start());
        seconds.set_oscillator_start(true);
        assert_eq!(u8::from(seconds), 0xB0);
    }

    #[test]
    fn test_minutes_register_conversions() {
        let minutes = Minutes::from(0x45);
        assert_eq!(minutes.ten_minutes(), 4);
        assert_eq!(minutes.minutes(), 5);
        assert_eq!(u8::from(minutes), 0x45);
    }

    #[test]
    fn test_hours_register_conversions() {
        let hours = Hours::from(0x23);
        assert_eq!(hours.hour_format(), HourFormat::TwentyFourHour);
        assert_eq!(hours.ten_hours(), 2);
        assert_eq!(hours.hours(), 3);

        // 12-hour mode, PM, 11 o'clock
        let hours = Hours::from(0x71);
        assert_eq!(hours.hour_format(), HourFormat::TwelveHour);
        assert_eq!(hours.ten_hours(), 3);
        assert_eq!(hours.hours(), 1);

        let mut hours = Hours::from(0x71);
        hours.set_hour_format(HourFormat::TwentyFourHour);
        assert_eq!(u8::from(hours), 0x31);
    }

    #[test]
    fn test_weekday_register_flags() {
        let weekday = Weekday::from(0x2B); // OSCRUN, VBATEN, Wednesday
        assert!(weekday.oscillator_running());
        assert!(!weekday.power_failed());
        assert!(weekday.battery_enable());
        assert_eq!(weekday.weekday(), 3);

        let weekday = Weekday::from(0x01);
        assert!(!weekday.oscillator_running());
    }
}
