//! A platform-agnostic binary LED clock built on the MCP7940N real-time clock.
//!
//! The RTC keeps time on its own battery; this crate reads it once per poll,
//! shows hours and minutes in binary on ten LEDs and the seconds as the
//! brightness of an eleventh, and lets two buttons step the hours and minutes.
//! All hardware access goes through `embedded-hal` traits.
//!
//! # Features
//!
//! - Decimal-in-hex register encoding with validation ([`codec`])
//! - 12-hour display projection ([`format`])
//! - Binary rendering onto [`OutputPin`](embedded_hal::digital::OutputPin)s and a
//!   [`SetDutyCycle`](embedded_hal::pwm::SetDutyCycle) seconds line ([`LedDisplay`])
//! - One debounce window shared by every button and the startup time sync ([`Debouncer`])
//! - Button presses delivered as queued events, so register updates never interleave
//!   with a display poll ([`ClockController`])
//! - Optional async support via the `async` feature
//! - Optional logging via the `log` or `defmt` features
//!
//! # Example
//!
//! ```rust,ignore
//! use binclock::{ClockController, Config, LedDisplay, Mcp7940n};
//!
//! let rtc = Mcp7940n::new(i2c, binclock::DEFAULT_ADDRESS);
//! let display = LedDisplay::new(hour_pins, minute_pins, seconds_pwm);
//! let mut clock = ClockController::new(rtc, display, monotonic, &Config::default());
//!
//! clock.sync_time(&mut || chrono::Local::now().time())?;
//! loop {
//!     clock.drain(&mut events)?;
//!     clock.tick()?;
//!     sleep(1000);
//! }
//! ```
#![no_std]

// Logging shims: forward to `defmt` or `log` when one of them is enabled and
// expand to nothing otherwise.
macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        log::debug!($($arg)*);
        #[cfg(not(any(feature = "log", feature = "defmt")))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        log::info!($($arg)*);
        #[cfg(not(any(feature = "log", feature = "defmt")))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        log::warn!($($arg)*);
        #[cfg(not(any(feature = "log", feature = "defmt")))]
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(feature = "async")]
pub mod asynch;
pub mod codec;
mod controller;
mod debounce;
mod display;
pub mod format;
#[cfg(test)]
mod mock;
mod registers;
mod time;

pub use codec::CodecError;
pub use controller::*;
pub use debounce::*;
pub use display::*;
pub use registers::*;
pub use time::*;

use embedded_hal::i2c::I2c;
use paste::paste;

/// I2C address of the MCP7940N timekeeping registers.
pub const DEFAULT_ADDRESS: u8 = 0x6F;

/// Configuration for the [`ClockController`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Events closer than this to the previous event are ignored
    pub debounce_window_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

/// Error type for clock operations.
#[derive(Debug)]
pub enum ClockError<E> {
    /// The RTC bus failed
    Rtc(E),
    /// A register held, or would have been given, an invalid time
    Codec(CodecError),
    /// An output line failed
    Display(DisplayError),
}

impl<E> From<CodecError> for ClockError<E> {
    fn from(e: CodecError) -> Self {
        ClockError::Codec(e)
    }
}

impl<E> From<DisplayError> for ClockError<E> {
    fn from(e: DisplayError) -> Self {
        ClockError::Display(e)
    }
}

/// Register-level access to the RTC's time fields.
///
/// Values are raw register bytes; packing and unpacking is the caller's job.
pub trait RtcBus {
    /// Error reported by the underlying transport.
    type Error;

    /// Reads the raw register holding `field`.
    fn read_register(&mut self, field: Field) -> Result<u8, Self::Error>;

    /// Writes a raw value to the register holding `field`.
    fn write_register(&mut self, field: Field, value: u8) -> Result<(), Self::Error>;
}

/// MCP7940N Real-Time Clock driver.
///
/// This struct provides the blocking interface to the RTC over I2C.
pub struct Mcp7940n<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mcp7940n<I2C> {
    /// Creates a new driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The I2C address of the device (normally [`DEFAULT_ADDRESS`])
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Gives back the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Reads one register.
    pub fn read_raw(&mut self, reg: RegAddr) -> Result<u8, I2C::Error> {
        let mut data = [0];
        self.i2c.write_read(self.address, &[reg as u8], &mut data)?;
        Ok(data[0])
    }

    /// Writes one register.
    pub fn write_raw(&mut self, reg: RegAddr, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[reg as u8, value])
    }

    /// Whether the oscillator is actually running (OSCRUN).
    ///
    /// The flag lags the start bit by a few oscillator cycles, so it can
    /// still read false immediately after a time sync.
    pub fn oscillator_running(&mut self) -> Result<bool, I2C::Error> {
        let weekday = self.weekday()?;
        debug!("weekday: {:?}", weekday);
        Ok(weekday.oscillator_running())
    }

    /// Writes all three time registers, hours first.
    pub fn set_raw_time(&mut self, raw: &RawTime) -> Result<(), I2C::Error> {
        self.set_hours(raw.hours)?;
        self.set_minutes(raw.minutes)?;
        self.set_seconds(raw.seconds)
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> Mcp7940n<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, I2C::Error> {
                        Ok(<$typ>::from(self.read_raw($regaddr)?))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), I2C::Error> {
                        self.write_raw($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (seconds, RegAddr::Seconds, Seconds),
    (minutes, RegAddr::Minutes, Minutes),
    (hours, RegAddr::Hours, Hours),
    (weekday, RegAddr::Weekday, Weekday)
);

impl<I2C: I2c> RtcBus for Mcp7940n<I2C> {
    type Error = I2C::Error;

    fn read_register(&mut self, field: Field) -> Result<u8, Self::Error> {
        self.read_raw(field.into())
    }

    fn write_register(&mut self, field: Field, value: u8) -> Result<(), Self::Error> {
        self.write_raw(field.into(), value)
    }
}
