//! Binary LED face of the clock.
//!
//! Hours and minutes are shown in binary on two banks of on/off lines, the
//! seconds as the brightness of a single PWM line. Each bank is an array
//! indexed by bit position, so `hour_lines[0]` is the least significant hour
//! LED whatever pin it happens to be wired to.

use embedded_hal::digital::{self, OutputPin, PinState};
use embedded_hal::pwm::{self, SetDutyCycle};

use crate::WallTime;

/// Number of hour lines.
pub const HOUR_LINES: usize = 4;

/// Number of minute lines.
pub const MINUTE_LINES: usize = 6;

/// Brightness of the seconds line at 59 seconds.
pub const MAX_BRIGHTNESS: u8 = 59;

/// Errors reported by the output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// An hour or minute line failed to switch
    Line(digital::ErrorKind),
    /// The seconds line failed to change brightness
    Brightness(pwm::ErrorKind),
}

/// The output lines of the clock face.
pub struct LedDisplay<P, B> {
    hour_lines: [P; HOUR_LINES],
    minute_lines: [P; MINUTE_LINES],
    seconds_line: B,
}

impl<P, B> LedDisplay<P, B>
where
    P: OutputPin,
    B: SetDutyCycle,
{
    /// Creates a display from lines ordered least significant bit first.
    pub fn new(hour_lines: [P; HOUR_LINES], minute_lines: [P; MINUTE_LINES], seconds_line: B) -> Self {
        Self {
            hour_lines,
            minute_lines,
            seconds_line,
        }
    }

    /// Shows `value` in binary on the hour lines.
    ///
    /// Only the low four bits are shown.
    pub fn render_hours(&mut self, value: u8) -> Result<(), DisplayError> {
        Self::render_bits(&mut self.hour_lines, value)
    }

    /// Shows `value` in binary on the minute lines.
    ///
    /// Only the low six bits are shown.
    pub fn render_minutes(&mut self, value: u8) -> Result<(), DisplayError> {
        Self::render_bits(&mut self.minute_lines, value)
    }

    /// Sets the seconds line to `value` out of 59, clamping anything above.
    pub fn render_seconds(&mut self, value: u8) -> Result<(), DisplayError> {
        let level = value.min(MAX_BRIGHTNESS);
        self.seconds_line
            .set_duty_cycle_fraction(u16::from(level), u16::from(MAX_BRIGHTNESS))
            .map_err(|e| DisplayError::Brightness(pwm::Error::kind(&e)))
    }

    /// Shows a full time, hours projected to the 12-hour face.
    pub fn render(&mut self, time: &WallTime) -> Result<(), DisplayError> {
        self.render_hours(time.display_hour())?;
        self.render_minutes(time.minutes())?;
        self.render_seconds(time.seconds())
    }

    /// Turns every line off and hands the pins back.
    ///
    /// The caller is expected to return the pins to input mode. A line that
    /// fails to switch off is logged and skipped; the pins are returned
    /// regardless.
    pub fn release(mut self) -> ([P; HOUR_LINES], [P; MINUTE_LINES], B) {
        for line in self.hour_lines.iter_mut().chain(self.minute_lines.iter_mut()) {
            if let Err(e) = line.set_low() {
                warn!("failed to switch off line: {:?}", digital::Error::kind(&e));
            }
        }
        if let Err(e) = self.seconds_line.set_duty_cycle_fully_off() {
            warn!("failed to switch off seconds: {:?}", pwm::Error::kind(&e));
        }
        (self.hour_lines, self.minute_lines, self.seconds_line)
    }

    fn render_bits(lines: &mut [P], value: u8) -> Result<(), DisplayError> {
        for (bit, line) in lines.iter_mut().enumerate().rev() {
            let state = PinState::from((value >> bit) & 1 == 1);
            line.set_state(state)
                .map_err(|e| DisplayError::Line(digital::Error::kind(&e)))?;
        }
        Ok(())
    }
}
