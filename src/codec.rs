//! Conversion between the RTC's decimal-in-hex register values and plain
//! integers.
//!
//! The RTC stores each decimal digit of a two digit value in its own nibble,
//! so 59 minutes is stored as `0x59`. Bit 7 never carries part of the value:
//! on the seconds register it is the oscillator start flag and on the minutes
//! and hours registers it is unused, so it is masked off before decoding.

/// Bits of a time register that hold the packed value.
const VALUE_MASK: u8 = 0x7F;

/// Largest value a minutes or seconds register can hold.
pub const MAX_MINUTE_SECOND: u8 = 59;

/// Largest value the hours register holds in 24-hour mode.
pub const MAX_HOUR: u8 = 23;

/// Errors that can occur while packing or unpacking a time register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// The value is outside the valid domain of the field it is written to
    OutOfRange,
    /// The register does not hold a decimal-in-hex value in 0-59
    InvalidEncoding,
}

/// Decodes a raw time register into its integer value.
///
/// The low nibble is the units digit and the high nibble (with bit 7
/// cleared) selects the tens: `0x00`, `0x10`, ... `0x50`. Anything in the
/// `0x60` band or above, or with a units nibble above 9, is not a valid time
/// and fails with [`CodecError::InvalidEncoding`].
pub fn decode(raw: u8) -> Result<u8, CodecError> {
    let value = raw & VALUE_MASK;
    let units = value % 0x10;
    if units > 9 {
        return Err(CodecError::InvalidEncoding);
    }
    let tens = match value {
        0x50..=0x5F => 50,
        0x40..=0x4F => 40,
        0x30..=0x3F => 30,
        0x20..=0x2F => 20,
        0x10..=0x1F => 10,
        0x00..=0x0F => 0,
        _ => return Err(CodecError::InvalidEncoding),
    };
    Ok(tens + units)
}

/// Encodes a minute or second value (0-59) into its register form.
pub fn encode(value: u8) -> Result<u8, CodecError> {
    if value > MAX_MINUTE_SECOND {
        return Err(CodecError::OutOfRange);
    }
    let units = value % 10;
    let tens = match value {
        50..=59 => 0x50,
        40..=49 => 0x40,
        30..=39 => 0x30,
        20..=29 => 0x20,
        10..=19 => 0x10,
        _ => 0x00,
    };
    Ok(tens + units)
}

/// Encodes an hour value (0-23) into its 24-hour register form.
pub fn encode_hour(value: u8) -> Result<u8, CodecError> {
    if value > MAX_HOUR {
        return Err(CodecError::OutOfRange);
    }
    encode(value)
}
