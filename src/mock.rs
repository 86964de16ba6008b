//! Test doubles shared by the unit tests.

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTrans};

/// One pin mock per bit, each expecting the given values to be shown in turn.
pub(crate) fn line_mocks<const N: usize>(values: &[u8]) -> [PinMock; N] {
    core::array::from_fn(|bit| {
        let expectations: Vec<PinTrans> = values
            .iter()
            .map(|value| {
                if (value >> bit) & 1 == 1 {
                    PinTrans::set(PinState::High)
                } else {
                    PinTrans::set(PinState::Low)
                }
            })
            .collect();
        PinMock::new(&expectations)
    })
}

/// Seconds line that records every duty cycle it is set to.
#[derive(Clone, Default)]
pub(crate) struct Brightness(Rc<RefCell<Vec<u16>>>);

impl Brightness {
    pub(crate) fn levels(&self) -> Vec<u16> {
        self.0.borrow().clone()
    }
}

impl ErrorType for Brightness {
    type Error = Infallible;
}

impl SetDutyCycle for Brightness {
    fn max_duty_cycle(&self) -> u16 {
        59
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(duty);
        Ok(())
    }
}

/// Monotonic clock the test moves by hand.
#[derive(Clone, Default)]
pub(crate) struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub(crate) fn at(now_ms: u64) -> Self {
        let clock = Self::default();
        clock.set(now_ms);
        clock
    }

    pub(crate) fn set(&self, now_ms: u64) {
        self.0.set(now_ms);
    }

    pub(crate) fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl crate::MonotonicClock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.get()
    }
}
