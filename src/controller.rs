//! The clock itself: polls the RTC onto the display and applies button presses.
//!
//! Button interrupts do not touch the RTC. They stamp a [`ClockEvent`] with the
//! time of the press and push it onto an [`EventQueue`]; the controller drains
//! the queue between ticks, so every register read-modify-write runs to
//! completion before the next poll reads the registers. Presses are debounced
//! by their stamp, not by when they happen to be drained.
//!
//! # Example
//!
//! ```rust,ignore
//! static mut EVENTS: EventQueue<8> = EventQueue::new();
//! let (producer, mut consumer) = unsafe { EVENTS.split() };
//! // in the hour button interrupt handler:
//! producer.enqueue(ClockEvent::HourButton { at_ms: monotonic.now_millis() });
//!
//! clock.sync_time(&mut initial_time)?;
//! while clock.drain(&mut consumer)? == Flow::Continue {
//!     clock.tick()?;
//!     delay.delay_ms(1000);
//! }
//! let parts = clock.shutdown();
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use heapless::spsc::{Consumer, Queue};

use crate::codec::{self, CodecError};
use crate::format::wrap_hour;
use crate::{
    ClockError, Config, Debouncer, Field, Hours, LedDisplay, Minutes, MonotonicClock, RtcBus,
    Seconds, WallTime, WallTimeSource, HOUR_LINES, MINUTE_LINES,
};

/// What the controller is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Waiting for the next tick or event
    Idle,
    /// Writing the startup time to the RTC
    SyncingInitialTime,
    /// Reading the RTC onto the display
    PollingDisplay,
    /// Applying a button press
    HandlingButtonEvent,
    /// Releasing the outputs before exit
    ShuttingDown,
}

/// Something that happened outside the polling loop.
///
/// Button presses carry the [`MonotonicClock`] reading taken when the
/// interrupt fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEvent {
    /// The hour button was pressed
    HourButton {
        /// Time of the press in milliseconds
        at_ms: u64,
    },
    /// The minute button was pressed
    MinuteButton {
        /// Time of the press in milliseconds
        at_ms: u64,
    },
    /// The process was asked to stop
    Terminate,
}

/// Whether the polling loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flow {
    /// Keep polling
    Continue,
    /// Stop and call [`ClockController::shutdown`]
    Shutdown,
}

/// Queue carrying events from interrupt handlers to the controller.
///
/// Holds at most `N - 1` events; a press arriving at a full queue is dropped.
pub type EventQueue<const N: usize> = Queue<ClockEvent, N>;

/// Everything the controller owned, handed back by [`ClockController::shutdown`].
pub struct Parts<R, P, B, C> {
    /// The RTC bus
    pub rtc: R,
    /// Hour lines, switched off
    pub hour_lines: [P; HOUR_LINES],
    /// Minute lines, switched off
    pub minute_lines: [P; MINUTE_LINES],
    /// Seconds line, at zero brightness
    pub seconds_line: B,
    /// The monotonic clock
    pub clock: C,
}

/// Computes the hours register after one press of the hour button.
///
/// Wraps past 23 back to 0, so the value written back is always a valid
/// 24-hour register.
pub(crate) fn next_hour(raw: u8) -> Result<u8, CodecError> {
    let hours = codec::decode(raw)?;
    codec::encode_hour(wrap_hour(hours + 1))
}

/// Computes the minutes register after one press of the minute button, and
/// whether the press carried into the hours.
pub(crate) fn next_minute(raw: u8) -> Result<(u8, bool), CodecError> {
    let minutes = codec::decode(raw)? + 1;
    let (minutes, carry) = if minutes >= 60 {
        (0, true)
    } else {
        (minutes, false)
    };
    Ok((codec::encode(minutes)?, carry))
}

/// Binary clock controller.
///
/// Owns the RTC, the display, the monotonic clock and the debounce state
/// shared by both buttons and the startup time sync.
pub struct ClockController<R, P, B, C> {
    rtc: R,
    display: LedDisplay<P, B>,
    clock: C,
    debouncer: Debouncer,
    state: ClockState,
}

impl<R, P, B, C> ClockController<R, P, B, C>
where
    R: RtcBus,
    P: OutputPin,
    B: SetDutyCycle,
    C: MonotonicClock,
{
    /// Creates a controller waiting for its initial time sync.
    pub fn new(rtc: R, display: LedDisplay<P, B>, clock: C, config: &Config) -> Self {
        Self {
            rtc,
            display,
            clock,
            debouncer: Debouncer::new(config.debounce_window_ms),
            state: ClockState::SyncingInitialTime,
        }
    }

    /// Current state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Shared debounce state.
    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Sets the RTC to the time supplied by `source`.
    ///
    /// Goes through the same debounce gate as the buttons. When the event is
    /// accepted the source is consulted once and hours, minutes and seconds
    /// are written in that order, the seconds with the oscillator start bit
    /// set.
    ///
    /// # Returns
    /// * `Ok(true)` - The time was written
    /// * `Ok(false)` - The event fell inside the debounce window
    /// * `Err(ClockError)` on error
    pub fn sync_time<S: WallTimeSource>(
        &mut self,
        source: &mut S,
    ) -> Result<bool, ClockError<R::Error>> {
        self.enter(ClockState::SyncingInitialTime);
        let now = self.clock.now_millis();
        let result = if self.accept_event("time sync", now) {
            self.write_time(source).map(|()| true)
        } else {
            Ok(false)
        };
        self.enter(ClockState::Idle);
        result
    }

    /// Reads the RTC and shows the time.
    ///
    /// Nothing is rendered unless all three registers decode, so a bad read
    /// leaves the previous time on the display.
    pub fn tick(&mut self) -> Result<WallTime, ClockError<R::Error>> {
        self.enter(ClockState::PollingDisplay);
        let result = self.poll();
        self.enter(ClockState::Idle);
        result
    }

    /// Applies an hour button press happening now.
    ///
    /// # Returns
    /// * `Ok(true)` - The hour was advanced
    /// * `Ok(false)` - The press fell inside the debounce window
    /// * `Err(ClockError)` on error
    pub fn increment_hour(&mut self) -> Result<bool, ClockError<R::Error>> {
        let now = self.clock.now_millis();
        self.increment_hour_at(now)
    }

    /// Applies an hour button press made at `at_ms`.
    pub fn increment_hour_at(&mut self, at_ms: u64) -> Result<bool, ClockError<R::Error>> {
        self.enter(ClockState::HandlingButtonEvent);
        let result = if self.accept_event("hour button", at_ms) {
            self.advance_hour().map(|()| true)
        } else {
            Ok(false)
        };
        self.enter(ClockState::Idle);
        result
    }

    /// Applies a minute button press happening now, carrying into the hour
    /// at 60.
    ///
    /// The carry reuses this press; it is not debounced a second time.
    pub fn increment_minute(&mut self) -> Result<bool, ClockError<R::Error>> {
        let now = self.clock.now_millis();
        self.increment_minute_at(now)
    }

    /// Applies a minute button press made at `at_ms`.
    pub fn increment_minute_at(&mut self, at_ms: u64) -> Result<bool, ClockError<R::Error>> {
        self.enter(ClockState::HandlingButtonEvent);
        let result = if self.accept_event("minute button", at_ms) {
            self.advance_minute().map(|()| true)
        } else {
            Ok(false)
        };
        self.enter(ClockState::Idle);
        result
    }

    /// Applies one event.
    pub fn handle(&mut self, event: ClockEvent) -> Result<Flow, ClockError<R::Error>> {
        match event {
            ClockEvent::HourButton { at_ms } => {
                self.increment_hour_at(at_ms)?;
                Ok(Flow::Continue)
            }
            ClockEvent::MinuteButton { at_ms } => {
                self.increment_minute_at(at_ms)?;
                Ok(Flow::Continue)
            }
            ClockEvent::Terminate => Ok(Flow::Shutdown),
        }
    }

    /// Applies queued events until the queue is empty or a
    /// [`ClockEvent::Terminate`] is found.
    ///
    /// Events behind a terminate, or behind a failing event, stay queued.
    pub fn drain<const N: usize>(
        &mut self,
        events: &mut Consumer<'_, ClockEvent, N>,
    ) -> Result<Flow, ClockError<R::Error>> {
        while let Some(event) = events.dequeue() {
            if self.handle(event)? == Flow::Shutdown {
                return Ok(Flow::Shutdown);
            }
        }
        Ok(Flow::Continue)
    }

    /// Switches every output off and hands back the hardware.
    ///
    /// Consumes the controller, so it can only happen once.
    pub fn shutdown(mut self) -> Parts<R, P, B, C> {
        self.enter(ClockState::ShuttingDown);
        info!("Cleaning up...");
        let (hour_lines, minute_lines, seconds_line) = self.display.release();
        info!("LEDs reset");
        Parts {
            rtc: self.rtc,
            hour_lines,
            minute_lines,
            seconds_line,
            clock: self.clock,
        }
    }

    fn enter(&mut self, next: ClockState) {
        if self.state != next {
            debug!("state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn accept_event(&mut self, source: &str, now: u64) -> bool {
        let accepted = self.debouncer.gate(now);
        if accepted {
            info!("{} accepted at {}ms", source, now);
        } else {
            debug!("{} ignored at {}ms", source, now);
        }
        accepted
    }

    fn read(&mut self, field: Field) -> Result<u8, ClockError<R::Error>> {
        self.rtc.read_register(field).map_err(ClockError::Rtc)
    }

    fn write(&mut self, field: Field, value: u8) -> Result<(), ClockError<R::Error>> {
        self.rtc.write_register(field, value).map_err(ClockError::Rtc)
    }

    fn poll(&mut self) -> Result<WallTime, ClockError<R::Error>> {
        let hours = self.read(Field::Hour)?;
        let minutes = self.read(Field::Minute)?;
        let seconds = self.read(Field::Second)?;
        debug!(
            "raw={:?} {:?} {:?}",
            Hours::from(hours),
            Minutes::from(minutes),
            Seconds::from(seconds)
        );
        let time = WallTime::from_registers(hours, minutes, seconds)?;
        self.display.render(&time)?;
        info!(
            "The current time is: {}:{}:{}",
            time.display_hour(),
            time.minutes(),
            time.seconds()
        );
        Ok(time)
    }

    fn advance_hour(&mut self) -> Result<(), ClockError<R::Error>> {
        let raw = self.read(Field::Hour)?;
        let next = next_hour(raw)?;
        debug!("hours {:#x} -> {:#x}", raw, next);
        self.write(Field::Hour, next)
    }

    fn advance_minute(&mut self) -> Result<(), ClockError<R::Error>> {
        let raw = self.read(Field::Minute)?;
        let (next, carry) = next_minute(raw)?;
        if carry {
            self.advance_hour()?;
        }
        debug!("minutes {:#x} -> {:#x}", raw, next);
        self.write(Field::Minute, next)
    }

    fn write_time<S: WallTimeSource>(&mut self, source: &mut S) -> Result<(), ClockError<R::Error>> {
        let time = WallTime::from(source.initial_time());
        let raw = time.to_registers()?;
        info!("setting RTC to {}:{}:{}", time.hours(), time.minutes(), time.seconds());
        self.write(Field::Hour, raw.hours.into())?;
        self.write(Field::Minute, raw.minutes.into())?;
        self.write(Field::Second, raw.seconds.into())
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use crate::mock::{line_mocks, Brightness, ManualClock};
    use crate::{CodecError, Mcp7940n, RegAddr, DEFAULT_ADDRESS};
    use alloc::vec;
    use chrono::NaiveTime;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::digital::Mock as PinMock;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    type TestController = ClockController<Mcp7940n<I2cMock>, PinMock, Brightness, ManualClock>;

    fn read(reg: RegAddr, value: u8) -> I2cTrans {
        I2cTrans::write_read(DEFAULT_ADDRESS, vec![reg as u8], vec![value])
    }

    fn write(reg: RegAddr, value: u8) -> I2cTrans {
        I2cTrans::write(DEFAULT_ADDRESS, vec![reg as u8, value])
    }

    /// Mocked hardware around a controller.
    struct Rig {
        i2c: I2cMock,
        hours: [PinMock; HOUR_LINES],
        minutes: [PinMock; MINUTE_LINES],
        brightness: Brightness,
        clock: ManualClock,
    }

    impl Rig {
        fn new(bus: &[I2cTrans], hours_shown: &[u8], minutes_shown: &[u8], now_ms: u64) -> Self {
            Self {
                i2c: I2cMock::new(bus),
                hours: line_mocks(hours_shown),
                minutes: line_mocks(minutes_shown),
                brightness: Brightness::default(),
                clock: ManualClock::at(now_ms),
            }
        }

        fn controller(&self) -> TestController {
            ClockController::new(
                Mcp7940n::new(self.i2c.clone(), DEFAULT_ADDRESS),
                LedDisplay::new(
                    self.hours.clone(),
                    self.minutes.clone(),
                    self.brightness.clone(),
                ),
                self.clock.clone(),
                &Config::default(),
            )
        }

        fn done(&mut self) {
            self.i2c.done();
            for line in self.hours.iter_mut().chain(self.minutes.iter_mut()) {
                line.done();
            }
        }
    }

    #[test]
    fn test_next_hour() {
        assert_eq!(next_hour(0x00).unwrap(), 0x01);
        assert_eq!(next_hour(0x12).unwrap(), 0x13);
        assert_eq!(next_hour(0x23).unwrap(), 0x00);
        // Corrupt register (12-hour mode bit) wraps to midnight
        assert_eq!(next_hour(0x52).unwrap(), 0x00);
        assert_eq!(next_hour(0x6A), Err(CodecError::InvalidEncoding));
    }

    #[test]
    fn test_next_minute() {
        assert_eq!(next_minute(0x00).unwrap(), (0x01, false));
        assert_eq!(next_minute(0x41).unwrap(), (0x42, false));
        assert_eq!(next_minute(0x58).unwrap(), (0x59, false));
        assert_eq!(next_minute(0x59).unwrap(), (0x00, true));
    }

    #[test]
    fn test_initial_state() {
        let mut rig = Rig::new(&[], &[], &[], 0);
        let clock = rig.controller();
        assert_eq!(clock.state(), ClockState::SyncingInitialTime);
        rig.done();
    }

    #[test]
    fn test_sync_time_writes_registers() {
        let mut rig = Rig::new(
            &[
                write(RegAddr::Hours, 0x12),
                write(RegAddr::Minutes, 0x59),
                write(RegAddr::Seconds, 0xD0),
            ],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();

        let mut source = NaiveTime::from_hms_opt(12, 59, 50).unwrap();
        assert!(clock.sync_time(&mut source).unwrap());
        assert_eq!(clock.state(), ClockState::Idle);
        rig.done();
    }

    #[test]
    fn test_sync_time_keeps_afternoon_hours() {
        let mut rig = Rig::new(
            &[
                write(RegAddr::Hours, 0x15),
                write(RegAddr::Minutes, 0x04),
                write(RegAddr::Seconds, 0x80),
            ],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();

        let mut source = NaiveTime::from_hms_opt(15, 4, 0).unwrap();
        assert!(clock.sync_time(&mut source).unwrap());
        rig.done();
    }

    #[test]
    fn test_sync_time_inside_startup_window() {
        let mut rig = Rig::new(&[], &[], &[], 100);
        let mut clock = rig.controller();

        let mut consulted = 0;
        let mut source = || {
            consulted += 1;
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        };
        assert!(!clock.sync_time(&mut source).unwrap());
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(consulted, 0);
        rig.done();
    }

    #[test]
    fn test_tick_renders_time() {
        // 23:45:12 shows as 11:45 with brightness 12
        let mut rig = Rig::new(
            &[
                read(RegAddr::Hours, 0x23),
                read(RegAddr::Minutes, 0x45),
                read(RegAddr::Seconds, 0x92),
            ],
            &[11],
            &[45],
            1_000,
        );
        let mut clock = rig.controller();

        let time = clock.tick().unwrap();
        assert_eq!(time, WallTime::new(23, 45, 12).unwrap());
        assert_eq!(rig.brightness.levels(), [12]);
        assert_eq!(clock.state(), ClockState::Idle);
        rig.done();
    }

    #[test]
    fn test_tick_with_invalid_seconds_leaves_display() {
        let mut rig = Rig::new(
            &[
                read(RegAddr::Hours, 0x12),
                read(RegAddr::Minutes, 0x30),
                read(RegAddr::Seconds, 0x61),
            ],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();

        let err = clock.tick().unwrap_err();
        assert!(matches!(
            err,
            ClockError::Codec(CodecError::InvalidEncoding)
        ));
        assert!(rig.brightness.levels().is_empty());
        assert_eq!(clock.state(), ClockState::Idle);
        rig.done();
    }

    #[test]
    fn test_tick_with_bus_error() {
        let mut rig = Rig::new(
            &[
                read(RegAddr::Hours, 0x12),
                read(RegAddr::Minutes, 0x00).with_error(ErrorKind::Other),
            ],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();

        assert!(matches!(
            clock.tick(),
            Err(ClockError::Rtc(ErrorKind::Other))
        ));
        assert!(rig.brightness.levels().is_empty());
        rig.done();
    }

    #[test]
    fn test_hour_button_wraps_at_midnight() {
        let mut rig = Rig::new(
            &[read(RegAddr::Hours, 0x23), write(RegAddr::Hours, 0x00)],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();

        assert!(clock.increment_hour().unwrap());
        rig.done();
    }

    #[test]
    fn test_minute_button_without_carry() {
        let mut rig = Rig::new(
            &[read(RegAddr::Minutes, 0x41), write(RegAddr::Minutes, 0x42)],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();

        assert!(clock.increment_minute().unwrap());
        rig.done();
    }

    #[test]
    fn test_minute_button_carries_one_hour() {
        let mut rig = Rig::new(
            &[
                read(RegAddr::Minutes, 0x59),
                read(RegAddr::Hours, 0x23),
                write(RegAddr::Hours, 0x00),
                write(RegAddr::Minutes, 0x00),
            ],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();

        assert!(clock.increment_minute().unwrap());
        rig.done();
    }

    #[test]
    fn test_buttons_share_debounce_window() {
        let mut rig = Rig::new(
            &[read(RegAddr::Minutes, 0x10), write(RegAddr::Minutes, 0x11)],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();
        let mut source = NaiveTime::from_hms_opt(1, 0, 0).unwrap();

        // Sync inside the startup window moves the anchor to 100ms
        rig.clock.set(100);
        assert!(!clock.sync_time(&mut source).unwrap());
        rig.clock.set(250);
        assert!(!clock.increment_hour().unwrap());
        rig.clock.set(400);
        assert!(!clock.increment_minute().unwrap());
        assert_eq!(clock.debouncer().last_event_ms(), 400);
        rig.clock.advance(201);
        assert!(clock.increment_minute().unwrap());
        rig.done();
    }

    #[test]
    fn test_synced_noon_rolls_into_one_pm() {
        let mut rig = Rig::new(
            &[
                write(RegAddr::Hours, 0x12),
                write(RegAddr::Minutes, 0x59),
                write(RegAddr::Seconds, 0xD0),
                read(RegAddr::Minutes, 0x59),
                read(RegAddr::Hours, 0x12),
                write(RegAddr::Hours, 0x13),
                write(RegAddr::Minutes, 0x00),
                read(RegAddr::Hours, 0x13),
                read(RegAddr::Minutes, 0x00),
                read(RegAddr::Seconds, 0xD0),
            ],
            &[1],
            &[0],
            1_000,
        );
        let mut clock = rig.controller();

        let mut source = NaiveTime::from_hms_opt(12, 59, 50).unwrap();
        assert!(clock.sync_time(&mut source).unwrap());
        rig.clock.advance(250);
        assert!(clock.increment_minute().unwrap());

        let time = clock.tick().unwrap();
        assert_eq!(time, WallTime::new(13, 0, 50).unwrap());
        assert_eq!(time.display_hour(), 1);
        assert_eq!(rig.brightness.levels(), [50]);
        rig.done();
    }

    #[test]
    fn test_drain_stops_at_terminate() {
        let mut rig = Rig::new(
            &[read(RegAddr::Hours, 0x05), write(RegAddr::Hours, 0x06)],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();
        let mut queue: EventQueue<4> = EventQueue::new();
        let (mut producer, mut consumer) = queue.split();

        producer
            .enqueue(ClockEvent::HourButton { at_ms: 1_000 })
            .unwrap();
        producer.enqueue(ClockEvent::Terminate).unwrap();
        producer
            .enqueue(ClockEvent::MinuteButton { at_ms: 1_500 })
            .unwrap();

        assert_eq!(clock.drain(&mut consumer).unwrap(), Flow::Shutdown);
        assert_eq!(
            consumer.dequeue(),
            Some(ClockEvent::MinuteButton { at_ms: 1_500 })
        );
        assert_eq!(clock.drain(&mut consumer).unwrap(), Flow::Continue);
        rig.done();
    }

    #[test]
    fn test_drain_debounces_bursts_by_press_time() {
        let mut rig = Rig::new(
            &[read(RegAddr::Minutes, 0x07), write(RegAddr::Minutes, 0x08)],
            &[],
            &[],
            5_000,
        );
        let mut clock = rig.controller();
        let mut queue: EventQueue<4> = EventQueue::new();
        let (mut producer, mut consumer) = queue.split();

        // A bouncing switch: contacts close at 1000, 1040 and 1090 ms
        for at_ms in [1_000, 1_040, 1_090] {
            producer
                .enqueue(ClockEvent::MinuteButton { at_ms })
                .unwrap();
        }
        assert_eq!(clock.drain(&mut consumer).unwrap(), Flow::Continue);
        assert_eq!(consumer.dequeue(), None);
        assert_eq!(clock.debouncer().last_event_ms(), 1_090);
        rig.done();
    }

    #[test]
    fn test_drain_applies_spaced_presses_queued_together() {
        // Both presses land in the queue during one poll interval
        let mut rig = Rig::new(
            &[
                read(RegAddr::Hours, 0x05),
                write(RegAddr::Hours, 0x06),
                read(RegAddr::Hours, 0x06),
                write(RegAddr::Hours, 0x07),
            ],
            &[],
            &[],
            1_900,
        );
        let mut clock = rig.controller();
        let mut queue: EventQueue<4> = EventQueue::new();
        let (mut producer, mut consumer) = queue.split();

        producer
            .enqueue(ClockEvent::HourButton { at_ms: 1_000 })
            .unwrap();
        producer
            .enqueue(ClockEvent::HourButton { at_ms: 1_250 })
            .unwrap();
        assert_eq!(clock.drain(&mut consumer).unwrap(), Flow::Continue);
        assert_eq!(clock.debouncer().last_event_ms(), 1_250);
        rig.done();
    }

    #[test]
    fn test_bounce_across_drains_is_rejected() {
        let mut rig = Rig::new(
            &[read(RegAddr::Minutes, 0x10), write(RegAddr::Minutes, 0x11)],
            &[],
            &[],
            1_000,
        );
        let mut clock = rig.controller();
        let mut queue: EventQueue<4> = EventQueue::new();
        let (mut producer, mut consumer) = queue.split();

        producer
            .enqueue(ClockEvent::MinuteButton { at_ms: 990 })
            .unwrap();
        assert_eq!(clock.drain(&mut consumer).unwrap(), Flow::Continue);

        // The same press bounces just after the drain; the next drain is a second later
        rig.clock.advance(1_000);
        producer
            .enqueue(ClockEvent::MinuteButton { at_ms: 1_020 })
            .unwrap();
        assert_eq!(clock.drain(&mut consumer).unwrap(), Flow::Continue);
        rig.done();
    }

    #[test]
    fn test_shutdown_releases_outputs() {
        let mut rig = Rig::new(&[], &[0], &[0], 1_000);
        let clock = rig.controller();

        let parts = clock.shutdown();
        assert_eq!(parts.seconds_line.levels(), [0]);
        drop(parts);
        rig.done();
    }
}
