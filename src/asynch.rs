//! Async implementation of the MCP7940N driver and the clock controller.
//!
//! This module provides the same clock on top of `embedded-hal-async` I2C.
//! It is only available when the `async` feature is enabled. The output
//! lines stay blocking: switching a GPIO never waits.
//!
//! # Example
//!
//! ```rust,ignore
//! use binclock::asynch::{ClockController, Mcp7940n};
//!
//! let rtc = Mcp7940n::new(i2c, binclock::DEFAULT_ADDRESS);
//! let mut clock = ClockController::new(rtc, display, monotonic, &Config::default());
//!
//! clock.sync_time(&mut initial_time).await?;
//! loop {
//!     clock.tick().await?;
//!     Timer::after_secs(1).await;
//! }
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::i2c::I2c;
use heapless::spsc::Consumer;
use paste::paste;

use crate::controller::{next_hour, next_minute};
use crate::{
    ClockError, ClockEvent, ClockState, Config, Debouncer, Field, Flow, Hours, LedDisplay,
    Minutes, MonotonicClock, Parts, RawTime, RegAddr, Seconds, WallTime, WallTimeSource, Weekday,
};

/// MCP7940N Real-Time Clock async driver.
pub struct Mcp7940n<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mcp7940n<I2C> {
    /// Creates a new async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    /// * `address` - The I2C address of the device (normally [`crate::DEFAULT_ADDRESS`])
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Gives back the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Reads one register.
    pub async fn read_raw(&mut self, reg: RegAddr) -> Result<u8, I2C::Error> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut data)
            .await?;
        Ok(data[0])
    }

    /// Writes one register.
    pub async fn write_raw(&mut self, reg: RegAddr, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[reg as u8, value]).await
    }

    /// Whether the oscillator is actually running (OSCRUN).
    pub async fn oscillator_running(&mut self) -> Result<bool, I2C::Error> {
        let weekday = self.weekday().await?;
        debug!("weekday: {:?}", weekday);
        Ok(weekday.oscillator_running())
    }

    /// Writes all three time registers, hours first.
    pub async fn set_raw_time(&mut self, raw: &RawTime) -> Result<(), I2C::Error> {
        self.set_hours(raw.hours).await?;
        self.set_minutes(raw.minutes).await?;
        self.set_seconds(raw.seconds).await
    }

    async fn read_field(&mut self, field: Field) -> Result<u8, I2C::Error> {
        self.read_raw(field.into()).await
    }

    async fn write_field(&mut self, field: Field, value: u8) -> Result<(), I2C::Error> {
        self.write_raw(field.into(), value).await
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> Mcp7940n<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, I2C::Error> {
                        Ok(<$typ>::from(self.read_raw($regaddr).await?))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), I2C::Error> {
                        self.write_raw($regaddr, value.into()).await
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

/// Async binary clock controller.
///
/// Behaves exactly like [`crate::ClockController`]; only the RTC access is
/// awaited.
pub struct ClockController<I2C: I2c, P, B, C> {
    rtc: Mcp7940n<I2C>,
    display: LedDisplay<P, B>,
    clock: C,
    debouncer: Debouncer,
    state: ClockState,
}

impl<I2C, P, B, C> ClockController<I2C, P, B, C>
where
    I2C: I2c,
    P: OutputPin,
    B: SetDutyCycle,
    C: MonotonicClock,
{
    /// Creates a controller waiting for its initial time sync.
    pub fn new(rtc: Mcp7940n<I2C>, display: LedDisplay<P, B>, clock: C, config: &Config) -> Self {
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

    /// Sets the RTC to the time supplied by `source`, if the debounce gate
    /// accepts the event.
    pub async fn sync_time<S: WallTimeSource>(
        &mut self,
        source: &mut S,
    ) -> Result<bool, ClockError<I2C::Error>> {
        self.enter(ClockState::SyncingInitialTime);
        let now = self.clock.now_millis();
        let result = if self.accept_event("time sync", now) {
            self.write_time(source).await.map(|()| true)
        } else {
            Ok(false)
        };
        self.enter(ClockState::Idle);
        result
    }

    /// Reads the RTC and shows the time.
    pub async fn tick(&mut self) -> Result<WallTime, ClockError<I2C::Error>> {
        self.enter(ClockState::PollingDisplay);
        let result = self.poll().await;
        self.enter(ClockState::Idle);
        result
    }

    /// Applies an hour button press happening now.
    pub async fn increment_hour(&mut self) -> Result<bool, ClockError<I2C::Error>> {
        let now = self.clock.now_millis();
        self.increment_hour_at(now).await
    }

    /// Applies an hour button press made at `at_ms`.
    pub async fn increment_hour_at(&mut self, at_ms: u64) -> Result<bool, ClockError<I2C::Error>> {
        self.enter(ClockState::HandlingButtonEvent);
        let result = if self.accept_event("hour button", at_ms) {
            self.advance_hour().await.map(|()| true)
        } else {
            Ok(false)
        };
        self.enter(ClockState::Idle);
        result
    }

    /// Applies a minute button press happening now, carrying into the hour
    /// at 60.
    pub async fn increment_minute(&mut self) -> Result<bool, ClockError<I2C::Error>> {
        let now = self.clock.now_millis();
        self.increment_minute_at(now).await
    }

    /// Applies a minute button press made at `at_ms`.
    pub async fn increment_minute_at(
        &mut self,
        at_ms: u64,
    ) -> Result<bool, ClockError<I2C::Error>> {
        self.enter(ClockState::HandlingButtonEvent);
        let result = if self.accept_event("minute button", at_ms) {
            self.advance_minute().await.map(|()| true)
        } else {
            Ok(false)
        };
        self.enter(ClockState::Idle);
        result
    }

    /// Applies one event.
    pub async fn handle(&mut self, event: ClockEvent) -> Result<Flow, ClockError<I2C::Error>> {
        match event {
            ClockEvent::HourButton { at_ms } => {
                self.increment_hour_at(at_ms).await?;
                Ok(Flow::Continue)
            }
            ClockEvent::MinuteButton { at_ms } => {
                self.increment_minute_at(at_ms).await?;
                Ok(Flow::Continue)
            }
            ClockEvent::Terminate => Ok(Flow::Shutdown),
        }
    }

    /// Applies queued events until the queue is empty or a terminate is found.
    pub async fn drain<const N: usize>(
        &mut self,
        events: &mut Consumer<'_, ClockEvent, N>,
    ) -> Result<Flow, ClockError<I2C::Error>> {
        while let Some(event) = events.dequeue() {
            if self.handle(event).await? == Flow::Shutdown {
                return Ok(Flow::Shutdown);
            }
        }
        Ok(Flow::Continue)
    }

    /// Switches every output off and hands back the hardware.
    pub fn shutdown(mut self) -> Parts<Mcp7940n<I2C>, P, B, C> {
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

    async fn write_time<S: WallTimeSource>(
        &mut self,
        source: &mut S,
    ) -> Result<(), ClockError<I2C::Error>> {
        let time = WallTime::from(source.initial_time());
        let raw = time.to_registers()?;
        info!("setting RTC to {}:{}:{}", time.hours(), time.minutes(), time.seconds());
        self.rtc.set_raw_time(&raw).await.map_err(ClockError::Rtc)
    }

    async fn poll(&mut self) -> Result<WallTime, ClockError<I2C::Error>> {
        let hours = self.rtc.read_field(Field::Hour).await.map_err(ClockError::Rtc)?;
        let minutes = self.rtc.read_field(Field::Minute).await.map_err(ClockError::Rtc)?;
        let seconds = self.rtc.read_field(Field::Second).await.map_err(ClockError::Rtc)?;
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

    async fn advance_hour(&mut self) -> Result<(), ClockError<I2C::Error>> {
        let raw = self.rtc.read_field(Field::Hour).await.map_err(ClockError::Rtc)?;
        let next = next_hour(raw)?;
        self.rtc
            .write_field(Field::Hour, next)
            .await
            .map_err(ClockError::Rtc)
    }

    async fn advance_minute(&mut self) -> Result<(), ClockError<I2C::Error>> {
        let raw = self.rtc.read_field(Field::Minute).await.map_err(ClockError::Rtc)?;
        let (next, carry) = next_minute(raw)?;
        if carry {
            self.advance_hour().await?;
        }
        self.rtc
            .write_field(Field::Minute, next)
            .await
            .map_err(ClockError::Rtc)
    }
}
