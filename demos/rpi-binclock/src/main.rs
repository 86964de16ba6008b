//! # Binary LED clock on a Raspberry Pi
//!
//! Drives the binary clock from an MCP7940N on the Pi's I2C bus.
//!
//! ## Features
//! - Sets the RTC from the system clock at startup
//! - Polls the RTC once a second and shows the time on eleven LEDs
//! - Hour and minute buttons step the RTC through falling-edge interrupts
//! - SIGINT/SIGTERM switches every LED off and returns the pins to input mode
//!
//! ## Hardware Connections (BCM numbering)
//! - **SDA/SCL**: GPIO2/GPIO3 (I2C1)
//! - **Hour LEDs**: GPIO5, GPIO6, GPIO13, GPIO19 (least significant first)
//! - **Minute LEDs**: GPIO12, GPIO16, GPIO20, GPIO21, GPIO26, GPIO4
//! - **Seconds LED**: GPIO18 (software PWM)
//! - **Hour button**: GPIO23 to ground
//! - **Minute button**: GPIO24 to ground
//!
//! ## Expected Output
//! ```
//! INFO  setting RTC to 14:30:2
//! INFO  The current time is: 2:30:2
//! INFO  The current time is: 2:30:3
//! ^C
//! INFO  Cleaning up...
//! INFO  LEDs reset
//! ```

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use binclock::{
    ClockController, ClockEvent, Config, EventQueue, Flow, LedDisplay, Mcp7940n, MonotonicClock,
    DEFAULT_ADDRESS, MAX_BRIGHTNESS,
};
use chrono::Local;
use embedded_hal::pwm::{self, ErrorKind, ErrorType, SetDutyCycle};
use heapless::spsc::Producer;
use log::{info, warn, Level, LevelFilter, Metadata, Record};
use rppal::gpio::{self, Gpio, InputPin, OutputPin, Pin, Trigger};
use rppal::i2c::I2c;
use simple_signal::{self, Signal};

const HOUR_PINS: [u8; 4] = [5, 6, 13, 19];
const MINUTE_PINS: [u8; 6] = [12, 16, 20, 21, 26, 4];
const SECONDS_PIN: u8 = 18;
const HOUR_BUTTON: u8 = 23;
const MINUTE_BUTTON: u8 = 24;

const PWM_FREQUENCY_HZ: f64 = 100.0;
const POLL_INTERVAL: Duration = Duration::from_millis(1000);
// The first event is only accepted once the debounce window has passed
const STARTUP_DELAY: Duration = Duration::from_millis(201);
const QUEUE_CAPACITY: usize = 8;

type Events = Arc<Mutex<Producer<'static, ClockEvent, QUEUE_CAPACITY>>>;

struct StdoutLogger;

impl log::Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StdoutLogger = StdoutLogger;

/// Milliseconds since the program started.
#[derive(Clone, Copy)]
struct Uptime(Instant);

impl MonotonicClock for Uptime {
    fn now_millis(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
}

/// Seconds LED on rppal's software PWM.
struct SoftPwm {
    pin: OutputPin,
}

#[derive(Debug)]
struct PwmError(gpio::Error);

impl pwm::Error for PwmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for SoftPwm {
    type Error = PwmError;
}

impl SetDutyCycle for SoftPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::from(MAX_BRIGHTNESS)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if duty == 0 {
            self.pin.clear_pwm().map_err(PwmError)?;
            self.pin.set_low();
            return Ok(());
        }
        let duty_cycle = f64::from(duty) / f64::from(self.max_duty_cycle());
        self.pin
            .set_pwm_frequency(PWM_FREQUENCY_HZ, duty_cycle)
            .map_err(PwmError)
    }
}

fn output_pins<const N: usize>(gpio: &Gpio, pins: [u8; N]) -> Result<[OutputPin; N], Box<dyn Error>> {
    let lines = pins
        .iter()
        .map(|&pin| gpio.get(pin).map(Pin::into_output))
        .collect::<Result<Vec<_>, _>>()?;
    lines
        .try_into()
        .map_err(|_| Box::<dyn Error>::from("wrong number of output lines"))
}

// Stamped under the lock so queued presses stay in time order
fn push(events: &Events, uptime: Uptime, press: fn(u64) -> ClockEvent) {
    match events.lock() {
        Ok(mut producer) => {
            let event = press(uptime.now_millis());
            if producer.enqueue(event).is_err() {
                warn!("event queue full, dropping {:?}", event);
            }
        }
        Err(_) => warn!("event queue lock poisoned"),
    }
}

fn button(
    gpio: &Gpio,
    pin: u8,
    press: fn(u64) -> ClockEvent,
    uptime: Uptime,
    events: &Events,
) -> Result<InputPin, gpio::Error> {
    let mut input = gpio.get(pin)?.into_input_pullup();
    let events = events.clone();
    input.set_async_interrupt(Trigger::FallingEdge, move |_| push(&events, uptime, press))?;
    Ok(input)
}

fn stop_on_signal(running: &Arc<AtomicBool>) -> impl Fn(&[Signal]) + Send + 'static {
    let running = running.clone();
    move |_: &[Signal]| running.store(false, Ordering::SeqCst)
}

fn main() -> Result<(), Box<dyn Error>> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Info))?;

    let gpio = Gpio::new()?;
    let hour_lines = output_pins(&gpio, HOUR_PINS)?;
    let minute_lines = output_pins(&gpio, MINUTE_PINS)?;
    let seconds_line = SoftPwm {
        pin: gpio.get(SECONDS_PIN)?.into_output(),
    };
    info!("LEDs ready");

    let rtc = Mcp7940n::new(I2c::new()?, DEFAULT_ADDRESS);
    let uptime = Uptime(Instant::now());
    let mut clock = ClockController::new(
        rtc,
        LedDisplay::new(hour_lines, minute_lines, seconds_line),
        uptime,
        &Config::default(),
    );

    let queue: &'static mut EventQueue<QUEUE_CAPACITY> = Box::leak(Box::new(EventQueue::new()));
    let (producer, mut consumer) = queue.split();
    let events: Events = Arc::new(Mutex::new(producer));

    // Interrupts stay registered while the input pins are alive
    let _hour_button = button(
        &gpio,
        HOUR_BUTTON,
        |at_ms| ClockEvent::HourButton { at_ms },
        uptime,
        &events,
    )?;
    let _minute_button = button(
        &gpio,
        MINUTE_BUTTON,
        |at_ms| ClockEvent::MinuteButton { at_ms },
        uptime,
        &events,
    )?;
    info!("Buttons ready");

    // Signals bypass the event queue so a full queue can never swallow them
    let running = Arc::new(AtomicBool::new(true));
    simple_signal::set_handler(&[Signal::Int, Signal::Term], stop_on_signal(&running));

    thread::sleep(STARTUP_DELAY);
    if let Err(e) = clock.sync_time(&mut || Local::now().time()) {
        warn!("Failed to set initial time: {:?}", e);
    }

    while running.load(Ordering::SeqCst) {
        match clock.drain(&mut consumer) {
            Ok(Flow::Shutdown) => break,
            Ok(Flow::Continue) => {}
            Err(e) => warn!("Failed to apply button press: {:?}", e),
        }
        if let Err(e) = clock.tick() {
            warn!("Failed to read time: {:?}", e);
        }
        thread::sleep(POLL_INTERVAL);
    }

    // Dropping the output pins puts them back in input mode
    let parts = clock.shutdown();
    drop(parts);
    info!("Pins returned to input mode");

    Ok(())
}
