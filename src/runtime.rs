use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// What the drill loop reacts to. `Tick` drives the per-problem countdown
/// (one per `TICK_RATE_MS`); keys feed the answer box.
#[derive(Clone, Debug)]
pub enum DrillEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// The event source hung up; no more keys will ever arrive
    Closed,
}

/// Where key and resize events come from. The TUI uses crossterm, the
/// headless tests feed a channel.
pub trait DrillEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError>;
}

/// Reads the terminal on its own thread so the countdown keeps ticking while
/// the player thinks. Key releases are dropped so a digit is typed once.
/// The thread ends, closing the channel, if the terminal can no longer be read.
pub struct CrosstermEventSource {
    rx: Receiver<DrillEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => DrillEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => DrillEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    log::error!("terminal event stream failed: {e}");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DrillEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Spacing of countdown ticks
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed source for driving an `App` without a terminal. Dropping
/// every sender closes it.
pub struct TestEventSource {
    rx: Receiver<DrillEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<DrillEvent>) -> Self {
        Self { rx }
    }
}

impl DrillEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Hands out one event at a time, interleaving a `Tick` every ticker interval.
///
/// Ticks are scheduled against a deadline, so a steady stream of key events
/// does not hold the timer back. Once the source disconnects every call
/// returns `Closed`; ticks stop so the countdown cannot drain unattended.
pub struct Runner<E: DrillEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
    closed: bool,
}

impl<E: DrillEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
            closed: false,
        }
    }

    /// Blocks until the next event or the next tick deadline, whichever is first
    pub fn step(&mut self) -> DrillEvent {
        if self.closed {
            return DrillEvent::Closed;
        }
        let now = Instant::now();
        if now >= self.next_tick {
            return self.tick(now);
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("event source disconnected");
                self.closed = true;
                DrillEvent::Closed
            }
        }
    }

    fn tick(&mut self, now: Instant) -> DrillEvent {
        self.next_tick += self.ticker.interval();
        // don't replay a burst of ticks after a long stall
        if self.next_tick < now {
            self.next_tick = now + self.ticker.interval();
        }
        DrillEvent::Tick
    }
}
