//! Platform services the game loop calls into: clock, random columns, input events, frame pacing.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::io;
use std::time::{Duration, Instant};

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Uniform random integer in an inclusive range.
pub trait RandomRange {
    fn range_inclusive(&mut self, lo: u16, hi: u16) -> u16;
}

/// Tagged input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Session-level quit request (interrupt), independent of key bindings.
    Quit,
    KeyDown(KeyEvent),
}

/// Non-blocking event poll. `Ok(None)` means the queue is drained.
pub trait EventSource {
    fn poll_event(&mut self) -> io::Result<Option<GameEvent>>;
}

/// Blocks until the next frame boundary.
pub trait FramePacer {
    fn delay(&mut self);
}

/// Milliseconds since construction, backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
    }
}

/// PCG32 stream; same seed gives the same spawn columns.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl RandomRange for SeededRandom {
    fn range_inclusive(&mut self, lo: u16, hi: u16) -> u16 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }
}

/// Crossterm input. Only key presses surface; releases, repeats, mouse and resize are dropped.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll_event(&mut self) -> io::Result<Option<GameEvent>> {
        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            return Ok(Some(classify_key(key)));
        }
        Ok(None)
    }
}

/// Ctrl-C / Ctrl-D are the terminal's equivalent of a window close.
fn classify_key(key: KeyEvent) -> GameEvent {
    match key.code {
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            GameEvent::Quit
        }
        _ => GameEvent::KeyDown(key),
    }
}

/// Fixed-rate delay. An overrun frame resyncs the schedule to now instead of bursting to catch up.
#[derive(Debug)]
pub struct FixedRatePacer {
    frame: Duration,
    next_frame: Instant,
}

impl FixedRatePacer {
    pub fn new(fps: u32) -> Self {
        let frame = Duration::from_secs(1) / fps.max(1);
        Self {
            frame,
            next_frame: Instant::now(),
        }
    }
}

impl FramePacer for FixedRatePacer {
    fn delay(&mut self) {
        let now = Instant::now();
        self.next_frame += self.frame;
        if self.next_frame > now {
            std::thread::sleep(self.next_frame - now);
        } else {
            self.next_frame = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_random_stays_in_range() {
        let mut rng = SeededRandom::new(7);
        for _ in 0..500 {
            let v = rng.range_inclusive(0, 9);
            assert!(v <= 9);
        }
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        let xs: Vec<u16> = (0..20).map(|_| a.range_inclusive(0, 9)).collect();
        let ys: Vec<u16> = (0..20).map(|_| b.range_inclusive(0, 9)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_seeded_random_degenerate_range() {
        let mut rng = SeededRandom::new(1);
        assert_eq!(rng.range_inclusive(3, 3), 3);
    }

    #[test]
    fn test_ctrl_c_is_quit() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(classify_key(key), GameEvent::Quit);
        let plain = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(classify_key(plain), GameEvent::KeyDown(plain));
    }

    #[test]
    fn test_pacer_frame_duration() {
        let pacer = FixedRatePacer::new(30);
        assert_eq!(pacer.frame, Duration::from_secs(1) / 30);
        assert_eq!(FixedRatePacer::new(0).frame, Duration::from_secs(1));
    }

    #[test]
    fn test_monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
