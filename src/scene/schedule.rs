use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

/// Caps the render rate. A tick that arrives early is skipped, never slept on.
#[derive(Clone, Debug)]
pub struct FrameGate {
    interval_ms: f64,
    last_ms: f64,
}

impl FrameGate {
    pub fn new(fps: f64) -> Self {
        Self {
            interval_ms: 1000.0 / fps,
            last_ms: 0.0,
        }
    }

    /// Returns whether a frame should be rendered at `now_ms`. The reference
    /// time is realigned to the interval grid so late frames do not drift.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let delta = now_ms - self.last_ms;
        if delta >= self.interval_ms {
            self.last_ms = now_ms - delta % self.interval_ms;
            true
        } else {
            false
        }
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.last_ms + self.interval_ms - now_ms).max(0.0)
    }
}

#[derive(Clone, Debug)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn instant_after(&self, ms: f64) -> Instant {
        Instant::now() + Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.tx.try_send(());
    }
}

pub struct StopSignal {
    rx: Receiver<()>,
}

impl StopSignal {
    /// A signal also counts as raised once every handle is dropped.
    pub fn is_raised(&self) -> bool {
        match self.rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = channel::bounded(1);
    (StopHandle { tx }, StopSignal { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn thirty_hz_interval() {
        let mut gate = FrameGate::new(30.0);
        assert!(gate.tick(1000.0 / 30.0));
        assert_relative_eq!(gate.remaining_ms(1000.0 / 30.0), 1000.0 / 30.0);
    }

    #[test]
    fn early_ticks_are_skipped() {
        let mut gate = FrameGate::new(30.0);
        assert!(gate.tick(40.0));
        assert!(!gate.tick(50.0));
        assert!(!gate.tick(66.0));
        assert!(gate.tick(70.0));
    }

    #[test]
    fn late_frame_realigns_to_interval() {
        let mut gate = FrameGate::new(10.0);
        assert!(gate.tick(250.0));
        // 250 % 100 = 50, so the reference becomes 200.
        assert_relative_eq!(gate.remaining_ms(250.0), 50.0);
        assert!(gate.tick(300.0));
    }

    #[test]
    fn remaining_never_negative() {
        let gate = FrameGate::new(30.0);
        assert_eq!(gate.remaining_ms(1_000.0), 0.0);
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = FrameClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn stop_signal_fires_once_raised() {
        let (handle, signal) = stop_channel();
        assert!(!signal.is_raised());
        handle.stop();
        handle.stop();
        assert!(signal.is_raised());
    }

    #[test]
    fn dropped_handles_raise_signal() {
        let (handle, signal) = stop_channel();
        drop(handle);
        assert!(signal.is_raised());
    }
}
