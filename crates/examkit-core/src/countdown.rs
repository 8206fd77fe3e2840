//! Attempt countdown.
//!
//! [`Countdown`] is a plain state machine advanced by [`Countdown::tick`].
//! It knows nothing about clocks; [`TickSource`] supplies one tick per
//! interval from a tokio task that is aborted when the source is dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::model::Exam;

/// Countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running { remaining_secs: u64 },
    /// Time ran out. Terminal.
    Expired,
    /// Stopped before expiry (submitted or torn down). Terminal.
    Stopped { remaining_secs: u64 },
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still running with this many seconds left.
    Running(u64),
    /// This tick expired the countdown. Returned at most once.
    Expired,
    /// The countdown had already ended; nothing changed.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    state: CountdownState,
}

impl Countdown {
    pub fn from_secs(remaining_secs: u64) -> Self {
        Self {
            state: CountdownState::Running { remaining_secs },
        }
    }

    /// A countdown for the full duration of an exam.
    pub fn for_exam(exam: &Exam) -> Self {
        Self::from_secs(u64::from(exam.duration_minutes) * 60)
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Seconds left; zero once expired.
    pub fn remaining_secs(&self) -> u64 {
        match self.state {
            CountdownState::Running { remaining_secs }
            | CountdownState::Stopped { remaining_secs } => remaining_secs,
            CountdownState::Expired => 0,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, CountdownState::Running { .. })
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Tick {
        match self.state {
            CountdownState::Running { remaining_secs } if remaining_secs <= 1 => {
                self.state = CountdownState::Expired;
                Tick::Expired
            }
            CountdownState::Running { remaining_secs } => {
                let remaining_secs = remaining_secs - 1;
                self.state = CountdownState::Running { remaining_secs };
                Tick::Running(remaining_secs)
            }
            CountdownState::Expired | CountdownState::Stopped { .. } => Tick::Idle,
        }
    }

    /// Stop a running countdown. No effect once it has ended.
    pub fn stop(&mut self) {
        if let CountdownState::Running { remaining_secs } = self.state {
            self.state = CountdownState::Stopped { remaining_secs };
        }
    }
}

/// Format seconds as `MM:SS`, or `H:MM:SS` past an hour.
pub fn format_remaining(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Periodic tick generator backed by a tokio task.
///
/// The task is aborted on drop, so ticks never outlive their consumer.
pub struct TickSource {
    rx: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

impl TickSource {
    /// Start ticking. The first tick arrives one `period` from now.
    pub fn spawn(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self { rx, handle }
    }

    /// One tick per second.
    pub fn every_second() -> Self {
        Self::spawn(Duration::from_secs(1))
    }

    /// Wait for the next tick. `None` once the source has stopped.
    pub async fn next(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Stop ticking without dropping the source.
    pub fn stop(&mut self) {
        self.handle.abort();
        self.rx.close();
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_minute_expires_after_sixty_ticks() {
        let mut countdown = Countdown::from_secs(60);
        for expected in (1..60).rev() {
            assert_eq!(countdown.tick(), Tick::Running(expected));
        }
        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.remaining_secs(), 0);
    }

    #[test]
    fn expires_exactly_once() {
        let mut countdown = Countdown::from_secs(2);
        let expirations = (0..10)
            .map(|_| countdown.tick())
            .filter(|t| *t == Tick::Expired)
            .count();
        assert_eq!(expirations, 1);
        assert_eq!(countdown.state(), CountdownState::Expired);
    }

    #[test]
    fn stopped_countdown_ignores_ticks() {
        let mut countdown = Countdown::from_secs(30);
        countdown.tick();
        countdown.stop();
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.state(), CountdownState::Stopped { remaining_secs: 29 });
        assert!(!countdown.is_running());
    }

    #[test]
    fn stop_after_expiry_keeps_expired() {
        let mut countdown = Countdown::from_secs(1);
        assert_eq!(countdown.tick(), Tick::Expired);
        countdown.stop();
        assert_eq!(countdown.state(), CountdownState::Expired);
    }

    #[test]
    fn zero_seconds_expires_on_first_tick() {
        let mut countdown = Countdown::from_secs(0);
        assert_eq!(countdown.tick(), Tick::Expired);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(600), "10:00");
        assert_eq!(format_remaining(3723), "1:02:03");
    }

    #[tokio::test(start_paused = true)]
    async fn tick_source_ticks_each_period() {
        let mut ticks = TickSource::spawn(Duration::from_secs(1));
        let start = tokio::time::Instant::now();
        for _ in 0..3 {
            ticks.next().await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_tick_source_ends() {
        let mut ticks = TickSource::spawn(Duration::from_secs(1));
        ticks.next().await.unwrap();
        ticks.stop();
        assert!(ticks.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn drives_countdown_to_expiry() {
        let mut countdown = Countdown::from_secs(5);
        let mut ticks = TickSource::every_second();
        let mut expired = 0;
        while ticks.next().await.is_some() {
            match countdown.tick() {
                Tick::Expired => {
                    expired += 1;
                    ticks.stop();
                }
                Tick::Running(_) => {}
                Tick::Idle => unreachable!("ticked after stop"),
            }
        }
        assert_eq!(expired, 1);
    }
}
