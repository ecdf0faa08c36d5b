/// Single-shot countdown that reports completion through the session queue.
///
/// Each [`CountdownTimer::start`] spawns one tokio task that sleeps for the
/// requested duration and then sends [`SessionEvent::TimerFired`] tagged with
/// the countdown's generation. The task never touches session state itself;
/// the controller decides what a fire means when it drains the queue.
///
/// Cancellation goes through a `watch` channel. A fire that was already queued
/// when the countdown got cancelled still reaches the controller, which
/// rejects it through [`CountdownTimer::acknowledge`] because the generation
/// no longer matches.
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::event::SessionEvent;

struct ArmedCountdown {
    generation: u64,
    duration: Duration,
    deadline: Instant,
    /// Sending `true` (or dropping the sender) stops the task without a fire.
    stop_tx: watch::Sender<bool>,
}

pub struct CountdownTimer {
    tx: mpsc::Sender<SessionEvent>,
    armed: Option<ArmedCountdown>,
    last_generation: u64,
}

impl CountdownTimer {
    pub fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            tx,
            armed: None,
            last_generation: 0,
        }
    }

    /// Arms a countdown of `duration_secs` and returns its generation.
    ///
    /// Any countdown still armed is cancelled first, so at most one is ever
    /// pending. Must be called from within a tokio runtime.
    pub fn start(&mut self, duration_secs: u32) -> u64 {
        self.cancel();

        self.last_generation += 1;
        let generation = self.last_generation;
        let duration = Duration::from_secs(u64::from(duration_secs));
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                // Resolves on an explicit stop and when the sender is dropped.
                _ = stop_rx.changed() => {}
                _ = tokio::time::sleep(duration) => {
                    let _ = tx.send(SessionEvent::TimerFired { generation }).await;
                }
            }
        });

        self.armed = Some(ArmedCountdown {
            generation,
            duration,
            deadline: Instant::now() + duration,
            stop_tx,
        });
        generation
    }

    /// Stops the armed countdown, if any, without delivering a fire.
    /// Returns whether a countdown was armed.
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some(armed) => {
                let _ = armed.stop_tx.send(true);
                true
            }
            None => false,
        }
    }

    /// Consumes a fire notification. Returns `true` and disarms the timer if
    /// `generation` is the countdown currently armed; returns `false` for a
    /// stale or cancelled generation and leaves the timer untouched.
    pub fn acknowledge(&mut self, generation: u64) -> bool {
        match &self.armed {
            Some(armed) if armed.generation == generation => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    #[cfg(test)]
    pub fn armed_generation(&self) -> Option<u64> {
        self.armed.as_ref().map(|a| a.generation)
    }

    /// Total length of the armed countdown.
    #[cfg(test)]
    pub fn armed_duration(&self) -> Option<Duration> {
        self.armed.as_ref().map(|a| a.duration)
    }

    /// Time left on the armed countdown, saturating at zero.
    pub fn remaining(&self) -> Option<Duration> {
        self.armed
            .as_ref()
            .map(|a| a.deadline.saturating_duration_since(Instant::now()))
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> (CountdownTimer, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(8);
        (CountdownTimer::new(tx), rx)
    }

    // ── firing ────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn fires_after_full_duration() {
        let (mut timer, mut rx) = timer();
        let started = Instant::now();
        let generation = timer.start(60);

        let evt = rx.recv().await.unwrap();
        assert_eq!(evt, SessionEvent::TimerFired { generation });
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(60), "fired early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(61), "fired late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_fire_before_duration() {
        let (mut timer, mut rx) = timer();
        timer.start(60);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(rx.try_recv().is_err());
        assert!(timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_exactly_once() {
        let (mut timer, mut rx) = timer();
        let generation = timer.start(5);

        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::TimerFired { generation }
        );
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn every_accepted_interval_fires_after_its_length() {
        for minutes in [1u32, 25, 1440, 2000] {
            let (mut timer, mut rx) = timer();
            let started = Instant::now();
            timer.start(minutes * 60);
            rx.recv().await.unwrap();
            assert!(started.elapsed() >= Duration::from_secs(u64::from(minutes) * 60));
        }
    }

    // ── cancel ────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_fire() {
        let (mut timer, mut rx) = timer();
        timer.start(60);
        assert!(timer.cancel());
        assert!(!timer.is_armed());

        tokio::time::advance(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_when_idle_is_a_no_op() {
        let (mut timer, _rx) = timer();
        assert!(!timer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_countdown() {
        let (mut timer, mut rx) = timer();
        let first = timer.start(10);
        let second = timer.start(60);
        assert_ne!(first, second);
        assert_eq!(timer.armed_generation(), Some(second));

        let evt = rx.recv().await.unwrap();
        assert_eq!(evt, SessionEvent::TimerFired { generation: second });
        tokio::time::advance(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_armed_countdown() {
        let (mut timer, mut rx) = timer();
        timer.start(30);
        drop(timer);

        tokio::time::advance(Duration::from_secs(60)).await;
        // Every sender is gone once the task exits, so the queue closes empty.
        assert_eq!(rx.recv().await, None);
    }

    // ── acknowledge ───────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn acknowledge_disarms_matching_generation() {
        let (mut timer, mut rx) = timer();
        let generation = timer.start(1);
        rx.recv().await.unwrap();

        assert!(timer.acknowledge(generation));
        assert!(!timer.is_armed());
        assert!(!timer.acknowledge(generation));
    }

    #[tokio::test(start_paused = true)]
    async fn acknowledge_rejects_stale_generation() {
        let (mut timer, _rx) = timer();
        let old = timer.start(1);
        let current = timer.start(60);

        assert!(!timer.acknowledge(old));
        assert_eq!(timer.armed_generation(), Some(current));
    }

    // ── introspection ─────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn remaining_counts_down() {
        let (mut timer, _rx) = timer();
        timer.start(60);
        assert_eq!(timer.armed_duration(), Some(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(timer.remaining(), Some(Duration::from_secs(15)));
    }
}
