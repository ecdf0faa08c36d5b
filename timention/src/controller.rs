/// The session state machine tying the countdown, the overlay and the
/// keyboard together.
///
/// ```text
///   Idle ──interval──▶ CountingDown ──fire──▶ Presenting ──other key──▶ CountingDown
///     │                                          │
///     └──cancelled──▶ Terminated ◀──exit key─────┘
/// ```
///
/// All state changes happen on the task that drains the session queue. The
/// countdown task and the overlay's input thread only *send* events; every
/// event carries the generation (countdown) or cycle (overlay) it belongs
/// to, and is dropped unless both the current state and that tag match.
use anyhow::Result;
use tokio::sync::mpsc;

use crate::event::SessionEvent;
use crate::interval::IntervalSetting;
use crate::keys::Key;
use crate::overlay::{DismissalOutcome, Overlay, OverlayBackend};
use crate::timer::CountdownTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the interval prompt.
    Idle,
    /// A countdown is armed; nothing on screen.
    CountingDown,
    /// The overlay is on screen; no countdown is armed.
    Presenting,
    /// Absorbing. Nothing armed, nothing on screen.
    Terminated,
}

/// Whether the event loop should keep going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// One recorded state change, plus what was observable right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
    pub overlay_visible: bool,
    pub timer_armed: bool,
}

pub struct SessionController<B> {
    state: SessionState,
    interval: Option<IntervalSetting>,
    timer: CountdownTimer,
    overlay: Overlay<B>,
    /// Number of overlays presented so far; also the tag of the current one.
    cycle: u64,
    #[cfg(test)]
    transitions: Vec<Transition>,
}

impl<B: OverlayBackend> SessionController<B> {
    pub fn new(timer: CountdownTimer, overlay: Overlay<B>) -> Self {
        Self {
            state: SessionState::Idle,
            interval: None,
            timer,
            overlay,
            cycle: 0,
            #[cfg(test)]
            transitions: Vec::new(),
        }
    }

    /// Leaves `Idle` with the prompt's answer: arms the first countdown, or
    /// terminates straight away when the prompt was cancelled.
    pub fn configure(&mut self, interval: Option<IntervalSetting>) -> Flow {
        if self.state != SessionState::Idle {
            log::warn!("[session] Ignoring configuration in state {:?}", self.state);
            return self.flow();
        }
        match interval {
            Some(interval) => {
                self.interval = Some(interval);
                self.arm_countdown(interval);
                self.transition(SessionState::CountingDown);
                Flow::Continue
            }
            None => {
                log::info!("No interval configured; exiting");
                self.transition(SessionState::Terminated);
                Flow::Exit
            }
        }
    }

    /// Applies one event from the session queue.
    ///
    /// Events that do not fit the current state (a fire while presenting, a
    /// key for an overlay that is gone, anything after termination) are
    /// logged at debug level and ignored.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Flow> {
        match event {
            SessionEvent::TimerFired { generation } => self.on_timer_fired(generation)?,
            SessionEvent::KeyPressed { cycle, key } => self.on_key(cycle, key)?,
            SessionEvent::InputFailed { cycle, reason } => {
                self.on_input_failed(cycle, &reason)?
            }
            SessionEvent::Shutdown => {
                match self.timer.remaining() {
                    Some(left) => log::info!(
                        "Shutdown requested ({}s left on the countdown)",
                        left.as_secs()
                    ),
                    None => log::info!("Shutdown requested"),
                }
                self.terminate()?;
            }
        }
        Ok(self.flow())
    }

    /// Drains the session queue until the session terminates or every
    /// sender is gone.
    pub async fn run(mut self, mut rx: mpsc::Receiver<SessionEvent>) -> Result<()> {
        if self.state == SessionState::Terminated {
            return Ok(());
        }
        while let Some(event) = rx.recv().await {
            match self.handle(event) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(e) => {
                    // Leave the terminal and timer in a clean state before bailing.
                    let _ = self.terminate();
                    return Err(e);
                }
            }
        }
        self.terminate()?;
        log::info!("Program exiting");
        Ok(())
    }

    fn on_timer_fired(&mut self, generation: u64) -> Result<()> {
        if self.state != SessionState::CountingDown {
            log::debug!("[session] Ignoring countdown {generation} in state {:?}", self.state);
            return Ok(());
        }
        if !self.timer.acknowledge(generation) {
            log::debug!("[session] Ignoring stale countdown {generation}");
            return Ok(());
        }

        self.cycle += 1;
        log::info!("Break time; showing reminder");
        self.overlay.present(self.cycle)?;
        self.transition(SessionState::Presenting);
        Ok(())
    }

    fn on_key(&mut self, cycle: u64, key: Key) -> Result<()> {
        if self.state != SessionState::Presenting || self.overlay.visible_cycle() != Some(cycle) {
            log::debug!(
                "[session] Ignoring {key:?} for overlay {cycle} in state {:?}",
                self.state
            );
            return Ok(());
        }
        let Some(outcome) = self.overlay.on_key(key) else {
            return Ok(());
        };

        match outcome {
            DismissalOutcome::ContinueWork => {
                self.overlay.dismiss()?;
                log::info!("Reminder dismissed");
                // The interval is set once in `configure` and never changes.
                if let Some(interval) = self.interval {
                    self.arm_countdown(interval);
                }
                self.transition(SessionState::CountingDown);
            }
            DismissalOutcome::ExitProgram => {
                log::info!("Exit key pressed");
                self.terminate()?;
            }
        }
        Ok(())
    }

    /// The overlay can no longer see key presses, so it could never be
    /// dismissed. Tears the session down and reports the failure.
    fn on_input_failed(&mut self, cycle: u64, reason: &str) -> Result<()> {
        if self.state != SessionState::Presenting || self.overlay.visible_cycle() != Some(cycle) {
            log::debug!("[session] Ignoring input failure for overlay {cycle}: {reason}");
            return Ok(());
        }
        self.terminate()?;
        anyhow::bail!("overlay input failed: {reason}")
    }

    /// Cancels the countdown, hides the overlay and enters `Terminated`.
    /// Safe to call repeatedly.
    fn terminate(&mut self) -> Result<()> {
        if self.state == SessionState::Terminated {
            return Ok(());
        }
        self.timer.cancel();
        let hidden = self.overlay.dismiss();
        self.transition(SessionState::Terminated);
        hidden.map(|_| ())
    }

    fn arm_countdown(&mut self, interval: IntervalSetting) {
        self.timer.start(interval.duration_secs());
        let next = chrono::Local::now()
            + chrono::Duration::seconds(i64::from(interval.duration_secs()));
        log::info!(
            "Countdown started: {} min, next reminder at {}",
            interval.minutes(),
            next.format("%H:%M")
        );
    }

    fn transition(&mut self, to: SessionState) {
        let t = Transition {
            from: self.state,
            to,
            overlay_visible: self.overlay.is_visible(),
            timer_armed: self.timer.is_armed(),
        };
        log::debug!(
            "[session] {:?} -> {:?} (overlay visible: {}, countdown armed: {})",
            t.from,
            t.to,
            t.overlay_visible,
            t.timer_armed
        );
        self.state = to;
        #[cfg(test)]
        self.transitions.push(t);
    }

    fn flow(&self) -> Flow {
        if self.state == SessionState::Terminated {
            Flow::Exit
        } else {
            Flow::Continue
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn interval(&self) -> Option<IntervalSetting> {
        self.interval
    }

    #[cfg(test)]
    pub fn current_cycle(&self) -> u64 {
        self.cycle
    }

    /// Every state change so far, in order.
    #[cfg(test)]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    #[cfg(test)]
    pub fn is_overlay_visible(&self) -> bool {
        self.overlay.is_visible()
    }

    #[cfg(test)]
    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    #[cfg(test)]
    fn overlay(&self) -> &Overlay<B> {
        &self.overlay
    }
}
