use crate::keys::Key;

/// Everything the session controller reacts to. Produced by countdown tasks,
/// the overlay's input thread and the Ctrl+C handler; consumed only by
/// [`SessionController::run`](crate::controller::SessionController::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The countdown armed as `generation` ran to completion.
    TimerFired { generation: u64 },
    /// A key was pressed while the overlay for `cycle` was showing.
    KeyPressed { cycle: u64, key: Key },
    /// The overlay for `cycle` stopped receiving terminal input.
    InputFailed { cycle: u64, reason: String },
    /// Ctrl+C received; tear everything down and exit.
    Shutdown,
}
