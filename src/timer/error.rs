//! Timer errors.

/// Errors raised by the [`TimerModule`](super::TimerModule).
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("timer interval must be greater than zero")]
    ZeroInterval,

    #[error("timer module is already running, register timers while configuring")]
    AlreadyStarted,

    #[error("timer callback panicked: {message}")]
    CallbackPanicked { message: String },
}
