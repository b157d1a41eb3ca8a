use thiserror::Error;

/// Faults raised by the engine itself.
///
/// These are programming errors in whoever drives a consumer, never data
/// errors: a consumer that wants to report bad input carries that in its
/// result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// A signal was applied to a consumer that had already finished.
    #[error("cannot apply a signal to a finished consumer")]
    AlreadyDone,
}
