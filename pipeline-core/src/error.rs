use consumer_framework::StepError;
use thiserror::Error;

/// Logic faults detected while driving a consumer.
///
/// None of these describe bad data; each one means the driving code broke
/// the delivery contract or a consumer never finished.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    /// A signal was offered to a consumer that had already finished.
    #[error(transparent)]
    Step(#[from] StepError),
    /// A signal was offered after the end of the stream was delivered.
    #[error("signal delivered after end of stream")]
    AfterEof,
    /// The consumer was still waiting for input after the end of the stream.
    #[error("consumer still waiting for input after end of stream")]
    Diverged,
    /// The configured number of steps was used up.
    #[error("step limit of {limit} exceeded")]
    StepLimit { limit: usize },
}
