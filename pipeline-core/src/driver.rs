use crate::config::DriverConfig;
use crate::error::DriveError;
use consumer_framework::{ConsumerState, StepError};
use signal_framework::Signal;
use tracing::{debug, trace, warn};

/// Feeds signals into one consumer and enforces the delivery contract.
///
/// The driver delivers elements in whatever chunk sizes the caller has them,
/// refuses to deliver anything after `Eof` or after the consumer finished,
/// and delivers exactly one `Eof` when asked to finish.
pub struct Driver<E, A> {
    state: ConsumerState<E, A>,
    config: DriverConfig,
    steps: usize,
    eof_delivered: bool,
}

impl<E, A> Driver<E, A> {
    /// Creates a driver with the default configuration.
    pub fn new(consumer: ConsumerState<E, A>) -> Self {
        Self::with_config(consumer, DriverConfig::default())
    }

    /// Creates a driver with the given configuration.
    pub fn with_config(consumer: ConsumerState<E, A>, config: DriverConfig) -> Self {
        Self {
            state: consumer,
            config,
            steps: 0,
            eof_delivered: false,
        }
    }

    /// Returns the current consumer state.
    pub fn state(&self) -> &ConsumerState<E, A> {
        &self.state
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Returns true once the consumer has finished.
    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Returns true once `Eof` has been delivered.
    pub fn is_eof_delivered(&self) -> bool {
        self.eof_delivered
    }

    /// Number of signals delivered so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Result and leftover, once the consumer has finished.
    pub fn outcome(&self) -> Option<(&A, &Signal<E>)> {
        self.state.done_pair()
    }

    /// Gives back the consumer state.
    pub fn into_state(self) -> ConsumerState<E, A> {
        self.state
    }

    /// Delivers one element.
    pub fn push(&mut self, element: E) -> Result<(), DriveError> {
        self.deliver(Signal::Element(element))
    }

    /// Delivers an `Empty` signal.
    pub fn tick(&mut self) -> Result<(), DriveError> {
        self.deliver(Signal::Empty)
    }

    /// Delivers a chunk of elements, stopping as soon as the consumer
    /// finishes.
    ///
    /// Returns the elements of the chunk that were not delivered. They were
    /// never seen by the consumer and belong to whatever reads the stream
    /// next.
    pub fn feed<I>(&mut self, chunk: I) -> Result<Vec<E>, DriveError>
    where
        I: IntoIterator<Item = E>,
    {
        let mut chunk = chunk.into_iter();
        while !self.is_done() {
            match chunk.next() {
                Some(element) => self.push(element)?,
                None => return Ok(Vec::new()),
            }
        }
        let rest: Vec<E> = chunk.collect();
        if !rest.is_empty() {
            debug!(
                label = %self.config.label,
                undelivered = rest.len(),
                "consumer finished inside a chunk"
            );
        }
        Ok(rest)
    }

    /// Delivers `Eof` unless the consumer already finished or `Eof` was
    /// already delivered, and returns the result and leftover.
    pub fn finish(mut self) -> Result<(A, Signal<E>), DriveError> {
        if !self.is_done() && !self.eof_delivered {
            self.deliver(Signal::Eof)?;
        }
        match self.state.into_done() {
            Ok(outcome) => Ok(outcome),
            Err(_) => {
                warn!(label = %self.config.label, steps = self.steps, "consumer diverged");
                Err(DriveError::Diverged)
            }
        }
    }

    /// Applies one signal, checking the delivery contract first.
    pub fn deliver(&mut self, signal: Signal<E>) -> Result<(), DriveError> {
        if self.eof_delivered {
            warn!(label = %self.config.label, steps = self.steps, "signal after end of stream");
            return Err(DriveError::AfterEof);
        }
        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                warn!(label = %self.config.label, limit, "step limit exceeded");
                return Err(DriveError::StepLimit { limit });
            }
        }
        let resume = match self.state.continuation() {
            Some(k) => k.clone(),
            None => {
                warn!(label = %self.config.label, steps = self.steps, "signal after consumer finished");
                return Err(StepError::AlreadyDone.into());
            }
        };

        trace!(
            label = %self.config.label,
            step = self.steps,
            signal = signal_kind(&signal),
            "delivering signal"
        );
        self.eof_delivered = signal.is_eof();
        self.steps += 1;
        self.state = resume.resume(signal);

        if let Some((_, leftover)) = self.state.done_pair() {
            debug!(
                label = %self.config.label,
                steps = self.steps,
                leftover = signal_kind(leftover),
                "consumer finished"
            );
        }
        Ok(())
    }
}

/// Feeds every item of `input` into `consumer`, then `Eof`, and returns the
/// result with the leftover.
///
/// Items after the point where the consumer finished are not pulled from the
/// iterator.
pub fn run<E, A, I>(consumer: ConsumerState<E, A>, input: I) -> Result<(A, Signal<E>), DriveError>
where
    I: IntoIterator<Item = E>,
{
    run_with_config(consumer, input, DriverConfig::default())
}

/// [`run`] with an explicit configuration.
pub fn run_with_config<E, A, I>(
    consumer: ConsumerState<E, A>,
    input: I,
    config: DriverConfig,
) -> Result<(A, Signal<E>), DriveError>
where
    I: IntoIterator<Item = E>,
{
    let mut driver = Driver::with_config(consumer, config);
    let mut input = input.into_iter();
    while !driver.is_done() {
        match input.next() {
            Some(element) => driver.push(element)?,
            None => break,
        }
    }
    driver.finish()
}

pub(crate) fn signal_kind<E>(signal: &Signal<E>) -> &'static str {
    match signal {
        Signal::Empty => "empty",
        Signal::Eof => "eof",
        Signal::Element(_) => "element",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consumer_framework::{collect, fold, head, peek, take};

    #[test]
    fn test_push_until_done() {
        let mut driver = Driver::new(head::<i32>());
        assert!(!driver.is_done());
        driver.push(5).unwrap();
        assert!(driver.is_done());
        assert_eq!(driver.outcome(), Some((&Some(5), &Signal::Empty)));
        assert_eq!(driver.steps(), 1);
    }

    #[test]
    fn test_push_after_done_is_rejected() {
        let mut driver = Driver::new(head::<i32>());
        driver.push(1).unwrap();
        assert_eq!(driver.push(2), Err(DriveError::Step(StepError::AlreadyDone)));
        assert_eq!(driver.steps(), 1);
    }

    #[test]
    fn test_signal_after_eof_is_rejected() {
        let consumer = ConsumerState::cont(|_: Signal<i32>| {
            ConsumerState::cont(|_: Signal<i32>| ConsumerState::done((), Signal::Empty))
        });
        let mut driver = Driver::new(consumer);
        driver.deliver(Signal::Eof).unwrap();
        assert!(driver.is_eof_delivered());
        assert_eq!(driver.push(1), Err(DriveError::AfterEof));
    }

    #[test]
    fn test_finish_reports_divergence() {
        let stubborn: ConsumerState<i32, ()> = ConsumerState::cont(|_| {
            ConsumerState::cont(|_| ConsumerState::done((), Signal::Empty))
        });
        let driver = Driver::new(stubborn);
        assert_eq!(driver.finish().err(), Some(DriveError::Diverged));
    }

    #[test]
    fn test_finish_after_delivered_eof_reports_divergence() {
        let stubborn: ConsumerState<i32, ()> = ConsumerState::cont(|_| {
            ConsumerState::cont(|_| ConsumerState::done((), Signal::Empty))
        });
        let mut driver = Driver::new(stubborn);
        driver.deliver(Signal::Eof).unwrap();
        assert_eq!(driver.steps(), 1);
        assert_eq!(driver.finish().err(), Some(DriveError::Diverged));
    }

    #[test]
    fn test_finish_does_not_send_eof_to_done_consumer() {
        let mut driver = Driver::new(peek::<char>());
        driver.push('z').unwrap();
        let (result, leftover) = driver.finish().unwrap();
        assert_eq!(result, Some('z'));
        assert_eq!(leftover, Signal::Element('z'));
    }

    #[test]
    fn test_tick_counts_as_step() {
        let mut driver = Driver::new(head::<u8>());
        driver.tick().unwrap();
        driver.tick().unwrap();
        assert_eq!(driver.steps(), 2);
        assert!(!driver.is_done());
    }

    #[test]
    fn test_feed_returns_undelivered_tail() {
        let mut driver = Driver::new(take::<i32>(3));
        assert_eq!(driver.feed(vec![1, 2]).unwrap(), Vec::<i32>::new());
        assert_eq!(driver.feed(vec![3, 4, 5]).unwrap(), vec![4, 5]);
        assert_eq!(driver.outcome(), Some((&vec![1, 2, 3], &Signal::Empty)));
    }

    #[test]
    fn test_step_limit() {
        let config = DriverConfig::new().with_step_limit(2);
        let mut driver = Driver::with_config(collect::<i32>(), config);
        driver.push(1).unwrap();
        driver.push(2).unwrap();
        assert_eq!(driver.push(3), Err(DriveError::StepLimit { limit: 2 }));
    }

    #[test]
    fn test_run_sums() {
        let (sum, leftover) = run(fold(|acc: u32, e: u32| acc + e, 0), 1..=4).unwrap();
        assert_eq!(sum, 10);
        assert_eq!(leftover, Signal::Eof);
    }

    #[test]
    fn test_run_stops_pulling_when_done() {
        let mut input = vec![1, 2, 3, 4].into_iter();
        let (taken, leftover) = run(take(2), input.by_ref()).unwrap();
        assert_eq!(taken, vec![1, 2]);
        assert_eq!(leftover, Signal::Empty);
        assert_eq!(input.collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_signal_kind() {
        assert_eq!(signal_kind(&Signal::<u8>::Empty), "empty");
        assert_eq!(signal_kind(&Signal::<u8>::Eof), "eof");
        assert_eq!(signal_kind(&Signal::Element(1)), "element");
    }
}
