use crate::config::DriverConfig;
use crate::driver::{signal_kind, Driver};
use crate::error::DriveError;
use crate::source::SignalSource;
use consumer_framework::ConsumerState;
use signal_framework::Signal;
use tracing::debug;

/// Runs several consumers one after another over a single source.
///
/// Whatever a finished consumer left over is delivered to the next consumer
/// before anything new is pulled from the source, so every element pulled
/// from the source is consumed at most once.
pub struct Pipeline<S, E, A> {
    source: S,
    consumers: Vec<ConsumerState<E, A>>,
    config: DriverConfig,
}

impl<S, E, A> Pipeline<S, E, A>
where
    S: SignalSource<E>,
{
    /// Creates a pipeline with the default configuration.
    pub fn new(source: S, consumers: Vec<ConsumerState<E, A>>) -> Self {
        Self::with_config(source, consumers, DriverConfig::default())
    }

    /// The label of `config` is suffixed with the consumer index for each
    /// consumer's driver.
    pub fn with_config(source: S, consumers: Vec<ConsumerState<E, A>>, config: DriverConfig) -> Self {
        Self {
            source,
            consumers,
            config,
        }
    }

    /// Appends one more consumer to the end of the pipeline.
    pub fn then(mut self, consumer: ConsumerState<E, A>) -> Self {
        self.consumers.push(consumer);
        self
    }

    /// Runs every consumer in order and returns their results together with
    /// the leftover of the last one.
    pub fn run(mut self) -> Result<(Vec<A>, Signal<E>), DriveError> {
        let mut results = Vec::with_capacity(self.consumers.len());
        let mut pending = Signal::Empty;
        let mut source_ended = false;

        for (index, consumer) in self.consumers.into_iter().enumerate() {
            let config = self
                .config
                .clone()
                .with_label(format!("{}[{}]", self.config.label, index));
            let mut driver = Driver::with_config(consumer, config);

            // A consumer that needs no input leaves the owed signal for the next one.
            if driver.is_done() {
                let (result, leftover) = driver.finish()?;
                results.push(result);
                if pending.is_empty() {
                    pending = leftover;
                }
                continue;
            }

            match pending {
                Signal::Element(element) => driver.push(element)?,
                Signal::Eof => source_ended = true,
                Signal::Empty => {}
            }

            while !driver.is_done() && !source_ended {
                match self.source.next_signal() {
                    Signal::Element(element) => driver.push(element)?,
                    Signal::Empty => driver.tick()?,
                    Signal::Eof => source_ended = true,
                }
            }

            let (result, leftover) = driver.finish()?;
            debug!(
                label = %self.config.label,
                index,
                leftover = signal_kind(&leftover),
                "pipeline stage finished"
            );
            results.push(result);
            pending = if source_ended && leftover.is_empty() {
                Signal::Eof
            } else {
                leftover
            };
        }

        Ok((results, pending))
    }
}
