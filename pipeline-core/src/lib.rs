pub mod config;
pub mod driver;
pub mod error;
#[cfg(feature = "pipeline")]
pub mod pipeline;
pub mod source;

pub use config::DriverConfig;
pub use driver::{run, run_with_config, Driver};
pub use error::DriveError;
#[cfg(feature = "pipeline")]
pub use pipeline::Pipeline;
pub use source::{IterSource, SignalSource};
