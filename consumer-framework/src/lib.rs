//! Consumer Framework
//!
//! 可恢复、可挂起的流消费状态机，以及由它组合出的基本消费者。

pub mod error;
mod persistent;
pub mod primitives;
pub mod state;

pub use error::StepError;
pub use primitives::{
    collect, count, drop, drop_while, expect_eof, fold, head, peek, pure, sequence, take,
    take_while,
};
pub use signal_framework::Signal;
pub use state::{ConsumerState, Continuation};
