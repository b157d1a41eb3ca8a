//! Signal Framework
//!
//! 输入信号：消费者每一步收到的单个投递（空、流结束或一个元素）。

pub mod signal;

pub use signal::Signal;
