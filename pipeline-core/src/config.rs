/// Run-time settings for a [`Driver`](crate::Driver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Name attached to every log event of the driver.
    pub label: String,
    /// Maximum number of signals the driver delivers before giving up.
    /// `None` means unbounded.
    pub step_limit: Option<usize>,
}

impl DriverConfig {
    /// Creates the default configuration: label `"driver"`, no step limit.
    pub fn new() -> Self {
        Self {
            label: "driver".to_string(),
            step_limit: None,
        }
    }

    /// Sets the label used in log events.
    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    /// Bounds the number of delivered signals.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}
