//! The single completion signal of an invocation.

use crate::error::ForwardError;

/// Why an invocation succeeded without sending anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The tag requires ad-storage consent and the event does not carry it.
    ConsentNotGranted,
    /// The request came from the host's measurement probe.
    MeasurementProbe,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConsentNotGranted => "consent_not_granted",
            Self::MeasurementProbe => "measurement_probe",
        }
    }
}

/// Result of one invocation. Exactly one is produced per invocation.
#[derive(Debug)]
pub enum Outcome {
    /// The endpoint acknowledged the payload with a 2xx status.
    Delivered { status: u16 },
    /// Optimistic mode: the request was issued and not awaited.
    Dispatched,
    Skipped(SkipReason),
    Failed(ForwardError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Short machine-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered { .. } => "delivered",
            Self::Dispatched => "dispatched",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&ForwardError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ForwardError> for Outcome {
    fn from(error: ForwardError) -> Self {
        Self::Failed(error)
    }
}
