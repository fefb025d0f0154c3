use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of the processing run a message is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Status {
    Success,
    Failed(i32),
}

impl Status {
    pub fn code(&self) -> i32 {
        match self {
            Status::Success => 0,
            Status::Failed(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    /// Label written into the `status` field of an emitted message.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Success => "OK",
            Status::Failed(_) => "FAILED",
        }
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        if code == 0 {
            Status::Success
        } else {
            Status::Failed(code)
        }
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}
