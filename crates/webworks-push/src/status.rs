//! Push service status codes and operation identifiers

use std::fmt;

/// Completion status reported by the push service
///
/// The platform reserves a handful of codes for its own failures; every
/// other value (10001 and up) comes from the push provider and is passed to
/// JavaScript untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushStatus(i32);

impl PushStatus {
    pub const SUCCESS: Self = Self(0);
    pub const INTERNAL_ERROR: Self = Self(500);
    /// The connection to the push service dropped while the request was pending
    pub const CONNECTION_CLOSED: Self = Self(501);
    pub const PERMISSION_ERROR: Self = Self(502);

    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn is_connection_closed(self) -> bool {
        self == Self::CONNECTION_CLOSED
    }

    /// Whether the code comes from the push provider rather than the platform
    pub fn is_provider_code(self) -> bool {
        self.0 > 10_000
    }
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asynchronous push operation, as reported back to JavaScript
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushCommand {
    CreateSession = 0,
    CreateChannel = 1,
    DestroyChannel = 2,
    LaunchApplicationOnPush = 3,
}

impl PushCommand {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(PushCommand::CreateSession),
            1 => Some(PushCommand::CreateChannel),
            2 => Some(PushCommand::DestroyChannel),
            3 => Some(PushCommand::LaunchApplicationOnPush),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for PushCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
