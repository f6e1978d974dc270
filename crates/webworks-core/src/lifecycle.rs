//! Extension object lifecycle state machine

use serde::{Deserialize, Serialize};

/// Lifecycle of one extension object
///
/// State transitions:
/// ```text
/// Installed → Starting → Active → Stopping → Stopped
///                ↑                    │
///                └────────────────────┘ (restart)
///            Any non-terminal state → Failed (on error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LifecycleState {
    /// Object is created but not yet started
    #[default]
    Installed = 0,
    /// Object is starting up (runtime, platform service)
    Starting = 1,
    /// Object accepts commands
    Active = 2,
    /// Object is shutting down
    Stopping = 3,
    /// Object has been stopped
    Stopped = 4,
    /// Object encountered a fatal error
    Failed = 5,
}

impl LifecycleState {
    /// Decode the ABI representation; unknown values map to `Failed`
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Installed,
            1 => LifecycleState::Starting,
            2 => LifecycleState::Active,
            3 => LifecycleState::Stopping,
            4 => LifecycleState::Stopped,
            _ => LifecycleState::Failed,
        }
    }

    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, target),
            (Installed, Starting)
                | (Starting, Active)
                | (Active, Stopping)
                | (Stopping, Stopped)
                | (Stopped, Starting)
                | (Installed, Failed)
                | (Starting, Failed)
                | (Active, Failed)
                | (Stopping, Failed)
        )
    }

    /// Check if the object can handle commands in this state
    pub fn can_handle_commands(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }

    /// Check if the object is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Stopped | LifecycleState::Failed)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Installed => write!(f, "Installed"),
            LifecycleState::Starting => write!(f, "Starting"),
            LifecycleState::Active => write!(f, "Active"),
            LifecycleState::Stopping => write!(f, "Stopping"),
            LifecycleState::Stopped => write!(f, "Stopped"),
            LifecycleState::Failed => write!(f, "Failed"),
        }
    }
}
