//! Command implementations

pub mod config;
pub mod list;
pub mod monitor;
pub mod update;

use colored::Colorize;
use ocictl_core::LifecycleState;

/// Lifecycle state colored by how settled it is
pub fn format_state(state: &LifecycleState) -> String {
    let text = state.as_str();
    match state {
        LifecycleState::Running => text.green().to_string(),
        LifecycleState::Stopped => text.red().to_string(),
        LifecycleState::Terminating | LifecycleState::Terminated => {
            text.bright_black().to_string()
        }
        LifecycleState::Unknown(_) => text.to_string(),
        _ => text.yellow().to_string(),
    }
}

/// State with a status icon, for spinner messages
pub fn format_state_icon(state: &LifecycleState) -> String {
    match state {
        LifecycleState::Running | LifecycleState::Stopped => {
            format!("\u{2713} {}", state) // checkmark
        }
        LifecycleState::Terminating | LifecycleState::Terminated => {
            format!("\u{2717} {}", state) // x mark
        }
        LifecycleState::Unknown(_) => state.to_string(),
        _ => format!("\u{21bb} {}", state), // arrow circle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_icons() {
        assert_eq!(format_state_icon(&LifecycleState::Running), "\u{2713} RUNNING");
        assert_eq!(
            format_state_icon(&LifecycleState::Starting),
            "\u{21bb} STARTING"
        );
        assert_eq!(
            format_state_icon(&LifecycleState::Terminated),
            "\u{2717} TERMINATED"
        );
        assert_eq!(
            format_state_icon(&LifecycleState::from("SHELVED")),
            "SHELVED"
        );
    }

    #[test]
    fn test_format_state_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(format_state(&LifecycleState::Stopping), "STOPPING");
    }
}
