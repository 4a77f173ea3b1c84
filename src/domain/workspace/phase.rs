use serde::{Deserialize, Serialize};

/// Where the template usage flow currently is
///
/// # Transitions
/// ```text
/// Idle -> Selected -> Editing -> Used -> Selected
/// Selected -> Used                    (use with defaults only)
/// Selected/Editing -> Selected        (another template selected)
/// Selected/Editing -> Idle            (selected template left the catalog)
/// ```
/// `Used` is transient and falls back to `Selected` immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Nothing selected
    #[default]
    Idle,
    /// Template selected, values seeded with defaults
    Selected,
    /// At least one value edited since selection or last use
    Editing,
    /// Usage is being recorded
    Used,
}

impl SessionPhase {
    /// Checks if a transition from the current phase to `next` is valid
    ///
    /// # Example
    /// ```
    /// use costkatana_templates::domain::workspace::SessionPhase;
    ///
    /// assert!(SessionPhase::Idle.can_transition_to(SessionPhase::Selected));
    /// assert!(!SessionPhase::Idle.can_transition_to(SessionPhase::Used));
    /// ```
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Idle | Selected | Editing | Used, Selected)
                | (Selected | Editing, Editing)
                | (Selected | Editing, Used)
                | (Selected | Editing, Idle)
        )
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Selected => write!(f, "selected"),
            SessionPhase::Editing => write!(f, "editing"),
            SessionPhase::Used => write!(f, "used"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_is_allowed_from_every_phase() {
        for phase in [
            SessionPhase::Idle,
            SessionPhase::Selected,
            SessionPhase::Editing,
            SessionPhase::Used,
        ] {
            assert!(phase.can_transition_to(SessionPhase::Selected));
        }
    }

    #[test]
    fn editing_requires_selection() {
        assert!(!SessionPhase::Idle.can_transition_to(SessionPhase::Editing));
        assert!(SessionPhase::Selected.can_transition_to(SessionPhase::Editing));
        assert!(SessionPhase::Editing.can_transition_to(SessionPhase::Editing));
    }

    #[test]
    fn use_requires_selection() {
        assert!(!SessionPhase::Idle.can_transition_to(SessionPhase::Used));
        assert!(SessionPhase::Selected.can_transition_to(SessionPhase::Used));
        assert!(SessionPhase::Editing.can_transition_to(SessionPhase::Used));
    }

    #[test]
    fn used_only_falls_back_to_selected() {
        assert!(!SessionPhase::Used.can_transition_to(SessionPhase::Editing));
        assert!(!SessionPhase::Used.can_transition_to(SessionPhase::Idle));
        assert!(!SessionPhase::Used.can_transition_to(SessionPhase::Used));
    }

    #[test]
    fn phase_display() {
        assert_eq!(SessionPhase::Idle.to_string(), "idle");
        assert_eq!(SessionPhase::Editing.to_string(), "editing");
    }
}
