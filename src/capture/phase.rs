use std::fmt;

/// Phases of one capture pass. Transitions are strictly linear; the pass
/// ends back at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    MovingToTarget,
    Hovering,
    Clicking,
    MovingAway,
}

/// Label for the settle frame captured after the click effect has landed.
pub const AFTER_CLICK_LABEL: &str = "after_click";

impl Phase {
    /// Frame filename suffix for this phase.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "initial",
            Self::MovingToTarget => "moving",
            Self::Hovering => "hover",
            Self::Clicking => "click",
            Self::MovingAway => "exit",
        }
    }

    /// The phase that follows this one.
    pub fn next(&self) -> Phase {
        match self {
            Self::Idle => Self::MovingToTarget,
            Self::MovingToTarget => Self::Hovering,
            Self::Hovering => Self::Clicking,
            Self::Clicking => Self::MovingAway,
            Self::MovingAway => Self::Idle,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
