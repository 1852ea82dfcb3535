//! Frame budget partitioning.
//!
//! A capture run has a fixed total frame budget which is split across the
//! movement, interaction, and exit phases up front. The budget is a hard
//! ceiling: when the per-phase arithmetic adds up to more frames than the
//! cap allows, capture stops early instead of exceeding it.

/// Interaction frames in proportional mode: hover, pre-click pause,
/// click, click-transition, post-click settle.
const PROPORTIONAL_INTERACTION_FRAMES: u32 = 9;

/// Interaction frames in the legacy equal split: hover, click, after-click.
const EQUAL_SPLIT_INTERACTION_FRAMES: u32 = 3;

/// How a total frame budget is divided across phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    /// Total frame budget the plan was built from.
    pub total: u32,
    /// Frames allotted to the move-to-target phase.
    pub movement: u32,
    /// Frames reserved for the hover/click interaction.
    pub interaction: u32,
    /// Frames allotted to the move-away phase, floored at 1.
    pub exit: u32,
    cap: u32,
}

impl FramePlan {
    /// Proportional allocation: movement gets `floor(total * fraction)`,
    /// interaction gets a fixed reserve, the remainder exits. No frame
    /// index reaches `total`.
    pub fn proportional(total: u32, movement_fraction: f64) -> Self {
        let movement = (total as f64 * movement_fraction).floor() as u32;
        let interaction = PROPORTIONAL_INTERACTION_FRAMES;
        let exit = total.saturating_sub(movement + interaction).max(1);
        Self {
            total,
            movement,
            interaction,
            exit,
            cap: total,
        }
    }

    /// Legacy equal split: movement gets `floor(total / 2)` frames and the
    /// run emits `total + 1` frames counting frame 0.
    pub fn equal_split(total: u32) -> Self {
        let movement = total / 2;
        let interaction = EQUAL_SPLIT_INTERACTION_FRAMES;
        let exit = total.saturating_sub(movement + interaction).max(1);
        Self {
            total,
            movement,
            interaction,
            exit,
            cap: total + 1,
        }
    }

    /// Hard ceiling on emitted frames; valid indices are `0..cap`.
    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Interaction frames beyond the three mandatory hover/click/settle
    /// captures, split between pre-click pause and click-transition.
    pub fn extra_interaction(&self) -> (u32, u32) {
        let extra = self.interaction.saturating_sub(3);
        let pre_click = extra / 2;
        (pre_click, extra - pre_click)
    }
}
