//! Dieback confirmation state machine.
//!
//! Each pixel carries a label (healthy or unhealthy) and a counter of
//! consecutive valid dates whose anomaly flag disagrees with that label. The
//! label flips when the counter reaches 3, and the counter is consumed in the
//! same step. Dates are consumed one at a time in increasing order, so the
//! state after date `t` depends only on the state after `t - 1` and on date `t`,
//! which makes processing resumable from a persisted state.
//!
//! Masked dates are never passed to [`PixelDieback::observe`]: they leave
//! every field untouched.

use serde::{Deserialize, Serialize};

/// Number of consecutive disagreeing valid dates needed to flip the label.
pub const CONFIRMATION_COUNT: u8 = 3;

/// Label change produced by one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Label unchanged.
    None,
    /// Healthy → unhealthy: dieback confirmed.
    Onset,
    /// Unhealthy → healthy: recovery confirmed.
    Recovery,
}

/// Persistent dieback state of one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelDieback {
    /// Currently confirmed unhealthy.
    pub unhealthy: bool,
    /// Consecutive valid dates disagreeing with the label (always < 3 between updates).
    pub count: u8,
    /// Date index at which the most recent confirmed dieback started.
    pub first_date: u32,
    /// Date index of the first anomaly of the current tentative onset.
    pub first_date_unconfirmed: u32,
}

impl PixelDieback {
    /// Consume one valid observation at `date_index`.
    pub fn observe(&mut self, anomaly: bool, date_index: u32) -> Transition {
        if anomaly != self.unhealthy {
            self.count += 1;
        } else {
            self.count = 0;
        }

        let mut transition = Transition::None;
        if self.count == CONFIRMATION_COUNT {
            self.unhealthy = !self.unhealthy;
            self.count = 0;
            transition = if self.unhealthy {
                Transition::Onset
            } else {
                Transition::Recovery
            };
        }

        if self.count == 1 && !self.unhealthy {
            self.first_date_unconfirmed = date_index;
        }
        if transition != Transition::None {
            self.first_date = self.first_date_unconfirmed;
        }
        transition
    }

    /// Whether the pixel is in the middle of a tentative transition.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.count > 0
    }
}

/// Feed a sequence of optional anomaly flags (`None` = masked date) to a fresh
/// pixel state, starting at date index `start`. Returns the final state and
/// the transitions with the date index at which they occurred.
pub fn replay<I>(flags: I, start: u32) -> (PixelDieback, Vec<(u32, Transition)>)
where
    I: IntoIterator<Item = Option<bool>>,
{
    let mut state = PixelDieback::default();
    let mut transitions = Vec::new();
    for (i, flag) in flags.into_iter().enumerate() {
        let t = start + i as u32;
        if let Some(anomaly) = flag {
            let tr = state.observe(anomaly, t);
            if tr != Transition::None {
                transitions.push((t, tr));
            }
        }
    }
    (state, transitions)
}
