//! Step-by-step walker over a navigation plan.

use super::plan::{NavPlan, NavStep};

/// Cursor state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
    /// No plan loaded
    Empty,
    /// A step is pending or in progress
    Stepping,
    /// Every step has completed
    Complete,
}

/// Walks `NavPlan::steps` one at a time.
#[derive(Debug)]
pub struct PlanCursor {
    plan: NavPlan,
    index: usize,
    state: CursorState,
}

impl Default for PlanCursor {
    fn default() -> Self {
        Self {
            plan: NavPlan::default(),
            index: 0,
            state: CursorState::Empty,
        }
    }
}

impl PlanCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fresh plan and rewind.
    pub fn load(&mut self, plan: NavPlan) {
        self.state = if plan.is_empty() {
            CursorState::Complete
        } else {
            CursorState::Stepping
        };
        tracing::debug!("plan loaded: {}", plan);
        self.plan = plan;
        self.index = 0;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Step under the cursor, if any remain.
    pub fn current(&self) -> Option<&NavStep> {
        match self.state {
            CursorState::Stepping => self.plan.steps.get(self.index),
            _ => None,
        }
    }

    /// Move past the current step. Returns `false` once the plan is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.state != CursorState::Stepping {
            return false;
        }
        self.index += 1;
        if self.index >= self.plan.steps.len() {
            self.state = CursorState::Complete;
            false
        } else {
            true
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn plan(&self) -> &NavPlan {
        &self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point2D;

    #[test]
    fn test_walks_steps_in_order() {
        let mut cursor = PlanCursor::new();
        assert_eq!(cursor.state(), CursorState::Empty);
        assert!(cursor.current().is_none());

        cursor.load(NavPlan::new(vec![
            NavStep::Drive(vec![Point2D::ZERO, Point2D::new(10.0, 0.0)]),
            NavStep::DoorwayPass("d".to_string()),
        ]));
        assert_eq!(cursor.current().map(NavStep::kind), Some("drive"));
        assert!(cursor.advance());
        assert_eq!(cursor.current().map(NavStep::kind), Some("doorpass"));
        assert!(!cursor.advance());
        assert_eq!(cursor.state(), CursorState::Complete);
        assert!(cursor.current().is_none());
        assert!(!cursor.advance());
    }

    #[test]
    fn test_empty_plan_is_complete() {
        let mut cursor = PlanCursor::new();
        cursor.load(NavPlan::default());
        assert_eq!(cursor.state(), CursorState::Complete);
    }
}
