//! Navigation plans: splitting planner output into drive and doorway steps,
//! and walking the resulting steps.

mod cursor;
mod plan;

pub use cursor::{CursorState, PlanCursor};
pub use plan::{NavPlan, NavStep};
