//! Sarathi - pilot for autonomous mobile robots
//!
//! Plans collision-free paths to a target pose, splits them into drive and
//! doorway-pass steps, and runs those steps under a hierarchical,
//! event-driven state machine that replans when the robot misses its target.
//!
//! ## Components (leaf to root)
//!
//! | Module | Role |
//! |--------|------|
//! | [`shapes`] | Collision shapes and pairwise tests |
//! | [`planning`] | Bidirectional RRT over the obstacle catalog |
//! | [`navigation`] | `NavPlan` built from a raw path, split at doorways |
//! | [`fsm`] | Node arena, transitions, event dispatch |
//! | [`pilot`] | Planner → executor → arrival check sub-machine |
//!
//! Collaborators the pilot consumes are traits: [`robot::Robot`] for pose
//! telemetry and motion primitives, [`world::ObstacleCatalog`] for the map,
//! [`robot::PathViewer`] for diagnostics. [`sim::SimRobot`] implements the
//! robot side for hardware-free runs.
//!
//! Units are millimetres and radians throughout.

pub mod config;
pub mod core;
pub mod error;
pub mod fsm;
pub mod navigation;
pub mod pilot;
pub mod planning;
pub mod robot;
pub mod shapes;
pub mod sim;
pub mod world;

pub use config::SarathiConfig;
pub use error::{PlanningFailure, Result, SarathiError};
