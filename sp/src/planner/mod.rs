//! The planner widget
//!
//! `Planner` is the synchronous state machine (handshake, item list, saves).
//! `PlannerManager` runs it as an actor, turning its effects into host
//! messages and cancellable timers.

mod machine;
mod manager;
mod messages;
mod state;

pub use machine::{
    Effect, Planner, PlannerSettings, STATUS_INVALID_HOURS, STATUS_ITEM_ADDED, STATUS_ITEM_REMOVED,
    STATUS_ITEM_UPDATED, STATUS_LOADED, STATUS_SAVED, STATUS_SAVING, STATUS_TEST_MODE_SUFFIX, SaveMode, Timer,
};
pub use manager::PlannerManager;
pub use messages::{PlannerCommand, PlannerError, PlannerResponse};
pub use state::{HandshakePhase, PlannerState};
