//! Study Planner - an embeddable study task widget
//!
//! The widget mounts inside a host application, announces itself, receives
//! the signed-in user and any saved work items, and hands the list back to
//! the host when it is saved. Without a host it runs standalone in test mode.
//!
//! # Modules
//!
//! - [`domain`] - Work items, hours and auth info
//! - [`protocol`] - Typed host envelopes and their line codec
//! - [`host`] - Host link trait, socket and channel transports, dev host
//! - [`planner`] - The widget state machine and its actor
//! - [`tui`] - Terminal front-end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod host;
pub mod planner;
pub mod protocol;
pub mod tui;

// Re-export commonly used types
pub use config::Config;
pub use domain::{AuthInfo, Hours, ItemError, WorkItem};
pub use host::{ChannelHost, HostConnection, HostError, HostMode, HostPort, channel_pair};
pub use planner::{Effect, Planner, PlannerError, PlannerManager, PlannerSettings, PlannerState, SaveMode, Timer};
pub use protocol::{Inbound, Outbound, ProtocolError, SaveResult, SavedData, UserInfo};
