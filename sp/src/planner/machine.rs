//! Planner state machine
//!
//! `Planner` holds the widget state and applies user actions, host messages
//! and timer firings to it. It never performs I/O or sleeps: anything that has
//! to happen outside (posting to the host, waiting) is queued as an [`Effect`]
//! for the runtime to carry out.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{Hours, ItemError, WorkItem, generate_item_id};
use crate::host::HostMode;
use crate::protocol::{Inbound, Outbound, SaveResult, SavedData, UserInfo};

use super::state::{HandshakePhase, PlannerState};

pub const STATUS_ITEM_ADDED: &str = "Item added";
pub const STATUS_ITEM_UPDATED: &str = "Item updated";
pub const STATUS_ITEM_REMOVED: &str = "Item removed";
pub const STATUS_SAVING: &str = "Saving...";
pub const STATUS_SAVED: &str = "Saved successfully!";
pub const STATUS_TEST_MODE_SUFFIX: &str = " (Test mode)";
pub const STATUS_LOADED: &str = "Loaded saved data";
pub const STATUS_INVALID_HOURS: &str = "Hours must be a positive multiple of 0.5";

/// When the widget saves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// After every successful add, toggle or remove
    Auto,
    /// Only on an explicit save request
    #[default]
    Manual,
}

impl std::fmt::Display for SaveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for SaveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            _ => Err(format!("Unknown save mode: {}. Use: auto or manual", s)),
        }
    }
}

/// Behaviour knobs for a planner
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    pub save_mode: SaveMode,
    /// Simulated save latency
    pub save_delay: Duration,
    /// Lifetime of transient status messages
    pub status_clear_after: Duration,
    pub track_hours: bool,
    pub default_hours: Hours,
    /// "subject" or "task"; used in the empty-label prompt
    pub noun: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            save_mode: SaveMode::Manual,
            save_delay: Duration::from_millis(1000),
            status_clear_after: Duration::from_millis(2000),
            track_hours: true,
            default_hours: Hours::default(),
            noun: "subject".to_string(),
        }
    }
}

/// Delayed work the runtime schedules on the planner's behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Optimistic resolution of save number `seq`
    SaveSettled { seq: u64 },
    /// Clear the status line if it still shows message number `seq`
    ClearStatus { seq: u64 },
}

/// Side effect requested by the planner
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a message to the host
    Post(Outbound),
    /// Call [`Planner::fire`] with `timer` after `after`
    Schedule { after: Duration, timer: Timer },
}

#[derive(Debug, Clone, Copy)]
struct PendingSave {
    seq: u64,
    /// No host saw this save
    simulated: bool,
}

/// The widget's state machine
#[derive(Debug)]
pub struct Planner {
    settings: PlannerSettings,
    state: PlannerState,
    mounted: bool,
    save_seq: u64,
    pending_save: Option<PendingSave>,
    status_seq: u64,
    effects: Vec<Effect>,
}

impl Planner {
    pub fn new(settings: PlannerSettings) -> Self {
        debug!(?settings, "Planner::new: called");
        let state = PlannerState {
            save_mode: settings.save_mode,
            track_hours: settings.track_hours,
            default_hours: settings.default_hours,
            noun: settings.noun.clone(),
            ..PlannerState::default()
        };
        Self {
            settings,
            state,
            mounted: false,
            save_seq: 0,
            pending_save: None,
            status_seq: 0,
            effects: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Drain the effects queued since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // === Lifecycle ===

    /// Start the handshake
    ///
    /// Embedded widgets announce READY and wait for USER_INFO. Standalone
    /// widgets are ready at once, without auth.
    pub fn mount(&mut self, mode: HostMode) {
        debug!(%mode, "Planner::mount: called");
        if self.mounted {
            warn!("Planner already mounted, ignoring");
            return;
        }
        self.mounted = true;
        self.state.mode = mode;

        match mode {
            HostMode::Embedded => {
                debug!("Planner::mount: embedded, sending READY");
                self.state.phase = HandshakePhase::AwaitingAuth;
                self.state.is_loading = true;
                self.effects.push(Effect::Post(Outbound::Ready));
            }
            HostMode::Standalone => {
                info!("No host, running standalone");
                self.state.phase = HandshakePhase::Ready;
                self.state.is_loading = false;
            }
        }
    }

    /// Stop reacting to anything; pending timers become no-ops
    pub fn teardown(&mut self) {
        debug!("Planner::teardown: called");
        self.mounted = false;
        self.pending_save = None;
        self.effects.clear();
    }

    // === Host messages ===

    pub fn handle_inbound(&mut self, message: Inbound) {
        debug!(kind = message.kind(), "Planner::handle_inbound: called");
        if !self.mounted {
            debug!("Planner::handle_inbound: not mounted, ignoring");
            return;
        }
        match message {
            Inbound::UserInfo(info) => self.on_user_info(info),
            Inbound::LoadSavedData(data) => self.on_load_saved_data(data),
            Inbound::SaveResult(result) => self.on_save_result(result),
        }
    }

    fn on_user_info(&mut self, info: UserInfo) {
        debug!(email = ?info.auth.email, has_data = info.user_data.is_some(), "Planner::on_user_info: called");
        self.state.auth = Some(info.auth);
        if let Some(data) = info.user_data {
            self.state.items = data.items;
        }

        if self.state.mode == HostMode::Embedded {
            self.effects.push(Effect::Post(Outbound::AuthConfirmed));
        }

        if self.state.phase == HandshakePhase::AwaitingAuth {
            info!(items = self.state.items.len(), "Handshake complete");
            self.state.phase = HandshakePhase::Ready;
            self.state.is_loading = false;
        }
    }

    fn on_load_saved_data(&mut self, data: SavedData) {
        debug!(count = data.items.len(), "Planner::on_load_saved_data: called");
        self.state.items = data.items;
        self.set_transient_status(STATUS_LOADED.to_string());
    }

    fn on_save_result(&mut self, result: SaveResult) {
        debug!(?result, pending = ?self.pending_save, "Planner::on_save_result: called");
        let pending = self.pending_save.filter(|p| !p.simulated);
        if pending.is_some() {
            self.pending_save = None;
            self.state.is_saving = false;
        }

        if result.ok {
            if pending.is_some() {
                info!("Host confirmed save");
                self.finish_save_status(STATUS_SAVED.to_string());
            } else {
                debug!("Planner::on_save_result: already settled optimistically");
            }
        } else {
            let reason = result.message.unwrap_or_else(|| "host rejected the save".to_string());
            warn!(%reason, "Host reported save failure");
            self.set_status(format!("Save failed: {}", reason));
        }
    }

    // === User actions ===

    /// Append a new item
    ///
    /// A blank label or bad hours leave the list alone and explain why in the
    /// status line.
    pub fn add_item(&mut self, label: &str, hours: Option<f64>) -> Result<String, ItemError> {
        debug!(%label, ?hours, "Planner::add_item: called");
        let hours = match hours {
            Some(value) if self.settings.track_hours => match Hours::new(value) {
                Ok(hours) => Some(hours),
                Err(e) => {
                    self.set_status(STATUS_INVALID_HOURS.to_string());
                    return Err(e);
                }
            },
            _ => None,
        };

        let id = generate_item_id(&self.state.items);
        let item = match WorkItem::new(id, label, hours) {
            Ok(item) => item,
            Err(e) => {
                self.set_status(format!("Please enter a {}", self.settings.noun));
                return Err(e);
            }
        };

        let id = item.id.clone();
        let mut items = self.state.items.clone();
        items.push(item);
        self.state.items = items;
        info!(%id, "Item added");
        self.set_status(STATUS_ITEM_ADDED.to_string());
        self.after_mutation();
        Ok(id)
    }

    /// Flip `completed` on an item; false if no such item
    pub fn toggle_item(&mut self, id: &str) -> bool {
        debug!(%id, "Planner::toggle_item: called");
        if self.state.find(id).is_none() {
            debug!(%id, "Planner::toggle_item: no such item");
            return false;
        }
        self.state.items = self
            .state
            .items
            .iter()
            .map(|item| if item.id == id { item.toggled() } else { item.clone() })
            .collect();
        self.set_status(STATUS_ITEM_UPDATED.to_string());
        self.after_mutation();
        true
    }

    /// Drop an item; false if no such item
    pub fn remove_item(&mut self, id: &str) -> bool {
        debug!(%id, "Planner::remove_item: called");
        if self.state.find(id).is_none() {
            debug!(%id, "Planner::remove_item: no such item");
            return false;
        }
        self.state.items = self.state.items.iter().filter(|item| item.id != id).cloned().collect();
        info!(%id, "Item removed");
        self.set_status(STATUS_ITEM_REMOVED.to_string());
        self.after_mutation();
        true
    }

    /// Send the current list to the host
    ///
    /// The host does not have to answer. The save resolves optimistically
    /// after the configured delay unless a SAVE_RESULT arrives first. Without
    /// a host (or before auth) the save is only simulated.
    pub fn request_save(&mut self) {
        self.save_seq += 1;
        let seq = self.save_seq;
        let simulated = !(self.state.mode == HostMode::Embedded && self.state.auth.is_some());
        debug!(seq, simulated, "Planner::request_save: called");

        self.state.is_saving = true;
        self.set_status(STATUS_SAVING.to_string());
        self.pending_save = Some(PendingSave { seq, simulated });

        if simulated {
            info!(count = self.state.items.len(), "Would save (test mode)");
        } else {
            self.effects
                .push(Effect::Post(Outbound::SaveData(SavedData::new(self.state.items.clone()))));
        }
        self.effects.push(Effect::Schedule {
            after: self.settings.save_delay,
            timer: Timer::SaveSettled { seq },
        });
    }

    // === Timers ===

    pub fn fire(&mut self, timer: Timer) {
        debug!(?timer, "Planner::fire: called");
        if !self.mounted {
            debug!("Planner::fire: not mounted, ignoring");
            return;
        }
        match timer {
            Timer::SaveSettled { seq } => {
                let Some(pending) = self.pending_save.filter(|p| p.seq == seq) else {
                    debug!(seq, "Planner::fire: stale or already settled save");
                    return;
                };
                self.pending_save = None;
                self.state.is_saving = false;
                let mut message = STATUS_SAVED.to_string();
                if pending.simulated {
                    message.push_str(STATUS_TEST_MODE_SUFFIX);
                }
                self.finish_save_status(message);
            }
            Timer::ClearStatus { seq } => {
                if seq == self.status_seq {
                    debug!(seq, "Planner::fire: clearing status");
                    self.state.status_message.clear();
                }
            }
        }
    }

    // === Helpers ===

    fn after_mutation(&mut self) {
        if self.settings.save_mode == SaveMode::Auto {
            debug!("Planner::after_mutation: auto-saving");
            self.request_save();
        }
    }

    fn finish_save_status(&mut self, message: String) {
        match self.settings.save_mode {
            SaveMode::Auto => self.set_transient_status(message),
            SaveMode::Manual => self.set_status(message),
        }
    }

    fn set_status(&mut self, message: String) {
        self.status_seq += 1;
        debug!(seq = self.status_seq, %message, "Planner::set_status");
        self.state.status_message = message;
    }

    fn set_transient_status(&mut self, message: String) {
        self.set_status(message);
        self.effects.push(Effect::Schedule {
            after: self.settings.status_clear_after,
            timer: Timer::ClearStatus { seq: self.status_seq },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuthInfo;

    fn embedded() -> Planner {
        let mut planner = Planner::new(PlannerSettings::default());
        planner.mount(HostMode::Embedded);
        planner
    }

    fn auto_settings() -> PlannerSettings {
        PlannerSettings {
            save_mode: SaveMode::Auto,
            ..Default::default()
        }
    }

    fn user_info(email: &str, items: Option<Vec<WorkItem>>) -> Inbound {
        Inbound::UserInfo(UserInfo {
            auth: AuthInfo::with_email(email),
            user_data: items.map(SavedData::new),
        })
    }

    fn scheduled(effects: &[Effect]) -> Vec<Timer> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Schedule { timer, .. } => Some(*timer),
                Effect::Post(_) => None,
            })
            .collect()
    }

    fn posted(effects: &[Effect]) -> Vec<Outbound> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Post(msg) => Some(msg.clone()),
                Effect::Schedule { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_mount_embedded_sends_ready() {
        let mut planner = embedded();
        assert!(planner.state().is_loading);
        assert_eq!(planner.state().phase, HandshakePhase::AwaitingAuth);
        assert_eq!(planner.take_effects(), vec![Effect::Post(Outbound::Ready)]);
    }

    #[test]
    fn test_mount_standalone_is_ready_immediately() {
        let mut planner = Planner::new(PlannerSettings::default());
        planner.mount(HostMode::Standalone);
        assert!(!planner.state().is_loading);
        assert_eq!(planner.state().phase, HandshakePhase::Ready);
        assert!(planner.state().auth.is_none());
        assert_eq!(planner.state().user_label(), "Test Mode");
        assert!(planner.take_effects().is_empty());
    }

    #[test]
    fn test_mount_twice_is_ignored() {
        let mut planner = embedded();
        planner.take_effects();
        planner.mount(HostMode::Embedded);
        assert!(planner.take_effects().is_empty());
    }

    #[test]
    fn test_user_info_completes_handshake() {
        let mut planner = embedded();
        planner.take_effects();

        planner.handle_inbound(user_info("a@b.com", Some(vec![])));
        assert!(!planner.state().is_loading);
        assert_eq!(planner.state().phase, HandshakePhase::Ready);
        assert_eq!(planner.state().user_label(), "User: a@b.com");
        assert_eq!(planner.take_effects(), vec![Effect::Post(Outbound::AuthConfirmed)]);
    }

    #[test]
    fn test_repeated_user_info_replaces_auth_and_items() {
        let mut planner = embedded();
        planner.handle_inbound(user_info("a@b.com", Some(vec![WorkItem::with_id("1", "Math")])));
        planner.take_effects();

        planner.handle_inbound(user_info("c@d.com", Some(vec![WorkItem::with_id("2", "Art")])));
        assert!(!planner.state().is_loading);
        assert_eq!(planner.state().user_label(), "User: c@d.com");
        assert_eq!(planner.state().items[0].label, "Art");
        // Every USER_INFO is acknowledged
        assert_eq!(planner.take_effects(), vec![Effect::Post(Outbound::AuthConfirmed)]);
    }

    #[test]
    fn test_user_info_without_data_keeps_items() {
        let mut planner = embedded();
        planner.handle_inbound(user_info("a@b.com", Some(vec![WorkItem::with_id("1", "Math")])));
        planner.handle_inbound(user_info("a@b.com", None));
        assert_eq!(planner.state().items.len(), 1);
    }

    #[test]
    fn test_load_saved_data_replaces_items_and_clears_later() {
        let mut planner = embedded();
        planner.take_effects();

        planner.handle_inbound(Inbound::LoadSavedData(SavedData::new(vec![
            WorkItem::with_id("1", "Math"),
            WorkItem::with_id("2", "Art"),
        ])));
        assert_eq!(planner.state().items.len(), 2);
        assert_eq!(planner.state().status_message, STATUS_LOADED);

        let timers = scheduled(&planner.take_effects());
        assert_eq!(timers.len(), 1);
        planner.fire(timers[0]);
        assert!(planner.state().status_message.is_empty());
    }

    #[test]
    fn test_clear_status_skips_newer_message() {
        let mut planner = embedded();
        planner.handle_inbound(Inbound::LoadSavedData(SavedData::default()));
        let timers = scheduled(&planner.take_effects());

        planner.add_item("Math", Some(1.0)).unwrap();
        planner.fire(timers[0]);
        assert_eq!(planner.state().status_message, STATUS_ITEM_ADDED);
    }

    #[test]
    fn test_add_item_appends() {
        let mut planner = embedded();
        let id = planner.add_item("Math", Some(2.0)).unwrap();
        let item = planner.state().find(&id).unwrap();
        assert_eq!(item.label, "Math");
        assert_eq!(item.hours, Some(Hours::new(2.0).unwrap()));
        assert!(!item.completed);
        assert_eq!(planner.state().status_message, STATUS_ITEM_ADDED);
    }

    #[test]
    fn test_add_blank_label_rejected() {
        let mut planner = embedded();
        assert_eq!(planner.add_item("   ", Some(1.0)), Err(ItemError::EmptyLabel));
        assert!(planner.state().items.is_empty());
        assert_eq!(planner.state().status_message, "Please enter a subject");
    }

    #[test]
    fn test_add_blank_label_uses_noun() {
        let mut planner = Planner::new(PlannerSettings {
            noun: "task".to_string(),
            ..Default::default()
        });
        planner.mount(HostMode::Standalone);
        assert!(planner.add_item("", None).is_err());
        assert_eq!(planner.state().status_message, "Please enter a task");
    }

    #[test]
    fn test_add_invalid_hours_rejected() {
        let mut planner = embedded();
        assert!(matches!(planner.add_item("Math", Some(0.3)), Err(ItemError::InvalidHours(_))));
        assert!(planner.state().items.is_empty());
        assert_eq!(planner.state().status_message, STATUS_INVALID_HOURS);
    }

    #[test]
    fn test_add_without_hour_tracking_drops_hours() {
        let mut planner = Planner::new(PlannerSettings {
            track_hours: false,
            ..Default::default()
        });
        planner.mount(HostMode::Standalone);
        // Even a bad value is ignored when hours are not collected
        let id = planner.add_item("Essay", Some(0.3)).unwrap();
        assert_eq!(planner.state().find(&id).unwrap().hours, None);
    }

    #[test]
    fn test_add_gives_distinct_ids() {
        let mut planner = embedded();
        let a = planner.add_item("A", None).unwrap();
        let b = planner.add_item("B", None).unwrap();
        let c = planner.add_item("C", None).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_toggle_item() {
        let mut planner = embedded();
        let id = planner.add_item("Math", None).unwrap();
        assert!(planner.toggle_item(&id));
        assert!(planner.state().find(&id).unwrap().completed);
        assert_eq!(planner.state().status_message, STATUS_ITEM_UPDATED);
        assert!(planner.toggle_item(&id));
        assert!(!planner.state().find(&id).unwrap().completed);
    }

    #[test]
    fn test_toggle_and_remove_unknown_id_change_nothing() {
        let mut planner = embedded();
        planner.add_item("Math", None).unwrap();
        let before = planner.state().clone();
        planner.take_effects();

        assert!(!planner.toggle_item("missing"));
        assert!(!planner.remove_item("missing"));
        assert_eq!(planner.state(), &before);
        assert!(planner.take_effects().is_empty());
    }

    #[test]
    fn test_remove_item() {
        let mut planner = embedded();
        let a = planner.add_item("A", None).unwrap();
        let b = planner.add_item("B", None).unwrap();
        let c = planner.add_item("C", None).unwrap();

        assert!(planner.remove_item(&b));
        let ids: Vec<_> = planner.state().items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(planner.state().status_message, STATUS_ITEM_REMOVED);
    }

    #[test]
    fn test_manual_mode_does_not_save_on_mutation() {
        let mut planner = embedded();
        planner.handle_inbound(user_info("a@b.com", None));
        planner.take_effects();

        planner.add_item("Math", None).unwrap();
        assert!(planner.take_effects().is_empty());
        assert!(!planner.state().is_saving);
    }

    #[test]
    fn test_save_embedded_posts_and_settles() {
        let mut planner = embedded();
        planner.handle_inbound(user_info("a@b.com", None));
        let id = planner.add_item("Math", Some(2.0)).unwrap();
        planner.take_effects();

        planner.request_save();
        assert!(planner.state().is_saving);
        assert_eq!(planner.state().status_message, STATUS_SAVING);

        let effects = planner.take_effects();
        let posts = posted(&effects);
        assert_eq!(posts.len(), 1);
        let Outbound::SaveData(data) = &posts[0] else {
            panic!("Expected SaveData");
        };
        assert_eq!(data.items[0].id, id);

        let timers = scheduled(&effects);
        assert_eq!(timers, vec![Timer::SaveSettled { seq: 1 }]);
        planner.fire(timers[0]);
        assert!(!planner.state().is_saving);
        assert_eq!(planner.state().status_message, STATUS_SAVED);
        // Manual saves leave the message up
        assert!(planner.take_effects().is_empty());
    }

    #[test]
    fn test_save_standalone_is_simulated() {
        let mut planner = Planner::new(PlannerSettings::default());
        planner.mount(HostMode::Standalone);
        planner.add_item("Math", None).unwrap();

        planner.request_save();
        let effects = planner.take_effects();
        assert!(posted(&effects).is_empty());

        planner.fire(scheduled(&effects)[0]);
        assert_eq!(planner.state().status_message, "Saved successfully! (Test mode)");
    }

    #[test]
    fn test_save_before_auth_is_simulated() {
        let mut planner = embedded();
        planner.take_effects();
        planner.request_save();
        assert!(posted(&planner.take_effects()).is_empty());
    }

    #[test]
    fn test_auto_mode_saves_after_each_mutation() {
        let mut planner = Planner::new(auto_settings());
        planner.mount(HostMode::Embedded);
        planner.handle_inbound(user_info("a@b.com", None));
        planner.take_effects();

        let id = planner.add_item("Math", None).unwrap();
        assert!(planner.state().is_saving);
        let effects = planner.take_effects();
        assert_eq!(posted(&effects).len(), 1);

        // Saved message clears itself in auto mode
        planner.fire(Timer::SaveSettled { seq: 1 });
        assert_eq!(planner.state().status_message, STATUS_SAVED);
        let clear = scheduled(&planner.take_effects());
        assert_eq!(clear.len(), 1);
        planner.fire(clear[0]);
        assert!(planner.state().status_message.is_empty());

        planner.toggle_item(&id);
        assert_eq!(posted(&planner.take_effects()).len(), 1);
        planner.remove_item(&id);
        let Outbound::SaveData(data) = &posted(&planner.take_effects())[0] else {
            panic!("Expected SaveData");
        };
        assert!(data.items.is_empty());
    }

    #[test]
    fn test_only_latest_save_settles() {
        let mut planner = Planner::new(auto_settings());
        planner.mount(HostMode::Standalone);
        planner.add_item("A", None).unwrap();
        planner.add_item("B", None).unwrap();

        planner.fire(Timer::SaveSettled { seq: 1 });
        assert!(planner.state().is_saving);

        planner.fire(Timer::SaveSettled { seq: 2 });
        assert!(!planner.state().is_saving);
    }

    #[test]
    fn test_save_result_confirms_before_timer() {
        let mut planner = embedded();
        planner.handle_inbound(user_info("a@b.com", None));
        planner.request_save();
        planner.take_effects();

        planner.handle_inbound(Inbound::SaveResult(SaveResult { ok: true, message: None }));
        assert!(!planner.state().is_saving);
        assert_eq!(planner.state().status_message, STATUS_SAVED);

        // The optimistic timer is now stale
        planner.add_item("Math", None).unwrap();
        planner.fire(Timer::SaveSettled { seq: 1 });
        assert_eq!(planner.state().status_message, STATUS_ITEM_ADDED);
    }

    #[test]
    fn test_save_result_failure_surfaces() {
        let mut planner = embedded();
        planner.handle_inbound(user_info("a@b.com", None));
        planner.request_save();
        planner.fire(Timer::SaveSettled { seq: 1 });
        assert_eq!(planner.state().status_message, STATUS_SAVED);

        // A late failure still gets reported
        planner.handle_inbound(Inbound::SaveResult(SaveResult {
            ok: false,
            message: Some("disk full".to_string()),
        }));
        assert_eq!(planner.state().status_message, "Save failed: disk full");
        assert!(!planner.state().is_saving);
    }

    #[test]
    fn test_teardown_ignores_late_events() {
        let mut planner = embedded();
        planner.handle_inbound(user_info("a@b.com", None));
        planner.request_save();
        planner.teardown();

        planner.fire(Timer::SaveSettled { seq: 1 });
        assert_eq!(planner.state().status_message, STATUS_SAVING);
        planner.handle_inbound(Inbound::LoadSavedData(SavedData::new(vec![WorkItem::with_id("1", "x")])));
        assert!(planner.state().items.is_empty());
        assert!(planner.take_effects().is_empty());
    }

    #[test]
    fn test_save_mode_from_str() {
        assert_eq!("auto".parse::<SaveMode>().unwrap(), SaveMode::Auto);
        assert_eq!("MANUAL".parse::<SaveMode>().unwrap(), SaveMode::Manual);
        assert!("sometimes".parse::<SaveMode>().is_err());
    }
}
