//! Settings screen: the nearby-search radius.

use std::sync::Arc;

use log::error;
use pois_core::PreferenceStore;
use tokio::sync::watch;

/// Observable state of the Settings screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsState {
    /// Radius in metres as last read or written.
    pub search_radius: u32,
    /// Last failure, formatted for display.
    pub error: Option<String>,
}

/// View-model behind the Settings screen.
pub struct SettingsViewModel {
    preferences: Arc<dyn PreferenceStore>,
    state: watch::Sender<SettingsState>,
}

impl std::fmt::Debug for SettingsViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsViewModel")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SettingsViewModel {
    /// Wire the view-model and read the stored radius.
    #[must_use]
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        let (state, _) = watch::channel(SettingsState::default());
        let view_model = Self { preferences, state };
        view_model.search_radius();
        view_model
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SettingsState {
        self.state.borrow().clone()
    }

    /// Follow state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    /// Read the stored radius, keeping the previous value on failure.
    pub fn search_radius(&self) -> u32 {
        match self.preferences.search_radius() {
            Ok(radius) => {
                self.state.send_modify(|state| {
                    state.search_radius = radius;
                    state.error = None;
                });
                radius
            }
            Err(err) => {
                error!("failed to read search radius: {err}");
                self.state.send_modify(|state| {
                    state.error = Some(format!("Failed to read search radius: {err}"));
                });
                self.state.borrow().search_radius
            }
        }
    }

    /// Persist a new radius.
    pub fn set_search_radius(&self, radius_metres: u32) {
        match self.preferences.set_search_radius(radius_metres) {
            Ok(()) => self.state.send_modify(|state| {
                state.search_radius = radius_metres;
                state.error = None;
            }),
            Err(err) => {
                error!("failed to save search radius: {err}");
                self.state.send_modify(|state| {
                    state.error = Some(format!("Failed to save search radius: {err}"));
                });
            }
        }
    }
}
