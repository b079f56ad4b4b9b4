//! The status bar entry: a one-letter code for the active pattern kind,
//! a tooltip, and what clicking it does.

use std::sync::Mutex;

use serde::Serialize;

use crate::notice::usage_hint;
use crate::search::{NO_SEARCH_CODE, SearchState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    ClearSearch,
    AnnounceSearch,
}

/// What the host's status bar entry should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusIndicator {
    pub text: String,
    pub tooltip: String,
    pub on_click: ClickAction,
}

impl StatusIndicator {
    pub fn for_search(search: &SearchState) -> Self {
        match search.describe_active() {
            Some((kind, pattern)) => Self {
                text: kind.code().to_string(),
                tooltip: format!("Searching by {kind} for `{pattern}`\nClick to clear the search"),
                on_click: ClickAction::ClearSearch,
            },
            None => Self {
                text: NO_SEARCH_CODE.to_string(),
                tooltip: format!("No active search\n{}", usage_hint()),
                on_click: ClickAction::AnnounceSearch,
            },
        }
    }
}

/// Receives a new indicator every time the search changes.
///
/// Called while the search lock is held. Implementations must not call back
/// into the controller.
pub trait StatusSink {
    fn update(&self, indicator: &StatusIndicator);
}

impl<F> StatusSink for F
where
    F: Fn(&StatusIndicator),
{
    fn update(&self, indicator: &StatusIndicator) {
        self(indicator)
    }
}

/// Keeps the most recent indicator for hosts that poll instead of listening.
#[derive(Debug, Default)]
pub struct LatestStatus {
    latest: Mutex<Option<StatusIndicator>>,
}

impl LatestStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<StatusIndicator> {
        self.latest.lock().ok().and_then(|guard| guard.clone())
    }
}

impl StatusSink for LatestStatus {
    fn update(&self, indicator: &StatusIndicator) {
        match self.latest.lock() {
            Ok(mut guard) => *guard = Some(indicator.clone()),
            Err(_) => tracing::warn!("Status indicator lock poisoned, dropping update"),
        }
    }
}
