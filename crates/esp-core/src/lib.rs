//! esp-core - name search and marker layout for the xivesp overlay
//!
//! This crate owns the session's search pattern and turns a frame's entity
//! snapshot into marker and label draw calls. Hosts plug in through traits:
//! [`EntitySource`], [`Projector`], [`ClientState`], [`TargetSource`],
//! [`StatusSink`] and [`Canvas`].

pub mod canvas;
pub mod command;
pub mod config;
pub mod entity;
mod error;
pub mod glob_detect;
pub mod ipc;
pub mod layout;
pub mod log;
pub mod notice;
pub mod projection;
pub mod pvp;
pub mod render;
pub mod search;
pub mod status;

use std::sync::{Arc, RwLock};

pub use canvas::{Canvas, DrawCommand, DrawList, Rgba};
pub use command::{Command, SearchController};
pub use config::{OverlayConfig, OverlayStyle};
pub use entity::{Entity, EntitySnapshot, EntitySource, TargetSource};
pub use error::{Error, IntoCoreError, Result};
pub use ipc::{IpcEndpoint, IpcReply};
pub use layout::{LabelMetrics, LabelPlacement, Viewport, place_label};
pub use notice::{Notice, NoticeLevel};
pub use projection::ViewProjection;
pub use pvp::PvpWatch;
pub use render::{
    ClientCondition, ClientSnapshot, ClientState, FrameStats, OverlayRenderer, Projector,
};
pub use search::{PatternKind, SearchPattern, SearchState};
pub use status::{ClickAction, LatestStatus, StatusIndicator, StatusSink};

/// The search shared between the renderer and whoever handles commands.
pub type SharedSearch = Arc<RwLock<SearchState>>;

pub fn new_shared_search() -> SharedSearch {
    Arc::new(RwLock::new(SearchState::new()))
}

// Re-exported so hosts don't need their own glam dependency.
pub use glam::{Mat4, Vec2, Vec3};
