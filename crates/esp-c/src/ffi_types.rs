//! FFI-compatible type definitions
//!
//! `EspResult` uses #[repr(C)] for C ABI compatibility; everything else is
//! exchanged as JSON.

use std::ffi::{CString, c_char};
use std::ptr;
use std::sync::RwLock;

use esp_core::{
    ClientSnapshot, DrawCommand, EntitySnapshot, FrameStats, Mat4, Notice, NoticeLevel,
    OverlayConfig, TargetSource, Vec2, Viewport,
};
use serde::{Deserialize, Serialize};

/// Result type returned by all FFI functions
/// Returned as a heap-allocated pointer that must be freed with esp_free_result
#[repr(C)]
pub struct EspResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// JSON data on success (null-terminated string, may be null)
    pub data: *mut c_char,
    /// Error message on failure (null-terminated string)
    pub error: *mut c_char,
}

impl EspResult {
    pub fn ok_empty() -> *mut Self {
        Box::into_raw(Box::new(EspResult {
            success: true,
            data: ptr::null_mut(),
            error: ptr::null_mut(),
        }))
    }

    pub fn ok_data(data: &str) -> *mut Self {
        Box::into_raw(Box::new(EspResult {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }))
    }

    /// Serialize `value` as the result payload.
    pub fn ok_json<T: Serialize>(value: &T) -> *mut Self {
        match serde_json::to_string(value) {
            Ok(json) => Self::ok_data(&json),
            Err(e) => Self::err(&format!("Failed to serialize result: {}", e)),
        }
    }

    pub fn err(error: &str) -> *mut Self {
        Box::into_raw(Box::new(EspResult {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(error).unwrap_or_default().into_raw(),
        }))
    }
}

/// Initialization options (JSON-deserializable)
#[derive(Debug, Default, Deserialize)]
pub struct InitOptions {
    /// TOML config file to load; missing files fall back to defaults
    pub config_path: Option<String>,
    /// Inline config, used when `config_path` is absent
    pub config: Option<OverlayConfig>,
}

/// Notice as handed back to the host's chat output
#[derive(Debug, Serialize)]
pub struct NoticeJson {
    pub level: NoticeLevel,
    pub text: String,
    /// Fully formatted line, ready to print
    pub display: String,
}

impl From<&Notice> for NoticeJson {
    fn from(notice: &Notice) -> Self {
        Self {
            level: notice.level,
            text: notice.text.clone(),
            display: notice.to_string(),
        }
    }
}

pub fn notices_json(notices: &[Notice]) -> Vec<NoticeJson> {
    notices.iter().map(NoticeJson::from).collect()
}

/// One frame worth of host state (JSON-deserializable)
#[derive(Debug, Deserialize)]
pub struct FrameInput {
    pub viewport: Viewport,
    /// Column-major world to clip space matrix of the game camera
    pub view_projection: Mat4,
    /// Advance and line height of the overlay font
    pub glyph_size: Vec2,
    /// Defaults to logged in with no conditions
    #[serde(default = "ClientSnapshot::in_world")]
    pub client: ClientSnapshot,
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Serialize)]
pub struct FrameOutput {
    pub stats: FrameStats,
    pub commands: Vec<DrawCommand>,
}

/// Target names pushed by the host whenever its targets change.
#[derive(Debug, Default)]
pub struct HostTargets {
    names: RwLock<TargetNames>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TargetNames {
    pub soft: Option<String>,
    pub hard: Option<String>,
}

impl HostTargets {
    pub fn replace(&self, names: TargetNames) {
        match self.names.write() {
            Ok(mut guard) => *guard = names,
            Err(_) => tracing::warn!("Target lock poisoned, dropping update"),
        }
    }
}

impl TargetSource for HostTargets {
    fn soft_target_name(&self) -> Option<String> {
        self.names.read().ok().and_then(|n| n.soft.clone())
    }

    fn hard_target_name(&self) -> Option<String> {
        self.names.read().ok().and_then(|n| n.hard.clone())
    }
}
