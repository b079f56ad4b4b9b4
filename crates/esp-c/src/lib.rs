//! C FFI bindings for esp-core
//!
//! This crate exposes the overlay's search, command, IPC and frame layout
//! entry points over a C ABI so a game-side host (a plugin loader, a script
//! runtime, a test harness) can drive them.
//!
//! All functions return a pointer to a heap-allocated `EspResult` struct containing
//! success status and either data (as JSON string) or an error message.
//! Memory must be freed using `esp_free_result`.

use std::ffi::{CStr, CString, c_char};
use std::sync::RwLock;

mod ffi_types;

use esp_core::{
    DrawList, LatestStatus, Notice, OverlayConfig, OverlayRenderer, PvpWatch, SearchController,
    ViewProjection,
};
use ffi_types::{
    EspResult, FrameInput, FrameOutput, HostTargets, InitOptions, NoticeJson, TargetNames,
    notices_json,
};
use mimalloc::MiMalloc;
use once_cell::sync::Lazy;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

struct EspRuntime {
    controller: SearchController<LatestStatus, HostTargets>,
    config: OverlayConfig,
    pvp: PvpWatch,
}

static RUNTIME: Lazy<RwLock<Option<EspRuntime>>> = Lazy::new(|| RwLock::new(None));

const NOT_INITIALIZED: &str = "Overlay not initialized, call esp_init first";

/// Helper to convert C string to Rust &str.
///
/// Returns `None` if the pointer is null or the string is not valid UTF-8.
unsafe fn cstr_to_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(s).to_str().ok() }
    }
}

/// Runs `f` against the live runtime under the shared lock.
fn with_runtime(f: impl FnOnce(&EspRuntime) -> *mut EspResult) -> *mut EspResult {
    let runtime = match RUNTIME.read() {
        Ok(r) => r,
        Err(e) => return EspResult::err(&format!("Failed to acquire runtime lock: {}", e)),
    };
    match runtime.as_ref() {
        Some(runtime) => f(runtime),
        None => EspResult::err(NOT_INITIALIZED),
    }
}

/// Initialize the overlay with the given options (JSON string)
///
/// Any previous runtime is dropped and the search starts empty.
///
/// # Safety
/// `opts_json` must be a valid null-terminated UTF-8 string or null for defaults
#[unsafe(no_mangle)]
pub unsafe extern "C" fn esp_init(opts_json: *const c_char) -> *mut EspResult {
    let opts: InitOptions = match unsafe { cstr_to_str(opts_json) } {
        None => InitOptions::default(),
        Some(raw) => match serde_json::from_str(raw) {
            Ok(o) => o,
            Err(e) => return EspResult::err(&format!("Failed to parse options: {}", e)),
        },
    };

    let config = match (opts.config_path, opts.config) {
        (Some(path), _) => match OverlayConfig::load_or_default(&path) {
            Ok(config) => config,
            Err(e) => return EspResult::err(&e.to_string()),
        },
        (None, Some(config)) => config,
        (None, None) => OverlayConfig::default(),
    };

    let mut runtime = match RUNTIME.write() {
        Ok(r) => r,
        Err(e) => return EspResult::err(&format!("Failed to acquire runtime lock: {}", e)),
    };

    let controller =
        SearchController::with_empty_search(LatestStatus::new(), HostTargets::default());
    tracing::info!(hide_in_pvp = config.hide_in_pvp, "Overlay initialized");
    *runtime = Some(EspRuntime {
        controller,
        config,
        pvp: PvpWatch::new(),
    });

    EspResult::ok_empty()
}

/// Destroy the runtime and forget the active search
#[unsafe(no_mangle)]
pub extern "C" fn esp_destroy() -> *mut EspResult {
    if let Ok(mut runtime) = RUNTIME.write() {
        *runtime = None;
    }

    EspResult::ok_empty()
}

/// Start writing logs to `log_file_path`; returns the path as JSON string
///
/// # Safety
/// `log_file_path` must be a valid null-terminated UTF-8 string.
/// `log_level` may be null, in which case the config level or "info" is used.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn esp_init_tracing(
    log_file_path: *const c_char,
    log_level: *const c_char,
) -> *mut EspResult {
    let path = match unsafe { cstr_to_str(log_file_path) } {
        Some(s) => s,
        None => return EspResult::err("Log file path is null or invalid UTF-8"),
    };

    let configured_level = RUNTIME
        .read()
        .ok()
        .and_then(|r| r.as_ref().map(|r| r.config.log_level.clone()));
    let level = unsafe { cstr_to_str(log_level) }
        .map(str::to_string)
        .or(configured_level);

    match esp_core::log::init_tracing(path, level.as_deref()) {
        Ok(path) => {
            esp_core::log::install_panic_hook();
            EspResult::ok_json(&path.to_string_lossy())
        }
        Err(e) => EspResult::err(&e.to_string()),
    }
}

/// Call an IPC endpoint by name, e.g. "XivEsp.SetGlob"
///
/// Data is the JSON reply: a string, a boolean, or null for setters.
///
/// # Safety
/// `endpoint` must be a valid null-terminated UTF-8 string.
/// `payload` may be null for endpoints that take no argument.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn esp_ipc_call(
    endpoint: *const c_char,
    payload: *const c_char,
) -> *mut EspResult {
    let endpoint = match unsafe { cstr_to_str(endpoint) } {
        Some(s) => s,
        None => return EspResult::err("Endpoint is null or invalid UTF-8"),
    };
    let payload = unsafe { cstr_to_str(payload) };

    with_runtime(
        |runtime| match runtime.controller.ipc_call_by_name(endpoint, payload) {
            Ok(reply) => EspResult::ok_json(&reply),
            Err(e) => EspResult::err(&e.to_string()),
        },
    )
}

/// Run one chat command line, e.g. "/espg Gua*"
///
/// Data is a JSON array of notices to show the user. Command failures are
/// reported as notices, so this only fails when the runtime is missing.
///
/// # Safety
/// `line` must be a valid null-terminated UTF-8 string
#[unsafe(no_mangle)]
pub unsafe extern "C" fn esp_run_command(line: *const c_char) -> *mut EspResult {
    let line = match unsafe { cstr_to_str(line) } {
        Some(s) => s,
        None => return EspResult::err("Command line is null or invalid UTF-8"),
    };

    with_runtime(|runtime| {
        let notices = runtime.controller.run_line(line);
        EspResult::ok_json(&notices_json(&notices))
    })
}

/// Update the soft and hard target names used by "/espt"
///
/// # Safety
/// `targets_json` must be a valid null-terminated UTF-8 string like
/// `{"soft": "Goblin", "hard": null}`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn esp_set_targets(targets_json: *const c_char) -> *mut EspResult {
    let raw = match unsafe { cstr_to_str(targets_json) } {
        Some(s) => s,
        None => return EspResult::err("Targets JSON is null or invalid UTF-8"),
    };
    let names: TargetNames = match serde_json::from_str(raw) {
        Ok(n) => n,
        Err(e) => return EspResult::err(&format!("Failed to parse targets: {}", e)),
    };

    with_runtime(|runtime| {
        runtime.controller.targets().replace(names);
        EspResult::ok_empty()
    })
}

/// Current status bar indicator as JSON, null before the first update
#[unsafe(no_mangle)]
pub extern "C" fn esp_status() -> *mut EspResult {
    with_runtime(|runtime| EspResult::ok_json(&runtime.controller.status().get()))
}

/// Handle a click on the status indicator; returns notices as JSON
#[unsafe(no_mangle)]
pub extern "C" fn esp_status_click() -> *mut EspResult {
    with_runtime(|runtime| EspResult::ok_json(&notices_json(&runtime.controller.click_status())))
}

/// Report the client's login and PvP state once per frame or territory change
///
/// Data is a notice object when the player just entered PvP, otherwise null.
#[unsafe(no_mangle)]
pub extern "C" fn esp_observe_pvp(logged_in: bool, in_pvp: bool) -> *mut EspResult {
    let mut runtime = match RUNTIME.write() {
        Ok(r) => r,
        Err(e) => return EspResult::err(&format!("Failed to acquire runtime lock: {}", e)),
    };
    let Some(runtime) = runtime.as_mut() else {
        return EspResult::err(NOT_INITIALIZED);
    };

    let notice = runtime
        .pvp
        .observe(logged_in, in_pvp)
        .then(|| NoticeJson::from(&Notice::entered_pvp(runtime.config.hide_in_pvp)));
    EspResult::ok_json(&notice)
}

/// Lay out one frame of markers and labels
///
/// Takes a JSON `FrameInput` and returns `{"stats": ..., "commands": [...]}`
/// where commands are the draw calls in paint order.
///
/// # Safety
/// `frame_json` must be a valid null-terminated UTF-8 string
#[unsafe(no_mangle)]
pub unsafe extern "C" fn esp_render_frame(frame_json: *const c_char) -> *mut EspResult {
    let raw = match unsafe { cstr_to_str(frame_json) } {
        Some(s) => s,
        None => return EspResult::err("Frame JSON is null or invalid UTF-8"),
    };
    let input: FrameInput = match serde_json::from_str(raw) {
        Ok(f) => f,
        Err(e) => return EspResult::err(&format!("Failed to parse frame: {}", e)),
    };

    with_runtime(|runtime| {
        let projector = ViewProjection::new(input.view_projection, input.viewport);
        let renderer = OverlayRenderer::new(
            runtime.controller.search().clone(),
            input.entities,
            projector,
            input.client,
            &runtime.config,
        );

        let mut canvas = DrawList::new(input.viewport, input.glyph_size);
        match renderer.render_frame(&mut canvas) {
            Ok(stats) => EspResult::ok_json(&FrameOutput {
                stats,
                commands: canvas.into_commands(),
            }),
            Err(e) => EspResult::err(&e.to_string()),
        }
    })
}

/// Free a result returned by any esp_* function
///
/// # Safety
/// `result_ptr` must be a valid pointer returned by an esp_* function
#[unsafe(no_mangle)]
pub unsafe extern "C" fn esp_free_result(result_ptr: *mut EspResult) {
    if result_ptr.is_null() {
        return;
    }

    unsafe {
        let result = Box::from_raw(result_ptr);
        if !result.data.is_null() {
            drop(CString::from_raw(result.data));
        }
        if !result.error.is_null() {
            drop(CString::from_raw(result.error));
        }
    }
}
