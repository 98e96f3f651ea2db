//! Minimal native engine used by `tests/native_engine.rs`.
//!
//! `startup` receives the asset directory and every entry point appends one
//! line to `calls.log` inside it. `pause` and `resume` are only exported when
//! built with `--cfg pause` and `--cfg resume`.

use std::ffi::{c_char, c_void, CStr};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

static ASSET_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);

fn record(line: &str) {
    let dir = ASSET_DIR.lock().unwrap();
    if let Some(dir) = dir.as_ref() {
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("calls.log"))
            .unwrap();
        writeln!(log, "{line}").unwrap();
    }
}

#[no_mangle]
pub unsafe extern "C" fn engine_startup(assets: *mut c_void) {
    let dir = CStr::from_ptr(assets.cast::<c_char>().cast_const())
        .to_string_lossy()
        .into_owned();
    *ASSET_DIR.lock().unwrap() = Some(PathBuf::from(dir));
    record("startup");
}

#[no_mangle]
pub extern "C" fn engine_shutdown() {
    record("shutdown");
}

#[no_mangle]
pub extern "C" fn engine_tick() {
    record("tick");
}

#[no_mangle]
pub extern "C" fn engine_surface_changed(width: i32, height: i32) {
    record(&format!("surface_changed {width} {height}"));
}

#[no_mangle]
pub extern "C" fn engine_set_display_density(density: f32) {
    record(&format!("set_display_density {density}"));
}

#[no_mangle]
pub extern "C" fn engine_set_status_bar_height(height: i32) {
    record(&format!("set_status_bar_height {height}"));
}

#[cfg(pause)]
#[no_mangle]
pub extern "C" fn engine_pause() {
    record("pause");
}

#[cfg(resume)]
#[no_mangle]
pub extern "C" fn engine_resume() {
    record("resume");
}
