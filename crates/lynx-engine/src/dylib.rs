use crate::native::NativeEngine;
use crate::{AssetSource, EngineError};
use std::ffi::{c_void, CStr, CString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

type StartupFn = unsafe extern "C" fn(*mut c_void);
type VoidFn = unsafe extern "C" fn();
type SurfaceChangedFn = unsafe extern "C" fn(i32, i32);
type DensityFn = unsafe extern "C" fn(f32);
type StatusBarFn = unsafe extern "C" fn(i32);

struct EntryPoints {
    startup: StartupFn,
    shutdown: VoidFn,
    tick: VoidFn,
    surface_changed: SurfaceChangedFn,
    set_display_density: DensityFn,
    set_status_bar_height: StatusBarFn,
    pause: Option<VoidFn>,
    resume: Option<VoidFn>,
}

impl EntryPoints {
    #[allow(unsafe_code)]
    fn resolve(handle: *mut c_void, prefix: &str) -> Result<Self, EngineError> {
        let required = |suffix: &str| {
            let name = format!("{prefix}{suffix}");
            lookup(handle, &name).ok_or(EngineError::MissingSymbol(name))
        };
        let optional = |suffix: &str| lookup(handle, &format!("{prefix}{suffix}"));

        let startup = required("startup")?;
        let shutdown = required("shutdown")?;
        let tick = required("tick")?;
        let surface_changed = required("surface_changed")?;
        let set_display_density = required("set_display_density")?;
        let set_status_bar_height = required("set_status_bar_height")?;
        let pause = optional("pause");
        let resume = optional("resume");

        // SAFETY: every symbol is non-null and exported by the engine ABI with
        // exactly the signature it is transmuted to.
        unsafe {
            Ok(Self {
                startup: std::mem::transmute::<*mut c_void, StartupFn>(startup),
                shutdown: std::mem::transmute::<*mut c_void, VoidFn>(shutdown),
                tick: std::mem::transmute::<*mut c_void, VoidFn>(tick),
                surface_changed: std::mem::transmute::<*mut c_void, SurfaceChangedFn>(
                    surface_changed,
                ),
                set_display_density: std::mem::transmute::<*mut c_void, DensityFn>(
                    set_display_density,
                ),
                set_status_bar_height: std::mem::transmute::<*mut c_void, StatusBarFn>(
                    set_status_bar_height,
                ),
                pause: pause.map(|p| std::mem::transmute::<*mut c_void, VoidFn>(p)),
                resume: resume.map(|p| std::mem::transmute::<*mut c_void, VoidFn>(p)),
            })
        }
    }
}

#[allow(unsafe_code)]
fn lookup(handle: *mut c_void, name: &str) -> Option<*mut c_void> {
    let c_name = CString::new(name).ok()?;
    // SAFETY: `handle` comes from a successful dlopen that has not been closed,
    // and `c_name` is NUL-terminated for the duration of the call.
    let symbol = unsafe { libc::dlsym(handle, c_name.as_ptr()) };
    (!symbol.is_null()).then_some(symbol)
}

#[allow(unsafe_code)]
fn last_dl_error() -> String {
    // SAFETY: dlerror returns null or a NUL-terminated, thread-local message
    // that stays valid until the next dl* call on this thread.
    let message = unsafe { libc::dlerror() };
    if message.is_null() {
        "unknown dynamic loader error".to_owned()
    } else {
        // SAFETY: non-null pointer from dlerror, see above.
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    }
}

/// A loaded engine library with every entry point already resolved.
///
/// Opening is the only fallible step: a library that loads but lacks a
/// required entry point is rejected here, never at call time.
pub struct NativeLibrary {
    path: PathBuf,
    prefix: String,
    handle: *mut c_void,
    entry: EntryPoints,
}

// SAFETY: the handle is only used by dlclose in Drop, and the entry points are
// plain function pointers. The engine ABI requires its entry points to be
// callable from whichever thread drives the lifecycle.
#[allow(unsafe_code)]
unsafe impl Send for NativeLibrary {}
#[allow(unsafe_code)]
unsafe impl Sync for NativeLibrary {}

impl NativeLibrary {
    #[allow(unsafe_code)]
    pub fn open(path: &Path, prefix: &str) -> Result<Arc<Self>, EngineError> {
        let shown = path.display().to_string();
        let c_path = CString::new(path.as_os_str().as_encoded_bytes()).map_err(|_| {
            EngineError::LibraryLoad {
                path: shown.clone(),
                reason: "path contains an interior NUL byte".to_owned(),
            }
        })?;

        // SAFETY: `c_path` is a valid NUL-terminated string. Loading runs the
        // library's initializers, which is the point of attaching the engine.
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return Err(EngineError::LibraryLoad {
                path: shown,
                reason: last_dl_error(),
            });
        }

        let entry = match EntryPoints::resolve(handle, prefix) {
            Ok(entry) => entry,
            Err(e) => {
                // SAFETY: handle is open and no function pointers escape.
                unsafe { libc::dlclose(handle) };
                return Err(e);
            }
        };

        info!(
            "attached native engine {shown} (prefix '{prefix}', pause: {}, resume: {})",
            entry.pause.is_some(),
            entry.resume.is_some()
        );
        Ok(Arc::new(Self {
            path: path.to_path_buf(),
            prefix: prefix.to_owned(),
            handle,
            entry,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn has_pause(&self) -> bool {
        self.entry.pause.is_some()
    }

    pub fn has_resume(&self) -> bool {
        self.entry.resume.is_some()
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .field("prefix", &self.prefix)
            .field("pause", &self.entry.pause.is_some())
            .field("resume", &self.entry.resume.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for NativeLibrary {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        debug!("unloading native engine {}", self.path.display());
        // SAFETY: the last DylibEngine holding an Arc is gone, so no entry
        // point can be called after this.
        unsafe {
            libc::dlclose(self.handle);
        }
    }
}

/// `NativeEngine` backed by a loaded shared library.
pub struct DylibEngine {
    library: Arc<NativeLibrary>,
}

impl DylibEngine {
    pub fn new(library: &Arc<NativeLibrary>) -> Self {
        Self {
            library: Arc::clone(library),
        }
    }
}

// SAFETY (all calls below): the pointers were resolved against the ABI when
// the library was opened, and the library stays loaded while `self.library`
// holds its Arc.
#[allow(unsafe_code)]
impl NativeEngine for DylibEngine {
    fn name(&self) -> &'static str {
        "dylib"
    }

    fn startup(&mut self, assets: Option<&AssetSource>) {
        let ptr = assets.map_or(std::ptr::null_mut(), AssetSource::as_ptr);
        unsafe { (self.library.entry.startup)(ptr) }
    }

    fn shutdown(&mut self) {
        unsafe { (self.library.entry.shutdown)() }
    }

    fn tick(&mut self) {
        unsafe { (self.library.entry.tick)() }
    }

    fn surface_changed(&mut self, width: i32, height: i32) {
        unsafe { (self.library.entry.surface_changed)(width, height) }
    }

    fn set_display_density(&mut self, density: f32) {
        unsafe { (self.library.entry.set_display_density)(density) }
    }

    fn set_status_bar_height(&mut self, height: i32) {
        unsafe { (self.library.entry.set_status_bar_height)(height) }
    }

    fn pause(&mut self) {
        if let Some(pause) = self.library.entry.pause {
            unsafe { pause() }
        }
    }

    fn resume(&mut self) {
        if let Some(resume) = self.library.entry.resume {
            unsafe { resume() }
        }
    }
}
