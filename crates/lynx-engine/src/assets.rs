use crate::EngineError;
use std::ffi::{c_void, CString};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Opaque handle to the host's asset provider, handed to the engine at startup.
///
/// The bridge never dereferences or frees it. A raw handle must be non-null;
/// a directory source keeps a NUL-terminated copy of its path alive so the
/// engine can read it for as long as the source exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSource {
    repr: Repr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Handle(NonZeroUsize),
    Directory { path: PathBuf, c_path: CString },
}

impl AssetSource {
    /// Wrap a host-owned handle, such as a platform asset manager pointer.
    pub fn from_raw(handle: *mut c_void) -> Result<Self, EngineError> {
        let raw = NonZeroUsize::new(handle as usize)
            .ok_or_else(|| EngineError::InvalidAssetSource("null handle".to_owned()))?;
        Ok(Self {
            repr: Repr::Handle(raw),
        })
    }

    /// Use a directory on disk as the asset root (desktop hosts).
    pub fn directory(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        if !path.is_dir() {
            return Err(EngineError::InvalidAssetSource(format!(
                "'{}' is not a directory",
                path.display()
            )));
        }
        let c_path = CString::new(path.as_os_str().as_encoded_bytes()).map_err(|_| {
            EngineError::InvalidAssetSource(format!(
                "'{}' contains an interior NUL byte",
                path.display()
            ))
        })?;
        Ok(Self {
            repr: Repr::Directory { path, c_path },
        })
    }

    /// The value passed across the native boundary.
    pub fn as_ptr(&self) -> *mut c_void {
        match &self.repr {
            Repr::Handle(raw) => raw.get() as *mut c_void,
            Repr::Directory { c_path, .. } => c_path.as_ptr().cast_mut().cast(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.repr {
            Repr::Handle(_) => None,
            Repr::Directory { path, .. } => Some(path),
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Handle(raw) => write!(f, "handle:{:#x}", raw.get()),
            Repr::Directory { path, .. } => write!(f, "dir:{}", path.display()),
        }
    }
}
