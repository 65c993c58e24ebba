use libloading::os::windows::Library;
use std::ffi::c_void;
use std::ptr::NonNull;

use super::LoaderBackend;

type EntryFn = unsafe extern "system" fn();

/// `LoadLibrary`-family backend for Windows.
pub struct PlatformLoader;

impl LoaderBackend for PlatformLoader {
    type Handle = Library;

    fn open(&self, name: &str) -> Option<Library> {
        // Default LoadLibraryExW search order, i.e. the system paths.
        return match unsafe { Library::new(name) } {
            Ok(lib) => Some(lib),
            Err(e) => {
                log::debug!("LoadLibrary({}) failed: {}", name, e);
                None
            }
        };
    }

    fn resolve(&self, handle: &Library, symbol: &str) -> Option<NonNull<c_void>> {
        let sym = match unsafe { handle.get::<EntryFn>(symbol.as_bytes()) } {
            Ok(sym) => sym,
            Err(e) => {
                log::debug!("GetProcAddress({}) failed: {}", symbol, e);
                return None;
            }
        };
        return NonNull::new(*sym as *mut c_void);
    }

    fn close(&self, handle: Library) {
        if let Err(e) = handle.close() {
            log::warn!("FreeLibrary failed: {}", e);
        }
    }
}
