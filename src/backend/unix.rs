use libloading::os::unix::{Library, RTLD_LAZY, RTLD_LOCAL};
use std::ffi::c_void;
use std::ptr::NonNull;

use super::LoaderBackend;

// Signature is irrelevant here; the entry point is handed back
// as an opaque address for the caller to cast.
type EntryFn = unsafe extern "system" fn();

/// `dlopen`-family backend for Linux and Android.
pub struct PlatformLoader;

impl LoaderBackend for PlatformLoader {
    type Handle = Library;

    fn open(&self, name: &str) -> Option<Library> {
        // RTLD_LAZY | RTLD_LOCAL: bind symbols on first use and
        // keep them out of the global namespace.
        return match unsafe { Library::open(Some(name), RTLD_LAZY | RTLD_LOCAL) } {
            Ok(lib) => Some(lib),
            Err(e) => {
                log::debug!("dlopen({}) failed: {}", name, e);
                None
            }
        };
    }

    fn resolve(&self, handle: &Library, symbol: &str) -> Option<NonNull<c_void>> {
        let sym = match unsafe { handle.get::<EntryFn>(symbol.as_bytes()) } {
            Ok(sym) => sym,
            Err(e) => {
                log::debug!("dlsym({}) failed: {}", symbol, e);
                return None;
            }
        };
        return NonNull::new(*sym as *mut c_void);
    }

    fn close(&self, handle: Library) {
        if let Err(e) = handle.close() {
            log::warn!("dlclose failed: {}", e);
        }
    }
}
