use once_cell::sync::Lazy;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Mutex;

use crate::backend::{LoaderBackend, PlatformLoader, ENTRY_POINT_NAME, VULKAN_LIBRARY_NAME};

/// Cached library handle plus resolved entry point, tied to one
/// loader backend.
///
/// The entry point is only ever `Some` while the handle is; `release`
/// clears both together. Failed opens cache nothing, so a later
/// `acquire` retries from scratch. A failed resolve keeps the handle,
/// so only the symbol lookup is retried.
pub struct DriverBinding<B: LoaderBackend> {
    backend: B,
    library: &'static str,
    symbol: &'static str,
    handle: Option<B::Handle>,
    entry: Option<NonNull<c_void>>,
}

// The cached entry is a code address inside the loaded library, not
// aliased data, so the binding moves between threads as freely as
// its handle does.
unsafe impl<B: LoaderBackend + Send> Send for DriverBinding<B> where B::Handle: Send {}

impl<B: LoaderBackend> DriverBinding<B> {
    pub fn new(backend: B, library: &'static str, symbol: &'static str) -> Self {
        return DriverBinding {
            backend,
            library,
            symbol,
            handle: None,
            entry: None,
        };
    }

    /// Load the library and resolve the entry point, reusing whatever
    /// is already cached. Idempotent after the first success.
    ///
    /// `None` collapses every failure ("library not found", "symbol
    /// not found") into one signal: the driver loader is unusable.
    pub fn acquire(&mut self) -> Option<NonNull<c_void>> {
        if let Some(entry) = self.entry {
            return Some(entry);
        }
        if self.handle.is_none() {
            self.handle = Some(self.backend.open(self.library)?);
        }
        let handle = self.handle.as_ref()?;
        let entry = self.backend.resolve(handle, self.symbol)?;
        self.entry = Some(entry);
        return Some(entry);
    }

    /// Unload the library and forget the entry point. Safe to call
    /// repeatedly or without a prior `acquire`.
    pub fn release(&mut self) {
        self.entry = None;
        if let Some(handle) = self.handle.take() {
            self.backend.close(handle);
        }
    }
}

impl DriverBinding<PlatformLoader> {
    /// Binding against the real OS loader and this platform's Vulkan
    /// library name.
    pub fn platform() -> Self {
        return Self::new(PlatformLoader, VULKAN_LIBRARY_NAME, ENTRY_POINT_NAME);
    }
}

impl<B: LoaderBackend> Drop for DriverBinding<B> {
    fn drop(&mut self) {
        self.release();
    }
}

// One binding per process. The mutex keeps concurrent acquire/release
// calls from racing on the cache; the contract is otherwise unchanged.
static DRIVER: Lazy<Mutex<DriverBinding<PlatformLoader>>> =
    Lazy::new(|| Mutex::new(DriverBinding::platform()));

/// Process-wide `vkGetInstanceProcAddr`, loading the Vulkan library
/// on first call. `None` means the driver loader is unusable on this
/// system.
pub fn acquire_entry_point() -> Option<NonNull<c_void>> {
    return DRIVER.lock().expect("driver binding mutex poisoned").acquire();
}

/// Unload the process-wide Vulkan library, if loaded. Call once at
/// shutdown, after the last use of any pointer obtained through the
/// entry point.
pub fn release_entry_point() {
    DRIVER.lock().expect("driver binding mutex poisoned").release();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct StubState {
        opens: Cell<u32>,
        resolves: Cell<u32>,
        closes: Cell<u32>,
        fail_open: Cell<bool>,
        fail_resolve: Cell<bool>,
    }

    struct StubLoader(Rc<StubState>);

    impl LoaderBackend for StubLoader {
        type Handle = ();

        fn open(&self, name: &str) -> Option<()> {
            self.0.opens.set(self.0.opens.get() + 1);
            if self.0.fail_open.get() || name != "testlib" {
                return None;
            }
            return Some(());
        }

        fn resolve(&self, _handle: &(), symbol: &str) -> Option<NonNull<c_void>> {
            self.0.resolves.set(self.0.resolves.get() + 1);
            if self.0.fail_resolve.get() || symbol != "testEntry" {
                return None;
            }
            return Some(sentinel());
        }

        fn close(&self, _handle: ()) {
            self.0.closes.set(self.0.closes.get() + 1);
        }
    }

    fn sentinel() -> NonNull<c_void> {
        static TARGET: u8 = 0;
        return NonNull::new(&TARGET as *const u8 as *mut u8 as *mut c_void).unwrap();
    }

    fn stub_binding() -> (Rc<StubState>, DriverBinding<StubLoader>) {
        let state = Rc::new(StubState::default());
        let binding = DriverBinding::new(StubLoader(state.clone()), "testlib", "testEntry");
        return (state, binding);
    }

    #[test]
    fn acquire_is_idempotent_and_caches() {
        let (state, mut binding) = stub_binding();
        let first = binding.acquire().unwrap();
        let second = binding.acquire().unwrap();
        assert_eq!(first, second);
        assert_eq!(state.opens.get(), 1);
        assert_eq!(state.resolves.get(), 1);
    }

    #[test]
    fn release_then_acquire_reopens() {
        let (state, mut binding) = stub_binding();
        binding.acquire().unwrap();
        binding.release();
        assert_eq!(state.closes.get(), 1);
        binding.acquire().unwrap();
        assert_eq!(state.opens.get(), 2);
        assert_eq!(state.resolves.get(), 2);
    }

    #[test]
    fn release_without_acquire_is_a_noop() {
        let (state, mut binding) = stub_binding();
        binding.release();
        assert_eq!(state.closes.get(), 0);
    }

    #[test]
    fn double_release_closes_once() {
        let (state, mut binding) = stub_binding();
        binding.acquire().unwrap();
        binding.release();
        binding.release();
        assert_eq!(state.closes.get(), 1);
    }

    #[test]
    fn failed_open_caches_nothing() {
        let (state, mut binding) = stub_binding();
        state.fail_open.set(true);
        assert!(binding.acquire().is_none());
        assert_eq!(state.opens.get(), 1);
        assert_eq!(state.resolves.get(), 0);

        // The next call retries the open from scratch.
        state.fail_open.set(false);
        assert!(binding.acquire().is_some());
        assert_eq!(state.opens.get(), 2);
    }

    #[test]
    fn failed_resolve_keeps_the_handle() {
        let (state, mut binding) = stub_binding();
        state.fail_resolve.set(true);
        assert!(binding.acquire().is_none());
        assert_eq!(state.opens.get(), 1);
        assert_eq!(state.resolves.get(), 1);

        // Retry resolves again without reopening the library.
        state.fail_resolve.set(false);
        assert!(binding.acquire().is_some());
        assert_eq!(state.opens.get(), 1);
        assert_eq!(state.resolves.get(), 2);
    }

    #[test]
    fn drop_closes_an_open_handle() {
        let (state, mut binding) = stub_binding();
        binding.acquire().unwrap();
        drop(binding);
        assert_eq!(state.closes.get(), 1);
    }

    #[test]
    fn drop_without_acquire_closes_nothing() {
        let (state, binding) = stub_binding();
        drop(binding);
        assert_eq!(state.closes.get(), 0);
    }

    // The process-wide pair must tolerate a release with nothing
    // loaded regardless of whether this machine has a Vulkan driver.
    #[test]
    fn global_release_before_acquire_is_safe() {
        release_entry_point();
        release_entry_point();
    }
}
