
// Exactly one backend exists per build. Targets without a
// known Vulkan loader refuse to compile rather than fail at
// runtime.
#[cfg(any(target_os = "linux", target_os = "android"))]
mod unix;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use unix::PlatformLoader;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use windows::PlatformLoader;

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "windows")))]
compile_error!("vkbind: no Vulkan loader backend for this target OS");

// Loader library name per platform. Android ships it unversioned.
#[cfg(target_os = "linux")]
pub const VULKAN_LIBRARY_NAME: &str = "libvulkan.so.1";
#[cfg(target_os = "android")]
pub const VULKAN_LIBRARY_NAME: &str = "libvulkan.so";
#[cfg(target_os = "windows")]
pub const VULKAN_LIBRARY_NAME: &str = "vulkan-1.dll";

/// The one symbol every loader exports; all other Vulkan
/// functions are reached through it.
pub const ENTRY_POINT_NAME: &str = "vkGetInstanceProcAddr";

use std::ffi::c_void;
use std::ptr::NonNull;

/// What the binding needs from an OS dynamic-library loader.
///
/// Failure detail stays inside the backend (logged at debug
/// level); callers only see "unavailable".
pub trait LoaderBackend {
    type Handle;

    /// Open a shared library by name, searching the default
    /// system paths.
    fn open(&self, name: &str) -> Option<Self::Handle>;

    /// Resolve a function address by symbol name within an
    /// open library.
    fn resolve(&self, handle: &Self::Handle, symbol: &str) -> Option<NonNull<c_void>>;

    /// Unload the library. The handle and anything resolved
    /// from it are dead afterwards.
    fn close(&self, handle: Self::Handle);
}
