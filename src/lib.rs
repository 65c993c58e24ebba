//! Lazy binding to the platform's Vulkan loader library.
//!
//! Opens the system loader (`libvulkan.so.1`, `libvulkan.so` or
//! `vulkan-1.dll`, picked at compile time), resolves
//! `vkGetInstanceProcAddr` and caches both for the life of the process.
//! Dispatching every other Vulkan function through the returned entry
//! point is the caller's job.

mod backend;
mod binding;

pub use backend::{LoaderBackend, PlatformLoader, ENTRY_POINT_NAME, VULKAN_LIBRARY_NAME};
pub use binding::{acquire_entry_point, release_entry_point, DriverBinding};
