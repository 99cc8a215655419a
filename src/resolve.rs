use crate::window::Platform;

use std::{ffi::CStr, os::raw::c_void};

/// Resolve one entry point by name.
///
/// The context-specific resolver of the platform is asked first. When it
/// yields nothing, the symbol is looked up directly in the GL library.
/// Returns null when neither knows the name.
pub fn resolve<P: Platform>(platform: &P, name: &CStr) -> *const c_void {
    let address = platform.proc_address(name);
    if !address.is_null() {
        return address;
    }
    let address = platform.library_symbol(name);
    if address.is_null() {
        log::trace!("Unable to resolve {:?}", name);
    }
    address
}
