//! The process-wide loader behind the free functions of the crate root.
//!
//! All calls are serialized through one mutex. Making a context current is
//! still a per-thread operation, so the bootstrap pair is only current on the
//! thread that called [`init`] first.

use crate::{
    instance::Instance,
    window::{Config, NativePlatform, Platform},
    ApiTable, Error,
};

use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::os::raw::c_void;

lazy_static! {
    static ref INSTANCE: Mutex<Instance<NativePlatform>> = Mutex::new(Instance::new());
}

/// See [`Instance::init`].
pub fn init(api: Option<&mut ApiTable>, config: Option<&Config>) -> Result<(), Error> {
    INSTANCE.lock().init(api, config)
}

/// See [`Instance::uninit`].
pub fn uninit() {
    INSTANCE.lock().uninit()
}

/// See [`Instance::bind`].
pub fn bind_api(api: Option<&ApiTable>) -> Result<(), Error> {
    INSTANCE.lock().bind(api)
}

/// See [`Instance::load_for_context`].
pub fn load_for_context(
    surface: <NativePlatform as Platform>::Surface,
    context: <NativePlatform as Platform>::Context,
    api: Option<&mut ApiTable>,
) -> Result<(), Error> {
    INSTANCE.lock().load_for_context(surface, context, api)
}

/// See [`Instance::load_for_current_context`].
pub fn load_for_current_context(api: Option<&mut ApiTable>) -> Result<(), Error> {
    INSTANCE.lock().load_for_current_context(api)
}

/// A copy of the bound table.
pub fn api() -> ApiTable {
    *INSTANCE.lock().api()
}

pub fn get_proc_address(name: &str) -> *const c_void {
    INSTANCE.lock().proc_address(name)
}

/// See [`Instance::is_extension_supported`].
pub fn is_extension_supported(api: Option<&ApiTable>, name: &str) -> bool {
    INSTANCE.lock().is_extension_supported(api, name)
}

/// Run `f` on the process-wide instance, e.g. to read the bootstrap handles.
///
/// `f` must not call back into the other functions of this module.
pub fn with_instance<T>(f: impl FnOnce(&Instance<NativePlatform>) -> T) -> T {
    f(&INSTANCE.lock())
}
