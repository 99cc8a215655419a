//! Platform bootstrap: the disposable surface and context needed to make
//! entry points resolvable.

use crate::{ApiTable, Error};

use std::{
    ffi::{CStr, CString},
    fmt,
    os::raw::c_void,
};

use raw_window_handle::RawWindowHandle;

#[cfg(wgl)]
pub mod wgl;

#[cfg(glx)]
pub mod glx;

#[cfg(dummy)]
pub mod dummy;

#[cfg(wgl)]
pub use self::wgl::WglPlatform as NativePlatform;

#[cfg(glx)]
pub use self::glx::GlxPlatform as NativePlatform;

#[cfg(dummy)]
pub use self::dummy::Unsupported as NativePlatform;

/// Configuration of the bootstrap surface and context.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// Request a single-buffered pixel format. Defaults to double buffering.
    pub single_buffered: bool,
    /// An existing native window to reuse.
    ///
    /// With WGL the window itself is reused instead of creating a hidden
    /// one. With GLX only the display connection of an Xlib handle is reused;
    /// the 1x1 bootstrap window is still created on it.
    pub window: Option<RawWindowHandle>,
}

/// A surface/context pair, as made current by [`Platform::make_current`].
pub type Current<P> = (<P as Platform>::Surface, <P as Platform>::Context);

/// One way of bootstrapping a rendering context.
///
/// Exactly one implementation is compiled in per target and exported as
/// [`NativePlatform`]; the lifecycle and table loading code is written
/// against this trait only.
pub trait Platform: Sized {
    /// The drawing surface a context is made current against.
    type Surface: Copy + PartialEq + fmt::Debug;
    /// The rendering context handle.
    type Context: Copy + PartialEq + fmt::Debug;

    /// Open the native libraries and resolve the entry points needed to
    /// create, destroy and query contexts.
    ///
    /// On failure everything opened so far is released.
    fn open() -> Result<Self, Error>;

    /// Create the bootstrap surface and context.
    ///
    /// On failure whatever was created is destroyed before returning.
    fn create(&mut self, config: &Config) -> Result<Current<Self>, Error>;

    /// Destroy the bootstrap surface and context, in reverse creation order.
    ///
    /// Calling it when nothing exists is a no-op.
    fn destroy(&mut self);

    /// Make `target` current on the calling thread, or release the current
    /// context when `target` is `None`.
    fn make_current(&self, target: Option<Current<Self>>) -> Result<(), Error>;

    /// The pair current on the calling thread, if any.
    fn current(&self) -> Option<Current<Self>>;

    /// Resolve `name` through the context-specific resolver. Null if the
    /// resolver is unavailable or does not know the name.
    fn proc_address(&self, name: &CStr) -> *const c_void;

    /// Resolve `name` from the opened GL library. Null if absent.
    fn library_symbol(&self, name: &CStr) -> *const c_void;

    /// The platform extension string, taking the query function from `api`
    /// when it is resolved there.
    fn platform_extensions(&self, api: &ApiTable) -> Option<CString>;
}
