//! Runtime loader for OpenGL entry points.
//!
//! Entry points are resolved from the system GL library, first through the
//! context-specific `*GetProcAddress` of the windowing platform and then as
//! plain library symbols. A small hidden surface and legacy context are
//! created during [`init`] so that resolution works before the application
//! has a context of its own.
//!
//! Tables can be loaded per context into caller-owned [`ApiTable`]s, or bound
//! once into the process-wide table returned by [`api()`].
//!
//! ```no_run
//! let mut table = gfx_gl_loader::ApiTable::default();
//! gfx_gl_loader::init(Some(&mut table), None)?;
//! if gfx_gl_loader::is_extension_supported(Some(&table), "GL_ARB_debug_output") {
//!     // ...
//! }
//! gfx_gl_loader::uninit();
//! # Ok::<(), gfx_gl_loader::Error>(())
//! ```

#![allow(missing_docs, missing_copy_implementations)]

pub mod api;
pub mod context;
mod error;
pub mod extension;
mod global;
mod instance;
pub mod library;
pub mod resolve;
pub mod util;
pub mod window;

pub use crate::api::{ApiTable, Symbol};
pub use crate::error::{Error, ErrorCode};
pub use crate::global::{
    api, bind_api, get_proc_address, init, is_extension_supported, load_for_context,
    load_for_current_context, uninit, with_instance,
};
pub use crate::instance::Instance;
pub use crate::window::{Config, Current, NativePlatform, Platform};
