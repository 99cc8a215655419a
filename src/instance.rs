//! Reference-counted ownership of the bootstrap state.

use crate::{
    context,
    extension,
    resolve::resolve,
    window::{Config, Platform},
    ApiTable, Error,
};

use std::{ffi::CString, fmt, os::raw::c_void, ptr};

/// Everything acquired on the first `init`, released on the last `uninit`.
struct Bootstrap<P: Platform> {
    platform: P,
    surface: P::Surface,
    context: P::Context,
    config: Config,
}

impl<P: Platform> Bootstrap<P> {
    fn acquire(config: Config) -> Result<Self, Error> {
        let mut platform = P::open()?;
        let (surface, context) = platform.create(&config)?;
        let bootstrap = Bootstrap {
            platform,
            surface,
            context,
            config,
        };
        // Dropping `bootstrap` on failure destroys the pair and the libraries.
        bootstrap
            .platform
            .make_current(Some((surface, context)))?;
        Ok(bootstrap)
    }
}

impl<P: Platform> Drop for Bootstrap<P> {
    fn drop(&mut self) {
        log::debug!("Destroying bootstrap context {:?}", self.context);
        self.platform.destroy();
    }
}

/// The loader state: a reference count, the bootstrap surface/context pair
/// with the libraries it came from, and the bound table.
///
/// Every successful [`init`](Instance::init) must be paired with one
/// [`uninit`](Instance::uninit). The bootstrap state exists exactly while
/// the count is above zero.
pub struct Instance<P: Platform> {
    count: usize,
    bootstrap: Option<Bootstrap<P>>,
    bound: ApiTable,
}

unsafe impl<P: Platform + Send> Send for Instance<P> {}

impl<P: Platform> Default for Instance<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform + fmt::Debug> fmt::Debug for Instance<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Instance")
            .field("count", &self.count)
            .field("platform", &self.platform())
            .field("bound", &self.bound)
            .finish()
    }
}

impl<P: Platform> Instance<P> {
    /// An uninitialized instance. Nothing is opened until `init`.
    pub fn new() -> Self {
        Instance {
            count: 0,
            bootstrap: None,
            bound: ApiTable::EMPTY,
        }
    }

    /// Acquire the loader, filling `api` with the entry points of the
    /// bootstrap context.
    ///
    /// The first call opens the libraries, creates the bootstrap surface and
    /// context, makes them current and binds the loaded entry points. Later
    /// calls only load into `api`. `config` is only looked at by the first
    /// call. On failure the count is unchanged and nothing acquired by this
    /// call is left behind.
    pub fn init(&mut self, api: Option<&mut ApiTable>, config: Option<&Config>) -> Result<(), Error> {
        let first = self.count == 0;
        if first {
            let config = config.cloned().unwrap_or_default();
            log::info!("Initializing the loader with {:?}", config);
            self.bootstrap = Some(Bootstrap::acquire(config)?);
        }

        match self.load_bootstrap(api, first) {
            Ok(()) => {
                self.count += 1;
                Ok(())
            }
            Err(e) => {
                if first {
                    log::warn!("Rolling back initialization: {}", e);
                    self.bound = ApiTable::EMPTY;
                    self.bootstrap = None;
                }
                Err(e)
            }
        }
    }

    fn load_bootstrap(&mut self, api: Option<&mut ApiTable>, bind: bool) -> Result<(), Error> {
        let bootstrap = self.bootstrap.as_ref().ok_or(Error::NotInitialized)?;
        let mut temporary = ApiTable::EMPTY;
        let out = api.unwrap_or(&mut temporary);
        context::load_for_context(&bootstrap.platform, bootstrap.surface, bootstrap.context, out)?;
        if bind {
            self.bound = *out;
        }
        Ok(())
    }

    /// Release one `init`. The last release destroys the bootstrap pair,
    /// clears the bound table and closes the libraries.
    pub fn uninit(&mut self) {
        match self.count {
            0 => {}
            1 => {
                self.count = 0;
                self.bound = ApiTable::EMPTY;
                self.bootstrap = None;
                log::info!("Loader shut down");
            }
            _ => self.count -= 1,
        }
    }

    /// Fill `api` against an arbitrary surface/context pair.
    ///
    /// The pair current on this thread is restored afterwards, including
    /// when nothing was current.
    pub fn load_for_context(
        &self,
        surface: P::Surface,
        context: P::Context,
        api: Option<&mut ApiTable>,
    ) -> Result<(), Error> {
        let out = api.ok_or(Error::InvalidArgument)?;
        let bootstrap = self.bootstrap.as_ref().ok_or(Error::NotInitialized)?;
        context::load_for_context(&bootstrap.platform, surface, context, out)
    }

    /// Fill `api` from whatever context is current on this thread.
    pub fn load_for_current_context(&self, api: Option<&mut ApiTable>) -> Result<(), Error> {
        let out = api.ok_or(Error::InvalidArgument)?;
        let bootstrap = self.bootstrap.as_ref().ok_or(Error::NotInitialized)?;
        context::load_current(&bootstrap.platform, out);
        Ok(())
    }

    /// Publish `api` as the bound table.
    ///
    /// With `None`, the entry points of the bootstrap context are loaded and
    /// bound, which requires a prior `init`.
    pub fn bind(&mut self, api: Option<&ApiTable>) -> Result<(), Error> {
        match api {
            Some(api) => {
                self.bound = *api;
                Ok(())
            }
            None => {
                let bootstrap = self.bootstrap.as_ref().ok_or(Error::NotInitialized)?;
                let mut temporary = ApiTable::EMPTY;
                context::load_for_context(
                    &bootstrap.platform,
                    bootstrap.surface,
                    bootstrap.context,
                    &mut temporary,
                )?;
                self.bound = temporary;
                Ok(())
            }
        }
    }

    /// The bound table.
    pub fn api(&self) -> &ApiTable {
        &self.bound
    }

    /// Resolve a single entry point with the two-tier resolver. Null when
    /// uninitialized, unknown, or `name` contains a nul byte.
    pub fn proc_address(&self, name: &str) -> *const c_void {
        let platform = match self.platform() {
            Some(platform) => platform,
            None => return ptr::null(),
        };
        match CString::new(name) {
            Ok(name) => resolve(platform, &name),
            Err(_) => ptr::null(),
        }
    }

    /// Whether `name` is supported by the context `api` was loaded from,
    /// the bound table if `None`.
    pub fn is_extension_supported(&self, api: Option<&ApiTable>, name: &str) -> bool {
        extension::is_supported(self.platform(), api.unwrap_or(&self.bound), name)
    }

    pub fn platform(&self) -> Option<&P> {
        self.bootstrap.as_ref().map(|b| &b.platform)
    }

    pub fn surface(&self) -> Option<P::Surface> {
        self.bootstrap.as_ref().map(|b| b.surface)
    }

    pub fn context(&self) -> Option<P::Context> {
        self.bootstrap.as_ref().map(|b| b.context)
    }

    /// The configuration the bootstrap pair was created with.
    pub fn config(&self) -> Option<&Config> {
        self.bootstrap.as_ref().map(|b| &b.config)
    }

    pub fn init_count(&self) -> usize {
        self.count
    }

    pub fn is_initialized(&self) -> bool {
        self.count > 0
    }
}

impl<P: Platform> Drop for Instance<P> {
    fn drop(&mut self) {
        if self.count > 0 {
            log::warn!("Dropping the loader with {} outstanding init(s)", self.count);
        }
        self.bound = ApiTable::EMPTY;
        self.bootstrap = None;
    }
}
