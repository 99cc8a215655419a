//! A scripted platform living in thread-local state, so that every test gets
//! its own fake windowing system.

#![allow(dead_code)]

use gfx_gl_loader::api::{self, GLenum, GLint, GLubyte, GLuint};
use gfx_gl_loader::{ApiTable, Config, Current, Error, Platform};

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::ptr;

/// Acquisition step to fail on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Library,
    Symbols,
    Surface,
    Context,
    MakeCurrent,
}

#[derive(Default)]
pub struct World {
    pub fail: Option<Stage>,
    pub libraries_open: usize,
    next_id: usize,
    pub surfaces: Vec<usize>,
    pub contexts: Vec<usize>,
    pub current: Option<(usize, usize)>,
    pub make_current_calls: usize,
    /// What was current the last time the context resolver was asked.
    pub resolved_against: Option<(usize, usize)>,
    pub single_buffered: Option<bool>,
    /// Answered by the context resolver, only while a context is current.
    pub proc_symbols: HashMap<String, *const c_void>,
    /// Answered by the library lookup.
    pub library_symbols: HashMap<String, *const c_void>,
    pub core_extensions: Vec<CString>,
    /// Calls made to `glGetStringi`.
    pub string_i_calls: usize,
    pub strings: HashMap<GLenum, CString>,
    pub platform_extensions: Option<CString>,
}

impl World {
    fn allocate(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

thread_local! {
    static WORLD: RefCell<World> = RefCell::new(World::default());
}

pub fn with<T>(f: impl FnOnce(&mut World) -> T) -> T {
    WORLD.with(|world| f(&mut world.borrow_mut()))
}

extern "system" fn get_integerv(pname: GLenum, data: *mut GLint) {
    if pname == api::NUM_EXTENSIONS {
        let count = with(|w| w.core_extensions.len());
        unsafe { *data = count as GLint };
    }
}

extern "system" fn get_string_i(name: GLenum, index: GLuint) -> *const GLubyte {
    if name != api::EXTENSIONS {
        return ptr::null();
    }
    with(|w| {
        w.string_i_calls += 1;
        w.core_extensions
            .get(index as usize)
            .map_or(ptr::null(), |s| s.as_ptr() as *const GLubyte)
    })
}

extern "system" fn get_string(name: GLenum) -> *const GLubyte {
    with(|w| {
        w.strings
            .get(&name)
            .map_or(ptr::null(), |s| s.as_ptr() as *const GLubyte)
    })
}

/// Reset the thread's world: nothing open, the three GL query functions
/// resolvable through the context resolver.
pub fn reset() {
    let _ = env_logger::builder().is_test(true).try_init();
    with(|w| {
        *w = World::default();
        w.proc_symbols
            .insert("glGetIntegerv".into(), get_integerv as *const c_void);
        w.proc_symbols
            .insert("glGetStringi".into(), get_string_i as *const c_void);
        w.proc_symbols
            .insert("glGetString".into(), get_string as *const c_void);
    });
}

/// Counts of open libraries, live surfaces and live contexts.
pub fn live() -> (usize, usize, usize) {
    with(|w| (w.libraries_open, w.surfaces.len(), w.contexts.len()))
}

/// A surface/context pair owned by the "application".
pub fn app_pair() -> (usize, usize) {
    with(|w| {
        let surface = w.allocate();
        let context = w.allocate();
        w.surfaces.push(surface);
        w.contexts.push(context);
        (surface, context)
    })
}

pub fn current() -> Option<(usize, usize)> {
    with(|w| w.current)
}

pub fn set_current(pair: Option<(usize, usize)>) {
    with(|w| w.current = pair)
}

pub fn set_core_extensions(names: &[&str]) {
    with(|w| w.core_extensions = names.iter().map(|&n| CString::new(n).unwrap()).collect())
}

pub fn set_string(name: GLenum, value: &str) {
    with(|w| {
        w.strings.insert(name, CString::new(value).unwrap());
    })
}

pub fn set_platform_extensions(value: &str) {
    with(|w| w.platform_extensions = Some(CString::new(value).unwrap()))
}

#[derive(Debug)]
pub struct MockPlatform {
    surface: Option<usize>,
    context: Option<usize>,
}

impl Platform for MockPlatform {
    type Surface = usize;
    type Context = usize;

    fn open() -> Result<Self, Error> {
        with(|w| match w.fail {
            Some(Stage::Library) => Err(Error::ResourceUnavailable {
                candidates: vec!["libGLmock.so.1".to_string()],
            }),
            Some(Stage::Symbols) => Err(Error::SymbolMissing("mockMakeCurrent")),
            _ => {
                w.libraries_open += 1;
                Ok(MockPlatform {
                    surface: None,
                    context: None,
                })
            }
        })
    }

    fn create(&mut self, config: &Config) -> Result<Current<Self>, Error> {
        let result = with(|w| {
            if w.fail == Some(Stage::Surface) {
                return Err(Error::SurfaceCreation("mock surface"));
            }
            let surface = w.allocate();
            w.surfaces.push(surface);
            self.surface = Some(surface);

            if w.fail == Some(Stage::Context) {
                return Err(Error::SurfaceCreation("mock context"));
            }
            let context = w.allocate();
            w.contexts.push(context);
            self.context = Some(context);
            w.single_buffered = Some(config.single_buffered);
            Ok((surface, context))
        });
        if result.is_err() {
            self.destroy();
        }
        result
    }

    fn destroy(&mut self) {
        let (surface, context) = (self.surface.take(), self.context.take());
        with(|w| {
            if let Some(context) = context {
                if w.current.map(|(_, c)| c) == Some(context) {
                    w.current = None;
                }
                w.contexts.retain(|&c| c != context);
            }
            if let Some(surface) = surface {
                w.surfaces.retain(|&s| s != surface);
            }
        });
    }

    fn make_current(&self, target: Option<Current<Self>>) -> Result<(), Error> {
        with(|w| {
            w.make_current_calls += 1;
            if w.fail == Some(Stage::MakeCurrent) {
                return Err(Error::MakeCurrent);
            }
            if let Some((surface, context)) = target {
                if !w.surfaces.contains(&surface) || !w.contexts.contains(&context) {
                    return Err(Error::MakeCurrent);
                }
            }
            w.current = target;
            Ok(())
        })
    }

    fn current(&self) -> Option<Current<Self>> {
        with(|w| w.current)
    }

    fn proc_address(&self, name: &CStr) -> *const c_void {
        with(|w| {
            w.resolved_against = w.current;
            if w.current.is_none() {
                return ptr::null();
            }
            let name = name.to_str().unwrap_or_default();
            w.proc_symbols.get(name).cloned().unwrap_or(ptr::null())
        })
    }

    fn library_symbol(&self, name: &CStr) -> *const c_void {
        with(|w| {
            let name = name.to_str().unwrap_or_default();
            w.library_symbols.get(name).cloned().unwrap_or(ptr::null())
        })
    }

    fn platform_extensions(&self, _: &ApiTable) -> Option<CString> {
        with(|w| w.platform_extensions.clone())
    }
}

impl Drop for MockPlatform {
    fn drop(&mut self) {
        self.destroy();
        with(|w| w.libraries_open -= 1);
    }
}
