//! GLX bootstrap: a 1x1 window on an X display, with a color map for the
//! chosen visual.

use super::{Config, Current, Platform};
use crate::{
    api::{Bool, GLXContext, GLXDrawable},
    library::LibrarySet,
    util, ApiTable, Error,
};

use std::{
    ffi::{CStr, CString},
    fmt, mem,
    os::raw::{c_char, c_int, c_long, c_uint, c_ulong, c_void},
    ptr,
};

use raw_window_handle::RawWindowHandle;

const GL_LIBRARIES: &[&str] = &["libGL.so.1", "libGL.so"];
const X11_LIBRARIES: &[&str] = &["libX11.so.6", "libX11.so"];

const GLX_RGBA: c_int = 4;
const GLX_DOUBLEBUFFER: c_int = 5;
const GLX_RED_SIZE: c_int = 8;
const GLX_GREEN_SIZE: c_int = 9;
const GLX_BLUE_SIZE: c_int = 10;
const GLX_ALPHA_SIZE: c_int = 11;
const GLX_DEPTH_SIZE: c_int = 12;
const GLX_STENCIL_SIZE: c_int = 13;
const NONE: c_int = 0;

const ALLOC_NONE: c_int = 0;
const INPUT_OUTPUT: c_uint = 1;
const CW_BORDER_PIXEL: c_ulong = 1 << 3;
const CW_COLORMAP: c_ulong = 1 << 13;
const TRUE: Bool = 1;

pub type XDisplay = *mut c_void;
pub type XWindow = c_ulong;
pub type Colormap = c_ulong;

/// Visual description returned by `glXChooseVisual`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct XVisualInfo {
    pub visual: *mut c_void,
    pub visualid: c_ulong,
    pub screen: c_int,
    pub depth: c_int,
    pub class: c_int,
    pub red_mask: c_ulong,
    pub green_mask: c_ulong,
    pub blue_mask: c_ulong,
    pub colormap_size: c_int,
    pub bits_per_rgb: c_int,
}

#[repr(C)]
struct XSetWindowAttributes {
    background_pixmap: c_ulong,
    background_pixel: c_ulong,
    border_pixmap: c_ulong,
    border_pixel: c_ulong,
    bit_gravity: c_int,
    win_gravity: c_int,
    backing_store: c_int,
    backing_planes: c_ulong,
    backing_pixel: c_ulong,
    save_under: Bool,
    event_mask: c_long,
    do_not_propagate_mask: c_long,
    override_redirect: Bool,
    colormap: Colormap,
    cursor: c_ulong,
}

type XOpenDisplayFun = unsafe extern "system" fn(display_name: *const c_char) -> XDisplay;
type XCloseDisplayFun = unsafe extern "system" fn(display: XDisplay) -> c_int;
type XCreateWindowFun = unsafe extern "system" fn(
    display: XDisplay,
    parent: XWindow,
    x: c_int,
    y: c_int,
    width: c_uint,
    height: c_uint,
    border_width: c_uint,
    depth: c_int,
    class: c_uint,
    visual: *mut c_void,
    value_mask: c_ulong,
    attributes: *mut XSetWindowAttributes,
) -> XWindow;
type XDestroyWindowFun = unsafe extern "system" fn(display: XDisplay, window: XWindow) -> c_int;
type XCreateColormapFun = unsafe extern "system" fn(
    display: XDisplay,
    window: XWindow,
    visual: *mut c_void,
    alloc: c_int,
) -> Colormap;
type XFreeColormapFun = unsafe extern "system" fn(display: XDisplay, colormap: Colormap) -> c_int;
type XDefaultScreenFun = unsafe extern "system" fn(display: XDisplay) -> c_int;
type XRootWindowFun = unsafe extern "system" fn(display: XDisplay, screen: c_int) -> XWindow;
type XFreeFun = unsafe extern "system" fn(data: *mut c_void) -> c_int;

type GlxChooseVisualFun = unsafe extern "system" fn(
    display: XDisplay,
    screen: c_int,
    attributes: *mut c_int,
) -> *mut XVisualInfo;
type GlxCreateContextFun = unsafe extern "system" fn(
    display: XDisplay,
    visual: *mut XVisualInfo,
    share: GLXContext,
    direct: Bool,
) -> GLXContext;
type GlxDestroyContextFun = unsafe extern "system" fn(display: XDisplay, context: GLXContext);
type GlxMakeCurrentFun = unsafe extern "system" fn(
    display: XDisplay,
    drawable: GLXDrawable,
    context: GLXContext,
) -> Bool;
type GlxGetCurrentContextFun = unsafe extern "system" fn() -> GLXContext;
type GlxGetCurrentDrawableFun = unsafe extern "system" fn() -> GLXDrawable;
type GlxGetCurrentDisplayFun = unsafe extern "system" fn() -> XDisplay;
type GlxQueryExtensionsStringFun =
    unsafe extern "system" fn(display: XDisplay, screen: c_int) -> *const c_char;
type GlxGetProcAddressFun = unsafe extern "system" fn(name: *const u8) -> *const c_void;

/// Entry points of libX11 and libGL needed before any context exists.
struct Functions {
    x_open_display: XOpenDisplayFun,
    x_close_display: XCloseDisplayFun,
    x_create_window: XCreateWindowFun,
    x_destroy_window: XDestroyWindowFun,
    x_create_colormap: XCreateColormapFun,
    x_free_colormap: XFreeColormapFun,
    x_default_screen: XDefaultScreenFun,
    x_root_window: XRootWindowFun,
    x_free: XFreeFun,
    glx_choose_visual: GlxChooseVisualFun,
    glx_create_context: GlxCreateContextFun,
    glx_destroy_context: GlxDestroyContextFun,
    glx_make_current: GlxMakeCurrentFun,
    glx_get_current_context: GlxGetCurrentContextFun,
    glx_get_current_drawable: GlxGetCurrentDrawableFun,
    glx_get_current_display: GlxGetCurrentDisplayFun,
    glx_query_extensions_string: GlxQueryExtensionsStringFun,
    glx_get_proc_address: Option<GlxGetProcAddressFun>,
}

impl Functions {
    unsafe fn load(libraries: &LibrarySet) -> Result<Self, Error> {
        let gl = libraries.main();
        let x11 = libraries.get(1).ok_or_else(|| Error::ResourceUnavailable {
            candidates: X11_LIBRARIES.iter().map(|name| name.to_string()).collect(),
        })?;

        let glx_get_proc_address = gl
            .function::<GlxGetProcAddressFun>("glXGetProcAddress")
            .or_else(|_| gl.function::<GlxGetProcAddressFun>("glXGetProcAddressARB"))
            .ok();

        Ok(Functions {
            x_open_display: x11.function("XOpenDisplay")?,
            x_close_display: x11.function("XCloseDisplay")?,
            x_create_window: x11.function("XCreateWindow")?,
            x_destroy_window: x11.function("XDestroyWindow")?,
            x_create_colormap: x11.function("XCreateColormap")?,
            x_free_colormap: x11.function("XFreeColormap")?,
            x_default_screen: x11.function("XDefaultScreen")?,
            x_root_window: x11.function("XRootWindow")?,
            x_free: x11.function("XFree")?,
            glx_choose_visual: gl.function("glXChooseVisual")?,
            glx_create_context: gl.function("glXCreateContext")?,
            glx_destroy_context: gl.function("glXDestroyContext")?,
            glx_make_current: gl.function("glXMakeCurrent")?,
            glx_get_current_context: gl.function("glXGetCurrentContext")?,
            glx_get_current_drawable: gl.function("glXGetCurrentDrawable")?,
            glx_get_current_display: gl.function("glXGetCurrentDisplay")?,
            glx_query_extensions_string: gl.function("glXQueryExtensionsString")?,
            glx_get_proc_address,
        })
    }
}

/// A GLX drawable together with the display it lives on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GlxSurface {
    pub display: XDisplay,
    pub drawable: GLXDrawable,
}

/// Attribute list for `glXChooseVisual`.
///
/// Single buffering is requested by leaving `GLX_DOUBLEBUFFER` out, since the
/// attribute is a boolean flag without a value.
fn visual_attributes(single_buffered: bool) -> Vec<c_int> {
    let mut attributes = vec![
        GLX_RGBA,
        GLX_RED_SIZE,
        8,
        GLX_GREEN_SIZE,
        8,
        GLX_BLUE_SIZE,
        8,
        GLX_ALPHA_SIZE,
        8,
        GLX_DEPTH_SIZE,
        24,
        GLX_STENCIL_SIZE,
        8,
    ];
    if !single_buffered {
        attributes.push(GLX_DOUBLEBUFFER);
    }
    attributes.push(NONE);
    attributes
}

/// Display-based bootstrap strategy.
pub struct GlxPlatform {
    fns: Functions,
    display: XDisplay,
    owns_display: bool,
    visual_info: *mut XVisualInfo,
    colormap: Colormap,
    window: XWindow,
    context: GLXContext,
    // Dropped last, after `Drop` has destroyed the objects above.
    libraries: LibrarySet,
}

// Only touched by the thread that serializes init/uninit.
unsafe impl Send for GlxPlatform {}

impl fmt::Debug for GlxPlatform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GlxPlatform")
            .field("display", &self.display)
            .field("owns_display", &self.owns_display)
            .field("colormap", &self.colormap)
            .field("window", &self.window)
            .field("context", &self.context)
            .field("libraries", &self.libraries)
            .finish()
    }
}

impl GlxPlatform {
    /// The display connection of the bootstrap window.
    pub fn display(&self) -> XDisplay {
        self.display
    }

    /// Whether the display was opened by the loader rather than supplied.
    pub fn owns_display(&self) -> bool {
        self.owns_display
    }

    pub fn window(&self) -> XWindow {
        self.window
    }

    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    /// The visual the bootstrap context was created with.
    pub fn visual_info(&self) -> Option<&XVisualInfo> {
        unsafe { self.visual_info.as_ref() }
    }

    unsafe fn create_objects(&mut self, config: &Config) -> Result<Current<Self>, Error> {
        let shared_display = match config.window {
            Some(RawWindowHandle::Xlib(handle)) if !handle.display.is_null() => {
                Some(handle.display)
            }
            Some(other) => {
                log::warn!("Ignoring window handle {:?}, opening the default display", other);
                None
            }
            None => None,
        };

        match shared_display {
            Some(display) => {
                self.display = display;
                self.owns_display = false;
            }
            None => {
                let display = (self.fns.x_open_display)(ptr::null());
                if display.is_null() {
                    return Err(Error::SurfaceCreation("unable to open the X display"));
                }
                self.display = display;
                self.owns_display = true;
            }
        }

        let screen = (self.fns.x_default_screen)(self.display);
        let mut attributes = visual_attributes(config.single_buffered);
        self.visual_info =
            (self.fns.glx_choose_visual)(self.display, screen, attributes.as_mut_ptr());
        if self.visual_info.is_null() {
            return Err(Error::SurfaceCreation("no visual matches the requested format"));
        }
        let visual_info = *self.visual_info;
        let root = (self.fns.x_root_window)(self.display, visual_info.screen);

        self.colormap =
            (self.fns.x_create_colormap)(self.display, root, visual_info.visual, ALLOC_NONE);
        if self.colormap == 0 {
            return Err(Error::SurfaceCreation("unable to allocate a color map"));
        }

        let mut window_attributes: XSetWindowAttributes = mem::zeroed();
        window_attributes.colormap = self.colormap;
        window_attributes.border_pixel = 0;

        // Zero-sized windows are illegal in X11.
        self.window = (self.fns.x_create_window)(
            self.display,
            root,
            0,
            0,
            1,
            1,
            0,
            visual_info.depth,
            INPUT_OUTPUT,
            visual_info.visual,
            CW_BORDER_PIXEL | CW_COLORMAP,
            &mut window_attributes,
        );
        if self.window == 0 {
            return Err(Error::SurfaceCreation("unable to create the bootstrap window"));
        }

        self.context =
            (self.fns.glx_create_context)(self.display, self.visual_info, ptr::null_mut(), TRUE);
        if self.context.is_null() {
            return Err(Error::SurfaceCreation("unable to create a GLX context"));
        }

        log::info!(
            "Created GLX bootstrap context {:?} on window {:#x} (visual {:#x}, depth {})",
            self.context,
            self.window,
            visual_info.visualid,
            visual_info.depth
        );

        Ok((
            GlxSurface {
                display: self.display,
                drawable: self.window,
            },
            self.context,
        ))
    }
}

impl Platform for GlxPlatform {
    type Surface = GlxSurface;
    type Context = GLXContext;

    fn open() -> Result<Self, Error> {
        let libraries = LibrarySet::open(&[GL_LIBRARIES, X11_LIBRARIES])?;
        let fns = unsafe { Functions::load(&libraries)? };
        log::info!("Using GLX platform");

        Ok(GlxPlatform {
            fns,
            display: ptr::null_mut(),
            owns_display: false,
            visual_info: ptr::null_mut(),
            colormap: 0,
            window: 0,
            context: ptr::null_mut(),
            libraries,
        })
    }

    fn create(&mut self, config: &Config) -> Result<Current<Self>, Error> {
        let result = unsafe { self.create_objects(config) };
        if let Err(ref e) = result {
            log::warn!("GLX bootstrap failed: {}", e);
            self.destroy();
        }
        result
    }

    fn destroy(&mut self) {
        unsafe {
            if !self.context.is_null() {
                if (self.fns.glx_get_current_context)() == self.context {
                    (self.fns.glx_make_current)(self.display, 0, ptr::null_mut());
                }
                (self.fns.glx_destroy_context)(self.display, self.context);
                self.context = ptr::null_mut();
            }
            if self.window != 0 {
                (self.fns.x_destroy_window)(self.display, self.window);
                self.window = 0;
            }
            if self.colormap != 0 {
                (self.fns.x_free_colormap)(self.display, self.colormap);
                self.colormap = 0;
            }
            if !self.visual_info.is_null() {
                (self.fns.x_free)(self.visual_info as *mut c_void);
                self.visual_info = ptr::null_mut();
            }
            if !self.display.is_null() {
                if self.owns_display {
                    (self.fns.x_close_display)(self.display);
                }
                self.display = ptr::null_mut();
                self.owns_display = false;
            }
        }
    }

    fn make_current(&self, target: Option<Current<Self>>) -> Result<(), Error> {
        let result = unsafe {
            match target {
                Some((surface, context)) => {
                    if surface.display.is_null() {
                        return Err(Error::MakeCurrent);
                    }
                    (self.fns.glx_make_current)(surface.display, surface.drawable, context)
                }
                None => {
                    let mut display = (self.fns.glx_get_current_display)();
                    if display.is_null() {
                        display = self.display;
                    }
                    if display.is_null() {
                        return Ok(());
                    }
                    (self.fns.glx_make_current)(display, 0, ptr::null_mut())
                }
            }
        };
        if result != 0 {
            Ok(())
        } else {
            Err(Error::MakeCurrent)
        }
    }

    fn current(&self) -> Option<Current<Self>> {
        unsafe {
            let context = (self.fns.glx_get_current_context)();
            if context.is_null() {
                return None;
            }
            let surface = GlxSurface {
                display: (self.fns.glx_get_current_display)(),
                drawable: (self.fns.glx_get_current_drawable)(),
            };
            Some((surface, context))
        }
    }

    fn proc_address(&self, name: &CStr) -> *const c_void {
        match self.fns.glx_get_proc_address {
            Some(get_proc_address) => unsafe { get_proc_address(name.as_ptr() as *const u8) },
            None => ptr::null(),
        }
    }

    fn library_symbol(&self, name: &CStr) -> *const c_void {
        self.libraries.main().symbol(name)
    }

    fn platform_extensions(&self, api: &ApiTable) -> Option<CString> {
        if self.display.is_null() {
            return None;
        }
        let query = api
            .glXQueryExtensionsString
            .unwrap_or(self.fns.glx_query_extensions_string);
        unsafe {
            let screen = (self.fns.x_default_screen)(self.display);
            util::c_str(query(self.display, screen)).map(CStr::to_owned)
        }
    }
}

impl Drop for GlxPlatform {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_buffer_attribute() {
        let double = visual_attributes(false);
        assert_eq!(double[0], GLX_RGBA);
        assert_eq!(&double[double.len() - 2..], &[GLX_DOUBLEBUFFER, NONE]);

        let single = visual_attributes(true);
        assert!(!single.contains(&GLX_DOUBLEBUFFER));
        assert_eq!(single.len(), double.len() - 1);
        assert_eq!(single.last(), Some(&NONE));
    }

    #[test]
    fn test_format_sizes() {
        let attributes = visual_attributes(false);
        let size_of = |key: c_int| {
            attributes
                .iter()
                .position(|&a| a == key)
                .map(|i| attributes[i + 1])
        };
        assert_eq!(size_of(GLX_RED_SIZE), Some(8));
        assert_eq!(size_of(GLX_ALPHA_SIZE), Some(8));
        assert_eq!(size_of(GLX_DEPTH_SIZE), Some(24));
        assert_eq!(size_of(GLX_STENCIL_SIZE), Some(8));
    }
}
