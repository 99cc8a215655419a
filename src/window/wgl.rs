//! WGL bootstrap: a hidden window, its device context and a legacy context
//! created on a classic pixel format.

use super::{Config, Current, Platform};
use crate::{api, library::LibrarySet, resolve::resolve, util, ApiTable, Error, Symbol};

use std::{
    ffi::{CStr, CString, OsStr},
    fmt, iter, mem,
    os::{
        raw::{c_char, c_int, c_void},
        windows::ffi::OsStrExt,
    },
    ptr,
    sync::atomic::{AtomicUsize, Ordering},
};

use raw_window_handle::RawWindowHandle;
use winapi::shared::minwindef::*;
use winapi::shared::windef::*;
use winapi::um::libloaderapi::*;
use winapi::um::wingdi::*;
use winapi::um::winuser::*;

const GL_LIBRARIES: &[&str] = &["opengl32.dll"];
const GDI_LIBRARIES: &[&str] = &["gdi32.dll"];
const CLASS_PREFIX: &str = "gfx-gl-loader bootstrap";

static NEXT_CLASS: AtomicUsize = AtomicUsize::new(0);

type WglCreateContextFun = unsafe extern "system" fn(hdc: HDC) -> HGLRC;
type WglDeleteContextFun = unsafe extern "system" fn(hglrc: HGLRC) -> BOOL;
type WglGetCurrentContextFun = unsafe extern "system" fn() -> HGLRC;
type WglGetCurrentDCFun = unsafe extern "system" fn() -> HDC;
type WglGetProcAddressFun = unsafe extern "system" fn(name: *const c_char) -> *const c_void;
type WglMakeCurrentFun = unsafe extern "system" fn(hdc: HDC, hglrc: HGLRC) -> BOOL;

type ChoosePixelFormatFun =
    unsafe extern "system" fn(hdc: HDC, descriptor: *const PIXELFORMATDESCRIPTOR) -> c_int;
type SetPixelFormatFun = unsafe extern "system" fn(
    hdc: HDC,
    format: c_int,
    descriptor: *const PIXELFORMATDESCRIPTOR,
) -> BOOL;
type GetPixelFormatFun = unsafe extern "system" fn(hdc: HDC) -> c_int;
type DescribePixelFormatFun = unsafe extern "system" fn(
    hdc: HDC,
    format: c_int,
    size: UINT,
    descriptor: *mut PIXELFORMATDESCRIPTOR,
) -> c_int;

struct Functions {
    create_context: WglCreateContextFun,
    delete_context: WglDeleteContextFun,
    get_current_context: WglGetCurrentContextFun,
    get_current_dc: WglGetCurrentDCFun,
    get_proc_address: WglGetProcAddressFun,
    make_current: WglMakeCurrentFun,
    choose_pixel_format: ChoosePixelFormatFun,
    set_pixel_format: SetPixelFormatFun,
    get_pixel_format: GetPixelFormatFun,
    describe_pixel_format: DescribePixelFormatFun,
}

impl Functions {
    unsafe fn load(libraries: &LibrarySet) -> Result<Self, Error> {
        let gl = libraries.main();
        let gdi = libraries.get(1).ok_or_else(|| Error::ResourceUnavailable {
            candidates: GDI_LIBRARIES.iter().map(|name| name.to_string()).collect(),
        })?;

        Ok(Functions {
            create_context: gl.function("wglCreateContext")?,
            delete_context: gl.function("wglDeleteContext")?,
            get_current_context: gl.function("wglGetCurrentContext")?,
            get_current_dc: gl.function("wglGetCurrentDC")?,
            get_proc_address: gl.function("wglGetProcAddress")?,
            make_current: gl.function("wglMakeCurrent")?,
            choose_pixel_format: gdi.function("ChoosePixelFormat")?,
            set_pixel_format: gdi.function("SetPixelFormat")?,
            get_pixel_format: gdi.function("GetPixelFormat")?,
            describe_pixel_format: gdi.function("DescribePixelFormat")?,
        })
    }
}

fn wide(text: &str) -> Vec<u16> {
    OsStr::new(text)
        .encode_wide()
        .chain(iter::once(0))
        .collect()
}

/// A window class name no other platform object in the process uses.
fn unique_class_name() -> Vec<u16> {
    let index = NEXT_CLASS.fetch_add(1, Ordering::Relaxed);
    wide(&format!("{} {}", CLASS_PREFIX, index))
}

/// RGBA, 32 color bits, 24 depth bits and 8 stencil bits.
fn pixel_format_descriptor(single_buffered: bool) -> PIXELFORMATDESCRIPTOR {
    let mut flags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL;
    if !single_buffered {
        flags |= PFD_DOUBLEBUFFER;
    }

    PIXELFORMATDESCRIPTOR {
        nSize: mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16,
        nVersion: 1,
        dwFlags: flags,
        iPixelType: PFD_TYPE_RGBA,
        cColorBits: 32,
        cRedBits: 0,
        cRedShift: 0,
        cGreenBits: 0,
        cGreenShift: 0,
        cBlueBits: 0,
        cBlueShift: 0,
        cAlphaBits: 0,
        cAlphaShift: 0,
        cAccumBits: 0,
        cAccumRedBits: 0,
        cAccumGreenBits: 0,
        cAccumBlueBits: 0,
        cAccumAlphaBits: 0,
        cDepthBits: 24,
        cStencilBits: 8,
        cAuxBuffers: 0,
        iLayerType: PFD_MAIN_PLANE,
        bReserved: 0,
        dwLayerMask: 0,
        dwVisibleMask: 0,
        dwDamageMask: 0,
    }
}

/// Window-based bootstrap strategy.
pub struct WglPlatform {
    fns: Functions,
    class_name: Vec<u16>,
    class_registered: bool,
    window: HWND,
    owns_window: bool,
    device_context: HDC,
    pixel_format: c_int,
    context: HGLRC,
    // Dropped last, after `Drop` has destroyed the objects above.
    libraries: LibrarySet,
}

unsafe impl Send for WglPlatform {}

impl fmt::Debug for WglPlatform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WglPlatform")
            .field("window", &self.window)
            .field("owns_window", &self.owns_window)
            .field("device_context", &self.device_context)
            .field("pixel_format", &self.pixel_format)
            .field("context", &self.context)
            .field("libraries", &self.libraries)
            .finish()
    }
}

impl WglPlatform {
    pub fn window(&self) -> HWND {
        self.window
    }

    pub fn device_context(&self) -> HDC {
        self.device_context
    }

    /// Index of the pixel format set on the bootstrap device context, or 0.
    pub fn pixel_format(&self) -> c_int {
        self.pixel_format
    }

    /// The full description of the selected pixel format.
    pub fn pixel_format_descriptor(&self) -> Option<PIXELFORMATDESCRIPTOR> {
        if self.device_context.is_null() || self.pixel_format == 0 {
            return None;
        }
        unsafe {
            let mut descriptor: PIXELFORMATDESCRIPTOR = mem::zeroed();
            let count = (self.fns.describe_pixel_format)(
                self.device_context,
                self.pixel_format,
                mem::size_of::<PIXELFORMATDESCRIPTOR>() as UINT,
                &mut descriptor,
            );
            if count == 0 {
                None
            } else {
                Some(descriptor)
            }
        }
    }

    unsafe fn create_window(&mut self) -> Result<(), Error> {
        let instance = GetModuleHandleW(ptr::null());

        let mut class: WNDCLASSEXW = mem::zeroed();
        class.cbSize = mem::size_of::<WNDCLASSEXW>() as UINT;
        class.style = CS_OWNDC;
        class.lpfnWndProc = Some(DefWindowProcW);
        class.hInstance = instance;
        class.lpszClassName = self.class_name.as_ptr();

        if RegisterClassExW(&class) == 0 {
            return Err(Error::SurfaceCreation("unable to register the window class"));
        }
        self.class_registered = true;

        let window = CreateWindowExW(
            0,
            self.class_name.as_ptr(),
            self.class_name.as_ptr(),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            ptr::null_mut(),
            ptr::null_mut(),
            instance,
            ptr::null_mut(),
        );
        if window.is_null() {
            return Err(Error::SurfaceCreation("unable to create the bootstrap window"));
        }
        self.window = window;
        self.owns_window = true;
        Ok(())
    }

    unsafe fn create_objects(&mut self, config: &Config) -> Result<Current<Self>, Error> {
        match config.window {
            Some(RawWindowHandle::Windows(handle)) if !handle.hwnd.is_null() => {
                self.window = handle.hwnd as HWND;
                self.owns_window = false;
            }
            other => {
                if let Some(other) = other {
                    log::warn!("Ignoring window handle {:?}, creating a hidden window", other);
                }
                self.create_window()?;
            }
        }

        self.device_context = GetDC(self.window);
        if self.device_context.is_null() {
            return Err(Error::SurfaceCreation("unable to get the device context"));
        }

        let descriptor = pixel_format_descriptor(config.single_buffered);
        // A pixel format can be set only once per window.
        let existing = (self.fns.get_pixel_format)(self.device_context);
        if existing != 0 {
            log::debug!("Reusing pixel format {} of the window", existing);
            self.pixel_format = existing;
        } else {
            let format = (self.fns.choose_pixel_format)(self.device_context, &descriptor);
            if format == 0 {
                return Err(Error::SurfaceCreation("no pixel format matches the request"));
            }
            if (self.fns.set_pixel_format)(self.device_context, format, &descriptor) == FALSE {
                return Err(Error::SurfaceCreation("unable to set the pixel format"));
            }
            self.pixel_format = format;
        }

        self.context = (self.fns.create_context)(self.device_context);
        if self.context.is_null() {
            return Err(Error::SurfaceCreation("unable to create a WGL context"));
        }

        log::info!(
            "Created WGL bootstrap context {:?} on window {:?} (pixel format {})",
            self.context,
            self.window,
            self.pixel_format
        );
        Ok((self.device_context, self.context))
    }
}

impl Platform for WglPlatform {
    type Surface = HDC;
    type Context = HGLRC;

    fn open() -> Result<Self, Error> {
        let libraries = LibrarySet::open(&[GL_LIBRARIES, GDI_LIBRARIES])?;
        let fns = unsafe { Functions::load(&libraries)? };
        log::info!("Using WGL platform");

        Ok(WglPlatform {
            fns,
            class_name: unique_class_name(),
            class_registered: false,
            window: ptr::null_mut(),
            owns_window: false,
            device_context: ptr::null_mut(),
            pixel_format: 0,
            context: ptr::null_mut(),
            libraries,
        })
    }

    fn create(&mut self, config: &Config) -> Result<Current<Self>, Error> {
        let result = unsafe { self.create_objects(config) };
        if let Err(ref e) = result {
            log::warn!("WGL bootstrap failed: {}", e);
            self.destroy();
        }
        result
    }

    fn destroy(&mut self) {
        unsafe {
            if !self.context.is_null() {
                if (self.fns.get_current_context)() == self.context {
                    (self.fns.make_current)(ptr::null_mut(), ptr::null_mut());
                }
                (self.fns.delete_context)(self.context);
                self.context = ptr::null_mut();
            }
            if !self.device_context.is_null() {
                ReleaseDC(self.window, self.device_context);
                self.device_context = ptr::null_mut();
            }
            self.pixel_format = 0;
            if self.owns_window && !self.window.is_null() {
                DestroyWindow(self.window);
            }
            self.window = ptr::null_mut();
            self.owns_window = false;
            if self.class_registered {
                UnregisterClassW(self.class_name.as_ptr(), GetModuleHandleW(ptr::null()));
                self.class_registered = false;
            }
        }
    }

    fn make_current(&self, target: Option<Current<Self>>) -> Result<(), Error> {
        let (hdc, hglrc) = target.unwrap_or((ptr::null_mut(), ptr::null_mut()));
        if unsafe { (self.fns.make_current)(hdc, hglrc) } != FALSE {
            Ok(())
        } else {
            Err(Error::MakeCurrent)
        }
    }

    fn current(&self) -> Option<Current<Self>> {
        unsafe {
            let context = (self.fns.get_current_context)();
            if context.is_null() {
                None
            } else {
                Some(((self.fns.get_current_dc)(), context))
            }
        }
    }

    fn proc_address(&self, name: &CStr) -> *const c_void {
        let address = unsafe { (self.fns.get_proc_address)(name.as_ptr()) };
        // Some drivers report failure with small sentinel values.
        match address as isize {
            -1 | 0 | 1 | 2 | 3 => ptr::null(),
            _ => address,
        }
    }

    fn library_symbol(&self, name: &CStr) -> *const c_void {
        self.libraries.main().symbol(name)
    }

    fn platform_extensions(&self, api: &ApiTable) -> Option<CString> {
        // Slots the table lacks are resolved against the current context.
        let mut api = *api;
        api.fill_missing(
            &[
                Symbol::wglGetExtensionsStringARB,
                Symbol::wglGetExtensionsStringEXT,
            ],
            |name| resolve(self, name),
        );
        unsafe {
            if let Some(get_extensions) = api.wglGetExtensionsStringARB {
                let mut hdc = match api.wglGetCurrentDC {
                    Some(get_current_dc) => get_current_dc(),
                    None => (self.fns.get_current_dc)() as api::HDC,
                };
                if hdc.is_null() {
                    hdc = self.device_context as api::HDC;
                }
                if let Some(extensions) = util::c_str(get_extensions(hdc)) {
                    return Some(extensions.to_owned());
                }
            }
            api.wglGetExtensionsStringEXT
                .and_then(|get_extensions| util::c_str(get_extensions()))
                .map(CStr::to_owned)
        }
    }
}

impl Drop for WglPlatform {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_descriptor() {
        let double = pixel_format_descriptor(false);
        assert_ne!(double.dwFlags & PFD_DOUBLEBUFFER, 0);
        assert_ne!(double.dwFlags & PFD_SUPPORT_OPENGL, 0);
        assert_eq!(double.cColorBits, 32);
        assert_eq!(double.cDepthBits, 24);
        assert_eq!(double.cStencilBits, 8);

        let single = pixel_format_descriptor(true);
        assert_eq!(single.dwFlags & PFD_DOUBLEBUFFER, 0);
    }

    #[test]
    fn test_wide_class_name() {
        let name = wide(CLASS_PREFIX);
        assert_eq!(name.last(), Some(&0));
        assert_eq!(name.len(), CLASS_PREFIX.len() + 1);
    }

    #[test]
    fn test_unique_class_names() {
        let first = unique_class_name();
        let second = unique_class_name();
        assert_ne!(first, second);
        assert_eq!(first.last(), Some(&0));
        assert_eq!(&first[..CLASS_PREFIX.len()], &wide(CLASS_PREFIX)[..CLASS_PREFIX.len()]);
    }
}
