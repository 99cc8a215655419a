//! The entry point catalogue.
//!
//! Every catalogued entry point gets a variant in [`Symbol`] and a typed slot
//! in [`ApiTable`]. Slots are `None` until resolved; a `None` slot means the
//! entry point is not available on the context it was loaded for.

use std::{ffi::CStr, fmt, mem, os::raw::c_void, ptr};

pub use self::types::*;

/// Scalar and handle types used in entry point signatures.
#[allow(non_camel_case_types)]
pub mod types {
    use std::os::raw::{c_char, c_double, c_float, c_int, c_uchar, c_uint, c_ulong, c_void};

    pub type GLenum = c_uint;
    pub type GLboolean = c_uchar;
    pub type GLbitfield = c_uint;
    pub type GLint = c_int;
    pub type GLuint = c_uint;
    pub type GLsizei = c_int;
    pub type GLfloat = c_float;
    pub type GLdouble = c_double;
    pub type GLubyte = c_uchar;
    pub type GLchar = c_char;
    pub type GLsizeiptr = isize;
    pub type GLintptr = isize;
    pub type GLDEBUGPROC = Option<
        extern "system" fn(
            source: GLenum,
            gltype: GLenum,
            id: GLuint,
            severity: GLenum,
            length: GLsizei,
            message: *const GLchar,
            user_param: *mut c_void,
        ),
    >;

    pub type HDC = *mut c_void;
    pub type HGLRC = *mut c_void;
    pub type BOOL = c_int;

    pub type GLXDisplay = *mut c_void;
    pub type GLXContext = *mut c_void;
    pub type GLXDrawable = c_ulong;
    pub type GLXFBConfig = *mut c_void;
    pub type Bool = c_int;
}

pub const EXTENSIONS: GLenum = 0x1F03;
pub const NUM_EXTENSIONS: GLenum = 0x821D;

macro_rules! entry_points {
    ($( fn $name:ident( $($arg:ident: $ty:ty),* $(,)? ) $(-> $ret:ty)?; )*) => {
        /// Identifier of a catalogued entry point.
        #[allow(non_camel_case_types)]
        #[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum Symbol {
            $( $name, )*
        }

        impl Symbol {
            /// Every catalogued entry point, in declaration order.
            pub const ALL: &'static [Symbol] = &[ $( Symbol::$name, )* ];

            /// The exported name of the entry point.
            pub fn name(self) -> &'static str {
                match self {
                    $( Symbol::$name => stringify!($name), )*
                }
            }

            /// The exported name, nul-terminated.
            pub fn c_name(self) -> &'static CStr {
                let bytes: &'static [u8] = match self {
                    $( Symbol::$name => concat!(stringify!($name), "\0").as_bytes(), )*
                };
                // Identifiers never contain a nul.
                unsafe { CStr::from_bytes_with_nul_unchecked(bytes) }
            }
        }

        /// Resolved entry points, one slot per [`Symbol`].
        #[allow(non_snake_case)]
        #[derive(Copy, Clone, Default)]
        pub struct ApiTable {
            $( pub $name: Option<unsafe extern "system" fn($($arg: $ty),*) $(-> $ret)?>, )*
        }

        impl ApiTable {
            /// A table with every slot unresolved.
            pub const EMPTY: ApiTable = ApiTable { $( $name: None, )* };

            /// Build a table by asking `loadfn` for the address of every
            /// catalogued entry point. Null addresses leave the slot empty.
            pub fn load_with<F>(mut loadfn: F) -> Self
            where
                F: FnMut(&'static CStr) -> *const c_void,
            {
                ApiTable {
                    $( $name: unsafe {
                        mem::transmute::<*const c_void, _>(loadfn(Symbol::$name.c_name()))
                    }, )*
                }
            }

            /// The address stored for `symbol`, null if unresolved.
            pub fn address(&self, symbol: Symbol) -> *const c_void {
                match symbol {
                    $( Symbol::$name => self.$name.map_or(ptr::null(), |f| f as *const c_void), )*
                }
            }

            /// Store a raw address for `symbol`. A null address clears the slot.
            ///
            /// # Safety
            /// A non-null `address` must point to a function with the
            /// signature declared for `symbol`.
            pub unsafe fn set_address(&mut self, symbol: Symbol, address: *const c_void) {
                match symbol {
                    $( Symbol::$name => self.$name = mem::transmute::<*const c_void, _>(address), )*
                }
            }
        }
    };
}

entry_points! {
    // OpenGL 1.0 - 1.1
    fn glGetError() -> GLenum;
    fn glGetString(name: GLenum) -> *const GLubyte;
    fn glGetIntegerv(pname: GLenum, data: *mut GLint);
    fn glGetFloatv(pname: GLenum, data: *mut GLfloat);
    fn glGetBooleanv(pname: GLenum, data: *mut GLboolean);
    fn glEnable(cap: GLenum);
    fn glDisable(cap: GLenum);
    fn glIsEnabled(cap: GLenum) -> GLboolean;
    fn glClear(mask: GLbitfield);
    fn glClearColor(red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat);
    fn glClearDepth(depth: GLdouble);
    fn glClearStencil(s: GLint);
    fn glViewport(x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn glScissor(x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn glFlush();
    fn glFinish();
    fn glBlendFunc(sfactor: GLenum, dfactor: GLenum);
    fn glDepthFunc(func: GLenum);
    fn glDepthMask(flag: GLboolean);
    fn glColorMask(red: GLboolean, green: GLboolean, blue: GLboolean, alpha: GLboolean);
    fn glCullFace(mode: GLenum);
    fn glFrontFace(mode: GLenum);
    fn glPixelStorei(pname: GLenum, param: GLint);
    fn glReadPixels(
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        ty: GLenum,
        pixels: *mut c_void,
    );
    fn glDrawArrays(mode: GLenum, first: GLint, count: GLsizei);
    fn glDrawElements(mode: GLenum, count: GLsizei, ty: GLenum, indices: *const c_void);
    fn glGenTextures(n: GLsizei, textures: *mut GLuint);
    fn glDeleteTextures(n: GLsizei, textures: *const GLuint);
    fn glBindTexture(target: GLenum, texture: GLuint);
    fn glTexImage2D(
        target: GLenum,
        level: GLint,
        internalformat: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        ty: GLenum,
        pixels: *const c_void,
    );
    fn glTexParameteri(target: GLenum, pname: GLenum, param: GLint);

    // OpenGL 1.3 - 1.5
    fn glActiveTexture(texture: GLenum);
    fn glGenBuffers(n: GLsizei, buffers: *mut GLuint);
    fn glDeleteBuffers(n: GLsizei, buffers: *const GLuint);
    fn glBindBuffer(target: GLenum, buffer: GLuint);
    fn glBufferData(target: GLenum, size: GLsizeiptr, data: *const c_void, usage: GLenum);
    fn glBufferSubData(target: GLenum, offset: GLintptr, size: GLsizeiptr, data: *const c_void);

    // OpenGL 2.0
    fn glCreateShader(ty: GLenum) -> GLuint;
    fn glDeleteShader(shader: GLuint);
    fn glShaderSource(
        shader: GLuint,
        count: GLsizei,
        string: *const *const GLchar,
        length: *const GLint,
    );
    fn glCompileShader(shader: GLuint);
    fn glGetShaderiv(shader: GLuint, pname: GLenum, params: *mut GLint);
    fn glGetShaderInfoLog(
        shader: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    );
    fn glCreateProgram() -> GLuint;
    fn glDeleteProgram(program: GLuint);
    fn glAttachShader(program: GLuint, shader: GLuint);
    fn glLinkProgram(program: GLuint);
    fn glUseProgram(program: GLuint);
    fn glGetProgramiv(program: GLuint, pname: GLenum, params: *mut GLint);
    fn glGetProgramInfoLog(
        program: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    );
    fn glGetUniformLocation(program: GLuint, name: *const GLchar) -> GLint;
    fn glGetAttribLocation(program: GLuint, name: *const GLchar) -> GLint;
    fn glUniform1i(location: GLint, v0: GLint);
    fn glUniform4f(location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat, v3: GLfloat);
    fn glUniformMatrix4fv(
        location: GLint,
        count: GLsizei,
        transpose: GLboolean,
        value: *const GLfloat,
    );
    fn glEnableVertexAttribArray(index: GLuint);
    fn glDisableVertexAttribArray(index: GLuint);
    fn glVertexAttribPointer(
        index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: GLboolean,
        stride: GLsizei,
        pointer: *const c_void,
    );

    // OpenGL 3.0 - 3.2
    fn glGetStringi(name: GLenum, index: GLuint) -> *const GLubyte;
    fn glGenVertexArrays(n: GLsizei, arrays: *mut GLuint);
    fn glDeleteVertexArrays(n: GLsizei, arrays: *const GLuint);
    fn glBindVertexArray(array: GLuint);
    fn glGenFramebuffers(n: GLsizei, framebuffers: *mut GLuint);
    fn glDeleteFramebuffers(n: GLsizei, framebuffers: *const GLuint);
    fn glBindFramebuffer(target: GLenum, framebuffer: GLuint);
    fn glFramebufferTexture2D(
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    );
    fn glCheckFramebufferStatus(target: GLenum) -> GLenum;
    fn glGenerateMipmap(target: GLenum);
    fn glDrawArraysInstanced(mode: GLenum, first: GLint, count: GLsizei, instancecount: GLsizei);

    // OpenGL 4.3
    fn glDebugMessageCallback(callback: GLDEBUGPROC, user_param: *const c_void);

    // WGL
    fn wglCreateContext(hdc: HDC) -> HGLRC;
    fn wglDeleteContext(hglrc: HGLRC) -> BOOL;
    fn wglGetCurrentContext() -> HGLRC;
    fn wglGetCurrentDC() -> HDC;
    fn wglGetProcAddress(name: *const GLchar) -> *const c_void;
    fn wglMakeCurrent(hdc: HDC, hglrc: HGLRC) -> BOOL;
    fn wglShareLists(first: HGLRC, second: HGLRC) -> BOOL;
    fn wglGetExtensionsStringARB(hdc: HDC) -> *const GLchar;
    fn wglGetExtensionsStringEXT() -> *const GLchar;
    fn wglCreateContextAttribsARB(hdc: HDC, share: HGLRC, attribs: *const GLint) -> HGLRC;
    fn wglChoosePixelFormatARB(
        hdc: HDC,
        int_attribs: *const GLint,
        float_attribs: *const GLfloat,
        max_formats: GLuint,
        formats: *mut GLint,
        num_formats: *mut GLuint,
    ) -> BOOL;
    fn wglSwapIntervalEXT(interval: GLint) -> BOOL;
    fn wglGetSwapIntervalEXT() -> GLint;

    // GLX
    fn glXGetProcAddress(name: *const GLubyte) -> *const c_void;
    fn glXGetProcAddressARB(name: *const GLubyte) -> *const c_void;
    fn glXQueryExtensionsString(display: GLXDisplay, screen: GLint) -> *const GLchar;
    fn glXGetCurrentContext() -> GLXContext;
    fn glXGetCurrentDrawable() -> GLXDrawable;
    fn glXGetCurrentDisplay() -> GLXDisplay;
    fn glXMakeCurrent(display: GLXDisplay, drawable: GLXDrawable, context: GLXContext) -> Bool;
    fn glXSwapBuffers(display: GLXDisplay, drawable: GLXDrawable);
    fn glXCreateContextAttribsARB(
        display: GLXDisplay,
        config: GLXFBConfig,
        share: GLXContext,
        direct: Bool,
        attribs: *const GLint,
    ) -> GLXContext;
    fn glXSwapIntervalEXT(display: GLXDisplay, drawable: GLXDrawable, interval: GLint);
    fn glXSwapIntervalMESA(interval: GLuint) -> GLint;
}

impl ApiTable {
    /// Check whether `symbol` has been resolved.
    pub fn is_loaded(&self, symbol: Symbol) -> bool {
        !self.address(symbol).is_null()
    }

    /// Number of resolved slots.
    pub fn loaded_count(&self) -> usize {
        Symbol::ALL.iter().filter(|&&s| self.is_loaded(s)).count()
    }

    /// Ask `loadfn` for the slots among `symbols` that are still
    /// unresolved. Resolved slots are left untouched.
    pub fn fill_missing<F>(&mut self, symbols: &[Symbol], mut loadfn: F)
    where
        F: FnMut(&'static CStr) -> *const c_void,
    {
        for &symbol in symbols {
            if !self.is_loaded(symbol) {
                unsafe { self.set_address(symbol, loadfn(symbol.c_name())) };
            }
        }
    }

    /// Iterate over every slot with its address, null for unresolved ones.
    pub fn entries(&self) -> impl Iterator<Item = (Symbol, *const c_void)> + '_ {
        Symbol::ALL.iter().map(move |&s| (s, self.address(s)))
    }
}

impl fmt::Debug for ApiTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ApiTable")
            .field("loaded", &self.loaded_count())
            .field("total", &Symbol::ALL.len())
            .finish()
    }
}
