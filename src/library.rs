//! Dynamically opened shared libraries.

use crate::Error;

use std::{ffi::CStr, fmt, mem, os::raw::c_void, ptr};

/// A shared library opened from the first loadable name of a candidate list.
pub struct NativeLibrary {
    library: libloading::Library,
    name: String,
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("name", &self.name)
            .finish()
    }
}

impl NativeLibrary {
    /// Open the first library of `candidates` that can be loaded.
    ///
    /// Names are tried in order, typically the versioned name first and the
    /// unversioned development name second.
    pub fn open(candidates: &[&str]) -> Result<Self, Error> {
        for &name in candidates {
            match unsafe { libloading::Library::new(name) } {
                Ok(library) => {
                    log::info!("Loaded {}", name);
                    return Ok(NativeLibrary {
                        library,
                        name: name.to_string(),
                    });
                }
                Err(e) => log::debug!("Unable to open {}: {}", name, e),
            }
        }

        Err(Error::ResourceUnavailable {
            candidates: candidates.iter().map(|name| name.to_string()).collect(),
        })
    }

    /// The candidate name that was opened.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the address of `name`. Absence is reported as null.
    pub fn symbol(&self, name: &CStr) -> *const c_void {
        match unsafe { self.library.get::<*const c_void>(name.to_bytes_with_nul()) } {
            Ok(symbol) => *symbol,
            Err(_) => ptr::null(),
        }
    }

    /// Look up `name` as a function pointer of type `F`.
    ///
    /// # Safety
    /// `F` must be a function pointer type matching the exported symbol.
    pub(crate) unsafe fn function<F: Copy>(&self, name: &'static str) -> Result<F, Error> {
        debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<*const c_void>());
        let address = match self.library.get::<*const c_void>(name.as_bytes()) {
            Ok(symbol) => *symbol,
            Err(_) => ptr::null(),
        };
        if address.is_null() {
            log::warn!("{} does not export {}", self.name, name);
            return Err(Error::SymbolMissing(name));
        }
        Ok(mem::transmute_copy::<*const c_void, F>(&address))
    }
}

/// A main library and the auxiliary libraries it needs, opened and closed as
/// a unit.
///
/// Libraries are released in reverse order of acquisition.
#[derive(Debug)]
pub struct LibrarySet {
    libraries: Vec<NativeLibrary>,
}

impl LibrarySet {
    /// Open one library per candidate group, the first group being the main
    /// library.
    ///
    /// If any group fails to open, the libraries opened so far are released
    /// before the error is returned.
    pub fn open(groups: &[&[&str]]) -> Result<Self, Error> {
        if groups.is_empty() {
            return Err(Error::ResourceUnavailable {
                candidates: Vec::new(),
            });
        }

        let mut set = LibrarySet {
            libraries: Vec::with_capacity(groups.len()),
        };
        for candidates in groups {
            set.libraries.push(NativeLibrary::open(candidates)?);
        }
        Ok(set)
    }

    /// The main library.
    pub fn main(&self) -> &NativeLibrary {
        &self.libraries[0]
    }

    /// The library opened from the candidate group at `index`.
    pub fn get(&self, index: usize) -> Option<&NativeLibrary> {
        self.libraries.get(index)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }
}

impl Drop for LibrarySet {
    fn drop(&mut self) {
        while let Some(library) = self.libraries.pop() {
            log::debug!("Unloading {}", library.name());
        }
    }
}
