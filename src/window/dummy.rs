//! Targets without a supported windowing system.

use super::{Config, Current, Platform};
use crate::{ApiTable, Error};

use std::{
    ffi::{CStr, CString},
    os::raw::c_void,
};

/// Platform of targets without a bootstrap strategy. It can never be opened.
#[derive(Debug)]
pub enum Unsupported {}

impl Platform for Unsupported {
    type Surface = ();
    type Context = ();

    fn open() -> Result<Self, Error> {
        log::warn!("No OpenGL bootstrap strategy for this target");
        Err(Error::ResourceUnavailable {
            candidates: Vec::new(),
        })
    }

    fn create(&mut self, _: &Config) -> Result<Current<Self>, Error> {
        match *self {}
    }

    fn destroy(&mut self) {
        match *self {}
    }

    fn make_current(&self, _: Option<Current<Self>>) -> Result<(), Error> {
        match *self {}
    }

    fn current(&self) -> Option<Current<Self>> {
        match *self {}
    }

    fn proc_address(&self, _: &CStr) -> *const c_void {
        match *self {}
    }

    fn library_symbol(&self, _: &CStr) -> *const c_void {
        match *self {}
    }

    fn platform_extensions(&self, _: &ApiTable) -> Option<CString> {
        match *self {}
    }
}
