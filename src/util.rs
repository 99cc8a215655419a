//! Byte-string helpers used by the extension queries.

use std::ffi::CStr;
use std::os::raw::c_char;

/// Borrow a nul-terminated string returned by the driver.
///
/// Returns `None` for a null pointer.
///
/// # Safety
/// `ptr` must be null or point to a nul-terminated string that stays alive
/// and unmodified for `'a`.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr))
    }
}

/// Iterate over the names of a space-delimited extension string.
///
/// Every single space is a boundary, so consecutive spaces yield empty
/// tokens.
pub fn extension_tokens(list: &[u8]) -> impl Iterator<Item = &[u8]> {
    list.split(|&b| b == b' ')
}

/// Check whether `name` is one of the tokens of `list`.
///
/// A token only matches if it has exactly the length and content of `name`,
/// so a prefix of a longer extension never matches. The empty name never
/// matches.
pub fn contains_extension(list: &[u8], name: &[u8]) -> bool {
    !name.is_empty() && extension_tokens(list).any(|token| token == name)
}
