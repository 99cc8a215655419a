//! Extension support queries.
//!
//! Three sources are consulted: the indexed core list, the legacy
//! space-separated string and the string of the windowing platform. The
//! first two are mutually exclusive: once the core list is available the
//! legacy string is never looked at.

use crate::{
    api::{self, GLint, GLuint},
    util,
    window::Platform,
    ApiTable,
};

/// Scan the indexed core list for `name`, stopping at the first match.
///
/// `None` if the table cannot provide the list.
fn core_contains(api: &ApiTable, name: &[u8]) -> Option<bool> {
    let (get_integer, get_string_i) = match (api.glGetIntegerv, api.glGetStringi) {
        (Some(get_integer), Some(get_string_i)) => (get_integer, get_string_i),
        _ => return None,
    };

    let mut count: GLint = 0;
    unsafe { get_integer(api::NUM_EXTENSIONS, &mut count) };

    Some((0..count.max(0) as GLuint).any(|index| unsafe {
        util::c_str(get_string_i(api::EXTENSIONS, index) as *const _)
            .map_or(false, |extension| extension.to_bytes() == name)
    }))
}

/// The legacy extension string, or `None` if `glGetString` is unresolved.
///
/// A resolved `glGetString` returning null yields an empty string.
fn legacy_extensions(api: &ApiTable) -> Option<Vec<u8>> {
    let get_string = api.glGetString?;
    let list = unsafe { util::c_str(get_string(api::EXTENSIONS) as *const _) };
    Some(list.map_or_else(Vec::new, |list| list.to_bytes().to_vec()))
}

fn platform_supports<P: Platform>(platform: Option<&P>, api: &ApiTable, name: &[u8]) -> bool {
    platform
        .and_then(|platform| platform.platform_extensions(api))
        .map_or(false, |list| util::contains_extension(list.as_bytes(), name))
}

/// Whether `name` is advertised by any of the sources reachable through
/// `api`.
///
/// `platform` provides the windowing platform string; without it only the
/// GL sources are consulted.
pub fn is_supported<P: Platform>(platform: Option<&P>, api: &ApiTable, name: &str) -> bool {
    let name = name.as_bytes();
    if name.is_empty() {
        return false;
    }

    if let Some(found) = core_contains(api, name) {
        if found {
            return true;
        }
    } else if let Some(legacy) = legacy_extensions(api) {
        if util::contains_extension(&legacy, name) {
            return true;
        }
    } else {
        // No GL source at all, the table was never loaded.
        return false;
    }

    platform_supports(platform, api, name)
}
