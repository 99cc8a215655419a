//! Temporarily switching the current context to fill a table.

use crate::{
    resolve::resolve,
    window::{Current, Platform},
    ApiTable, Error,
};

/// Restores the previously current surface/context pair when dropped.
///
/// Nothing is restored if the target was already current when the guard was
/// created.
pub struct CurrentGuard<'a, P: Platform> {
    platform: &'a P,
    previous: Option<Current<P>>,
    swapped: bool,
}

impl<'a, P: Platform> CurrentGuard<'a, P> {
    /// Make `target` current, remembering what was current before.
    pub fn new(platform: &'a P, target: Current<P>) -> Result<Self, Error> {
        let previous = platform.current();
        let swapped = previous != Some(target);
        let guard = CurrentGuard {
            platform,
            previous,
            swapped,
        };
        if swapped {
            // The guard already exists, so a failed switch is still undone.
            platform.make_current(Some(target))?;
        }
        Ok(guard)
    }
}

impl<'a, P: Platform> Drop for CurrentGuard<'a, P> {
    fn drop(&mut self) {
        if !self.swapped {
            return;
        }
        if let Err(e) = self.platform.make_current(self.previous) {
            log::warn!("Unable to restore the previous context: {}", e);
        }
    }
}

/// Fill `out` with every entry point as resolved for the current context.
pub fn load_current<P: Platform>(platform: &P, out: &mut ApiTable) {
    *out = ApiTable::load_with(|name| resolve(platform, name));
    log::debug!(
        "Resolved {} of {} entry points",
        out.loaded_count(),
        crate::Symbol::ALL.len()
    );
}

/// Fill `out` against `surface`/`context`, leaving the calling thread's
/// current pair as it was found.
pub fn load_for_context<P: Platform>(
    platform: &P,
    surface: P::Surface,
    context: P::Context,
    out: &mut ApiTable,
) -> Result<(), Error> {
    let _guard = CurrentGuard::new(platform, (surface, context))?;
    load_current(platform, out);
    Ok(())
}
