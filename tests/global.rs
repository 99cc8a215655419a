//! The process-wide free functions before any `init`. Nothing here may call
//! `init`, since that would reach the real windowing system.

use gfx_gl_loader::{ApiTable, Error, ErrorCode};

#[test]
fn uninitialized_process_loader() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Nothing to release.
    gfx_gl_loader::uninit();
    assert_eq!(gfx_gl_loader::with_instance(|i| i.init_count()), 0);
    assert!(gfx_gl_loader::with_instance(|i| i.platform().is_none()));

    let result = gfx_gl_loader::bind_api(None);
    assert_eq!(result, Err(Error::NotInitialized));
    assert_eq!(ErrorCode::from(&result), ErrorCode::OperationFailed);

    let result = gfx_gl_loader::load_for_current_context(None);
    assert_eq!(result, Err(Error::InvalidArgument));
    assert_eq!(ErrorCode::from(&result), ErrorCode::InvalidArgument);

    let mut table = ApiTable::default();
    assert_eq!(
        gfx_gl_loader::load_for_current_context(Some(&mut table)),
        Err(Error::NotInitialized)
    );
    assert_eq!(table.loaded_count(), 0);

    assert_eq!(gfx_gl_loader::api().loaded_count(), 0);
    assert!(!gfx_gl_loader::is_extension_supported(None, "GL_FOO"));
    assert!(!gfx_gl_loader::is_extension_supported(Some(&table), ""));
    assert!(gfx_gl_loader::get_proc_address("glFinish").is_null());

    // Binding an explicit table needs no bootstrap.
    assert_eq!(gfx_gl_loader::bind_api(Some(&table)), Ok(()));
    assert_eq!(gfx_gl_loader::with_instance(|i| i.init_count()), 0);
}
