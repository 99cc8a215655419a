mod common;

use common::{MockPlatform, Stage};
use gfx_gl_loader::{ApiTable, Config, Error, ErrorCode, Instance, Symbol};

#[test]
fn nested_init_keeps_resources() {
    common::reset();
    let mut instance = Instance::<MockPlatform>::new();

    instance.init(None, None).unwrap();
    let pair = (instance.surface(), instance.context());
    instance.init(None, None).unwrap();
    assert_eq!(instance.init_count(), 2);
    assert_eq!(common::live(), (1, 1, 1));
    assert_eq!((instance.surface(), instance.context()), pair);

    instance.uninit();
    assert!(instance.is_initialized());
    assert_eq!(common::live(), (1, 1, 1));

    instance.uninit();
    assert!(!instance.is_initialized());
    assert_eq!(common::live(), (0, 0, 0));
    assert!(instance.surface().is_none());
    assert!(instance.context().is_none());
    assert_eq!(instance.api().loaded_count(), 0);

    instance.uninit();
    assert_eq!(instance.init_count(), 0);
}

#[test]
fn reinit_recreates_resources() {
    common::reset();
    let mut instance = Instance::<MockPlatform>::new();

    instance.init(None, None).unwrap();
    let first = (instance.surface().unwrap(), instance.context().unwrap());
    instance.uninit();
    assert_eq!(common::live(), (0, 0, 0));

    instance.init(None, None).unwrap();
    let second = (instance.surface().unwrap(), instance.context().unwrap());
    assert_ne!(first.0, second.0);
    assert_ne!(first.1, second.1);
    assert_eq!(common::live(), (1, 1, 1));
    instance.uninit();
}

#[test]
fn first_init_binds_and_stays_current() {
    common::reset();
    let mut instance = Instance::<MockPlatform>::new();
    let mut table = ApiTable::default();

    instance.init(Some(&mut table), None).unwrap();
    assert!(table.is_loaded(Symbol::glGetString));
    assert_eq!(
        instance.api().address(Symbol::glGetString),
        table.address(Symbol::glGetString)
    );
    assert_eq!(
        common::current(),
        Some((instance.surface().unwrap(), instance.context().unwrap()))
    );

    // Later inits fill the caller's table but leave the bound one alone.
    let replacement = ApiTable::default();
    instance.bind(Some(&replacement)).unwrap();
    let mut second = ApiTable::default();
    instance.init(Some(&mut second), None).unwrap();
    assert!(second.is_loaded(Symbol::glGetString));
    assert_eq!(instance.api().loaded_count(), 0);

    instance.uninit();
    instance.uninit();
}

#[test]
fn failed_init_rolls_back() {
    let stages = [
        Stage::Library,
        Stage::Symbols,
        Stage::Surface,
        Stage::Context,
        Stage::MakeCurrent,
    ];
    for &stage in stages.iter() {
        common::reset();
        common::with(|w| w.fail = Some(stage));
        let mut instance = Instance::<MockPlatform>::new();
        let mut table = ApiTable::default();

        let result = instance.init(Some(&mut table), None);
        assert!(result.is_err(), "{:?}", stage);
        assert_eq!(ErrorCode::from(&result), ErrorCode::OperationFailed);
        assert_eq!(instance.init_count(), 0, "{:?}", stage);
        assert!(instance.platform().is_none(), "{:?}", stage);
        assert_eq!(common::live(), (0, 0, 0), "{:?}", stage);
        assert_eq!(common::current(), None, "{:?}", stage);
        assert_eq!(table.loaded_count(), 0, "{:?}", stage);

        common::with(|w| w.fail = None);
        instance.init(None, None).unwrap();
        assert_eq!(common::live(), (1, 1, 1));
        instance.uninit();
    }
}

#[test]
fn config_is_captured_once() {
    common::reset();
    let mut instance = Instance::<MockPlatform>::new();
    let single = Config {
        single_buffered: true,
        ..Config::default()
    };

    instance.init(None, Some(&single)).unwrap();
    assert_eq!(common::with(|w| w.single_buffered), Some(true));
    instance.init(None, Some(&Config::default())).unwrap();
    assert!(instance.config().unwrap().single_buffered);

    instance.uninit();
    instance.uninit();
    assert!(instance.config().is_none());

    instance.init(None, None).unwrap();
    assert_eq!(common::with(|w| w.single_buffered), Some(false));
    instance.uninit();
}

#[test]
fn bind_requires_init() {
    common::reset();
    let mut instance = Instance::<MockPlatform>::new();

    let result = instance.bind(None);
    assert_eq!(result, Err(Error::NotInitialized));
    assert_eq!(ErrorCode::from(&result), ErrorCode::OperationFailed);
    assert_eq!(common::live(), (0, 0, 0));

    let mut table = ApiTable::default();
    instance.init(Some(&mut table), None).unwrap();
    instance.bind(Some(&ApiTable::default())).unwrap();
    assert_eq!(instance.api().loaded_count(), 0);
    instance.bind(None).unwrap();
    assert_eq!(instance.api().loaded_count(), table.loaded_count());
    instance.uninit();
}

#[test]
fn drop_releases_leaked_inits() {
    common::reset();
    {
        let mut instance = Instance::<MockPlatform>::new();
        instance.init(None, None).unwrap();
        instance.init(None, None).unwrap();
        assert_eq!(common::live(), (1, 1, 1));
    }
    assert_eq!(common::live(), (0, 0, 0));
}
