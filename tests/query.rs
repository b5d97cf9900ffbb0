// tests/query.rs

//! Library locator queries against a fake installation prefix

mod common;

use common::{fake_prefix, file_names, libxc_recipe};
use mason::{libs, Compiler, Error, Selection};

const FULL_INSTALL: &[&str] = &[
    "libxc.so",
    "libxc.so.5.0.0",
    "libxc.a",
    "libxcf90.so",
    "libxcf90.a",
    "libxcf03.so",
    "libxcf03.a",
];

#[test]
fn test_default_query_returns_shared() {
    let recipe = libxc_recipe();
    let sel = Selection::from_recipe(&recipe, "5.0.0", Compiler::default()).unwrap();
    let prefix = fake_prefix(FULL_INSTALL);

    let found = libs(&recipe, &sel, prefix.path(), &[]).unwrap();
    let names = file_names(&found);
    assert_eq!(names, vec!["libxc.so", "libxc.so.5.0.0"]);
}

#[test]
fn test_static_query_overrides_shared_default() {
    let recipe = libxc_recipe();
    let sel = Selection::from_recipe(&recipe, "5.0.0", Compiler::default()).unwrap();
    let prefix = fake_prefix(FULL_INSTALL);

    // shared defaults to true, but an explicit static request wins
    let found = libs(&recipe, &sel, prefix.path(), &["static"]).unwrap();
    assert_eq!(file_names(&found), vec!["libxc.a"]);
}

#[test]
fn test_shared_off_returns_static() {
    let recipe = libxc_recipe();
    let mut sel = Selection::from_recipe(&recipe, "5.0.0", Compiler::default()).unwrap();
    sel.apply_spec(&recipe, "~shared").unwrap();
    let prefix = fake_prefix(FULL_INSTALL);

    let found = libs(&recipe, &sel, prefix.path(), &[]).unwrap();
    assert_eq!(file_names(&found), vec!["libxc.a"]);
}

#[test]
fn test_fortran_query_below_threshold_prepends_one_binding() {
    let recipe = libxc_recipe();
    let sel = Selection::from_recipe(&recipe, "3.0.0", Compiler::default()).unwrap();
    let prefix = fake_prefix(&["libxc.so", "libxcf90.so", "libxcf03.so"]);

    let found = libs(&recipe, &sel, prefix.path(), &["fortran", "static"]);
    // static artifacts absent in this tree
    assert!(found.is_err());

    let found = libs(&recipe, &sel, prefix.path(), &["fortran"]).unwrap();
    // below 4.0.0 only the f90 interface exists
    assert_eq!(file_names(&found), vec!["libxcf90.so", "libxc.so"]);
}

#[test]
fn test_fortran_query_at_threshold_prepends_two_bindings() {
    let recipe = libxc_recipe();
    let prefix = fake_prefix(FULL_INSTALL);

    for version in ["4.2.3", "4.3.4", "5.0.0"] {
        let sel = Selection::from_recipe(&recipe, version, Compiler::default()).unwrap();
        let found = libs(&recipe, &sel, prefix.path(), &["fortran"]).unwrap();
        let names = file_names(&found);
        assert_eq!(
            names,
            vec!["libxcf90.so", "libxcf03.so", "libxc.so", "libxc.so.5.0.0"],
            "wrong artifacts at {}",
            version
        );
    }
}

#[test]
fn test_fortran_static_query() {
    let recipe = libxc_recipe();
    let sel = Selection::from_recipe(&recipe, "4.3.4", Compiler::default()).unwrap();
    let prefix = fake_prefix(FULL_INSTALL);

    let found = libs(&recipe, &sel, prefix.path(), &["fortran", "static"]).unwrap();
    assert_eq!(
        file_names(&found),
        vec!["libxcf90.a", "libxcf03.a", "libxc.a"]
    );
}

#[test]
fn test_empty_prefix_surfaces_not_found() {
    let recipe = libxc_recipe();
    let sel = Selection::from_recipe(&recipe, "5.0.0", Compiler::default()).unwrap();
    let prefix = fake_prefix(&[]);

    match libs(&recipe, &sel, prefix.path(), &[]) {
        Err(Error::LibrariesNotFound { names, .. }) => {
            assert_eq!(names, vec!["libxc".to_string()]);
        }
        other => panic!("expected not-found error, got {:?}", other),
    }
}
