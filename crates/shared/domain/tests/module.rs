use std::str::FromStr;
use strum::IntoEnumIterator;
use tessera_domain::command::{ArgValue, ValueType};
use tessera_domain::module::{Mode, ModuleKind};

#[test]
fn module_kinds_render_lowercase() {
    let names: Vec<&str> = ModuleKind::iter().map(ModuleKind::as_str).collect();
    assert_eq!(names, ["route", "event", "command"]);
    assert_eq!(ModuleKind::from_str("event").ok(), Some(ModuleKind::Event));
}

#[test]
fn mode_kind_sets_are_disjoint_and_exhaustive() {
    let serve = Mode::Serve.kinds();
    let manage = Mode::Manage.kinds();

    assert_eq!(serve, [ModuleKind::Route, ModuleKind::Event]);
    assert_eq!(manage, [ModuleKind::Command]);
    for kind in ModuleKind::iter() {
        assert!(serve.contains(&kind) ^ manage.contains(&kind), "{kind} must be in exactly one set");
    }
}

#[test]
fn mode_flag_truthiness() {
    for truthy in ["1", "true", "yes", "on", "manage"] {
        assert_eq!(Mode::from_flag(truthy), Mode::Manage, "{truthy:?}");
    }
    for falsy in ["", "  ", "0", "false", "FALSE", "no", "Off"] {
        assert_eq!(Mode::from_flag(falsy), Mode::Serve, "{falsy:?}");
    }
}

#[test]
fn arg_values_know_their_type() {
    assert_eq!(ArgValue::from("x").value_type(), ValueType::String);
    assert_eq!(ArgValue::from(3_i64).value_type(), ValueType::Integer);
    assert_eq!(ArgValue::from(true).to_string(), "true");
    assert_eq!(ValueType::Path.to_string(), "path");
}
