use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The kinds of module a subapp may provide.
///
/// Ordering is significant: when several kinds are loaded for one subapp they are
/// processed route first, then event, then command.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Route,
    Event,
    Command,
}

impl ModuleKind {
    /// Module name used in resolved paths (`route`, `event`, `command`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Boot mode of the process.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Long-running server: routes and lifecycle hooks are wired into the host.
    #[default]
    Serve,
    /// One-shot CLI: only command registries are collected.
    Manage,
}

impl Mode {
    /// Module kinds loaded for every subapp in this mode.
    ///
    /// The two sets are disjoint and together cover every [`ModuleKind`].
    #[must_use]
    pub const fn kinds(self) -> &'static [ModuleKind] {
        match self {
            Self::Serve => &[ModuleKind::Route, ModuleKind::Event],
            Self::Manage => &[ModuleKind::Command],
        }
    }

    /// Interprets the raw value of the mode flag.
    ///
    /// Empty strings and `0`/`false`/`no`/`off` (any case) are falsy; anything else selects
    /// [`Mode::Manage`].
    #[must_use]
    pub fn from_flag(value: &str) -> Self {
        let value = value.trim();
        let falsy = value.is_empty()
            || ["0", "false", "no", "off"].iter().any(|f| value.eq_ignore_ascii_case(f));
        if falsy { Self::Serve } else { Self::Manage }
    }
}
