use super::ModulePath;
use strum_macros::Display;

/// Hook slot an event module filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum HookKind {
    Install,
    Startup,
    Shutdown,
}

/// A module that exists but does not satisfy its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    pub subapp: String,
    pub path: ModulePath,
    /// Export name that was probed.
    pub export: &'static str,
    /// Capability the export should have provided.
    pub expected: &'static str,
    /// Capability actually found, `None` when the export is missing.
    pub found: Option<&'static str>,
}

/// One observable step of an autoloader run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// A router was merged into the host.
    Mounted { subapp: String, path: ModulePath },
    /// The route or event module does not exist.
    Skipped { subapp: String, path: ModulePath },
    Violation(ContractViolation),
    HookRegistered { subapp: String, hook: HookKind },
    /// A command manager was collected (manage mode).
    ManagerCollected { subapp: String, title: String, commands: usize },
}

/// Ordered record of what the autoloader did.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    subapps: Vec<String>,
    events: Vec<LoadEvent>,
}

impl LoadReport {
    pub(crate) fn loaded(&mut self, subapp: &str) {
        self.subapps.push(subapp.to_owned());
    }

    pub(crate) fn push(&mut self, event: LoadEvent) {
        self.events.push(event);
    }

    /// Subapps that received a load pass, in load order.
    #[must_use]
    pub fn subapps(&self) -> &[String] {
        &self.subapps
    }

    #[must_use]
    pub fn is_loaded(&self, subapp: &str) -> bool {
        self.subapps.iter().any(|s| s == subapp)
    }

    #[must_use]
    pub fn events(&self) -> &[LoadEvent] {
        &self.events
    }

    pub fn mounted(&self) -> impl Iterator<Item = &ModulePath> {
        self.events.iter().filter_map(|e| match e {
            LoadEvent::Mounted { path, .. } => Some(path),
            _ => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ModulePath> {
        self.events.iter().filter_map(|e| match e {
            LoadEvent::Skipped { path, .. } => Some(path),
            _ => None,
        })
    }

    pub fn violations(&self) -> impl Iterator<Item = &ContractViolation> {
        self.events.iter().filter_map(|e| match e {
            LoadEvent::Violation(v) => Some(v),
            _ => None,
        })
    }

    pub fn hooks(&self) -> impl Iterator<Item = (&str, HookKind)> {
        self.events.iter().filter_map(|e| match e {
            LoadEvent::HookRegistered { subapp, hook } => Some((subapp.as_str(), *hook)),
            _ => None,
        })
    }
}
