use std::borrow::{Borrow, Cow};
use std::fmt;
use tessera_domain::constants::{CONFIG_MODULE, DEFAULT_NAMESPACE_ROOT};
use tessera_domain::module::ModuleKind;

/// Dotted identifier of a subapp module, e.g. `app.site.route`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(String);

impl ModulePath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ModulePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ModulePath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ModulePath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Maps `(subapp, module)` pairs to module paths under a namespace root.
///
/// Pure string composition; it never fails and never touches the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolver {
    namespace_root: Cow<'static, str>,
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self { namespace_root: Cow::Borrowed(DEFAULT_NAMESPACE_ROOT) }
    }
}

impl ModuleResolver {
    #[must_use]
    pub fn new(namespace_root: impl Into<Cow<'static, str>>) -> Self {
        Self { namespace_root: namespace_root.into() }
    }

    #[must_use]
    pub fn namespace_root(&self) -> &str {
        &self.namespace_root
    }

    /// `{root}.{subapp}` or `{root}.{subapp}.{module}`.
    #[must_use]
    pub fn resolve(&self, subapp: &str, module: Option<&str>) -> ModulePath {
        let root = &self.namespace_root;
        ModulePath(module.map_or_else(
            || format!("{root}.{subapp}"),
            |module| format!("{root}.{subapp}.{module}"),
        ))
    }

    #[must_use]
    pub fn resolve_kind(&self, subapp: &str, kind: ModuleKind) -> ModulePath {
        self.resolve(subapp, Some(kind.as_str()))
    }

    #[must_use]
    pub fn resolve_config(&self, subapp: &str) -> ModulePath {
        self.resolve(subapp, Some(CONFIG_MODULE))
    }
}
