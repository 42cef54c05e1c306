use super::ModulePath;
use std::borrow::Cow;

/// Errors surfaced by module resolution and the autoloader context.
#[tessera_derive::tessera_error]
pub enum AutoloadError {
    /// The convention module does not exist. The autoloader treats this as a skip.
    #[error("Module not found{}: {path}", format_context(.context))]
    ModuleNotFound { path: ModulePath, context: Option<Cow<'static, str>> },

    /// The main subapp registered no `config` module.
    #[error("No config module found in the main subapp{}: {subapp}", format_context(.context))]
    MissingConfig { subapp: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A configuration or import accessor ran before the autoloader attached its context.
    /// This is an ordering bug in the boot sequence and must not be ignored.
    #[error("Autoloader context is not initialized{}", format_context(.context))]
    Uninitialized { context: Option<Cow<'static, str>> },

    /// An `on_install` hook returned an error.
    #[error("Install hook failed{}: {source}", format_context(.context))]
    Hook { source: Box<dyn std::error::Error + Send + Sync>, context: Option<Cow<'static, str>> },
}
