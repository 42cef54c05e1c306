use super::CommandArgs;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type ActionFn = dyn Fn(CommandArgs) -> anyhow::Result<()> + Send + Sync;

/// A callable command body together with the identifier and doc it was declared with.
///
/// The identifier and doc feed name and help inference in
/// [`Manager::declare`](super::Manager::declare). Build one with [`action!`](crate::action)
/// to capture the function name automatically.
#[derive(Clone)]
pub struct Action {
    ident: Cow<'static, str>,
    doc: Option<Cow<'static, str>>,
    func: Arc<ActionFn>,
}

impl Action {
    pub fn new<F>(ident: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(CommandArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self { ident: ident.into(), doc: None, func: Arc::new(func) }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<Cow<'static, str>>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Identifier in CLI form: underscores become hyphens.
    #[must_use]
    pub fn command_name(&self) -> String {
        self.ident.replace('_', "-")
    }

    /// Runs the action.
    ///
    /// # Errors
    /// Returns whatever the action returns.
    pub fn call(&self, args: CommandArgs) -> anyhow::Result<()> {
        (self.func)(args)
    }

    /// Whether both actions share the same body.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("ident", &self.ident).field("doc", &self.doc).finish_non_exhaustive()
    }
}

/// Last path segment of a stringified function path.
#[doc(hidden)]
#[must_use]
pub fn action_ident(path: &'static str) -> &'static str {
    path.rsplit("::").next().unwrap_or(path).trim()
}

/// Wraps a function as an [`Action`](crate::command::Action), using its name as identifier.
///
/// ```rust,ignore
/// fn rm_cache(args: CommandArgs) -> anyhow::Result<()> { Ok(()) }
///
/// let action = action!(rm_cache, "Remove build caches.");
/// assert_eq!(action.command_name(), "rm-cache");
/// ```
#[macro_export]
macro_rules! action {
    ($func:path) => {
        $crate::command::Action::new($crate::command::action_ident(stringify!($func)), $func)
    };
    ($func:path, $doc:expr) => {
        $crate::action!($func).with_doc($doc)
    };
}
