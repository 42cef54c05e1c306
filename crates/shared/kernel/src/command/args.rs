use crate::autoload::{AutoloadContext, AutoloadError};
use fxhash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tessera_domain::command::ArgValue;

/// Keyword arguments handed to an [`Action`](super::Action).
///
/// Holds every parsed value by destination name, the injected project root directory and,
/// when the command line was built by the autoloader, the autoload context.
#[derive(Debug, Clone)]
pub struct CommandArgs {
    command: String,
    root_dir: PathBuf,
    values: FxHashMap<String, ArgValue>,
    context: Option<Arc<AutoloadContext>>,
}

impl CommandArgs {
    pub fn new(command: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            root_dir: root_dir.into(),
            values: FxHashMap::default(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, dest: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.values.insert(dest.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Arc<AutoloadContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub(crate) fn insert(&mut self, dest: String, value: ArgValue) {
        self.values.insert(dest, value);
    }

    /// Name of the invoked subcommand.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    #[must_use]
    pub fn get(&self, dest: &str) -> Option<&ArgValue> {
        self.values.get(dest)
    }

    #[must_use]
    pub const fn values(&self) -> &FxHashMap<String, ArgValue> {
        &self.values
    }

    #[must_use]
    pub fn string(&self, dest: &str) -> Option<&str> {
        self.get(dest).and_then(ArgValue::as_str)
    }

    #[must_use]
    pub fn integer(&self, dest: &str) -> Option<i64> {
        match self.get(dest)? {
            ArgValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, dest: &str) -> Option<f64> {
        match self.get(dest)? {
            ArgValue::Float(value) => Some(*value),
            ArgValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// A boolean switch; absent switches read as `false`.
    #[must_use]
    pub fn flag(&self, dest: &str) -> bool {
        matches!(self.get(dest), Some(ArgValue::Bool(true)))
    }

    #[must_use]
    pub fn path(&self, dest: &str) -> Option<&Path> {
        match self.get(dest)? {
            ArgValue::Path(path) => Some(path),
            ArgValue::String(raw) => Some(Path::new(raw)),
            _ => None,
        }
    }

    /// The autoload context of the run that built this command line.
    ///
    /// # Errors
    /// Returns [`AutoloadError::Uninitialized`] when the command line was built without one.
    pub fn context(&self) -> Result<&AutoloadContext, AutoloadError> {
        self.context.as_deref().ok_or(AutoloadError::Uninitialized {
            context: Some("command arguments carry no autoload context".into()),
        })
    }
}
