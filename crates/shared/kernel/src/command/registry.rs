use super::Action;
use tessera_domain::command::{ArgValue, ValueType};
use tessera_domain::constants::{META_HELP, META_NAME, RESERVED_PREFIX};
use tracing::{trace, warn};

/// Declaration of one command-line argument.
///
/// An argument whose flags do not start with `-` is positional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Argument {
    pub name_or_flags: Vec<String>,
    pub value_type: ValueType,
    pub default: Option<ArgValue>,
    pub help: Option<String>,
    /// `None` lets the parser decide: positionals are required, options are not.
    pub required: Option<bool>,
}

impl Argument {
    /// An argument with no flags yet; [`Manager::declare`] fills them from the metadata key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn positional(name: impl Into<String>) -> Self {
        Self { name_or_flags: vec![name.into()], ..Self::default() }
    }

    #[must_use]
    pub fn flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name_or_flags: flags.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    #[must_use]
    pub const fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the default; a default of another type also sets the value type.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<ArgValue>) -> Self {
        let value = value.into();
        self.value_type = value.value_type();
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.name_or_flags.first().is_some_and(|f| !f.starts_with('-'))
    }

    /// Name the parsed value is stored under.
    ///
    /// The positional name, else the first long flag, else the first short flag, without
    /// leading dashes and with `-` replaced by `_`.
    #[must_use]
    pub fn dest(&self) -> String {
        let chosen = if self.is_positional() {
            self.name_or_flags.first()
        } else {
            self.name_or_flags
                .iter()
                .find(|f| f.starts_with("--"))
                .or_else(|| self.name_or_flags.first())
        };
        chosen.map(|f| f.trim_start_matches('-').replace('-', "_")).unwrap_or_default()
    }
}

/// A registered CLI command.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub help: Option<String>,
    pub action: Action,
    pub arguments: Vec<Argument>,
}

impl Command {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder { name: name.into(), help: None, arguments: Vec::new() }
    }
}

/// Fluent construction of a [`Command`].
#[derive(Debug)]
pub struct CommandBuilder {
    name: String,
    help: Option<String>,
    arguments: Vec<Argument>,
}

impl CommandBuilder {
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn arg(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn build(self, action: Action) -> Command {
        Command { name: self.name, help: self.help, action, arguments: self.arguments }
    }
}

#[derive(Debug, Clone)]
enum MetaValue {
    Argument(Argument),
    Text(String),
}

/// Declarative per-parameter metadata for [`Manager::declare`].
///
/// Keys starting with `_` configure the command itself (`_name`, `_help`); every other key
/// declares one argument. Entries keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    entries: Vec<(String, MetaValue)>,
}

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, argument: Argument) -> Self {
        self.entries.push((key.into(), MetaValue::Argument(argument)));
        self
    }

    /// Sets a command-level key such as `_name` or `_help`.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), MetaValue::Text(value.into())));
        self
    }
}

/// Command registry of one subapp.
#[derive(Debug, Clone, Default)]
pub struct Manager {
    title: Option<String>,
    help: Option<String>,
    commands: Vec<Command>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[must_use]
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Appends a fully specified command.
    pub fn add_command(
        &mut self,
        name: impl Into<String>,
        help: Option<String>,
        action: Action,
        arguments: Vec<Argument>,
    ) -> &mut Self {
        self.push(Command { name: name.into(), help, action, arguments })
    }

    pub fn push(&mut self, command: Command) -> &mut Self {
        if self.command(&command.name).is_some() {
            warn!(
                target: "autoload",
                manager = self.title().unwrap_or_default(),
                command = %command.name,
                "Command registered twice in one manager"
            );
        }
        self.commands.push(command);
        self
    }

    /// Registers `action` from declarative metadata.
    ///
    /// The command name is `_name` or the action identifier, with `_` replaced by `-`.
    /// The help is `_help` or the action doc, trimmed. An argument declared without flags
    /// becomes a positional named after its key.
    pub fn declare(&mut self, action: Action, metadata: Metadata) -> &mut Self {
        let mut name = None;
        let mut help = None;
        let mut arguments = Vec::new();

        for (key, value) in metadata.entries {
            if key.starts_with(RESERVED_PREFIX) {
                match (key.as_str(), value) {
                    (META_NAME, MetaValue::Text(text)) => name = Some(text),
                    (META_HELP, MetaValue::Text(text)) => help = Some(text),
                    (other, _) => trace!(target: "autoload", key = other, "Ignoring metadata key"),
                }
                continue;
            }

            let mut argument = match value {
                MetaValue::Argument(argument) => argument,
                MetaValue::Text(text) => Argument::new().help(text),
            };
            if argument.name_or_flags.is_empty() {
                argument.name_or_flags.push(key);
            }
            arguments.push(argument);
        }

        let name = name.map_or_else(|| action.command_name(), |n| n.replace('_', "-"));
        let help = help
            .as_deref()
            .or_else(|| action.doc())
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(ToOwned::to_owned);

        self.push(Command { name, help, action, arguments })
    }
}
