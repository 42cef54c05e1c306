use super::{Action, Argument, Command, CommandArgs, Manager};
use crate::autoload::AutoloadContext;
use clap::builder::BoolishValueParser;
use clap::{Arg, ArgAction, ArgMatches, value_parser};
use fxhash::{FxHashMap, FxHashSet};
use std::borrow::Cow;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tessera_domain::command::{ArgValue, ValueType};
use tracing::{debug, warn};

/// What happens when two commands share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The later command replaces the earlier one.
    #[default]
    LastWins,
    /// The build fails with [`CliError::Conflict`].
    Reject,
}

#[tessera_derive::tessera_error]
pub enum CliError {
    #[error("Invalid flag `{flag}` in command `{command}`{}", format_context(.context))]
    InvalidFlag { command: String, flag: String, context: Option<Cow<'static, str>> },

    #[error("Invalid argument in command `{command}`{}: {message}", format_context(.context))]
    InvalidArgument { command: String, message: String, context: Option<Cow<'static, str>> },

    #[error("Command `{command}` is provided by both `{first}` and `{second}`{}", format_context(.context))]
    Conflict {
        command: String,
        first: String,
        second: String,
        context: Option<Cow<'static, str>>,
    },
}

#[derive(Debug, Clone)]
struct Target {
    action: Action,
    provider: String,
    arguments: Vec<(String, ValueType)>,
}

/// Assembles a [`Cli`] from command managers.
#[derive(Debug)]
pub struct CliBuilder {
    program: String,
    about: Option<String>,
    collision: CollisionPolicy,
    context: Option<Arc<AutoloadContext>>,
    managers: Vec<Manager>,
}

impl CliBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            collision: CollisionPolicy::default(),
            context: None,
            managers: Vec::new(),
        }
    }

    #[must_use]
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    #[must_use]
    pub const fn collision(mut self, policy: CollisionPolicy) -> Self {
        self.collision = policy;
        self
    }

    /// Context handed to every action through [`CommandArgs::context`].
    #[must_use]
    pub fn context(mut self, context: Arc<AutoloadContext>) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn manager(mut self, manager: Manager) -> Self {
        self.managers.push(manager);
        self
    }

    #[must_use]
    pub fn managers(mut self, managers: impl IntoIterator<Item = Manager>) -> Self {
        self.managers.extend(managers);
        self
    }

    /// Builds one subcommand per command, flattened in manager-then-command order.
    ///
    /// # Errors
    /// * [`CliError::InvalidFlag`] / [`CliError::InvalidArgument`] for arguments the parser
    ///   cannot express.
    /// * [`CliError::Conflict`] for a duplicate command name under [`CollisionPolicy::Reject`].
    pub fn build(self) -> Result<Cli, CliError> {
        let mut subcommands: Vec<clap::Command> = Vec::new();
        let mut targets: FxHashMap<String, Target> = FxHashMap::default();

        for manager in &self.managers {
            let provider = manager.title().unwrap_or_default();
            for command in manager.commands() {
                let (subcommand, arguments) = build_subcommand(command, provider)?;
                let target = Target { action: command.action.clone(), provider: provider.to_owned(), arguments };

                let existing = subcommands.iter().position(|s| s.get_name() == command.name);
                match (existing, targets.get(&command.name)) {
                    (Some(index), Some(previous)) => {
                        if self.collision == CollisionPolicy::Reject {
                            return Err(CliError::Conflict {
                                command: command.name.clone(),
                                first: previous.provider.clone(),
                                second: provider.to_owned(),
                                context: None,
                            });
                        }
                        warn!(
                            target: "autoload",
                            command = %command.name,
                            replaced = %previous.provider,
                            by = provider,
                            "Command name collision, the later registration wins"
                        );
                        subcommands[index] = subcommand;
                    },
                    _ => subcommands.push(subcommand),
                }
                targets.insert(command.name.clone(), target);
            }
        }

        let mut root = clap::Command::new(self.program)
            .disable_help_subcommand(true)
            .subcommands(subcommands);
        if let Some(about) = self.about {
            root = root.about(about);
        }

        debug!(target: "autoload", commands = targets.len(), "Command line built");
        Ok(Cli { command: root, targets, context: self.context })
    }
}

fn build_subcommand(
    command: &Command,
    provider: &str,
) -> Result<(clap::Command, Vec<(String, ValueType)>), CliError> {
    let invalid = |message: String| CliError::InvalidArgument {
        command: command.name.clone(),
        message,
        context: None,
    };
    if command.name.is_empty() || command.name.starts_with('-') {
        return Err(invalid(format!("`{}` is not a valid command name", command.name)));
    }

    let mut subcommand =
        clap::Command::new(command.name.clone()).after_help(format!("Provided by: {provider}"));
    if let Some(help) = &command.help {
        subcommand = subcommand.about(help.clone());
    }

    let mut dests = FxHashSet::default();
    let mut flags = FxHashSet::default();
    let mut optional_positional = false;
    let mut arguments = Vec::with_capacity(command.arguments.len());

    for argument in &command.arguments {
        let dest = argument.dest();
        if dest.is_empty() {
            return Err(invalid("argument declares no name or flags".to_owned()));
        }
        if dest == "help" {
            return Err(invalid("`help` is reserved".to_owned()));
        }
        if !dests.insert(dest.clone()) {
            return Err(invalid(format!("`{dest}` is declared twice")));
        }
        for flag in argument.name_or_flags.iter().filter(|f| f.starts_with('-')) {
            if !flags.insert(flag.as_str()) {
                return Err(invalid(format!("flag `{flag}` is declared twice")));
            }
        }

        let arg = if argument.is_positional() {
            let arg = positional(command, argument, &dest)?;
            if arg.is_required_set() {
                if optional_positional {
                    return Err(invalid(format!(
                        "required positional `{dest}` follows an optional one"
                    )));
                }
            } else {
                optional_positional = true;
            }
            arg
        } else {
            option(command, argument, &dest)?
        };

        arguments.push((dest, argument.value_type));
        subcommand = subcommand.arg(arg);
    }

    Ok((subcommand, arguments))
}

fn positional(command: &Command, argument: &Argument, dest: &str) -> Result<Arg, CliError> {
    if argument.name_or_flags.len() > 1 {
        return Err(CliError::InvalidArgument {
            command: command.name.clone(),
            message: format!(
                "`{}` mixes a positional name with flags",
                argument.name_or_flags.join(", ")
            ),
            context: None,
        });
    }

    let mut arg = typed(Arg::new(dest.to_owned()), argument, true)
        .required(argument.required.unwrap_or(argument.default.is_none()));
    if let Some(default) = &argument.default {
        arg = arg.default_value(default.to_string());
    }
    Ok(arg)
}

fn option(command: &Command, argument: &Argument, dest: &str) -> Result<Arg, CliError> {
    let mut arg = Arg::new(dest.to_owned());
    let mut has_short = false;
    let mut has_long = false;

    for flag in &argument.name_or_flags {
        let invalid_flag = || CliError::InvalidFlag {
            command: command.name.clone(),
            flag: flag.clone(),
            context: None,
        };

        if flag == "-h" || flag == "--help" {
            return Err(CliError::InvalidArgument {
                command: command.name.clone(),
                message: format!("`{flag}` is reserved for help"),
                context: None,
            });
        }

        if let Some(long) = flag.strip_prefix("--") {
            if long.is_empty() || long.starts_with('-') {
                return Err(invalid_flag());
            }
            arg = if has_long { arg.visible_alias(long.to_owned()) } else { arg.long(long.to_owned()) };
            has_long = true;
        } else if let Some(short) = flag.strip_prefix('-') {
            let mut chars = short.chars();
            let (Some(short), None) = (chars.next(), chars.next()) else {
                return Err(invalid_flag());
            };
            if short == '-' {
                return Err(invalid_flag());
            }
            arg = if has_short { arg.visible_short_alias(short) } else { arg.short(short) };
            has_short = true;
        } else {
            return Err(CliError::InvalidArgument {
                command: command.name.clone(),
                message: format!(
                    "`{}` mixes a positional name with flags",
                    argument.name_or_flags.join(", ")
                ),
                context: None,
            });
        }
    }

    let arg = typed(arg, argument, false).required(argument.required.unwrap_or(false));
    Ok(match (&argument.default, argument.value_type) {
        (_, ValueType::Bool) => arg,
        (Some(default), _) => arg.default_value(default.to_string()),
        (None, _) => arg,
    })
}

/// Applies the value parser (or switch action) and help text.
fn typed(arg: Arg, argument: &Argument, positional: bool) -> Arg {
    let arg = match argument.value_type {
        ValueType::String => arg.value_parser(value_parser!(String)),
        ValueType::Integer => arg.value_parser(value_parser!(i64)),
        ValueType::Float => arg.value_parser(value_parser!(f64)),
        ValueType::Path => arg.value_parser(value_parser!(PathBuf)),
        ValueType::Bool if positional => arg.value_parser(BoolishValueParser::new()),
        ValueType::Bool => {
            if matches!(argument.default, Some(ArgValue::Bool(true))) {
                arg.action(ArgAction::SetFalse)
            } else {
                arg.action(ArgAction::SetTrue)
            }
        },
    };
    match &argument.help {
        Some(help) => arg.help(help.clone()),
        None => arg,
    }
}

/// Outcome of [`Cli::dispatch`].
#[derive(Debug)]
pub enum Dispatch {
    /// No subcommand was given; holds the rendered top-level help.
    Help(String),
    /// A subcommand ran.
    Completed { command: String, outcome: anyhow::Result<()> },
}

impl Dispatch {
    /// Help output and successful actions count as success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        match self {
            Self::Help(_) => true,
            Self::Completed { outcome, .. } => outcome.is_ok(),
        }
    }
}

/// A parser with one subcommand per registered command, plus its dispatch table.
#[derive(Debug, Clone)]
pub struct Cli {
    command: clap::Command,
    targets: FxHashMap<String, Target>,
    context: Option<Arc<AutoloadContext>>,
}

impl Cli {
    /// Subcommand names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.command.get_subcommands().map(clap::Command::get_name)
    }

    /// Action the dispatch table maps `name` to.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.targets.get(name).map(|t| &t.action)
    }

    /// Title of the manager that provided `name`.
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&str> {
        self.targets.get(name).map(|t| t.provider.as_str())
    }

    #[must_use]
    pub const fn command(&self) -> &clap::Command {
        &self.command
    }

    #[must_use]
    pub fn render_help(&self) -> String {
        self.command.clone().render_help().to_string()
    }

    /// Parses `argv` (program name first) and runs the selected action.
    ///
    /// The action receives every parsed value by destination name plus `root_dir`.
    ///
    /// # Errors
    /// Returns the parser's error for unknown subcommands, invalid values and `--help`.
    pub fn dispatch<I, T>(&self, argv: I, root_dir: impl Into<PathBuf>) -> Result<Dispatch, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.clone().try_get_matches_from(argv)?;
        let Some((name, sub_matches)) = matches.subcommand() else {
            return Ok(Dispatch::Help(self.render_help()));
        };
        let Some(target) = self.targets.get(name) else {
            return Err(self.command.clone().error(
                clap::error::ErrorKind::InvalidSubcommand,
                format!("no action registered for `{name}`"),
            ));
        };

        let mut args = CommandArgs::new(name, root_dir);
        if let Some(context) = &self.context {
            args = args.with_context(Arc::clone(context));
        }
        for (dest, value_type) in &target.arguments {
            if let Some(value) = extract(sub_matches, dest, *value_type) {
                args.insert(dest.clone(), value);
            }
        }

        debug!(target: "autoload", command = name, "Dispatching command");
        let outcome = target.action.call(args);
        Ok(Dispatch::Completed { command: name.to_owned(), outcome })
    }
}

fn extract(matches: &ArgMatches, dest: &str, value_type: ValueType) -> Option<ArgValue> {
    match value_type {
        ValueType::String => matches.get_one::<String>(dest).cloned().map(ArgValue::String),
        ValueType::Integer => matches.get_one::<i64>(dest).copied().map(ArgValue::Integer),
        ValueType::Float => matches.get_one::<f64>(dest).copied().map(ArgValue::Float),
        ValueType::Bool => matches.get_one::<bool>(dest).copied().map(ArgValue::Bool),
        ValueType::Path => matches.get_one::<PathBuf>(dest).cloned().map(ArgValue::Path),
    }
}
