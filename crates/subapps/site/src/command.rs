#![allow(clippy::print_stdout)]

use crate::error::{SiteError, SiteErrorExt};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tessera_kernel::action;
use tessera_kernel::command::{Argument, CommandArgs, Manager, Metadata};
use tessera_kernel::domain::constants::{DEFAULT_MAIN_SUBAPP, INSTALLED_SUBAPPS};
use toml::Spanned;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Directory, relative to the project root, holding one crate per subapp.
pub const SUBAPPS_DIR: &str = "crates/subapps";
const CONFIG_FILE: &str = "config.toml";
const CACHE_TAG: &str = "CACHEDIR.TAG";
const CACHE_DIR: &str = "target";

const CARGO_TEMPLATE: &str = include_str!("../templates/subapp/Cargo.toml.tpl");
const LIB_TEMPLATE: &str = include_str!("../templates/subapp/lib.rs.tpl");

pub(crate) fn manager() -> Manager {
    let mut manager = Manager::new().with_help("Project scaffolding and housekeeping");
    manager
        .declare(
            action!(subapp, "\n    Create a new subapp\n"),
            Metadata::new()
                .arg("name", Argument::new().help("The name of the subapp"))
                .arg(
                    "main_subapp",
                    Argument::flags(["-m", "--main_subapp"]).help("The name of the main subapp"),
                )
                .arg(
                    "route",
                    Argument::flags(["-r", "--route"]).help("The route prefix for the subapp"),
                ),
        )
        .declare(action!(rm_cache, "Remove build cache directories"), Metadata::new());
    manager
}

/// Scaffolds `crates/subapps/<name>` and lists it in the main subapp's settings.
///
/// The main subapp's `config.toml` is read and updated in memory before anything is
/// written, and a partially written crate is removed again, so a failed run leaves the
/// project untouched.
fn subapp(args: CommandArgs) -> anyhow::Result<()> {
    let name = args.string("name").unwrap_or_default();
    validate_name(name)?;

    let main_subapp = match args.string("main_subapp") {
        Some(main) => main.to_owned(),
        None => args
            .context()
            .map_or_else(|_| DEFAULT_MAIN_SUBAPP.to_owned(), |c| c.main_subapp().to_owned()),
    };
    validate_name(&main_subapp)?;

    let subapps = args.root_dir().join(SUBAPPS_DIR);
    let target = subapps.join(name);
    if target.exists() {
        println!("Subapp '{name}' already exists.");
        return Ok(());
    }

    let config = subapps.join(&main_subapp).join(CONFIG_FILE);
    let updated = install(&config, name)?;

    let created = scaffold(&target, name, &main_subapp, args.string("route")).and_then(|()| {
        fs::write(&config, updated).context(format!("Writing {}", config.display()))
    });
    if let Err(e) = created {
        if let Err(cleanup) = fs::remove_dir_all(&target) {
            warn!(path = %target.display(), "Could not remove partial subapp: {cleanup}");
        }
        return Err(e.into());
    }

    info!(subapp = name, main_subapp = %main_subapp, "Subapp created");
    println!("Created subapp '{name}' in {}", target.display());
    println!("Register it with `tessera_{}::register` in crates/tessera.", name.replace('-', "_"));
    Ok(())
}

/// Removes every `target` directory carrying a `CACHEDIR.TAG` below the project root.
fn rm_cache(args: CommandArgs) -> anyhow::Result<()> {
    let caches = find_caches(args.root_dir())?;
    for cache in &caches {
        fs::remove_dir_all(cache).context(format!("Removing {}", cache.display()))?;
        debug!(path = %cache.display(), "Cache removed");
    }
    println!("Removed {} cache director{}", caches.len(), if caches.len() == 1 { "y" } else { "ies" });
    Ok(())
}

fn validate_name(name: &str) -> Result<(), SiteError> {
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SiteError::Invalid {
            message: format!("'{name}' is not a valid subapp name").into(),
            context: Some("use lowercase letters, digits, '-' or '_'".into()),
        })
    }
}

fn scaffold(target: &Path, name: &str, main_subapp: &str, route: Option<&str>) -> Result<(), SiteError> {
    let router = match route.map(str::trim).filter(|r| !r.is_empty()) {
        Some(prefix) => {
            let prefix = if prefix.starts_with('/') { prefix.to_owned() } else { format!("/{prefix}") };
            format!("SubappRouter::new().nest(\"{prefix}\", SubappRouter::new())")
        },
        None => "SubappRouter::new()".to_owned(),
    };
    let render = |template: &str| {
        template
            .replace("{{name}}", name)
            .replace("{{crate_name}}", &name.replace('-', "_"))
            .replace("{{main_subapp}}", main_subapp)
            .replace("{{router}}", &router)
    };

    fs::create_dir_all(target.join("src")).context(format!("Creating {}", target.display()))?;
    fs::write(target.join("Cargo.toml"), render(CARGO_TEMPLATE)).context("Writing Cargo.toml")?;
    fs::write(target.join("src").join("lib.rs"), render(LIB_TEMPLATE)).context("Writing src/lib.rs")?;
    Ok(())
}

/// Returns `config` with `name` appended to `installed_subapps`.
///
/// Only the list value is rewritten; comments and the rest of the layout are kept. A missing
/// key is inserted above the first table header.
fn install(config: &Path, name: &str) -> Result<String, SiteError> {
    let raw = fs::read_to_string(config).context(format!("Reading {}", config.display()))?;
    let installed: Installed =
        toml::from_str(&raw).context(format!("Parsing {}", config.display()))?;

    let Some(list) = installed.installed_subapps else {
        let line = format!("{INSTALLED_SUBAPPS} = {}\n", render_list(&[name]));
        let at = top_level_end(&raw);
        let separator = if at > 0 && !raw[..at].ends_with('\n') { "\n" } else { "" };
        return Ok(format!("{}{separator}{line}{}", &raw[..at], &raw[at..]));
    };

    if list.get_ref().iter().any(|s| s == name) {
        return Ok(raw);
    }
    let mut names: Vec<&str> = list.get_ref().iter().map(String::as_str).collect();
    names.push(name);

    let span = list.span();
    Ok(format!("{}{}{}", &raw[..span.start], render_list(&names), &raw[span.end..]))
}

#[derive(Deserialize)]
struct Installed {
    installed_subapps: Option<Spanned<Vec<String>>>,
}

fn render_list(names: &[&str]) -> String {
    let items: Vec<String> =
        names.iter().map(|n| toml::Value::String((*n).to_owned()).to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Byte offset of the first table header, or the end of the document.
fn top_level_end(raw: &str) -> usize {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        if line.trim_start().starts_with('[') {
            return offset;
        }
        offset += line.len();
    }
    raw.len()
}

fn find_caches(root: &Path) -> Result<Vec<PathBuf>, SiteError> {
    let mut caches = Vec::new();
    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.context("Scanning project")?;
        if entry.file_type().is_dir()
            && entry.file_name() == CACHE_DIR
            && entry.path().join(CACHE_TAG).is_file()
        {
            caches.push(entry.into_path());
            walker.skip_current_dir();
        }
    }
    Ok(caches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subapp_names_are_validated() {
        assert!(validate_name("blog").is_ok());
        assert!(validate_name("blog_posts-2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("Blog").is_err());
        assert!(validate_name("../escape").is_err());
    }

    #[test]
    fn install_rewrites_only_the_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join(CONFIG_FILE);
        fs::write(&config, "# top\ninstalled_subapps = [ 'billing' ] # trailing\n[redis]\n").unwrap();

        let updated = install(&config, "blog").unwrap();
        assert_eq!(updated, "# top\ninstalled_subapps = [\"billing\", \"blog\"] # trailing\n[redis]\n");
        assert_eq!(install(&config, "billing").unwrap(), fs::read_to_string(&config).unwrap());
    }

    #[test]
    fn missing_list_goes_before_the_first_table() {
        assert_eq!(top_level_end("a = 1\n[t]\nb = 2\n"), 6);
        assert_eq!(top_level_end("a = 1"), 5);

        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join(CONFIG_FILE);
        fs::write(&config, "a = 1").unwrap();
        assert_eq!(install(&config, "blog").unwrap(), "a = 1\ninstalled_subapps = [\"blog\"]\n");
    }

    #[test]
    fn manager_declares_both_commands() {
        let manager = manager();
        let names: Vec<_> = manager.commands().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["subapp", "rm-cache"]);

        let subapp = manager.command("subapp").unwrap();
        assert_eq!(subapp.help.as_deref(), Some("Create a new subapp"));
        assert_eq!(subapp.arguments[1].name_or_flags, ["-m", "--main_subapp"]);
        assert!(manager.command("rm-cache").unwrap().arguments.is_empty());
    }
}
