use std::borrow::Cow;
use tessera_kernel::config::ConfigError;

#[tessera_derive::tessera_error]
pub enum SiteError {
    #[error("Site settings error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Filesystem error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Directory walk error{}: {source}", format_context(.context))]
    Walk { source: walkdir::Error, context: Option<Cow<'static, str>> },

    #[error("Manifest parse error{}: {source}", format_context(.context))]
    ManifestParse { source: toml::de::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid input{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
