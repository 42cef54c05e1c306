use crate::autoload::AutoloadContext;
use axum::extract::FromRef;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use tessera_domain::config::AppConfig;

#[tessera_derive::tessera_error]
pub enum HostStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct HostStateInner {
    pub config: AppConfig,
    pub context: Arc<AutoloadContext>,
}

/// Shared state of every route handler.
#[derive(Debug, Clone)]
pub struct HostState {
    inner: Arc<HostStateInner>,
}

impl HostState {
    #[must_use]
    pub fn builder() -> HostStateBuilder {
        HostStateBuilder::default()
    }
}

impl Deref for HostState {
    type Target = HostStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<HostState> for AppConfig {
    fn from_ref(state: &HostState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<HostState> for Arc<AutoloadContext> {
    fn from_ref(state: &HostState) -> Self {
        Arc::clone(&state.inner.context)
    }
}

#[derive(Debug, Default)]
pub struct HostStateBuilder {
    config: Option<AppConfig>,
    context: Option<Arc<AutoloadContext>>,
}

impl HostStateBuilder {
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn context(mut self, context: Arc<AutoloadContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// # Errors
    /// Returns [`HostStateError::Validation`] if no autoload context was provided.
    pub fn build(self) -> Result<HostState, HostStateError> {
        let context = self.context.ok_or_else(|| HostStateError::Validation {
            message: "Autoload context not provided".into(),
            context: None,
        })?;
        let config = self.config.unwrap_or_default();

        Ok(HostState { inner: Arc::new(HostStateInner { config, context }) })
    }
}
