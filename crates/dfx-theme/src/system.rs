//! System color scheme detection.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::ThemeConfig;
use crate::error::ThemeError;
use crate::subscribers::{Subscribers, SubscriptionId};
use crate::theme::ResolvedTheme;

/// Source of the platform's preferred color scheme.
pub trait ColorSchemeQuery {
    /// Whether the platform currently prefers a dark scheme.
    fn prefers_dark(&self) -> Result<bool, ThemeError>;

    /// Register a callback invoked whenever the preference changes.
    fn add_change_listener(&self, listener: Box<dyn Fn()>) -> SubscriptionId;

    /// Remove a previously registered callback.
    fn remove_change_listener(&self, id: SubscriptionId) -> bool;
}

/// Color scheme set programmatically.
///
/// Clones share state, so one handle can drive changes while the theme
/// service listens through another.
#[derive(Clone, Default)]
pub struct ManualColorScheme {
    dark: Rc<Cell<bool>>,
    failing: Rc<Cell<bool>>,
    listeners: Rc<Subscribers<()>>,
}

impl ManualColorScheme {
    /// Create a query reporting `preference`.
    #[must_use]
    pub fn new(preference: ResolvedTheme) -> Self {
        let query = Self::default();
        query.dark.set(preference.is_dark());
        query
    }

    /// Change the reported preference, notifying listeners if it differs.
    pub fn set(&self, preference: ResolvedTheme) {
        if self.dark.replace(preference.is_dark()) != preference.is_dark() {
            self.listeners.notify(&());
        }
    }

    /// Make [`prefers_dark`](ColorSchemeQuery::prefers_dark) fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Number of registered change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ColorSchemeQuery for ManualColorScheme {
    fn prefers_dark(&self) -> Result<bool, ThemeError> {
        if self.failing.get() {
            return Err(ThemeError::Platform("color scheme query failed".to_owned()));
        }
        Ok(self.dark.get())
    }

    fn add_change_listener(&self, listener: Box<dyn Fn()>) -> SubscriptionId {
        self.listeners.subscribe(move |_| listener())
    }

    fn remove_change_listener(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

/// Tracks the system preference through a [`ColorSchemeQuery`].
///
/// Only active when system detection is enabled. After
/// [`cleanup`](Self::cleanup) the manager reports light and ignores new
/// listeners.
#[derive(Default)]
pub struct SystemThemeManager {
    query: Option<Rc<dyn ColorSchemeQuery>>,
    listener: Option<SubscriptionId>,
    destroyed: bool,
}

impl SystemThemeManager {
    /// Create an inactive manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `query` if system detection is enabled.
    pub fn setup(&mut self, config: &ThemeConfig, query: Option<Rc<dyn ColorSchemeQuery>>) {
        if !config.enable_system || self.destroyed {
            return;
        }
        if query.is_none() {
            tracing::warn!("No color scheme query available, system theme detection is disabled");
        }
        self.query = query;
    }

    /// Current system preference. Any failure reports light.
    pub fn update_system_theme(&self) -> ResolvedTheme {
        let Some(query) = self.active_query() else {
            return ResolvedTheme::Light;
        };
        match query.prefers_dark() {
            Ok(true) => ResolvedTheme::Dark,
            Ok(false) => ResolvedTheme::Light,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to update system theme");
                ResolvedTheme::Light
            }
        }
    }

    /// Register `callback` for system changes. Only one listener is kept.
    pub fn add_change_listener(&mut self, callback: impl Fn() + 'static) {
        if self.listener.is_some() {
            return;
        }
        if let Some(query) = self.active_query() {
            self.listener = Some(query.add_change_listener(Box::new(callback)));
        }
    }

    /// Remove the registered listener, if any.
    pub fn remove_change_listener(&mut self) {
        if let (Some(query), Some(id)) = (&self.query, self.listener.take()) {
            query.remove_change_listener(id);
        }
    }

    /// Detach from the query permanently.
    pub fn cleanup(&mut self) {
        self.remove_change_listener();
        self.destroyed = true;
        self.query = None;
    }

    /// Whether [`cleanup`](Self::cleanup) has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn active_query(&self) -> Option<&Rc<dyn ColorSchemeQuery>> {
        if self.destroyed { None } else { self.query.as_ref() }
    }
}
