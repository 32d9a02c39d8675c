//! Theme state machine.
//!
//! [`ThemeService`] tracks three inputs: the user's preference, the system
//! preference and an optional forced theme. Whenever they change, the
//! resolved theme is applied to the target through the configured
//! strategies and published to subscribers, and the preference is persisted.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::ThemeConfig;
use crate::error::ThemeError;
use crate::storage::{DEFAULT_STORAGE_KEY, ThemeStorageManager};
use crate::strategy::{DocumentElement, ThemeStrategy, ThemeTarget, apply_theme, default_strategies};
use crate::subscribers::{Subscribers, SubscriptionId};
use crate::system::{ColorSchemeQuery, SystemThemeManager};
use crate::theme::{ResolvedTheme, Theme, resolve_theme};

/// Where the service runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    /// Platform access available: storage, system detection, target.
    #[default]
    Interactive,
    /// No platform access. The default preference is resolved against a
    /// light system preference and nothing is stored or applied.
    Headless,
}

struct ServiceState {
    config: ThemeConfig,
    environment: Environment,
    storage_key: String,
    storage: Option<Box<dyn ThemeStorageManager>>,
    strategies: Vec<Box<dyn ThemeStrategy>>,
    target: Box<dyn ThemeTarget>,
    query: Option<Rc<dyn ColorSchemeQuery>>,
    system: SystemThemeManager,
    theme: Theme,
    system_theme: ResolvedTheme,
    last_applied: Option<ResolvedTheme>,
    last_saved: Option<Theme>,
    initialized: bool,
    destroyed: bool,
    effects_active: bool,
}

impl ServiceState {
    fn resolved(&self) -> ResolvedTheme {
        resolve_theme(
            self.theme,
            self.system_theme,
            self.config.forced_theme,
            self.config.enable_system,
        )
    }

    /// Persist and apply the current state. Returns the theme to publish.
    fn run_effects(&mut self) -> Option<ResolvedTheme> {
        if !self.effects_active || self.destroyed {
            return None;
        }

        if self.config.forced_theme.is_none() && self.last_saved != Some(self.theme) {
            if let Some(storage) = &mut self.storage {
                storage.save_theme(&self.storage_key, self.theme);
            }
            self.last_saved = Some(self.theme);
        }

        let resolved = self.resolved();
        if self.last_applied == Some(resolved) {
            return None;
        }
        if let Err(e) = apply_theme(self.target.as_ref(), resolved, &self.strategies) {
            tracing::debug!(error = %e, theme = %resolved, "Theme state changed without being applied");
        }
        self.last_applied = Some(resolved);
        Some(resolved)
    }

    fn reject(&self) -> Result<(), ThemeError> {
        if self.destroyed {
            tracing::warn!("Theme service has been destroyed");
            return Err(ThemeError::Destroyed);
        }
        if self.config.forced_theme.is_some() {
            tracing::warn!("Theme cannot be changed while forced theme is active");
            return Err(ThemeError::Forced);
        }
        Ok(())
    }
}

/// Theme preference state machine.
///
/// Single-threaded: state lives behind `Rc<RefCell<_>>` so that system
/// change listeners can reach it.
///
/// # Example
///
/// ```
/// use dfx_theme::{
///     DocumentElement, ManualColorScheme, MemoryStore, ResolvedTheme,
///     StoreThemeStorageManager, Theme, ThemeConfig, ThemeService,
/// };
///
/// let root = DocumentElement::new();
/// let system = ManualColorScheme::new(ResolvedTheme::Dark);
/// let service = ThemeService::builder(ThemeConfig::default())
///     .with_storage(StoreThemeStorageManager::new(MemoryStore::new()))
///     .with_color_scheme_query(system.clone())
///     .with_target(root.clone())
///     .build();
///
/// assert_eq!(service.theme(), Theme::System);
/// assert!(service.is_dark());
/// assert!(root.has_class("dark"));
///
/// system.set(ResolvedTheme::Light);
/// assert!(service.is_light());
/// assert!(!root.has_class("dark"));
/// ```
pub struct ThemeService {
    state: Rc<RefCell<ServiceState>>,
    subscribers: Rc<Subscribers<ResolvedTheme>>,
}

impl fmt::Debug for ThemeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ThemeService")
            .field("theme", &state.theme)
            .field("system_theme", &state.system_theme)
            .field("initialized", &state.initialized)
            .field("destroyed", &state.destroyed)
            .finish_non_exhaustive()
    }
}

impl ThemeService {
    /// Start building a service.
    #[must_use]
    pub fn builder(config: ThemeConfig) -> ThemeServiceBuilder {
        ThemeServiceBuilder::new(config)
    }

    /// Build a service with default collaborators.
    #[must_use]
    pub fn new(config: ThemeConfig) -> Self {
        Self::builder(config).build()
    }

    /// Load the preference, start tracking the system theme and apply.
    ///
    /// Does nothing (with a warning) if already initialized or destroyed.
    pub fn initialize(&self) {
        {
            let state = self.state.borrow();
            if state.destroyed {
                tracing::warn!("Theme service has been destroyed");
                return;
            }
            if state.initialized {
                tracing::warn!("Theme service is already initialized");
                return;
            }
        }

        let applied = self.initialize_state();
        self.publish(applied);
    }

    /// Storage and system detection degrade on their own, so this cannot fail.
    fn initialize_state(&self) -> Option<ResolvedTheme> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        if state.environment == Environment::Headless {
            state.theme = state.config.default_theme;
            state.system_theme = ResolvedTheme::Light;
            state.initialized = true;
            return None;
        }

        if let Some(storage) = &mut state.storage {
            storage.setup();
        }
        state.system.setup(&state.config, state.query.clone());
        let weak_state = Rc::downgrade(&self.state);
        let weak_subscribers = Rc::downgrade(&self.subscribers);
        state
            .system
            .add_change_listener(move || handle_system_change(&weak_state, &weak_subscribers));

        let loaded = match &mut state.storage {
            Some(storage) => storage.load_theme(&state.storage_key),
            None => None,
        };
        state.theme = loaded.unwrap_or(state.config.default_theme);
        state.system_theme = state.system.update_system_theme();

        state.effects_active = true;
        state.initialized = true;
        tracing::info!(
            theme = %state.theme,
            system = %state.system_theme,
            "Theme service initialized"
        );
        state.run_effects()
    }

    /// Select a preference.
    ///
    /// Rejected when destroyed, when a forced theme is active, or when
    /// `theme` is `system` and system detection is disabled.
    pub fn set_theme(&self, theme: Theme) -> Result<(), ThemeError> {
        let applied = {
            let mut state = self.state.borrow_mut();
            state.reject()?;
            if !state.config.allows(theme) {
                let available = state.config.available_themes();
                tracing::warn!(%theme, %available, "Unsupported theme");
                return Err(ThemeError::Unsupported { theme, available });
            }
            state.theme = theme;
            state.run_effects()
        };
        self.publish(applied);
        Ok(())
    }

    /// Cycle light, dark, then system (when enabled). Returns the new preference.
    pub fn toggle(&self) -> Result<Theme, ThemeError> {
        let (next, applied) = {
            let mut state = self.state.borrow_mut();
            state.reject()?;
            let themes = state.config.allowed_themes();
            let next_index = themes
                .iter()
                .position(|t| *t == state.theme)
                .map_or(0, |index| (index + 1) % themes.len());
            state.theme = themes[next_index];
            (state.theme, state.run_effects())
        };
        self.publish(applied);
        Ok(next)
    }

    /// Current preference.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.state.borrow().theme
    }

    /// Last detected system preference.
    #[must_use]
    pub fn system_theme(&self) -> ResolvedTheme {
        self.state.borrow().system_theme
    }

    /// Theme in effect.
    #[must_use]
    pub fn resolved_theme(&self) -> ResolvedTheme {
        self.state.borrow().resolved()
    }

    /// Whether the resolved theme is dark.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.resolved_theme() == ResolvedTheme::Dark
    }

    /// Whether the resolved theme is light.
    #[must_use]
    pub fn is_light(&self) -> bool {
        self.resolved_theme() == ResolvedTheme::Light
    }

    /// Whether the preference is `system`.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.theme() == Theme::System
    }

    /// Whether a forced theme is configured.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.state.borrow().config.forced_theme.is_some()
    }

    /// Whether [`initialize`](Self::initialize) has run.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// Whether [`destroy`](Self::destroy) has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    /// Key the preference is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.state.borrow().storage_key.clone()
    }

    /// Call `callback` with every newly applied resolved theme.
    pub fn subscribe(&self, callback: impl Fn(ResolvedTheme) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(move |theme| callback(*theme))
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Stop tracking the system theme and reject further changes.
    ///
    /// Idempotent. Also runs on drop.
    pub fn destroy(&self) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            tracing::warn!("Theme service is busy, skipping cleanup");
            return;
        };
        if state.destroyed {
            return;
        }
        state.destroyed = true;
        state.system.cleanup();
        tracing::debug!("Theme service destroyed");
    }

    fn publish(&self, applied: Option<ResolvedTheme>) {
        if let Some(theme) = applied {
            self.subscribers.notify(&theme);
        }
    }
}

impl Drop for ThemeService {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn handle_system_change(
    state: &Weak<RefCell<ServiceState>>,
    subscribers: &Weak<Subscribers<ResolvedTheme>>,
) {
    let (Some(state), Some(subscribers)) = (state.upgrade(), subscribers.upgrade()) else {
        return;
    };
    let applied = {
        let Ok(mut state) = state.try_borrow_mut() else {
            tracing::warn!("Ignoring system theme change during a theme update");
            return;
        };
        if state.destroyed {
            return;
        }
        state.system_theme = state.system.update_system_theme();
        tracing::debug!(system = %state.system_theme, "System theme changed");
        state.run_effects()
    };
    if let Some(theme) = applied {
        subscribers.notify(&theme);
    }
}

/// Builder for [`ThemeService`].
pub struct ThemeServiceBuilder {
    config: ThemeConfig,
    environment: Environment,
    storage_key: String,
    storage: Option<Box<dyn ThemeStorageManager>>,
    strategies: Vec<Box<dyn ThemeStrategy>>,
    target: Box<dyn ThemeTarget>,
    query: Option<Rc<dyn ColorSchemeQuery>>,
}

impl ThemeServiceBuilder {
    /// Start from `config` with default strategies, no storage and no
    /// system detection.
    #[must_use]
    pub fn new(config: ThemeConfig) -> Self {
        Self {
            config,
            environment: Environment::Interactive,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            storage: None,
            strategies: default_strategies(),
            target: Box::new(DocumentElement::new()),
            query: None,
        }
    }

    /// Persist the preference through `storage`.
    #[must_use]
    pub fn with_storage<M: ThemeStorageManager + 'static>(mut self, storage: M) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Persist under `key` instead of `theme`.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Replace the strategies.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ThemeStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Apply themes to `target`.
    #[must_use]
    pub fn with_target<T: ThemeTarget + 'static>(mut self, target: T) -> Self {
        self.target = Box::new(target);
        self
    }

    /// Detect the system theme through `query`.
    #[must_use]
    pub fn with_color_scheme_query<Q: ColorSchemeQuery + 'static>(mut self, query: Q) -> Self {
        self.query = Some(Rc::new(query));
        self
    }

    /// Set the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Build, initializing right away when auto-init is enabled.
    #[must_use]
    pub fn build(self) -> ThemeService {
        let auto_init = self.config.enable_auto_init;
        let service = ThemeService {
            state: Rc::new(RefCell::new(ServiceState {
                theme: self.config.default_theme,
                config: self.config,
                environment: self.environment,
                storage_key: self.storage_key,
                storage: self.storage,
                strategies: self.strategies,
                target: self.target,
                query: self.query,
                system: SystemThemeManager::new(),
                system_theme: ResolvedTheme::Light,
                last_applied: None,
                last_saved: None,
                initialized: false,
                destroyed: false,
                effects_active: false,
            })),
            subscribers: Rc::new(Subscribers::new()),
        };
        if auto_init {
            service.initialize();
        }
        service
    }
}
