//! Light/dark theme resolution.
//!
//! The [`ThemeService`] combines a stored user preference (`light`, `dark`
//! or `system`), the detected system preference and an optional forced theme
//! into one [`ResolvedTheme`], applies it to a [`ThemeTarget`] through
//! [`ThemeStrategy`]s and notifies subscribers.
//!
//! Platform concerns sit behind traits:
//!
//! - [`PreferenceStore`]: where the preference is persisted ([`MemoryStore`],
//!   [`FileStore`]), wrapped by a [`ThemeStorageManager`]
//! - [`ColorSchemeQuery`]: the platform's preferred color scheme
//!   ([`ManualColorScheme`])
//! - [`ThemeTarget`]: the element the theme is written to ([`DocumentElement`])
//!
//! Platform failures never propagate out of the service; they are logged and
//! degrade to the light theme or to no persistence.

mod config;
mod error;
mod service;
mod storage;
mod store;
mod strategy;
mod subscribers;
mod system;
mod theme;

pub use config::ThemeConfig;
pub use error::{StoreError, ThemeError};
pub use service::{Environment, ThemeService, ThemeServiceBuilder};
pub use storage::{DEFAULT_STORAGE_KEY, StoreThemeStorageManager, ThemeStorageManager};
pub use store::{FileStore, MemoryStore, PreferenceStore};
pub use strategy::{
    AttributeStrategy, COLOR_SCHEME_PROPERTY, ClassStrategy, ColorSchemeStrategy, DARK_CLASS,
    DocumentElement, StrategyKind, THEME_ATTRIBUTE, ThemeStrategy, ThemeTarget, apply_theme,
    default_strategies,
};
pub use subscribers::{Subscribers, SubscriptionId};
pub use system::{ColorSchemeQuery, ManualColorScheme, SystemThemeManager};
pub use theme::{ResolvedTheme, Theme, resolve_theme};
