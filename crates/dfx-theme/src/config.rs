//! Theme service configuration.

use crate::theme::Theme;

/// Theme behavior settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Preference used when nothing is stored.
    pub default_theme: Theme,
    /// Initialize the service as soon as it is built.
    pub enable_auto_init: bool,
    /// Allow selecting `system` and track the system color scheme.
    ///
    /// When disabled, a `system` default still works and resolves to light.
    pub enable_system: bool,
    /// Theme that overrides any preference. Blocks changes while set.
    ///
    /// A forced `system` blocks changes but resolves like the preference.
    pub forced_theme: Option<Theme>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::System,
            enable_auto_init: true,
            enable_system: true,
            forced_theme: None,
        }
    }
}

impl ThemeConfig {
    /// Set the default preference.
    #[must_use]
    pub fn with_default_theme(mut self, theme: Theme) -> Self {
        self.default_theme = theme;
        self
    }

    /// Enable or disable initialization on build.
    #[must_use]
    pub fn with_enable_auto_init(mut self, enabled: bool) -> Self {
        self.enable_auto_init = enabled;
        self
    }

    /// Enable or disable system detection.
    #[must_use]
    pub fn with_enable_system(mut self, enabled: bool) -> Self {
        self.enable_system = enabled;
        self
    }

    /// Force a theme.
    #[must_use]
    pub fn with_forced_theme(mut self, theme: Option<Theme>) -> Self {
        self.forced_theme = theme;
        self
    }

    /// Preferences that may be selected, in toggle order.
    #[must_use]
    pub fn allowed_themes(&self) -> &'static [Theme] {
        if self.enable_system {
            &Theme::ALL
        } else {
            &Theme::ALL[..2]
        }
    }

    /// Whether `theme` may be selected.
    #[must_use]
    pub fn allows(&self, theme: Theme) -> bool {
        self.allowed_themes().contains(&theme)
    }

    pub(crate) fn available_themes(&self) -> String {
        self.allowed_themes()
            .iter()
            .map(|theme| theme.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
