//! Theme values and resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

/// A theme preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the system preference.
    #[default]
    System,
}

impl Theme {
    /// All preferences in toggle order.
    pub const ALL: [Self; 3] = [Self::Light, Self::Dark, Self::System];

    /// Lowercase name (`light`, `dark`, `system`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// The explicit theme this preference names, if not `system`.
    #[must_use]
    pub fn explicit(self) -> Option<ResolvedTheme> {
        match self {
            Self::Light => Some(ResolvedTheme::Light),
            Self::Dark => Some(ResolvedTheme::Dark),
            Self::System => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(ThemeError::UnknownTheme(other.to_owned())),
        }
    }
}

/// The theme actually applied after resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    /// Light appearance.
    #[default]
    Light,
    /// Dark appearance.
    Dark,
}

impl ResolvedTheme {
    /// Lowercase name (`light`, `dark`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Whether this is the dark appearance.
    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolvedTheme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ThemeError::UnknownTheme(other.to_owned())),
        }
    }
}

impl From<ResolvedTheme> for Theme {
    fn from(theme: ResolvedTheme) -> Self {
        match theme {
            ResolvedTheme::Light => Self::Light,
            ResolvedTheme::Dark => Self::Dark,
        }
    }
}

/// Collapse a preference to the theme to apply.
///
/// A forced explicit theme wins. A forced `system` has no effect on
/// resolution. A `system` preference follows `system` when detection is
/// enabled and falls back to light otherwise.
#[must_use]
pub fn resolve_theme(
    preference: Theme,
    system: ResolvedTheme,
    forced: Option<Theme>,
    enable_system: bool,
) -> ResolvedTheme {
    if let Some(forced) = forced.and_then(Theme::explicit) {
        return forced;
    }
    match preference.explicit() {
        Some(explicit) => explicit,
        None if enable_system => system,
        None => ResolvedTheme::Light,
    }
}
