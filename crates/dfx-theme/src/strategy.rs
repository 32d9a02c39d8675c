//! Applying a resolved theme to a target element.
//!
//! A [`ThemeStrategy`] writes one representation of the theme (a style, a
//! class, an attribute) onto a [`ThemeTarget`]. [`apply_theme`] runs a list
//! of strategies in order.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;
use crate::theme::ResolvedTheme;

/// Class toggled by [`ClassStrategy`].
pub const DARK_CLASS: &str = "dark";
/// Attribute set by [`AttributeStrategy`].
pub const THEME_ATTRIBUTE: &str = "data-theme";
/// Style property set by [`ColorSchemeStrategy`].
pub const COLOR_SCHEME_PROPERTY: &str = "color-scheme";

/// Element a theme is applied to (the document root in a browser).
pub trait ThemeTarget {
    /// Add a class. Adding a present class is a no-op.
    fn add_class(&self, class: &str) -> Result<(), ThemeError>;
    /// Remove a class. Removing a missing class is a no-op.
    fn remove_class(&self, class: &str) -> Result<(), ThemeError>;
    /// Set an attribute.
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), ThemeError>;
    /// Set an inline style property.
    fn set_style(&self, property: &str, value: &str) -> Result<(), ThemeError>;
}

#[derive(Debug, Default)]
struct ElementState {
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    read_only: bool,
}

/// In-memory root element. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct DocumentElement {
    state: Rc<RefCell<ElementState>>,
}

impl DocumentElement {
    /// Create an element without classes, attributes or styles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `class` is present.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.contains(class)
    }

    /// Attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().attributes.get(name).cloned()
    }

    /// Inline style value.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<String> {
        self.state.borrow().styles.get(property).cloned()
    }

    /// Reject all further modifications.
    pub fn set_read_only(&self, read_only: bool) {
        self.state.borrow_mut().read_only = read_only;
    }

    /// Serialize as HTML attributes (`class="dark" data-theme="dark" style="..."`).
    #[must_use]
    pub fn html_attributes(&self) -> String {
        let state = self.state.borrow();
        let mut parts = Vec::new();
        if !state.classes.is_empty() {
            let classes: Vec<&str> = state.classes.iter().map(String::as_str).collect();
            parts.push(format!(r#"class="{}""#, classes.join(" ")));
        }
        for (name, value) in &state.attributes {
            parts.push(format!(r#"{name}="{value}""#));
        }
        if !state.styles.is_empty() {
            let styles: Vec<String> = state
                .styles
                .iter()
                .map(|(property, value)| format!("{property}: {value}"))
                .collect();
            parts.push(format!(r#"style="{}""#, styles.join("; ")));
        }
        parts.join(" ")
    }

    fn modify(&self, f: impl FnOnce(&mut ElementState)) -> Result<(), ThemeError> {
        let mut state = self.state.borrow_mut();
        if state.read_only {
            return Err(ThemeError::Target("element is read-only".to_owned()));
        }
        f(&mut state);
        Ok(())
    }
}

impl ThemeTarget for DocumentElement {
    fn add_class(&self, class: &str) -> Result<(), ThemeError> {
        self.modify(|state| {
            state.classes.insert(class.to_owned());
        })
    }

    fn remove_class(&self, class: &str) -> Result<(), ThemeError> {
        self.modify(|state| {
            state.classes.remove(class);
        })
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), ThemeError> {
        self.modify(|state| {
            state.attributes.insert(name.to_owned(), value.to_owned());
        })
    }

    fn set_style(&self, property: &str, value: &str) -> Result<(), ThemeError> {
        self.modify(|state| {
            state.styles.insert(property.to_owned(), value.to_owned());
        })
    }
}

/// Writes a resolved theme onto a target.
pub trait ThemeStrategy {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Apply `theme` to `target`.
    fn apply(&self, target: &dyn ThemeTarget, theme: ResolvedTheme) -> Result<(), ThemeError>;
}

/// Sets the `color-scheme` style to `light` or `dark`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorSchemeStrategy;

impl ThemeStrategy for ColorSchemeStrategy {
    fn name(&self) -> &'static str {
        "color-scheme"
    }

    fn apply(&self, target: &dyn ThemeTarget, theme: ResolvedTheme) -> Result<(), ThemeError> {
        target.set_style(COLOR_SCHEME_PROPERTY, theme.as_str())
    }
}

/// Adds the `dark` class for dark and removes it for light.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassStrategy;

impl ThemeStrategy for ClassStrategy {
    fn name(&self) -> &'static str {
        "class"
    }

    fn apply(&self, target: &dyn ThemeTarget, theme: ResolvedTheme) -> Result<(), ThemeError> {
        if theme.is_dark() {
            target.add_class(DARK_CLASS)
        } else {
            target.remove_class(DARK_CLASS)
        }
    }
}

/// Sets `data-theme` to `light` or `dark`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributeStrategy;

impl ThemeStrategy for AttributeStrategy {
    fn name(&self) -> &'static str {
        "attribute"
    }

    fn apply(&self, target: &dyn ThemeTarget, theme: ResolvedTheme) -> Result<(), ThemeError> {
        target.set_attribute(THEME_ATTRIBUTE, theme.as_str())
    }
}

/// Built-in strategy selector, as named in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// [`ColorSchemeStrategy`]
    ColorScheme,
    /// [`ClassStrategy`]
    Class,
    /// [`AttributeStrategy`]
    Attribute,
}

impl StrategyKind {
    /// Strategies used when none are configured.
    pub const DEFAULT: [Self; 2] = [Self::ColorScheme, Self::Class];

    /// Configuration name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ColorScheme => "color-scheme",
            Self::Class => "class",
            Self::Attribute => "attribute",
        }
    }

    /// Instantiate the strategy.
    #[must_use]
    pub fn build(self) -> Box<dyn ThemeStrategy> {
        match self {
            Self::ColorScheme => Box::new(ColorSchemeStrategy),
            Self::Class => Box::new(ClassStrategy),
            Self::Attribute => Box::new(AttributeStrategy),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "color-scheme" => Ok(Self::ColorScheme),
            "class" => Ok(Self::Class),
            "attribute" => Ok(Self::Attribute),
            other => Err(ThemeError::UnknownStrategy(other.to_owned())),
        }
    }
}

/// Color-scheme then class.
#[must_use]
pub fn default_strategies() -> Vec<Box<dyn ThemeStrategy>> {
    StrategyKind::DEFAULT.iter().map(|kind| kind.build()).collect()
}

/// Run `strategies` in order against `target`.
///
/// The first failure stops the pass and is returned.
pub fn apply_theme(
    target: &dyn ThemeTarget,
    theme: ResolvedTheme,
    strategies: &[Box<dyn ThemeStrategy>],
) -> Result<(), ThemeError> {
    for strategy in strategies {
        if let Err(e) = strategy.apply(target, theme) {
            tracing::error!(error = %e, strategy = strategy.name(), "Failed to apply theme");
            return Err(e);
        }
    }
    tracing::debug!(%theme, strategies = strategies.len(), "Applied theme");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    struct CountingStrategy(Rc<Cell<usize>>);

    impl ThemeStrategy for CountingStrategy {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn apply(&self, _target: &dyn ThemeTarget, _theme: ResolvedTheme) -> Result<(), ThemeError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    struct FailingStrategy;

    impl ThemeStrategy for FailingStrategy {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, _target: &dyn ThemeTarget, _theme: ResolvedTheme) -> Result<(), ThemeError> {
            Err(ThemeError::Target("boom".to_owned()))
        }
    }

    #[test]
    fn test_class_strategy_toggles_dark_class() {
        let element = DocumentElement::new();

        ClassStrategy.apply(&element, ResolvedTheme::Dark).unwrap();
        assert!(element.has_class("dark"));

        ClassStrategy.apply(&element, ResolvedTheme::Light).unwrap();
        assert!(!element.has_class("dark"));
    }

    #[test]
    fn test_attribute_strategy_sets_data_theme() {
        let element = DocumentElement::new();

        AttributeStrategy.apply(&element, ResolvedTheme::Dark).unwrap();
        assert_eq!(element.attribute("data-theme").as_deref(), Some("dark"));

        AttributeStrategy.apply(&element, ResolvedTheme::Light).unwrap();
        assert_eq!(element.attribute("data-theme").as_deref(), Some("light"));
    }

    #[test]
    fn test_color_scheme_strategy_sets_style() {
        let element = DocumentElement::new();

        ColorSchemeStrategy.apply(&element, ResolvedTheme::Dark).unwrap();
        assert_eq!(element.style("color-scheme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_default_strategies() {
        let element = DocumentElement::new();
        apply_theme(&element, ResolvedTheme::Dark, &default_strategies()).unwrap();

        assert_eq!(element.html_attributes(), r#"class="dark" style="color-scheme: dark""#);
    }

    #[test]
    fn test_failure_aborts_remaining_strategies() {
        let count = Rc::new(Cell::new(0));
        let strategies: Vec<Box<dyn ThemeStrategy>> = vec![
            Box::new(CountingStrategy(Rc::clone(&count))),
            Box::new(FailingStrategy),
            Box::new(CountingStrategy(Rc::clone(&count))),
        ];

        let result = apply_theme(&DocumentElement::new(), ResolvedTheme::Light, &strategies);

        assert!(matches!(result, Err(ThemeError::Target(_))));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_read_only_element_rejects_changes() {
        let element = DocumentElement::new();
        element.set_read_only(true);

        assert!(ClassStrategy.apply(&element, ResolvedTheme::Dark).is_err());
        assert!(!element.has_class("dark"));
    }

    #[test]
    fn test_strategy_kind_names() {
        for kind in [StrategyKind::ColorScheme, StrategyKind::Class, StrategyKind::Attribute] {
            assert_eq!(kind.as_str().parse::<StrategyKind>().unwrap(), kind);
            assert_eq!(kind.build().name(), kind.as_str());
        }
        assert!(matches!(
            "inline".parse::<StrategyKind>(),
            Err(ThemeError::UnknownStrategy(_))
        ));
    }
}
