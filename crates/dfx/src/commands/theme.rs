//! `dfx theme` command implementations.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Subcommand};
use dfx_config::{CliSettings, Config, ThemeSettings};
use dfx_theme::{
    DocumentElement, FileStore, ManualColorScheme, ResolvedTheme, StoreThemeStorageManager, Theme,
    ThemeService,
};

use crate::error::CliError;
use crate::output::Output;

/// Theme preference commands.
#[derive(Subcommand)]
pub(crate) enum ThemeCommand {
    /// Show the preference and the resolved theme.
    Show(ThemeArgs),
    /// Change the preference.
    Set {
        /// New preference (light, dark or system).
        theme: Theme,

        #[command(flatten)]
        args: ThemeArgs,
    },
    /// Cycle to the next allowed preference.
    Toggle(ThemeArgs),
}

/// Arguments shared by the theme commands.
#[derive(Args)]
pub(crate) struct ThemeArgs {
    /// System color scheme to resolve `system` against.
    #[arg(long, default_value_t = ResolvedTheme::Light)]
    system: ResolvedTheme,

    /// Preference file (overrides config).
    #[arg(long)]
    storage_path: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover dfx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ThemeArgs {
    fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            storage_path: self.storage_path.clone(),
            ..CliSettings::default()
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

impl ThemeCommand {
    /// Execute the theme command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the preference cannot
    /// be changed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let args = match &self {
            Self::Show(args) | Self::Toggle(args) | Self::Set { args, .. } => args,
        };
        let config = args.load_config()?;
        let session = ThemeSession::open(&config.theme_resolved, args.system);

        if session.service.is_forced() {
            output.warning("Forced theme is active; the preference cannot be changed");
        }

        match self {
            Self::Show(_) => {}
            Self::Set { theme, .. } => {
                session.service.set_theme(theme)?;
                output.highlight(&format!("Theme set to {theme}"));
            }
            Self::Toggle(_) => {
                let theme = session.service.toggle()?;
                output.highlight(&format!("Theme toggled to {theme}"));
            }
        }

        write!(io::stdout(), "{}", session.report())?;
        Ok(())
    }
}

/// A theme service backed by the configured preference file.
struct ThemeSession {
    service: ThemeService,
    root: DocumentElement,
    storage_path: PathBuf,
}

impl ThemeSession {
    /// Build and initialize a service for `settings`.
    fn open(settings: &ThemeSettings, system: ResolvedTheme) -> Self {
        let root = DocumentElement::new();
        let service = ThemeService::builder(settings.theme.clone())
            .with_storage(StoreThemeStorageManager::new(FileStore::new(
                &settings.storage_path,
            )))
            .with_storage_key(&settings.storage_key)
            .with_strategies(settings.strategies.iter().map(|kind| kind.build()).collect())
            .with_target(root.clone())
            .with_color_scheme_query(ManualColorScheme::new(system))
            .build();
        if !service.initialized() {
            service.initialize();
        }
        Self {
            service,
            root,
            storage_path: settings.storage_path.clone(),
        }
    }

    /// Summary printed after every theme command.
    fn report(&self) -> String {
        let service = &self.service;
        let mut out = String::new();
        writeln!(out, "preference: {}", service.theme()).unwrap();
        writeln!(out, "system:     {}", service.system_theme()).unwrap();
        writeln!(out, "resolved:   {}", service.resolved_theme()).unwrap();
        writeln!(out, "forced:     {}", if service.is_forced() { "yes" } else { "no" }).unwrap();
        writeln!(out, "storage:    {}", self.storage_path.display()).unwrap();
        writeln!(out, "root:       <html {}>", self.root.html_attributes()).unwrap();
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn settings(tmp: &TempDir) -> ThemeSettings {
        ThemeSettings {
            storage_path: tmp.path().join("prefs.json"),
            ..ThemeSettings::default()
        }
    }

    fn stored(settings: &ThemeSettings) -> serde_json::Value {
        let content = std::fs::read_to_string(&settings.storage_path).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn test_show_defaults_to_system() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);

        let session = ThemeSession::open(&settings, ResolvedTheme::Dark);

        assert_eq!(session.service.theme(), Theme::System);
        assert_eq!(session.service.resolved_theme(), ResolvedTheme::Dark);
        assert_eq!(
            session.report(),
            format!(
                "preference: system\nsystem:     dark\nresolved:   dark\nforced:     no\nstorage:    {}\nroot:       <html class=\"dark\" style=\"color-scheme: dark\">\n",
                settings.storage_path.display()
            )
        );
    }

    #[test]
    fn test_set_persists_across_sessions() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);

        let session = ThemeSession::open(&settings, ResolvedTheme::Light);
        session.service.set_theme(Theme::Dark).unwrap();
        assert_eq!(stored(&settings)["theme"], "dark");
        drop(session);

        let session = ThemeSession::open(&settings, ResolvedTheme::Light);
        assert_eq!(session.service.theme(), Theme::Dark);
        assert!(session.root.has_class("dark"));
    }

    #[test]
    fn test_toggle_cycles_through_stored_preference() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);

        let mut seen = Vec::new();
        for _ in 0..3 {
            let session = ThemeSession::open(&settings, ResolvedTheme::Light);
            seen.push(session.service.toggle().unwrap());
        }

        assert_eq!(seen, vec![Theme::Light, Theme::Dark, Theme::System]);
    }

    #[test]
    fn test_forced_theme_blocks_set() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(&tmp);
        settings.theme.forced_theme = Some(Theme::Dark);

        let session = ThemeSession::open(&settings, ResolvedTheme::Light);

        assert!(matches!(
            session.service.set_theme(Theme::Light),
            Err(dfx_theme::ThemeError::Forced)
        ));
        assert_eq!(session.service.resolved_theme(), ResolvedTheme::Dark);
    }
}
