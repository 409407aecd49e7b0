use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inject::InputMethod;
use crate::session::SessionSettings;
use crate::vocabulary::{keys, text, CountSlot, Variant, VariantOptions, Vocabulary, VocabularyBuilder};

/// User vocabulary tables, from the main config or an extra vocabulary file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct VocabularyTables {
    /// Phrase -> literal text
    pub insertions: BTreeMap<String, String>,
    /// Phrase -> literal code text
    pub code_insertions: BTreeMap<String, String>,
    /// Phrase -> key specification
    pub key_insertions: BTreeMap<String, String>,
}

impl VocabularyTables {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.code_insertions.is_empty() && self.key_insertions.is_empty()
    }

    /// Add these tables to a vocabulary builder
    pub fn apply(&self, builder: VocabularyBuilder) -> VocabularyBuilder {
        let builder = self
            .insertions
            .iter()
            .chain(&self.code_insertions)
            .fold(builder, |b, (phrase, t)| b.custom(phrase, text(t)));
        self.key_insertions.iter().fold(builder, |b, (phrase, spec)| {
            let count = if spec.contains("%(count)d") {
                CountSlot::Optional
            } else {
                CountSlot::None
            };
            b.key_insertion(phrase, keys(spec), count)
        })
    }
}

/// Configuration for vimvox
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub variant: Variant,
    pub input_method: InputMethod,
    pub key_delay_ms: u64,
    pub max_elements: usize,
    pub count_digits: usize,
    pub default_count: u32,
    pub easymotion_leader: String,
    pub log_filter: String,
    pub quiet: bool,
    pub extra_vocabulary: Vec<String>,
    #[serde(flatten)]
    pub tables: VocabularyTables,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::Vim,
            input_method: InputMethod::Direct,
            key_delay_ms: 10,
            max_elements: 10,
            count_digits: 3,
            default_count: 1,
            easymotion_leader: "comma".to_string(),
            log_filter: "vimvox=info".to_string(),
            quiet: false,
            extra_vocabulary: Vec::new(),
            tables: VocabularyTables::default(),
        }
    }
}

impl Config {
    /// Search the usual locations, writing a default config if none exists
    pub fn load(explicit: Option<&Path>) -> (Self, Option<PathBuf>) {
        if let Some(path) = explicit {
            return match Self::load_from(path) {
                Ok(config) => {
                    tracing::info!("Loaded config from: {:?}", path);
                    (config, Some(path.to_path_buf()))
                }
                Err(e) => {
                    tracing::error!("{:#}", e);
                    (Self::default(), None)
                }
            };
        }

        let config_paths = [
            dirs::config_dir().map(|p| p.join("vimvox").join("config.toml")),
            dirs::home_dir().map(|p| p.join(".vimvox").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from: {:?}", path);
                        return (config, Some(path));
                    }
                    Err(e) => tracing::warn!("{:#}", e),
                }
            }
        }

        // No config found - create one at the default location
        if let Some(config_dir) = dirs::config_dir() {
            let vimvox_dir = config_dir.join("vimvox");
            let config_path = vimvox_dir.join("config.toml");

            if let Err(e) = fs::create_dir_all(&vimvox_dir) {
                tracing::warn!("Failed to create config directory: {}", e);
            } else if let Err(e) = fs::write(&config_path, Self::default_config_content()) {
                tracing::warn!("Failed to write default config: {}", e);
            } else {
                tracing::info!("Created default config at: {:?}", config_path);
                return (Self::default(), Some(config_path));
            }
        }

        tracing::info!("Using default config");
        (Self::default(), None)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Config parse error in {:?}", path))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn default_config_content() -> &'static str {
        r##"# vimvox configuration
# Changes are hot-reloaded - no restart needed!

# Builtin vocabulary: "vim" or "rstudio"
variant = "vim"

# "direct" types each character, "clipboard" pastes text
input_method = "direct"

# Pause between injected keystrokes (ms)
key_delay_ms = 10

# Most commands and insertions allowed in one utterance
max_elements = 10

# Most digits a spoken count may have
count_digits = 3

# Count used when none is spoken
default_count = 1

# Key that starts EasyMotion motions
easymotion_leader = "comma"

# Log filter, overridden by RUST_LOG
log_filter = "vimvox=info"

# Only log warnings and errors
quiet = false

# More vocabulary files with the tables below, ~ is expanded
extra_vocabulary = []

# Spoken phrase -> literal text
[insertions]
# "my email" = "me@example.com"

# Spoken phrase -> literal code
[code_insertions]
# "shebang" = "#!/usr/bin/env bash"

# Spoken phrase -> key specification
# Strokes are comma separated: [mods-]key[/pause][:repeat | :%(count)d]
[key_insertions]
# "save all" = "escape, colon, w, a, enter"
"##
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            max_elements: self.max_elements,
            count_digits: self.count_digits,
            default_count: self.default_count,
        }
    }

    /// Default log filter when RUST_LOG is unset
    pub fn default_filter(&self) -> &str {
        if self.quiet {
            "vimvox=warn"
        } else {
            &self.log_filter
        }
    }

    fn extra_tables(&self) -> Result<Vec<VocabularyTables>> {
        self.extra_vocabulary
            .iter()
            .map(|path| {
                let path = shellexpand::tilde(path);
                let contents = fs::read_to_string(path.as_ref())
                    .with_context(|| format!("Failed to read vocabulary file {}", path))?;
                toml::from_str(&contents)
                    .with_context(|| format!("Vocabulary parse error in {}", path))
            })
            .collect()
    }

    /// Build and validate the configured vocabulary
    pub fn vocabulary(&self) -> Result<Vocabulary> {
        let options = VariantOptions {
            easymotion_leader: self.easymotion_leader.clone(),
        };
        let builder = self.variant.builder(&options);
        let builder = self.tables.apply(builder);
        let builder = self
            .extra_tables()?
            .iter()
            .fold(builder, |b, tables| tables.apply(b));

        let vocabulary = builder
            .build()
            .with_context(|| format!("Invalid {} vocabulary", self.variant.name()))?;
        Ok(vocabulary)
    }
}
