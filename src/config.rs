use crate::defaults;
use crate::script::ChunkerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub chunker: ChunkerSection,
    pub session: SessionSection,
    pub analyzer: AnalyzerSection,
}

/// Chunking algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkerSection {
    pub min_chars: usize,
    pub max_words_per_chunk: usize,
    pub words_per_second: f64,
    pub min_chunk_duration_ms: u64,
}

/// Session behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSection {
    pub countdown_secs: u8,
    pub tail_phrase_words: usize,
    pub max_restart_failures: u32,
    /// Where to save the finished recording; None discards it.
    pub recording_path: Option<PathBuf>,
}

/// Remote analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerSection {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for ChunkerSection {
    fn default() -> Self {
        Self {
            min_chars: defaults::MIN_SCRIPT_CHARS,
            max_words_per_chunk: defaults::MAX_WORDS_PER_CHUNK,
            words_per_second: defaults::WORDS_PER_SECOND,
            min_chunk_duration_ms: defaults::MIN_CHUNK_DURATION_MS,
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            countdown_secs: defaults::COUNTDOWN_SECS,
            tail_phrase_words: defaults::TAIL_PHRASE_WORDS,
            max_restart_failures: defaults::MAX_RESTART_FAILURES,
            recording_path: None,
        }
    }
}

impl Default for AnalyzerSection {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: defaults::ANALYZER_MODEL.to_string(),
        }
    }
}

impl From<&ChunkerSection> for ChunkerConfig {
    fn from(section: &ChunkerSection) -> Self {
        Self {
            min_chars: section.min_chars,
            max_words_per_chunk: section.max_words_per_chunk.max(1),
            words_per_second: section.words_per_second,
            min_chunk_duration_ms: section.min_chunk_duration_ms,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    // Re-panic on invalid TOML or other errors
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - FLOWPROMPT_MODEL → analyzer.model
    /// - FLOWPROMPT_RECORDING → session.recording_path
    /// - GEMINI_API_KEY → analyzer.api_key (also enables the analyzer)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("FLOWPROMPT_MODEL")
            && !model.is_empty()
        {
            self.analyzer.model = model;
        }

        if let Ok(path) = std::env::var("FLOWPROMPT_RECORDING")
            && !path.is_empty()
        {
            self.session.recording_path = Some(PathBuf::from(path));
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY")
            && !key.is_empty()
        {
            self.analyzer.api_key = Some(key);
            self.analyzer.enabled = true;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/flowprompt/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("flowprompt")
            .join("config.toml")
    }

    /// Chunker configuration derived from the chunker section.
    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig::from(&self.chunker)
    }
}
