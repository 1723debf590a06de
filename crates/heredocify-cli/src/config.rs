//! Configuration file support for heredocify
//!
//! Loads `.heredocify.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use heredocify_rules::{HeredocStyle, RewriteOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".heredocify.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rewrite: RewriteConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Preferred terminator, tried before `markers`
    pub marker: Option<String>,
    /// Replaces the built-in marker candidates
    pub markers: Option<Vec<String>>,
    /// "strip_indent" or "squiggly"
    pub heredoc: Option<HeredocStyle>,
    pub indent_width: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.heredocify.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Rewrite options from the `[rewrite]` section, CLI overrides applied on top
    pub fn rewrite_options(&self, cli_marker: Option<&str>, cli_squiggly: bool) -> RewriteOptions {
        let mut options = RewriteOptions::default();
        let section = &self.rewrite;

        if let Some(markers) = &section.markers {
            options.markers = markers.clone();
        }
        if let Some(marker) = &section.marker {
            options.prefer_marker(marker);
        }
        if let Some(heredoc) = section.heredoc {
            options.heredoc = heredoc;
        }
        if let Some(width) = section.indent_width {
            options.indent_width = width;
        }

        if let Some(marker) = cli_marker {
            options.prefer_marker(marker);
        }
        if cli_squiggly {
            options.heredoc = HeredocStyle::Squiggly;
        }

        options
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // `fixtures/` excludes that directory at any depth
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}
