// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Converter defaults loaded from environment variables.

use std::path::PathBuf;

use anyhow::Context;
use structlink_e2k::E2kOptions;
use structlink_topology::DedupConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Snapping grid, in model length units.
    pub grid_size: f64,
    /// Point merge distance, in model length units.
    pub tolerance: f64,
    /// Prepended to level names to form story names.
    pub story_prefix: String,
    /// Rigid diaphragm for floors; empty disables it.
    pub diaphragm: Option<String>,
    /// File whose contents are appended to the E2K output.
    pub custom_text: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through `var`, falling back to defaults for unset
    /// or unparsable values.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let dedup = DedupConfig::default();
        Self {
            grid_size: var("STRUCTLINK_GRID_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(dedup.grid_size),
            tolerance: var("STRUCTLINK_TOLERANCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(dedup.tolerance),
            story_prefix: var("STRUCTLINK_STORY_PREFIX").unwrap_or_default(),
            diaphragm: var("STRUCTLINK_DIAPHRAGM")
                .unwrap_or_else(|| "D1".into())
                .split_whitespace()
                .next()
                .map(str::to_string),
            custom_text: var("STRUCTLINK_CUSTOM_TEXT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Export options, reading the custom text file if one is configured.
    pub fn e2k_options(&self) -> anyhow::Result<E2kOptions> {
        let custom_text = match &self.custom_text {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read custom text {}", path.display()))?,
            ),
            None => None,
        };
        Ok(E2kOptions {
            dedup: DedupConfig {
                grid_size: self.grid_size,
                tolerance: self.tolerance,
            },
            story_prefix: self.story_prefix.clone(),
            diaphragm: self.diaphragm.clone(),
            custom_text,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = config(&[]);
        assert_eq!(c.grid_size, 0.25);
        assert_eq!(c.tolerance, 0.25);
        assert_eq!(c.story_prefix, "");
        assert_eq!(c.diaphragm.as_deref(), Some("D1"));
        assert_eq!(c.custom_text, None);
    }

    #[test]
    fn reads_overrides() {
        let c = config(&[
            ("STRUCTLINK_GRID_SIZE", "0.1"),
            ("STRUCTLINK_TOLERANCE", "not-a-number"),
            ("STRUCTLINK_STORY_PREFIX", "Story"),
            ("STRUCTLINK_DIAPHRAGM", ""),
        ]);
        assert_eq!(c.grid_size, 0.1);
        assert_eq!(c.tolerance, 0.25);
        assert_eq!(c.story_prefix, "Story");
        assert_eq!(c.diaphragm, None);
    }

    #[test]
    fn options_carry_dedup_settings() {
        let options = config(&[("STRUCTLINK_TOLERANCE", "0.5")])
            .e2k_options()
            .unwrap();
        assert_eq!(options.dedup.tolerance, 0.5);
        assert_eq!(options.custom_text, None);
    }

    #[test]
    fn missing_custom_text_file_is_an_error() {
        let c = config(&[("STRUCTLINK_CUSTOM_TEXT", "/nonexistent/structlink.txt")]);
        assert!(c.e2k_options().is_err());
    }
}
