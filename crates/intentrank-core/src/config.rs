//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `intentrank.toml` + `intentrank.<env>.toml` +
//! `INTENTRANK_*` env vars on top of built-in defaults. Settings only feed
//! front-end defaults; the engine itself takes every parameter explicitly.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::BackoffPlan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSettings {
    pub top_k: usize,
    pub min_score: f64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self { top_k: 5, min_score: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    pub top_k_each: usize,
    pub min_score: f64,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self { top_k_each: 5, min_score: 0.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub ranking: RankingSettings,
    pub backoff: BackoffPlan,
    pub knowledge: KnowledgeSettings,
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.ranking.top_k == 0 {
            return Err(Error::InvalidConfig("ranking.top_k must be at least 1".to_string()));
        }
        if self.knowledge.top_k_each == 0 {
            return Err(Error::InvalidConfig("knowledge.top_k_each must be at least 1".to_string()));
        }
        let thresholds = [
            ("ranking.min_score", self.ranking.min_score),
            ("knowledge.min_score", self.knowledge.min_score),
            ("backoff.start", self.backoff.start),
            ("backoff.floor", self.backoff.floor),
            ("backoff.step", self.backoff.step),
        ];
        for (key, value) in thresholds {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("{key} must be a finite number, got {value}")));
            }
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Load with config files looked up in `dir`.
    pub fn load_from(dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(EngineSettings::default()))
            .merge(Toml::file(dir.join("intentrank.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("intentrank.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("intentrank.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("intentrank.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("INTENTRANK_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        tracing::debug!(env = env_name, "configuration loaded");
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<EngineSettings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read engine settings: {}", e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
