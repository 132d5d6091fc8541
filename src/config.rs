//! TOML configuration for the `tourplan` CLI driver (`crates/cli`).
//!
//! Not part of the algorithmic core itself, but every shipped binary needs a
//! way to be told what to do: a dedicated `serde::Deserialize` config struct,
//! loaded once at startup from a TOML file.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::time::Duration;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error reading config at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Walk,
    Tsp,
}

/// The CLI's whole-config surface. `world_path` points at a JSON `World`
/// (this crate's own serialization — not a raw GTFS feed; feed ingestion is
/// left to a separate collaborator).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub world_path: PathBuf,
    pub target_stop_ids: Vec<String>,
    pub mode: Mode,
    #[serde(default)]
    pub keep_stop_ids: Option<Vec<String>>,
    #[serde(default)]
    pub min_transfer_seconds: Option<u32>,
}

impl Config {
    pub fn min_transfer(&self) -> Duration {
        Duration::from_seconds(self.min_transfer_seconds.unwrap_or(0))
    }
}

pub fn load(path: &Path) -> Result<Config, Error> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}
