//! JSON (de)serialization for [`World`] and [`Problem`].
//!
//! Opaque to the algorithmic contracts — nothing in `schedule`, `simplifier`,
//! `walk`, `solver`, `dense`, or `tsp` depends on this module. It exists so a
//! CLI (or any other collaborator) can load a `World` from disk, and so a
//! simplified `Problem` can be cached between runs without re-running the
//! simplifier.

use std::io;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::problem::Problem;
use crate::world::World;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn save<T: Serialize>(value: &T, path: &Path) -> Result<(), Error> {
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn load_world(path: &Path) -> Result<World, Error> {
    load(path)
}

pub fn save_world(world: &World, path: &Path) -> Result<(), Error> {
    save(world, path)
}

pub fn load_problem(path: &Path) -> Result<Problem, Error> {
    load(path)
}

pub fn save_problem(problem: &Problem, path: &Path) -> Result<(), Error> {
    save(problem, path)
}
