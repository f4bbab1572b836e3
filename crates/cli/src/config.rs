// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads [`agx_core::RuntimeConfig`] from an on-disk TOML file, falling
//! back to the default config directory
//! (`$XDG_CONFIG_HOME/agx/config.toml` via [`dirs::config_dir`]) when no
//! explicit path is given, and to the type's built-in defaults when
//! neither exists.

use agx_core::RuntimeConfig;
use std::path::{Path, PathBuf};

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("agx").join("config.toml"))
}

pub fn load(explicit: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    let path = explicit.map(Path::to_path_buf).or_else(default_config_path);
    let Some(path) = path else {
        return Ok(RuntimeConfig::default());
    };
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(RuntimeConfig::from_toml_str(&contents)?),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(RuntimeConfig::default()),
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
