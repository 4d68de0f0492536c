// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use todosync_core::SyncConfig;

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Options file the settings came from.
    pub path: PathBuf,
    /// Loaded sync options.
    pub sync: SyncConfig,
}

impl CliConfig {
    /// Loads the options file, applying command-line overrides.
    pub fn load(explicit: Option<&Path>, items_file: Option<PathBuf>) -> Result<Self> {
        let path = SyncConfig::locate(explicit);
        let mut sync = SyncConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        if items_file.is_some() {
            sync.items_file = items_file;
        }
        tracing::debug!(path = %path.display(), config = ?sync, "configuration loaded");
        Ok(CliConfig { path, sync })
    }

    /// Returns the target to-do entity.
    ///
    /// With the `locale-lookup` feature and neither an entity nor a language
    /// configured, the instance is asked for its language first.
    pub fn entity_id(&self) -> String {
        self.looked_up_entity_id()
            .unwrap_or_else(|| self.sync.entity_id())
    }

    #[cfg(feature = "locale-lookup")]
    fn looked_up_entity_id(&self) -> Option<String> {
        use todosync_core::todo::{fetch_language, resolve_entity_id};

        if self.sync.list_entity_id.is_some() || self.sync.language.is_some() {
            return None;
        }
        match fetch_language(
            &self.sync.ha_url,
            &self.sync.ha_token,
            self.sync.transport_config().io_timeout,
        ) {
            Ok(language) => Some(resolve_entity_id(None, Some(&language))),
            Err(e) => {
                tracing::warn!(error = %e, "language lookup failed, using default list");
                None
            }
        }
    }

    #[cfg(not(feature = "locale-lookup"))]
    fn looked_up_entity_id(&self) -> Option<String> {
        None
    }

    /// Returns the items file, if one is configured.
    pub fn items_file(&self) -> Option<&Path> {
        self.sync.items_file.as_deref()
    }
}
