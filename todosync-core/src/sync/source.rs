// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Item Sources
//!
//! Where the items to sync come from. Scraping is done elsewhere; a
//! scraper only has to implement [`ItemSource`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Item source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the titles of the remote list.
pub trait ItemSource: Send {
    /// Returns the current item titles, in source order.
    fn fetch_items(&mut self) -> Result<Vec<String>, SourceError>;
}

/// Fixed list of items.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    items: Vec<String>,
}

impl StaticSource {
    /// Creates a source that always yields `items`.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticSource {
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

impl ItemSource for StaticSource {
    fn fetch_items(&mut self) -> Result<Vec<String>, SourceError> {
        Ok(self.items.clone())
    }
}

/// Accepted layouts of an items file.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsFile {
    List(Vec<String>),
    Wrapped { items: Vec<String> },
}

/// Items read from a JSON file on every fetch.
///
/// The file holds either an array of strings or `{"items": [...]}`, so a
/// scraper can drop its output next to the config.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource { path: path.into() }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ItemSource for JsonFileSource {
    fn fetch_items(&mut self) -> Result<Vec<String>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| SourceError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let parsed: ItemsFile =
            serde_json::from_str(&content).map_err(|e| SourceError::Parse {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let items = match parsed {
            ItemsFile::List(items) | ItemsFile::Wrapped { items } => items,
        };
        debug!(path = %self.path.display(), count = items.len(), "read source items");
        Ok(items)
    }
}
