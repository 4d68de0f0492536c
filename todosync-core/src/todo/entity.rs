// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Target entity resolution
//!
//! Home Assistant names the built-in shopping list entity after the
//! instance language. This module maps a language to that entity id and,
//! with the `locale-lookup` feature, asks the instance for its language.

use thiserror::Error;

#[cfg(feature = "locale-lookup")]
use std::time::Duration;

/// Entity id of the shopping list on English instances, and the fallback.
pub const DEFAULT_ENTITY_ID: &str = "todo.shopping_list";

/// Language assumed when the instance does not report one.
pub const DEFAULT_LANGUAGE: &str = "en-GB";

/// Shopping list entity ids by primary language subtag.
const SHOPPING_LIST_ENTITIES: &[(&str, &str)] = &[
    ("da", "todo.indkobsliste"),
    ("de", "todo.einkaufsliste"),
    ("en", "todo.shopping_list"),
    ("es", "todo.lista_de_la_compra"),
    ("fr", "todo.liste_de_courses"),
    ("it", "todo.lista_della_spesa"),
    ("nb", "todo.handleliste"),
    ("nl", "todo.boodschappenlijst"),
    ("pl", "todo.lista_zakupow"),
    ("pt", "todo.lista_de_compras"),
    ("sv", "todo.inkopslista"),
];

/// Returns the shopping list entity id for a language tag such as `de-AT`.
///
/// Unknown languages fall back to [`DEFAULT_ENTITY_ID`].
pub fn entity_id_for_language(language: &str) -> &'static str {
    let primary = language
        .split(['-', '_'])
        .next()
        .unwrap_or(language)
        .to_ascii_lowercase();

    SHOPPING_LIST_ENTITIES
        .iter()
        .find(|(code, _)| *code == primary)
        .map(|(_, entity)| *entity)
        .unwrap_or(DEFAULT_ENTITY_ID)
}

/// Picks the target entity: an explicit id wins, then the language table.
pub fn resolve_entity_id(configured: Option<&str>, language: Option<&str>) -> String {
    match configured.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => entity_id_for_language(language.unwrap_or(DEFAULT_LANGUAGE)).to_string(),
    }
}

/// Derives the REST config URL from the WebSocket API URL.
///
/// `ws://host/api/websocket` becomes `http://host/api/config`, `wss` becomes `https`.
pub fn config_url(websocket_url: &str) -> Result<String, LookupError> {
    let (scheme, rest) = if let Some(rest) = websocket_url.strip_prefix("wss://") {
        ("https://", rest)
    } else if let Some(rest) = websocket_url.strip_prefix("ws://") {
        ("http://", rest)
    } else {
        return Err(LookupError::InvalidUrl(websocket_url.to_string()));
    };

    Ok(format!("{}{}", scheme, rest.replacen("websocket", "config", 1)))
}

/// Errors that can occur while looking up the instance language.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The URL is not a ws:// or wss:// URL.
    #[error("Invalid WebSocket URL: {0}")]
    InvalidUrl(String),

    /// HTTP error with status code
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Network/request error
    #[cfg(feature = "locale-lookup")]
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Reads the instance language from `GET /api/config`.
///
/// Falls back to [`DEFAULT_LANGUAGE`] when the response has no `language`.
#[cfg(feature = "locale-lookup")]
pub fn fetch_language(
    websocket_url: &str,
    token: &str,
    timeout: Duration,
) -> Result<String, LookupError> {
    let url = config_url(websocket_url)?;
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("todosync/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client.get(&url).bearer_auth(token).send()?;
    if !response.status().is_success() {
        return Err(LookupError::HttpError(response.status().as_u16()));
    }

    let config: serde_json::Value = response.json()?;
    let language = config
        .get("language")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string();
    tracing::debug!(%language, "instance language");
    Ok(language)
}
