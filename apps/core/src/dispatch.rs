use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::model::{
    Catalog, CatalogError, EngineKind, OpenMode, NATIVE_ENGINE_ID, SEARCH_TERMS_PLACEHOLDER,
};
use crate::settings::validate_search_url;

/// What the overlay hands to the search-execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DispatchRequest {
    Engine {
        search_terms: String,
        engine_id: String,
        open_mode: Option<OpenMode>,
    },
    /// The browser's own search provider.
    Native { search_terms: String },
}

impl DispatchRequest {
    /// Routes `engine_id` to the native provider when it is blank or the `default` id.
    pub fn new(search_terms: String, engine_id: &str, open_mode: Option<OpenMode>) -> Self {
        let engine_id = engine_id.trim();
        if engine_id.is_empty() || engine_id == NATIVE_ENGINE_ID {
            return Self::Native { search_terms };
        }
        Self::Engine {
            search_terms,
            engine_id: engine_id.to_string(),
            open_mode,
        }
    }

    pub fn search_terms(&self) -> &str {
        match self {
            Self::Engine { search_terms, .. } | Self::Native { search_terms } => search_terms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLaunch {
    pub engine_id: String,
    pub url: String,
    pub open_mode: OpenMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPlan {
    Launches(Vec<SearchLaunch>),
    Native { search_terms: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("engine '{engine_id}' has an invalid search URL: {message}")]
    InvalidTemplate { engine_id: String, message: String },
    #[error("group '{group_id}' contains nested group '{member_id}'")]
    NestedGroup { group_id: String, member_id: String },
}

/// Resolves a request into concrete URLs and open-modes.
///
/// A single engine opens with the user's override when one was chosen, else its own mode.
/// A group opens every member with the member's override, else the member's default; the
/// user's override is deliberately not applied to group members. Members missing from the
/// catalog are skipped.
pub fn resolve(catalog: &Catalog, request: &DispatchRequest) -> Result<DispatchPlan, DispatchError> {
    let search_terms = request.search_terms().trim();
    if search_terms.is_empty() {
        return Err(DispatchError::EmptyQuery);
    }

    let (engine_id, user_override) = match request {
        DispatchRequest::Native { .. } => {
            return Ok(DispatchPlan::Native {
                search_terms: search_terms.to_string(),
            })
        }
        DispatchRequest::Engine {
            engine_id,
            open_mode,
            ..
        } => (engine_id, *open_mode),
    };

    let engine = catalog.engine(engine_id)?;
    let launches = match &engine.kind {
        EngineKind::Single {
            search_url,
            open_mode,
        } => vec![SearchLaunch {
            engine_id: engine.id.clone(),
            url: build_search_url(&engine.id, search_url, search_terms)?,
            open_mode: user_override.unwrap_or(*open_mode),
        }],
        EngineKind::Group { engines } => {
            let mut launches = Vec::with_capacity(engines.len());
            for member in engines {
                let Some(sub_engine) = catalog.find_engine(&member.id) else {
                    warn!(group = %engine.id, member = %member.id, "skipping unknown group member");
                    continue;
                };
                let EngineKind::Single {
                    search_url,
                    open_mode,
                } = &sub_engine.kind
                else {
                    return Err(DispatchError::NestedGroup {
                        group_id: engine.id.clone(),
                        member_id: member.id.clone(),
                    });
                };
                launches.push(SearchLaunch {
                    engine_id: sub_engine.id.clone(),
                    url: build_search_url(&sub_engine.id, search_url, search_terms)?,
                    open_mode: member.override_open_mode.unwrap_or(*open_mode),
                });
            }
            launches
        }
    };

    Ok(DispatchPlan::Launches(launches))
}

pub fn build_search_url(
    engine_id: &str,
    template: &str,
    search_terms: &str,
) -> Result<String, DispatchError> {
    validate_search_url(template).map_err(|message| DispatchError::InvalidTemplate {
        engine_id: engine_id.to_string(),
        message,
    })?;
    Ok(template
        .trim()
        .replacen(SEARCH_TERMS_PLACEHOLDER, &encode_search_terms(search_terms), 1))
}

/// Bytes left alone by a browser's `encodeURIComponent`: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_search_terms(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}
