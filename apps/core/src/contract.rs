use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::dispatch::DispatchRequest;
use crate::model::OpenMode;

/// Requests the overlay sends to the extension's background collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ExtensionRequest {
    GetSettings,
    GetSearchEngines,
    GetCategories,
    Search {
        search_terms: String,
        engine_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        open_mode: Option<OpenMode>,
    },
    UseDefaultSearch {
        search_terms: String,
    },
    OpenOptions,
}

/// Messages pushed into the page by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    OpenSearchBox,
    SettingsUpdated { settings: Settings },
}

/// Acknowledgement returned for every host message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

impl From<DispatchRequest> for ExtensionRequest {
    fn from(value: DispatchRequest) -> Self {
        match value {
            DispatchRequest::Engine {
                search_terms,
                engine_id,
                open_mode,
            } => Self::Search {
                search_terms,
                engine_id,
                open_mode,
            },
            DispatchRequest::Native { search_terms } => Self::UseDefaultSearch { search_terms },
        }
    }
}
