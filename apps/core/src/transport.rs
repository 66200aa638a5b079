use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Settings;
use crate::contract::{ExtensionRequest, HostAck, HostMessage};
use crate::core_service::{OverlayService, ServiceError};
use crate::dispatch::DispatchError;
use crate::model::{Category, Engine};
use crate::overlay_state::{OverlayEffect, SessionError, SessionId};
use crate::page_guard::GuardRejection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("host unreachable: {0}")]
    Disconnected(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Outgoing side of the message channel to the extension's background collaborator.
/// Sends are fire-and-forget; responses come back through [`OverlayService::on_settings_loaded`],
/// [`OverlayService::on_engines_loaded`] and [`OverlayService::on_categories_loaded`].
pub trait HostPort {
    fn send(&mut self, request: ExtensionRequest) -> Result<(), TransportError>;

    /// Sends a request whose response belongs to `session`.
    fn fetch(&mut self, request: ExtensionRequest, _session: SessionId) -> Result<(), TransportError> {
        self.send(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub request: ExtensionRequest,
    pub session: Option<SessionId>,
}

/// Port that keeps every request in memory.
#[derive(Debug, Default)]
pub struct RecordingPort {
    sent: Vec<SentRequest>,
    disconnected: bool,
}

impl RecordingPort {
    pub fn sent(&self) -> &[SentRequest] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<SentRequest> {
        std::mem::take(&mut self.sent)
    }

    /// Makes every later send fail.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    fn record(&mut self, request: ExtensionRequest, session: Option<SessionId>) -> Result<(), TransportError> {
        if self.disconnected {
            return Err(TransportError::Disconnected(
                "Could not establish connection".to_string(),
            ));
        }
        self.sent.push(SentRequest { request, session });
        Ok(())
    }
}

impl HostPort for RecordingPort {
    fn send(&mut self, request: ExtensionRequest) -> Result<(), TransportError> {
        self.record(request, None)
    }

    fn fetch(&mut self, request: ExtensionRequest, session: SessionId) -> Result<(), TransportError> {
        self.record(request, Some(session))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    PageUnsupported,
    PageNotLoaded,
    EngineNotFound,
    InvalidRequest,
    Transport,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HostResponse {
    #[serde(flatten)]
    pub ack: HostAck,
    pub effects: Vec<OverlayEffect>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: HostResponse },
    Err { error: ErrorResponse },
}

pub fn handle_message<P: HostPort>(
    service: &mut OverlayService<P>,
    message: HostMessage,
) -> TransportResponse {
    match service.handle_host_message(message) {
        Ok(effects) => TransportResponse::Ok {
            response: HostResponse {
                ack: HostAck::ok(),
                effects,
            },
        },
        Err(error) => TransportResponse::Err {
            error: map_service_error(error),
        },
    }
}

pub fn handle_json<P: HostPort>(service: &mut OverlayService<P>, payload: &str) -> String {
    let response = match serde_json::from_str::<HostMessage>(payload) {
        Ok(message) => handle_message(service, message),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|error| {
        format!(
            r#"{{"status":"err","error":{{"code":"invalid_json","message":"{}"}}}}"#,
            error.to_string().replace('"', "'")
        )
    })
}

pub fn decode_engines(payload: &str) -> Result<Vec<Engine>, TransportError> {
    serde_json::from_str(payload).map_err(|error| TransportError::InvalidPayload(error.to_string()))
}

pub fn decode_categories(payload: &str) -> Result<Vec<Category>, TransportError> {
    serde_json::from_str(payload).map_err(|error| TransportError::InvalidPayload(error.to_string()))
}

pub fn decode_settings(payload: &str) -> Result<Settings, TransportError> {
    serde_json::from_str(payload).map_err(|error| TransportError::InvalidPayload(error.to_string()))
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    let message = error.to_string();
    let code = match error {
        ServiceError::Guard(GuardRejection::Unsupported(_)) => ErrorCode::PageUnsupported,
        ServiceError::Guard(GuardRejection::NotLoaded) => ErrorCode::PageNotLoaded,
        ServiceError::Session(SessionError::Catalog(_))
        | ServiceError::Session(SessionError::Dispatch(DispatchError::Catalog(_))) => {
            ErrorCode::EngineNotFound
        }
        ServiceError::Session(SessionError::Dispatch(_)) => ErrorCode::InvalidRequest,
        ServiceError::Transport(_) => ErrorCode::Transport,
    };
    ErrorResponse { code, message }
}
