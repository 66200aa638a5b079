use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::contract::{ExtensionRequest, HostMessage};
use crate::model::{Catalog, Category, Engine};
use crate::overlay_state::{OverlayEffect, OverlayEvent, OverlaySession, SessionError, SessionId};
use crate::page_guard::{GuardRejection, LoadState, PageContext};
use crate::settings::validate_catalog;
use crate::transport::{HostPort, TransportError};

/// How long an error toast stays on screen.
pub const TOAST_DURATION_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Guard(#[from] GuardRejection),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug)]
struct PendingCatalog {
    session: SessionId,
    engines: Option<Vec<Engine>>,
    categories: Option<Vec<Category>>,
}

/// Runs an [`OverlaySession`] against a host port. Side effects that talk to the
/// extension (catalog fetches, dispatches, opening options) are performed here; the
/// remaining effects are returned for the view to render.
pub struct OverlayService<P: HostPort> {
    session: OverlaySession,
    page: PageContext,
    port: P,
    pending: Option<PendingCatalog>,
}

impl<P: HostPort> OverlayService<P> {
    pub fn new(settings: Settings, page: PageContext, port: P) -> Self {
        Self {
            session: OverlaySession::new(settings),
            page,
            port,
            pending: None,
        }
    }

    pub fn session(&self) -> &OverlaySession {
        &self.session
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn set_page(&mut self, page: PageContext) {
        self.page = page;
    }

    pub fn on_page_loaded(&mut self) {
        self.page.load_state = LoadState::Complete;
    }

    pub fn handle_host_message(
        &mut self,
        message: HostMessage,
    ) -> Result<Vec<OverlayEffect>, ServiceError> {
        match message {
            HostMessage::OpenSearchBox => {
                self.page.check_open()?;
                let effects = self.session.handle(OverlayEvent::Open)?;
                Ok(self.route(effects))
            }
            HostMessage::SettingsUpdated { settings } => {
                let effects = self.session.handle(OverlayEvent::SettingsUpdated(settings))?;
                Ok(self.route(effects))
            }
        }
    }

    /// Feeds a view event through the session. Failures are reported as a toast.
    pub fn handle_event(&mut self, event: OverlayEvent) -> Vec<OverlayEffect> {
        match self.session.handle(event) {
            Ok(effects) => self.route(effects),
            Err(error) => {
                warn!(session = self.session.id(), "overlay event failed: {error}");
                vec![toast(error.to_string())]
            }
        }
    }

    /// Asks the host for the stored settings. Until they arrive, or if the request fails, the
    /// settings passed to [`OverlayService::new`] stay in effect.
    pub fn init(&mut self) -> Vec<OverlayEffect> {
        match self.port.send(ExtensionRequest::GetSettings) {
            Ok(()) => Vec::new(),
            Err(error) => self.on_settings_loaded(Err(error)),
        }
    }

    pub fn on_settings_loaded(
        &mut self,
        result: Result<Settings, TransportError>,
    ) -> Vec<OverlayEffect> {
        match result {
            Ok(settings) => {
                debug!(engine = %settings.default_engine, "settings loaded");
                self.handle_event(OverlayEvent::SettingsUpdated(settings))
            }
            Err(error) => {
                warn!("settings fetch failed, keeping cached settings: {error}");
                Vec::new()
            }
        }
    }

    pub fn on_engines_loaded(
        &mut self,
        session: SessionId,
        result: Result<Vec<Engine>, TransportError>,
    ) -> Vec<OverlayEffect> {
        let Some(pending) = self.pending_for(session) else {
            return Vec::new();
        };
        match result {
            Ok(engines) => pending.engines = Some(engines),
            Err(error) => return self.fail_fetch(session, error),
        }
        self.complete_fetch()
    }

    pub fn on_categories_loaded(
        &mut self,
        session: SessionId,
        result: Result<Vec<Category>, TransportError>,
    ) -> Vec<OverlayEffect> {
        let Some(pending) = self.pending_for(session) else {
            return Vec::new();
        };
        match result {
            Ok(categories) => pending.categories = Some(categories),
            Err(error) => return self.fail_fetch(session, error),
        }
        self.complete_fetch()
    }

    fn pending_for(&mut self, session: SessionId) -> Option<&mut PendingCatalog> {
        match self.pending.as_mut() {
            Some(pending) if pending.session == session => Some(pending),
            _ => {
                debug!(stale = session, "ignoring catalog response for superseded session");
                None
            }
        }
    }

    fn route(&mut self, effects: Vec<OverlayEffect>) -> Vec<OverlayEffect> {
        let mut view = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                OverlayEffect::FetchCatalog { session } => view.extend(self.start_fetch(session)),
                OverlayEffect::Dispatch { request } => {
                    if let Err(error) = self.port.send(request.into()) {
                        warn!(session = self.session.id(), "search dispatch failed: {error}");
                        view.push(toast(format!("Search failed: {error}")));
                    }
                }
                OverlayEffect::OpenOptions => {
                    if let Err(error) = self.port.send(ExtensionRequest::OpenOptions) {
                        warn!("could not open options: {error}");
                    }
                }
                other => view.push(other),
            }
        }
        view
    }

    fn start_fetch(&mut self, session: SessionId) -> Vec<OverlayEffect> {
        self.pending = Some(PendingCatalog {
            session,
            engines: None,
            categories: None,
        });
        let sent = self
            .port
            .fetch(ExtensionRequest::GetSearchEngines, session)
            .and_then(|()| self.port.fetch(ExtensionRequest::GetCategories, session));
        match sent {
            Ok(()) => Vec::new(),
            Err(error) => self.fail_fetch(session, error),
        }
    }

    fn fail_fetch(&mut self, session: SessionId, error: TransportError) -> Vec<OverlayEffect> {
        self.pending = None;
        self.handle_event(OverlayEvent::CatalogFailed {
            session,
            message: error.to_string(),
        })
    }

    fn complete_fetch(&mut self) -> Vec<OverlayEffect> {
        let ready = matches!(
            &self.pending,
            Some(PendingCatalog {
                engines: Some(_),
                categories: Some(_),
                ..
            })
        );
        if !ready {
            return Vec::new();
        }
        let Some(PendingCatalog {
            session,
            engines: Some(engines),
            categories: Some(categories),
        }) = self.pending.take()
        else {
            return Vec::new();
        };

        let catalog = Catalog::new(engines, categories);
        for problem in validate_catalog(&catalog) {
            warn!(session, "catalog problem: {problem}");
        }
        info!(session, engines = catalog.engines.len(), "catalog assembled");
        self.handle_event(OverlayEvent::CatalogLoaded { session, catalog })
    }
}

fn toast(message: String) -> OverlayEffect {
    OverlayEffect::Toast {
        message,
        duration_ms: TOAST_DURATION_MS,
    }
}
