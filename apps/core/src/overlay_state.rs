use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::commit::{commit, SessionChange};
use crate::config::{OverlayLayout, Settings};
use crate::dispatch::{self, DispatchError, DispatchRequest};
use crate::icon::{engine_icon, SuggestionIcon};
use crate::model::{Catalog, CatalogError, Engine, OpenMode, NATIVE_ENGINE_ID};
use crate::navigator::{Direction, SelectionNavigator};
use crate::search::{rank, Candidate, Suggestion};
use crate::trigger::{parse_trigger, strip_trailing_segment, TriggerKind, TriggerSegment};

/// Delay between a dispatch and hiding the overlay, so the submit animation can play.
pub const SUBMIT_CLOSE_DELAY_MS: u64 = 300;

/// Identifies one open/close cycle of the overlay.
pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPhase {
    Closed,
    /// Open with no suggestion list showing.
    Idle,
    /// Open with a trigger active and a non-empty suggestion list.
    Suggesting,
    /// Query dispatched; waiting for the close timer.
    Closing,
}

impl OverlayPhase {
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }

    fn accepts_input(self) -> bool {
        matches!(self, Self::Idle | Self::Suggesting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    Up,
    Down,
    Enter,
    Escape,
    Tab,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    Open,
    /// Full input value after a keystroke.
    Input(String),
    Key(OverlayKey),
    /// Pointer activation of the rendered suggestion at this row.
    PointerSelect(usize),
    ClickOutside,
    ClearInput,
    OpenOptions,
    /// Dispatch the current query, optionally to an explicit engine.
    Submit { engine_id: Option<String> },
    CatalogLoaded { session: SessionId, catalog: Catalog },
    CatalogFailed { session: SessionId, message: String },
    SettingsUpdated(Settings),
    CloseTimerElapsed { session: SessionId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum OverlayEffect {
    Show,
    Hide,
    FocusInput,
    SetText { text: String },
    ShowSuggestions { suggestions: Vec<Suggestion> },
    HideSuggestions,
    Highlight { index: usize },
    EngineBadge { icon: SuggestionIcon },
    ApplyLayout { layout: OverlayLayout },
    PlaySubmitAnimation,
    ScheduleClose { session: SessionId, delay_ms: u64 },
    Toast { message: String, duration_ms: u64 },
    FetchCatalog { session: SessionId },
    Dispatch { request: DispatchRequest },
    OpenOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// State of the page's single overlay instance. Per-open fields are reset on every open;
/// the settings and the last loaded catalog survive across sessions.
#[derive(Debug, Clone)]
pub struct OverlaySession {
    id: SessionId,
    phase: OverlayPhase,
    settings: Settings,
    catalog: Option<Catalog>,
    raw_text: String,
    trigger: Option<TriggerSegment>,
    suggestions: Vec<Suggestion>,
    navigator: SelectionNavigator,
    active_engine_id: String,
    pending_open_mode: Option<OpenMode>,
}

impl OverlaySession {
    pub fn new(settings: Settings) -> Self {
        let active_engine_id = settings.default_engine.clone();
        Self {
            id: 0,
            phase: OverlayPhase::Closed,
            settings,
            catalog: None,
            raw_text: String::new(),
            trigger: None,
            suggestions: Vec::new(),
            navigator: SelectionNavigator::default(),
            active_engine_id,
            pending_open_mode: None,
        }
    }

    pub fn handle(&mut self, event: OverlayEvent) -> Result<Vec<OverlayEffect>, SessionError> {
        match event {
            OverlayEvent::Open => Ok(self.open()),
            OverlayEvent::SettingsUpdated(settings) => Ok(self.apply_settings(settings)),
            OverlayEvent::CatalogLoaded { session, catalog } => {
                Ok(self.on_catalog_loaded(session, catalog))
            }
            OverlayEvent::CatalogFailed { session, message } => {
                self.on_catalog_failed(session, &message);
                Ok(Vec::new())
            }
            OverlayEvent::CloseTimerElapsed { session } => {
                if session == self.id && self.phase == OverlayPhase::Closing {
                    Ok(self.close())
                } else {
                    Ok(Vec::new())
                }
            }
            _ if !self.phase.accepts_input() => Ok(Vec::new()),
            OverlayEvent::Input(text) => {
                self.raw_text = text;
                Ok(self.refresh_suggestions())
            }
            OverlayEvent::Key(key) => self.on_key(key),
            OverlayEvent::PointerSelect(index) => Ok(self.select(index)),
            OverlayEvent::ClickOutside => Ok(self.close()),
            OverlayEvent::ClearInput => {
                self.raw_text.clear();
                let mut effects = vec![OverlayEffect::SetText {
                    text: String::new(),
                }];
                effects.extend(self.refresh_suggestions());
                effects.push(OverlayEffect::FocusInput);
                Ok(effects)
            }
            OverlayEvent::OpenOptions => {
                let mut effects = vec![OverlayEffect::OpenOptions];
                effects.extend(self.close());
                Ok(effects)
            }
            OverlayEvent::Submit { engine_id } => {
                if self.phase != OverlayPhase::Idle {
                    return Ok(Vec::new());
                }
                self.dispatch(engine_id)
            }
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn trigger(&self) -> Option<&TriggerSegment> {
        self.trigger.as_ref()
    }

    /// Visible suggestions; empty whenever the list is hidden.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Highlighted row, -1 when none.
    pub fn highlighted_index(&self) -> isize {
        self.navigator.highlighted_index()
    }

    pub fn active_engine_id(&self) -> &str {
        &self.active_engine_id
    }

    pub fn pending_open_mode(&self) -> Option<OpenMode> {
        self.pending_open_mode
    }

    /// The active engine, `None` for native search or before the catalog has loaded.
    pub fn active_engine(&self) -> Result<Option<&Engine>, CatalogError> {
        if self.active_engine_id == NATIVE_ENGINE_ID {
            return Ok(None);
        }
        match &self.catalog {
            Some(catalog) => catalog.engine(&self.active_engine_id).map(Some),
            None => Ok(None),
        }
    }

    fn open(&mut self) -> Vec<OverlayEffect> {
        self.id += 1;
        self.phase = OverlayPhase::Idle;
        self.raw_text.clear();
        self.trigger = None;
        self.suggestions.clear();
        self.navigator.clear();
        self.pending_open_mode = None;
        self.active_engine_id = self.settings.default_engine.clone();
        info!(session = self.id, engine = %self.active_engine_id, "overlay opened");

        let mut effects = vec![
            OverlayEffect::Show,
            OverlayEffect::ApplyLayout {
                layout: self.settings.layout(),
            },
            OverlayEffect::SetText {
                text: String::new(),
            },
            OverlayEffect::HideSuggestions,
            OverlayEffect::FocusInput,
        ];
        effects.extend(self.engine_badge());
        effects.push(OverlayEffect::FetchCatalog { session: self.id });
        effects
    }

    fn close(&mut self) -> Vec<OverlayEffect> {
        if self.phase == OverlayPhase::Closed {
            return Vec::new();
        }
        info!(session = self.id, "overlay closed");
        self.phase = OverlayPhase::Closed;
        self.raw_text.clear();
        self.trigger = None;
        self.suggestions.clear();
        self.navigator.clear();
        self.pending_open_mode = None;

        vec![
            OverlayEffect::HideSuggestions,
            OverlayEffect::SetText {
                text: String::new(),
            },
            OverlayEffect::Hide,
        ]
    }

    fn apply_settings(&mut self, settings: Settings) -> Vec<OverlayEffect> {
        self.settings = settings;
        if !self.phase.is_open() {
            return Vec::new();
        }
        vec![OverlayEffect::ApplyLayout {
            layout: self.settings.layout(),
        }]
    }

    fn on_catalog_loaded(&mut self, session: SessionId, catalog: Catalog) -> Vec<OverlayEffect> {
        if session != self.id {
            debug!(stale = session, current = self.id, "discarding catalog for superseded session");
            return Vec::new();
        }
        debug!(
            session,
            engines = catalog.engines.len(),
            categories = catalog.categories.len(),
            "catalog loaded"
        );
        self.catalog = Some(catalog);

        let mut effects = self.engine_badge();
        if self.phase.accepts_input()
            && self.trigger.as_ref().map(|trigger| trigger.kind) == Some(TriggerKind::Engine)
        {
            effects.extend(self.refresh_suggestions());
        }
        effects
    }

    fn on_catalog_failed(&mut self, session: SessionId, message: &str) {
        if session != self.id {
            return;
        }
        warn!(
            session,
            cached = self.catalog.is_some(),
            "catalog fetch failed: {message}"
        );
    }

    fn refresh_suggestions(&mut self) -> Vec<OverlayEffect> {
        let was_visible = self.phase == OverlayPhase::Suggesting;
        self.trigger = parse_trigger(&self.raw_text);
        self.suggestions = match &self.trigger {
            Some(trigger) => rank(trigger, self.catalog.as_ref()),
            None => Vec::new(),
        };
        self.navigator.reset(self.suggestions.len());

        if self.suggestions.is_empty() {
            self.phase = OverlayPhase::Idle;
            if was_visible {
                return vec![OverlayEffect::HideSuggestions];
            }
            return Vec::new();
        }

        self.phase = OverlayPhase::Suggesting;
        vec![OverlayEffect::ShowSuggestions {
            suggestions: self.suggestions.clone(),
        }]
    }

    fn on_key(&mut self, key: OverlayKey) -> Result<Vec<OverlayEffect>, SessionError> {
        match key {
            OverlayKey::Escape => Ok(self.close()),
            OverlayKey::Tab => Ok(Vec::new()),
            OverlayKey::Up => Ok(self.move_highlight(Direction::Up)),
            OverlayKey::Down => Ok(self.move_highlight(Direction::Down)),
            OverlayKey::Enter => {
                if self.phase == OverlayPhase::Suggesting {
                    let index = self.navigator.highlighted().unwrap_or(0);
                    return Ok(self.select(index));
                }
                if self.trigger.is_some() {
                    debug!(session = self.id, "enter ignored while a trigger segment is open");
                    return Ok(Vec::new());
                }
                self.dispatch(None)
            }
        }
    }

    fn move_highlight(&mut self, direction: Direction) -> Vec<OverlayEffect> {
        if self.phase != OverlayPhase::Suggesting || !self.navigator.step(direction) {
            return Vec::new();
        }
        match self.navigator.highlighted() {
            Some(index) => vec![OverlayEffect::Highlight { index }],
            None => Vec::new(),
        }
    }

    fn select(&mut self, index: usize) -> Vec<OverlayEffect> {
        if self.phase != OverlayPhase::Suggesting {
            return Vec::new();
        }
        let Some(candidate) = self
            .suggestions
            .get(index)
            .map(|suggestion| suggestion.candidate.clone())
        else {
            return Vec::new();
        };
        self.apply_commit(&candidate)
    }

    fn apply_commit(&mut self, candidate: &Candidate) -> Vec<OverlayEffect> {
        let outcome = commit(&self.raw_text, candidate);
        let engine_changed = match outcome.change {
            SessionChange::ActiveEngine(id) => {
                info!(session = self.id, engine = %id, "active engine committed");
                self.active_engine_id = id;
                true
            }
            SessionChange::OpenModeOverride(mode) => {
                info!(session = self.id, mode = mode.id(), "open-mode override committed");
                self.pending_open_mode = Some(mode);
                false
            }
        };

        self.raw_text = outcome.text;
        self.trigger = parse_trigger(&self.raw_text);
        self.suggestions.clear();
        self.navigator.clear();
        self.phase = OverlayPhase::Idle;

        let mut effects = vec![
            OverlayEffect::SetText {
                text: self.raw_text.clone(),
            },
            OverlayEffect::HideSuggestions,
            OverlayEffect::FocusInput,
        ];
        if engine_changed {
            effects.extend(self.engine_badge());
        }
        effects
    }

    fn dispatch(&mut self, engine_id: Option<String>) -> Result<Vec<OverlayEffect>, SessionError> {
        let search_terms = strip_trailing_segment(&self.raw_text).trim().to_string();
        if search_terms.is_empty() {
            debug!(session = self.id, "empty query; nothing dispatched");
            return Ok(Vec::new());
        }

        let engine_id = engine_id.unwrap_or_else(|| self.active_engine_id.clone());
        let request = DispatchRequest::new(search_terms, &engine_id, self.pending_open_mode);
        if let Some(catalog) = &self.catalog {
            dispatch::resolve(catalog, &request)?;
        }

        info!(session = self.id, engine = %engine_id, "query dispatched");
        self.pending_open_mode = None;
        self.phase = OverlayPhase::Closing;

        Ok(vec![
            OverlayEffect::PlaySubmitAnimation,
            OverlayEffect::Dispatch { request },
            OverlayEffect::ScheduleClose {
                session: self.id,
                delay_ms: SUBMIT_CLOSE_DELAY_MS,
            },
        ])
    }

    fn engine_badge(&self) -> Vec<OverlayEffect> {
        match self.active_engine() {
            Ok(Some(engine)) => vec![OverlayEffect::EngineBadge {
                icon: engine_icon(engine),
            }],
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(session = self.id, "active engine unavailable: {error}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OverlayEffect, OverlayEvent, OverlayKey, OverlayPhase, OverlaySession};
    use crate::config::Settings;
    use crate::model::{Catalog, Engine, OpenMode};

    fn open_session() -> OverlaySession {
        let mut session = OverlaySession::new(Settings::default());
        session.handle(OverlayEvent::Open).unwrap();
        session
    }

    #[test]
    fn open_resets_and_requests_catalog() {
        let mut session = OverlaySession::new(Settings::default());
        let effects = session.handle(OverlayEvent::Open).unwrap();
        assert_eq!(session.phase(), OverlayPhase::Idle);
        assert_eq!(session.active_engine_id(), "google");
        assert!(effects.contains(&OverlayEffect::FetchCatalog { session: 1 }));
        assert!(effects.contains(&OverlayEffect::FocusInput));
    }

    #[test]
    fn closed_overlay_ignores_input() {
        let mut session = OverlaySession::new(Settings::default());
        let effects = session.handle(OverlayEvent::Input("x@".into())).unwrap();
        assert!(effects.is_empty());
        assert_eq!(session.raw_text(), "");
    }

    #[test]
    fn escape_closes_open_overlay() {
        let mut session = open_session();
        let effects = session.handle(OverlayEvent::Key(OverlayKey::Escape)).unwrap();
        assert!(effects.contains(&OverlayEffect::Hide));
        assert_eq!(session.phase(), OverlayPhase::Closed);
        assert!(session
            .handle(OverlayEvent::Key(OverlayKey::Escape))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn arrows_are_noops_without_suggestions() {
        let mut session = open_session();
        session.handle(OverlayEvent::Input("plain".into())).unwrap();
        let effects = session.handle(OverlayEvent::Key(OverlayKey::Down)).unwrap();
        assert!(effects.is_empty());
        assert_eq!(session.highlighted_index(), -1);
    }

    #[test]
    fn stale_catalog_is_discarded() {
        let mut session = open_session();
        session.handle(OverlayEvent::Key(OverlayKey::Escape)).unwrap();
        session.handle(OverlayEvent::Open).unwrap();
        let catalog = Catalog::new(
            vec![Engine::single("google", "Google", "https://g.co/?q={searchTerms}", OpenMode::NewTab)],
            Vec::new(),
        );
        session
            .handle(OverlayEvent::CatalogLoaded {
                session: 1,
                catalog,
            })
            .unwrap();
        assert!(session.catalog().is_none());
    }

    #[test]
    fn settings_update_keeps_text() {
        let mut session = open_session();
        session.handle(OverlayEvent::Input("half typed".into())).unwrap();
        let settings = Settings {
            search_box_width: 900,
            ..Settings::default()
        };
        let effects = session
            .handle(OverlayEvent::SettingsUpdated(settings))
            .unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(session.raw_text(), "half typed");
        assert_eq!(session.settings().search_box_width, 900);
    }
}
