use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{self, ConfigError, Settings};
use crate::contract::{ExtensionRequest, HostMessage};
use crate::core_service::{OverlayService, ServiceError};
use crate::dispatch::{self, DispatchPlan, DispatchRequest, SearchLaunch};
use crate::model::Catalog;
use crate::overlay_state::{OverlayEffect, OverlayEvent, OverlayKey, SessionId};
use crate::page_guard::{LoadState, PageContext};
use crate::transport::{RecordingPort, SentRequest};

/// Page the replayed overlay pretends to be injected into.
pub const REPLAY_PAGE_URL: &str = "https://replay.quicksearch.invalid/";

pub const USAGE: &str = "usage: quicksearch-core [--config <file>] --catalog <file> \
[--type <text> | --key <up|down|enter|escape|tab> | --click <n> | --clear]... [--verbose]";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{0}\n{USAGE}")]
    Usage(String),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Type(String),
    Key(OverlayKey),
    Click(usize),
    Clear,
}

impl ScriptStep {
    fn event(&self) -> OverlayEvent {
        match self {
            Self::Type(text) => OverlayEvent::Input(text.clone()),
            Self::Key(key) => OverlayEvent::Key(*key),
            Self::Click(index) => OverlayEvent::PointerSelect(*index),
            Self::Clear => OverlayEvent::ClearInput,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub catalog_path: PathBuf,
    pub steps: Vec<ScriptStep>,
    pub verbose: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, RuntimeError> {
    let mut config_path = None;
    let mut catalog_path = None;
    let mut steps = Vec::new();
    let mut verbose = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" | "-v" => verbose = true,
            "--clear" => steps.push(ScriptStep::Clear),
            "--help" | "-h" => return Err(RuntimeError::Usage("help requested".into())),
            flag @ ("--config" | "--catalog" | "--type" | "--key" | "--click") => {
                let value = iter
                    .next()
                    .ok_or_else(|| RuntimeError::Usage(format!("{flag} expects a value")))?;
                match flag {
                    "--config" => config_path = Some(PathBuf::from(value)),
                    "--catalog" => catalog_path = Some(PathBuf::from(value)),
                    "--type" => steps.push(ScriptStep::Type(value.clone())),
                    "--key" => steps.push(ScriptStep::Key(parse_key(value)?)),
                    _ => {
                        let index = value.parse::<usize>().map_err(|_| {
                            RuntimeError::Usage(format!("--click expects a row index, got '{value}'"))
                        })?;
                        steps.push(ScriptStep::Click(index));
                    }
                }
            }
            other => return Err(RuntimeError::Usage(format!("unknown argument '{other}'"))),
        }
    }

    let catalog_path =
        catalog_path.ok_or_else(|| RuntimeError::Usage("--catalog is required".into()))?;
    Ok(RuntimeOptions {
        config_path,
        catalog_path,
        steps,
        verbose,
    })
}

fn parse_key(value: &str) -> Result<OverlayKey, RuntimeError> {
    match value.to_ascii_lowercase().as_str() {
        "up" => Ok(OverlayKey::Up),
        "down" => Ok(OverlayKey::Down),
        "enter" => Ok(OverlayKey::Enter),
        "escape" | "esc" => Ok(OverlayKey::Escape),
        "tab" => Ok(OverlayKey::Tab),
        other => Err(RuntimeError::Usage(format!("unknown key '{other}'"))),
    }
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_script(&options, &mut out)
}

/// Opens the overlay, replays `options.steps` and writes one JSON line per effect, outgoing
/// request and resolved search launch.
pub fn run_script<W: Write>(options: &RuntimeOptions, out: &mut W) -> Result<(), RuntimeError> {
    let settings = config::load(options.config_path.as_deref())?;
    let catalog = config::load_catalog(&options.catalog_path)?;
    info!(
        engines = catalog.engines.len(),
        steps = options.steps.len(),
        "replay starting"
    );

    let page = PageContext::new(REPLAY_PAGE_URL, LoadState::Complete);
    let mut replay = Replay {
        service: OverlayService::new(settings.clone(), page, RecordingPort::default()),
        settings,
        catalog,
        out,
    };

    let effects = replay.service.init();
    replay.drain(effects)?;
    let effects = replay
        .service
        .handle_host_message(HostMessage::OpenSearchBox)?;
    replay.drain(effects)?;

    for step in &options.steps {
        debug!(?step, "replaying step");
        replay.write(&ReplayLine::Step {
            step: step_label(step),
        })?;
        let effects = replay.service.handle_event(step.event());
        replay.drain(effects)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(tag = "line", rename_all = "snake_case")]
enum ReplayLine<'a> {
    Step { step: String },
    Effect { effect: &'a OverlayEffect },
    Request { request: &'a ExtensionRequest },
    Launch { launch: &'a SearchLaunch },
    NativeSearch { search_terms: &'a str },
    Error { message: String },
}

struct Replay<'w, W: Write> {
    service: OverlayService<RecordingPort>,
    settings: Settings,
    catalog: Catalog,
    out: &'w mut W,
}

impl<W: Write> Replay<'_, W> {
    /// Writes `effects`, answers settings and catalog fetches from the loaded files and fires close
    /// timers immediately, until nothing is left in flight.
    fn drain(&mut self, effects: Vec<OverlayEffect>) -> Result<(), RuntimeError> {
        let mut queue: VecDeque<OverlayEffect> = effects.into();
        let mut timers: Vec<SessionId> = Vec::new();
        loop {
            while let Some(effect) = queue.pop_front() {
                if let OverlayEffect::ScheduleClose { session, .. } = &effect {
                    timers.push(*session);
                }
                self.write(&ReplayLine::Effect { effect: &effect })?;
            }

            let sent = self.service.port_mut().take_sent();
            if sent.is_empty() && timers.is_empty() {
                return Ok(());
            }
            for SentRequest { request, session } in sent {
                match (request, session) {
                    (ExtensionRequest::GetSettings, _) => {
                        let settings = self.settings.clone();
                        queue.extend(self.service.on_settings_loaded(Ok(settings)));
                    }
                    (ExtensionRequest::GetSearchEngines, Some(session)) => {
                        let engines = self.catalog.engines.clone();
                        queue.extend(self.service.on_engines_loaded(session, Ok(engines)));
                    }
                    (ExtensionRequest::GetCategories, Some(session)) => {
                        let categories = self.catalog.categories.clone();
                        queue.extend(self.service.on_categories_loaded(session, Ok(categories)));
                    }
                    (request, _) => self.write_request(&request)?,
                }
            }
            for session in timers.drain(..) {
                queue.extend(
                    self.service
                        .handle_event(OverlayEvent::CloseTimerElapsed { session }),
                );
            }
        }
    }

    fn write_request(&mut self, request: &ExtensionRequest) -> Result<(), RuntimeError> {
        self.write(&ReplayLine::Request { request })?;
        let dispatch_request = match request {
            ExtensionRequest::Search {
                search_terms,
                engine_id,
                open_mode,
            } => DispatchRequest::new(search_terms.clone(), engine_id, *open_mode),
            ExtensionRequest::UseDefaultSearch { search_terms } => {
                DispatchRequest::Native {
                    search_terms: search_terms.clone(),
                }
            }
            _ => return Ok(()),
        };

        match dispatch::resolve(&self.catalog, &dispatch_request) {
            Ok(DispatchPlan::Launches(launches)) => {
                for launch in &launches {
                    self.write(&ReplayLine::Launch { launch })?;
                }
                Ok(())
            }
            Ok(DispatchPlan::Native { search_terms }) => self.write(&ReplayLine::NativeSearch {
                search_terms: &search_terms,
            }),
            Err(error) => self.write(&ReplayLine::Error {
                message: error.to_string(),
            }),
        }
    }

    fn write(&mut self, line: &ReplayLine<'_>) -> Result<(), RuntimeError> {
        serde_json::to_writer(&mut *self.out, line)?;
        writeln!(self.out)?;
        Ok(())
    }
}

fn step_label(step: &ScriptStep) -> String {
    match step {
        ScriptStep::Type(text) => format!("type {text}"),
        ScriptStep::Key(key) => format!("key {key:?}").to_ascii_lowercase(),
        ScriptStep::Click(index) => format!("click {index}"),
        ScriptStep::Clear => "clear".to_string(),
    }
}
