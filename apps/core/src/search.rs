use std::cmp::Ordering;

use serde::Serialize;

use crate::icon::{engine_icon, open_mode_icon, SuggestionIcon};
use crate::model::{normalize_for_search, Catalog, Engine, OpenMode, GROUP_GLYPH};
use crate::trigger::{TriggerKind, TriggerSegment};

/// Subtext for engines without a (known) category.
pub const UNCATEGORIZED_LABEL: &str = "Other";

/// Sort key for uncategorized engines; larger than any stored order.
const UNCATEGORIZED_ORDER: i64 = i64::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Candidate {
    Engine(String),
    OpenMode(OpenMode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub candidate: Candidate,
    pub icon: SuggestionIcon,
    pub name: String,
    pub subtext: String,
    /// Trailing open-mode glyph for engine rows.
    pub badge: Option<&'static str>,
}

impl Suggestion {
    pub fn id(&self) -> &str {
        match &self.candidate {
            Candidate::Engine(id) => id,
            Candidate::OpenMode(mode) => mode.id(),
        }
    }
}

/// Suggestions for `trigger`. Engine triggers yield nothing until a catalog is available.
pub fn rank(trigger: &TriggerSegment, catalog: Option<&Catalog>) -> Vec<Suggestion> {
    match trigger.kind {
        TriggerKind::Engine => catalog
            .map(|catalog| rank_engines(catalog, &trigger.filter))
            .unwrap_or_default(),
        TriggerKind::Mode => rank_open_modes(&trigger.filter),
    }
}

pub fn rank_engines(catalog: &Catalog, filter: &str) -> Vec<Suggestion> {
    let needle = normalize_for_search(filter);

    let mut ranked: Vec<RankedEngine<'_>> = catalog
        .engines
        .iter()
        .enumerate()
        .map(|(index, engine)| RankedEngine::new(catalog, engine, index))
        .filter(|ranked| {
            needle.is_empty()
                || ranked.name.contains(&needle)
                || ranked.category_name.contains(&needle)
        })
        .collect();

    if needle.is_empty() {
        ranked.sort_by(|a, b| {
            a.category_order
                .cmp(&b.category_order)
                .then_with(|| compare_names(a, b))
        });
    } else {
        ranked.sort_by(|a, b| {
            let a_prefix = a.name.starts_with(&needle);
            let b_prefix = b.name.starts_with(&needle);
            let a_category = a.category_name.contains(&needle);
            let b_category = b.category_name.contains(&needle);
            b_prefix
                .cmp(&a_prefix)
                .then_with(|| b_category.cmp(&a_category))
                .then_with(|| compare_names(a, b))
        });
    }

    ranked
        .into_iter()
        .map(|ranked| engine_suggestion(catalog, ranked.engine))
        .collect()
}

pub fn rank_open_modes(filter: &str) -> Vec<Suggestion> {
    let needle = normalize_for_search(filter);
    OpenMode::ALL
        .into_iter()
        .filter(|mode| {
            normalize_for_search(mode.name()).contains(&needle)
                || normalize_for_search(mode.description()).contains(&needle)
        })
        .map(open_mode_suggestion)
        .collect()
}

pub fn engine_suggestion(catalog: &Catalog, engine: &Engine) -> Suggestion {
    let subtext = catalog
        .category_of(engine)
        .map(|category| category.name.clone())
        .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string());
    let badge = match engine.open_mode() {
        Some(mode) => mode.glyph(),
        None => GROUP_GLYPH,
    };

    Suggestion {
        candidate: Candidate::Engine(engine.id.clone()),
        icon: engine_icon(engine),
        name: engine.name.clone(),
        subtext,
        badge: Some(badge),
    }
}

pub fn open_mode_suggestion(mode: OpenMode) -> Suggestion {
    Suggestion {
        candidate: Candidate::OpenMode(mode),
        icon: open_mode_icon(mode),
        name: mode.name().to_string(),
        subtext: mode.description().to_string(),
        badge: None,
    }
}

struct RankedEngine<'a> {
    engine: &'a Engine,
    index: usize,
    name: String,
    category_name: String,
    category_order: i64,
}

impl<'a> RankedEngine<'a> {
    fn new(catalog: &Catalog, engine: &'a Engine, index: usize) -> Self {
        let category = catalog.category_of(engine);
        Self {
            engine,
            index,
            name: normalize_for_search(&engine.name),
            category_name: category
                .map(|category| normalize_for_search(&category.name))
                .unwrap_or_default(),
            category_order: category
                .map(|category| category.order)
                .unwrap_or(UNCATEGORIZED_ORDER),
        }
    }
}

/// Case-insensitive name order, then exact name, then catalog position.
fn compare_names(a: &RankedEngine<'_>, b: &RankedEngine<'_>) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.engine.name.cmp(&b.engine.name))
        .then_with(|| a.index.cmp(&b.index))
}
