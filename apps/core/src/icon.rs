use serde::Serialize;

use crate::model::{Engine, OpenMode};

pub const FALLBACK_PALETTE: [&str; 10] = [
    "#4285F4", "#EA4335", "#FBBC05", "#34A853", "#FF5722", "#9C27B0", "#3F51B5", "#009688",
    "#795548", "#607D8B",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionIcon {
    /// Icon supplied with the engine (SVG markup or an image URL).
    Markup { markup: String },
    /// Synthesized coloured initial for engines without an icon.
    Letter { letter: String, color: &'static str },
    Glyph { glyph: &'static str },
}

pub fn engine_icon(engine: &Engine) -> SuggestionIcon {
    match engine.icon_markup() {
        Some(markup) => SuggestionIcon::Markup {
            markup: markup.to_string(),
        },
        None => fallback_icon(engine),
    }
}

pub fn fallback_icon(engine: &Engine) -> SuggestionIcon {
    let letter = engine
        .name
        .chars()
        .next()
        .map(|ch| ch.to_uppercase().collect::<String>())
        .unwrap_or_else(|| "?".to_string());

    SuggestionIcon::Letter {
        letter,
        color: FALLBACK_PALETTE[palette_index(&engine.id)],
    }
}

pub fn open_mode_icon(mode: OpenMode) -> SuggestionIcon {
    SuggestionIcon::Glyph {
        glyph: mode.glyph(),
    }
}

/// Sum of the id's UTF-16 code units, modulo the palette size.
pub fn palette_index(id: &str) -> usize {
    let sum: u64 = id.encode_utf16().map(u64::from).sum();
    (sum % FALLBACK_PALETTE.len() as u64) as usize
}
