use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::normalize_for_search;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// `@` - filter the engine catalog
    Engine,
    /// `#` - filter the open-modes
    Mode,
}

impl TriggerKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '@' => Some(Self::Engine),
            '#' => Some(Self::Mode),
            _ => None,
        }
    }

    pub fn trigger_char(self) -> char {
        match self {
            Self::Engine => '@',
            Self::Mode => '#',
        }
    }
}

/// The unterminated trigger segment at the end of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSegment {
    pub kind: TriggerKind,
    /// Byte offset of the trigger character.
    pub start: usize,
    /// Byte offset one past the end of the segment (the input length at parse time).
    pub end: usize,
    /// Text typed after the trigger character, as entered.
    pub filter: String,
}

impl TriggerSegment {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn normalized_filter(&self) -> String {
        normalize_for_search(&self.filter)
    }
}

pub fn parse_trigger(text: &str) -> Option<TriggerSegment> {
    let (start, kind) = text
        .char_indices()
        .rev()
        .find_map(|(index, ch)| TriggerKind::from_char(ch).map(|kind| (index, kind)))?;

    Some(TriggerSegment {
        kind,
        start,
        end: text.len(),
        filter: text[start + kind.trigger_char().len_utf8()..].to_string(),
    })
}

/// Removes `segment` from `text`. Returns `None` when the span no longer lines up with a
/// trigger character in `text`.
pub fn splice_out(text: &str, segment: &TriggerSegment) -> Option<String> {
    if segment.end != text.len() {
        return None;
    }
    let tail = text.get(segment.span())?;
    if !tail.starts_with(segment.kind.trigger_char()) {
        return None;
    }

    Some(text[..segment.start].to_string())
}

/// Drops the trailing segment of `kind`, leaving `text` untouched if the active trigger is
/// of another kind or absent.
pub fn strip_segment(text: &str, kind: TriggerKind) -> String {
    match parse_trigger(text) {
        Some(segment) if segment.kind == kind => {
            splice_out(text, &segment).unwrap_or_else(|| text.to_string())
        }
        _ => text.to_string(),
    }
}

/// Drops whatever trailing trigger remnant is present.
pub fn strip_trailing_segment(text: &str) -> String {
    match parse_trigger(text) {
        Some(segment) => splice_out(text, &segment).unwrap_or_else(|| text.to_string()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_trigger, splice_out, strip_segment, strip_trailing_segment, TriggerKind};

    #[test]
    fn last_trigger_wins() {
        let segment = parse_trigger("a@b#c").unwrap();
        assert_eq!(segment.kind, TriggerKind::Mode);
        assert_eq!(segment.filter, "c");
        assert_eq!(segment.span(), 3..5);

        let segment = parse_trigger("a@b").unwrap();
        assert_eq!(segment.kind, TriggerKind::Engine);
        assert_eq!(segment.filter, "b");
    }

    #[test]
    fn plain_text_has_no_trigger() {
        assert!(parse_trigger("plain text").is_none());
        assert!(parse_trigger("").is_none());
    }

    #[test]
    fn bare_trigger_has_empty_filter() {
        let segment = parse_trigger("weather@").unwrap();
        assert_eq!(segment.kind, TriggerKind::Engine);
        assert_eq!(segment.filter, "");
        assert_eq!(segment.start, 7);
    }

    #[test]
    fn filter_keeps_spaces_and_case() {
        let segment = parse_trigger("q @Web Search").unwrap();
        assert_eq!(segment.filter, "Web Search");
        assert_eq!(segment.normalized_filter(), "web search");
    }

    #[test]
    fn spans_are_byte_offsets_for_multibyte_text() {
        let text = "天气@谷歌";
        let segment = parse_trigger(text).unwrap();
        assert_eq!(segment.filter, "谷歌");
        assert_eq!(splice_out(text, &segment).as_deref(), Some("天气"));
    }

    #[test]
    fn splice_rejects_stale_segments() {
        let segment = parse_trigger("foo@bar").unwrap();
        assert!(splice_out("foo@barbaz", &segment).is_none());
        assert!(splice_out("fooXbar", &segment).is_none());
    }

    #[test]
    fn strip_segment_only_touches_matching_kind() {
        assert_eq!(strip_segment("cats#inc", TriggerKind::Mode), "cats");
        assert_eq!(strip_segment("cats#inc", TriggerKind::Engine), "cats#inc");
        assert_eq!(strip_segment("a@b#c", TriggerKind::Mode), "a@b");
        assert_eq!(strip_trailing_segment("news@"), "news");
        assert_eq!(strip_trailing_segment("no trigger"), "no trigger");
    }
}
