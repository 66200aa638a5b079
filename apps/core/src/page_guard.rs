use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pages where content scripts cannot run, so the overlay is never injected.
pub const UNSUPPORTED_URL_PREFIXES: [&str; 12] = [
    "chrome://",
    "chrome-extension://",
    "edge://",
    "edge-extension://",
    "brave://",
    "brave-extension://",
    "opera://",
    "opera-extension://",
    "firefox://",
    "firefox-extension://",
    "file://",
    "about:",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Loading,
    Complete,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub load_state: LoadState,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardRejection {
    #[error("overlay is not supported on {0}")]
    Unsupported(String),
    #[error("page has not finished loading")]
    NotLoaded,
}

impl PageContext {
    pub fn new(url: &str, load_state: LoadState) -> Self {
        Self {
            url: url.to_string(),
            load_state,
        }
    }

    /// Whether an open command should be honoured on this page.
    pub fn check_open(&self) -> Result<(), GuardRejection> {
        if !is_overlay_supported(&self.url) {
            return Err(GuardRejection::Unsupported(self.url.clone()));
        }
        if self.load_state != LoadState::Complete {
            return Err(GuardRejection::NotLoaded);
        }
        Ok(())
    }
}

pub fn is_overlay_supported(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }
    let lowered = url.to_ascii_lowercase();
    !UNSUPPORTED_URL_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::{is_overlay_supported, GuardRejection, LoadState, PageContext};

    #[test]
    fn browser_internal_pages_are_unsupported() {
        assert!(!is_overlay_supported("chrome://settings"));
        assert!(!is_overlay_supported("about:blank"));
        assert!(!is_overlay_supported("file:///tmp/a.html"));
        assert!(!is_overlay_supported(""));
        assert!(is_overlay_supported("https://example.com/"));
    }

    #[test]
    fn open_requires_loaded_page() {
        let page = PageContext::new("https://example.com/", LoadState::Loading);
        assert_eq!(page.check_open(), Err(GuardRejection::NotLoaded));

        let page = PageContext::new("https://example.com/", LoadState::Complete);
        assert!(page.check_open().is_ok());
    }
}
