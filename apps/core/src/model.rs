use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine id that routes a query to the browser's native search instead of a catalog engine.
pub const NATIVE_ENGINE_ID: &str = "default";

/// Placeholder replaced by the encoded query inside a single engine's search URL.
pub const SEARCH_TERMS_PLACEHOLDER: &str = "{searchTerms}";

/// Badge shown next to group engines in the suggestion list.
pub const GROUP_GLYPH: &str = "\u{2630}";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenMode {
    #[default]
    NewTab,
    CurrentTab,
    NewWindow,
    Incognito,
}

impl OpenMode {
    /// Declaration order of the `#` suggestion pool.
    pub const ALL: [OpenMode; 4] = [
        OpenMode::NewTab,
        OpenMode::CurrentTab,
        OpenMode::NewWindow,
        OpenMode::Incognito,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::NewTab => "new-tab",
            Self::CurrentTab => "current-tab",
            Self::NewWindow => "new-window",
            Self::Incognito => "incognito",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NewTab => "New Tab",
            Self::CurrentTab => "Current Tab",
            Self::NewWindow => "New Window",
            Self::Incognito => "Incognito Window",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::NewTab => "Open search results in a new tab",
            Self::CurrentTab => "Open search results in the current tab",
            Self::NewWindow => "Open search results in a new window",
            Self::Incognito => "Open search results in a private incognito window",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::NewTab => "\u{29c9}",
            Self::CurrentTab => "\u{25ad}",
            Self::NewWindow => "\u{1f5d4}",
            Self::Incognito => "\u{1f576}",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.id().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_open_mode: Option<OpenMode>,
}

impl GroupMember {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            override_open_mode: None,
        }
    }

    pub fn with_override(id: &str, mode: OpenMode) -> Self {
        Self {
            id: id.to_string(),
            override_open_mode: Some(mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineKind {
    Single {
        #[serde(rename = "searchUrl")]
        search_url: String,
        #[serde(rename = "openMode", default)]
        open_mode: OpenMode,
    },
    Group {
        #[serde(default)]
        engines: Vec<GroupMember>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: EngineKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, alias = "categoryId", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Engine {
    pub fn single(id: &str, name: &str, search_url: &str, open_mode: OpenMode) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: EngineKind::Single {
                search_url: search_url.to_string(),
                open_mode,
            },
            icon: None,
            category: None,
        }
    }

    pub fn group(id: &str, name: &str, members: Vec<GroupMember>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: EngineKind::Group { engines: members },
            icon: None,
            category: None,
        }
    }

    pub fn with_category(mut self, category_id: &str) -> Self {
        self.category = Some(category_id.to_string());
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, EngineKind::Group { .. })
    }

    /// Default open-mode of a single engine; groups have none of their own.
    pub fn open_mode(&self) -> Option<OpenMode> {
        match &self.kind {
            EngineKind::Single { open_mode, .. } => Some(*open_mode),
            EngineKind::Group { .. } => None,
        }
    }

    /// Icon markup, with blank strings treated as absent.
    pub fn icon_markup(&self) -> Option<&str> {
        self.icon.as_deref().filter(|icon| !icon.trim().is_empty())
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub order: i64,
}

impl Category {
    pub fn new(id: &str, name: &str, order: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("engine not found: {0}")]
    EngineNotFound(String),
}

/// Snapshot of the engines and categories owned by the storage collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub engines: Vec<Engine>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn new(engines: Vec<Engine>, categories: Vec<Category>) -> Self {
        Self {
            engines,
            categories,
        }
    }

    pub fn engine(&self, id: &str) -> Result<&Engine, CatalogError> {
        self.find_engine(id)
            .ok_or_else(|| CatalogError::EngineNotFound(id.to_string()))
    }

    pub fn find_engine(&self, id: &str) -> Option<&Engine> {
        self.engines.iter().find(|engine| engine.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_of(&self, engine: &Engine) -> Option<&Category> {
        engine.category_id().and_then(|id| self.category(id))
    }
}

/// Case folding applied to both filter text and candidate fields before comparison.
pub fn normalize_for_search(input: &str) -> String {
    input.to_lowercase()
}
