use std::collections::HashSet;

use url::Url;

use crate::model::{Catalog, EngineKind, SEARCH_TERMS_PLACEHOLDER};

pub const MIN_SEARCH_BOX_WIDTH: u16 = 300;
pub const MAX_SEARCH_BOX_WIDTH: u16 = 1200;
pub const MIN_SEARCH_BOX_HEIGHT: u16 = 40;
pub const MAX_SEARCH_BOX_HEIGHT: u16 = 100;
pub const MAX_BLUR_AMOUNT: u8 = 100;

pub fn validate_search_box_width(value: u16) -> Result<(), String> {
    if (MIN_SEARCH_BOX_WIDTH..=MAX_SEARCH_BOX_WIDTH).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Search box width must be between {MIN_SEARCH_BOX_WIDTH} and {MAX_SEARCH_BOX_WIDTH}."
        ))
    }
}

pub fn validate_search_box_height(value: u16) -> Result<(), String> {
    if (MIN_SEARCH_BOX_HEIGHT..=MAX_SEARCH_BOX_HEIGHT).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Search box height must be between {MIN_SEARCH_BOX_HEIGHT} and {MAX_SEARCH_BOX_HEIGHT}."
        ))
    }
}

pub fn validate_blur_amount(value: u8) -> Result<(), String> {
    if value <= MAX_BLUR_AMOUNT {
        Ok(())
    } else {
        Err(format!("Blur amount must be at most {MAX_BLUR_AMOUNT}%."))
    }
}

/// Checks a single engine's URL template: it must carry the query placeholder and form an
/// absolute http(s) URL once the placeholder is filled in.
pub fn validate_search_url(template: &str) -> Result<(), String> {
    let trimmed = template.trim();
    if trimmed.is_empty() {
        return Err("Search URL is required.".to_string());
    }
    if !trimmed.contains(SEARCH_TERMS_PLACEHOLDER) {
        return Err(format!(
            "Search URL must contain the {SEARCH_TERMS_PLACEHOLDER} placeholder."
        ));
    }

    let sample = trimmed.replace(SEARCH_TERMS_PLACEHOLDER, "test");
    let url = Url::parse(&sample).map_err(|error| format!("Search URL is not valid: {error}"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("Unsupported search URL scheme '{other}'.")),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("Search URL must include a host.".to_string());
    }

    Ok(())
}

/// Integrity problems in an engine catalog; empty when the catalog is consistent.
pub fn validate_catalog(catalog: &Catalog) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();

    for engine in &catalog.engines {
        if !seen.insert(engine.id.as_str()) {
            problems.push(format!("duplicate engine id '{}'", engine.id));
        }

        match &engine.kind {
            EngineKind::Single { search_url, .. } => {
                if let Err(error) = validate_search_url(search_url) {
                    problems.push(format!("engine '{}': {error}", engine.id));
                }
            }
            EngineKind::Group { engines } => {
                if engines.is_empty() {
                    problems.push(format!("group '{}' has no members", engine.id));
                }
                for member in engines {
                    match catalog.find_engine(&member.id) {
                        None => problems.push(format!(
                            "group '{}' references unknown engine '{}'",
                            engine.id, member.id
                        )),
                        Some(found) if found.is_group() => problems.push(format!(
                            "group '{}' nests group '{}'",
                            engine.id, member.id
                        )),
                        Some(_) => {}
                    }
                }
            }
        }

        if let Some(category_id) = engine.category_id() {
            if catalog.category(category_id).is_none() {
                problems.push(format!(
                    "engine '{}' references unknown category '{category_id}'",
                    engine.id
                ));
            }
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::{validate_catalog, validate_search_url};
    use crate::model::{Catalog, Engine, GroupMember, OpenMode};

    #[test]
    fn search_url_requires_placeholder_and_http_scheme() {
        assert!(validate_search_url("https://www.google.com/search?q={searchTerms}").is_ok());
        assert!(validate_search_url("https://www.google.com/search?q=").is_err());
        assert!(validate_search_url("javascript:alert({searchTerms})").is_err());
        assert!(validate_search_url("not a url {searchTerms}").is_err());
        assert!(validate_search_url("   ").is_err());
    }

    #[test]
    fn catalog_validation_flags_nested_and_dangling_members() {
        let catalog = Catalog::new(
            vec![
                Engine::single("g", "Google", "https://g.co/?q={searchTerms}", OpenMode::NewTab),
                Engine::group("inner", "Inner", vec![GroupMember::new("g")]),
                Engine::group(
                    "outer",
                    "Outer",
                    vec![GroupMember::new("inner"), GroupMember::new("gone")],
                ),
            ],
            Vec::new(),
        );

        let problems = validate_catalog(&catalog);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("nests group 'inner'"));
        assert!(problems[1].contains("unknown engine 'gone'"));
    }
}
