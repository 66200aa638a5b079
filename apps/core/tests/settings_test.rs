use quicksearch_core::model::{Catalog, Category, Engine, OpenMode};
use quicksearch_core::settings::{
    validate_blur_amount, validate_catalog, validate_search_box_height, validate_search_box_width,
    validate_search_url,
};

#[test]
fn validates_search_box_ranges() {
    assert!(validate_search_box_width(300).is_ok());
    assert!(validate_search_box_width(1200).is_ok());
    assert!(validate_search_box_width(299).is_err());
    assert!(validate_search_box_height(40).is_ok());
    assert!(validate_search_box_height(101).is_err());
}

#[test]
fn validates_blur_amount() {
    assert!(validate_blur_amount(0).is_ok());
    assert!(validate_blur_amount(100).is_ok());
    assert!(validate_blur_amount(101).is_err());
}

#[test]
fn rejects_non_http_templates() {
    let error = validate_search_url("ftp://files.example.com/?q={searchTerms}").unwrap_err();
    assert!(error.contains("ftp"));
    assert!(validate_search_url("  http://example.com/{searchTerms}  ").is_ok());
}

#[test]
fn consistent_catalog_has_no_problems() {
    let catalog = Catalog::new(
        vec![Engine::single(
            "google",
            "Google",
            "https://www.google.com/search?q={searchTerms}",
            OpenMode::NewTab,
        )
        .with_category("general")],
        vec![Category::new("general", "General", 0)],
    );
    assert!(validate_catalog(&catalog).is_empty());
}

#[test]
fn flags_duplicates_and_unknown_categories() {
    let engine = Engine::single(
        "google",
        "Google",
        "https://www.google.com/search?q={searchTerms}",
        OpenMode::NewTab,
    );
    let catalog = Catalog::new(
        vec![engine.clone(), engine.with_category("missing")],
        Vec::new(),
    );

    let problems = validate_catalog(&catalog);
    assert_eq!(
        problems,
        vec![
            "duplicate engine id 'google'".to_string(),
            "engine 'google' references unknown category 'missing'".to_string(),
        ]
    );
}
