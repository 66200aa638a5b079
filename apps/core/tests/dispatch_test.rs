use quicksearch_core::dispatch::{
    build_search_url, resolve, DispatchError, DispatchPlan, DispatchRequest, SearchLaunch,
};
use quicksearch_core::model::{Catalog, CatalogError, Engine, GroupMember, OpenMode};

fn catalog() -> Catalog {
    Catalog::new(
        vec![
            Engine::single(
                "google",
                "Google",
                "https://www.google.com/search?q={searchTerms}",
                OpenMode::NewTab,
            ),
            Engine::single(
                "ddg",
                "DuckDuckGo",
                "https://duckduckgo.com/?q={searchTerms}",
                OpenMode::CurrentTab,
            ),
            Engine::group(
                "both",
                "Both",
                vec![
                    GroupMember::new("google"),
                    GroupMember::with_override("ddg", OpenMode::NewWindow),
                    GroupMember::new("removed"),
                ],
            ),
            Engine::group("outer", "Outer", vec![GroupMember::new("both")]),
            Engine::single("broken", "Broken", "https://example.com/search", OpenMode::NewTab),
        ],
        Vec::new(),
    )
}

fn launches(plan: DispatchPlan) -> Vec<SearchLaunch> {
    match plan {
        DispatchPlan::Launches(launches) => launches,
        DispatchPlan::Native { .. } => panic!("expected engine launches"),
    }
}

#[test]
fn single_engine_uses_user_override_over_default() {
    let request = DispatchRequest::new("red panda".into(), "ddg", Some(OpenMode::Incognito));
    let first = launches(resolve(&catalog(), &request).unwrap());
    assert_eq!(
        first,
        vec![SearchLaunch {
            engine_id: "ddg".into(),
            url: "https://duckduckgo.com/?q=red%20panda".into(),
            open_mode: OpenMode::Incognito,
        }]
    );

    let request = DispatchRequest::new("red panda".into(), "ddg", None);
    let second = launches(resolve(&catalog(), &request).unwrap());
    assert_eq!(second[0].open_mode, OpenMode::CurrentTab);
}

#[test]
fn group_members_ignore_user_override() {
    let request = DispatchRequest::new("cats".into(), "both", Some(OpenMode::Incognito));
    let launches = launches(resolve(&catalog(), &request).unwrap());

    let summary: Vec<(&str, OpenMode)> = launches
        .iter()
        .map(|launch| (launch.engine_id.as_str(), launch.open_mode))
        .collect();
    assert_eq!(
        summary,
        vec![("google", OpenMode::NewTab), ("ddg", OpenMode::NewWindow)]
    );
}

#[test]
fn nested_group_is_rejected() {
    let request = DispatchRequest::new("cats".into(), "outer", None);
    assert_eq!(
        resolve(&catalog(), &request),
        Err(DispatchError::NestedGroup {
            group_id: "outer".into(),
            member_id: "both".into(),
        })
    );
}

#[test]
fn unknown_engine_is_a_catalog_error() {
    let request = DispatchRequest::new("cats".into(), "ghost", None);
    assert_eq!(
        resolve(&catalog(), &request),
        Err(DispatchError::Catalog(CatalogError::EngineNotFound(
            "ghost".into()
        )))
    );
}

#[test]
fn template_without_placeholder_is_rejected() {
    let request = DispatchRequest::new("cats".into(), "broken", None);
    assert!(matches!(
        resolve(&catalog(), &request),
        Err(DispatchError::InvalidTemplate { engine_id, .. }) if engine_id == "broken"
    ));
}

#[test]
fn blank_terms_are_rejected() {
    let request = DispatchRequest::new("  ".into(), "google", None);
    assert_eq!(resolve(&catalog(), &request), Err(DispatchError::EmptyQuery));
}

#[test]
fn native_request_passes_terms_through() {
    let request = DispatchRequest::new(" cats ".into(), "default", None);
    assert_eq!(
        resolve(&catalog(), &request),
        Ok(DispatchPlan::Native {
            search_terms: "cats".into()
        })
    );
}

#[test]
fn url_keeps_template_query_parameters() {
    let url = build_search_url(
        "wiki",
        "https://en.wikipedia.org/w/index.php?search={searchTerms}&go=Go",
        "C# & Rust",
    )
    .unwrap();
    assert_eq!(
        url,
        "https://en.wikipedia.org/w/index.php?search=C%23%20%26%20Rust&go=Go"
    );
}
