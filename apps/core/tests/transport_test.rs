use quicksearch_core::config::Settings;
use quicksearch_core::contract::{ExtensionRequest, HostMessage};
use quicksearch_core::core_service::OverlayService;
use quicksearch_core::page_guard::{LoadState, PageContext};
use quicksearch_core::transport::{
    decode_categories, decode_engines, decode_settings, handle_json, handle_message,
    HostPort, RecordingPort, TransportError, TransportResponse,
};
use serde_json::Value;

fn service_on(url: &str, load_state: LoadState) -> OverlayService<RecordingPort> {
    OverlayService::new(
        Settings::default(),
        PageContext::new(url, load_state),
        RecordingPort::default(),
    )
}

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

#[test]
fn open_message_returns_ok_with_effects() {
    let mut service = service_on("https://example.com/", LoadState::Complete);

    let response = handle_message(&mut service, HostMessage::OpenSearchBox);
    match &response {
        TransportResponse::Ok { response } => {
            assert!(response.ack.success);
            assert!(!response.effects.is_empty());
        }
        TransportResponse::Err { error } => panic!("unexpected error {error:?}"),
    }

    let encoded = serde_json::to_value(&response).unwrap();
    assert_eq!(encoded["status"], "ok");
    assert_eq!(encoded["response"]["success"], true);
    assert_eq!(encoded["response"]["effects"][0]["effect"], "show");
}

#[test]
fn json_handler_reports_invalid_json() {
    let mut service = service_on("https://example.com/", LoadState::Complete);
    let parsed = parse(&handle_json(&mut service, "{not-json"));
    assert_eq!(parsed["status"], "err");
    assert_eq!(parsed["error"]["code"], "invalid_json");
}

#[test]
fn json_handler_reports_unloaded_page() {
    let mut service = service_on("https://example.com/", LoadState::Loading);
    let parsed = parse(&handle_json(&mut service, r#"{"action":"openSearchBox"}"#));
    assert_eq!(parsed["error"]["code"], "page_not_loaded");

    service.on_page_loaded();
    let parsed = parse(&handle_json(&mut service, r#"{"action":"openSearchBox"}"#));
    assert_eq!(parsed["status"], "ok");
}

#[test]
fn json_handler_reports_unsupported_page() {
    let mut service = service_on("edge://settings", LoadState::Complete);
    let parsed = parse(&handle_json(&mut service, r#"{"action":"openSearchBox"}"#));
    assert_eq!(parsed["error"]["code"], "page_unsupported");
    assert!(service.port().sent().is_empty());
}

#[test]
fn settings_update_while_closed_has_no_effects() {
    let mut service = service_on("https://example.com/", LoadState::Complete);
    let parsed = parse(&handle_json(
        &mut service,
        r#"{"action":"settingsUpdated","settings":{"searchBoxWidth":700}}"#,
    ));
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["response"]["effects"], Value::Array(Vec::new()));
    assert_eq!(service.session().settings().search_box_width, 700);
}

#[test]
fn disconnected_port_fails_fetch_quietly() {
    let mut port = RecordingPort::default();
    port.disconnect();
    let mut service = OverlayService::new(
        Settings::default(),
        PageContext::new("https://example.com/", LoadState::Complete),
        port,
    );

    let parsed = parse(&handle_json(&mut service, r#"{"action":"openSearchBox"}"#));
    assert_eq!(parsed["status"], "ok");
    assert!(service.session().catalog().is_none());
    assert!(service.session().phase().is_open());
}

#[test]
fn decodes_collaborator_payloads() {
    let engines = decode_engines(
        r#"[{"id":"g","name":"Google","type":"single","searchUrl":"https://g.co/?q={searchTerms}"}]"#,
    )
    .unwrap();
    assert_eq!(engines[0].id, "g");

    let categories = decode_categories(r#"[{"id":"web","name":"Web"}]"#).unwrap();
    assert_eq!(categories[0].order, 0);

    let settings = decode_settings(r#"{"defaultEngine":"g"}"#).unwrap();
    assert_eq!(settings.default_engine, "g");

    assert!(matches!(
        decode_engines("{}"),
        Err(TransportError::InvalidPayload(_))
    ));
}

#[test]
fn recording_port_tags_fetches_with_session() {
    let mut service = service_on("https://example.com/", LoadState::Complete);
    handle_json(&mut service, r#"{"action":"openSearchBox"}"#);

    let sent = service.port_mut().take_sent();
    assert!(sent
        .iter()
        .all(|sent| sent.session == Some(1)));
    assert_eq!(
        sent.into_iter().map(|sent| sent.request).collect::<Vec<_>>(),
        vec![ExtensionRequest::GetSearchEngines, ExtensionRequest::GetCategories]
    );
}

#[derive(Default)]
struct SendOnlyPort {
    sent: Vec<ExtensionRequest>,
}

impl HostPort for SendOnlyPort {
    fn send(&mut self, request: ExtensionRequest) -> Result<(), TransportError> {
        self.sent.push(request);
        Ok(())
    }
}

#[test]
fn ports_without_fetch_send_catalog_requests_plainly() {
    let mut service = OverlayService::new(
        Settings::default(),
        PageContext::new("https://example.com/", LoadState::Complete),
        SendOnlyPort::default(),
    );
    handle_json(&mut service, r#"{"action":"openSearchBox"}"#);

    assert_eq!(
        service.port().sent,
        vec![ExtensionRequest::GetSearchEngines, ExtensionRequest::GetCategories]
    );
}
