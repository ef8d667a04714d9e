//! Integration tests for the application context wiring
//!
//! **Coverage:**
//! - Guarded navigation before and after sign-in
//! - Session restore on start and the live channel following the identity
//! - Wizard submission and the leave confirmation through the shared stores
//!
//! **Infrastructure:**
//! - WireMock HTTP server, credential file in a tempdir

use std::time::Duration;

use assessor_app::AppContext;
use assessor_core::{CredentialStore, Navigator, Resolution};
use assessor_domain::constants::{LANDING_PATH, LOGIN_PATH};
use assessor_domain::{ClientConfig, DraftFile, LiveEvent, LiveEventKind};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token(role: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    let claims = json!({ "id": "u-41", "role": role, "name": "Dana", "exp": exp });
    format!("hdr.{}.sig", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

fn context(dir: &TempDir, api_base: &str) -> AppContext {
    let mut config = ClientConfig::default();
    config.api.base_url = api_base.to_string();
    config.storage.credential_path =
        dir.path().join("credentials.json").to_string_lossy().into_owned();
    config.live.reconnect_delay_ms = 20;
    AppContext::new_with_config(config).expect("context should build")
}

async fn wait_for_identity(ctx: &AppContext, expected: Option<&str>) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while ctx.live.current_identity().as_deref() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("live identity did not converge");
}

#[tokio::test]
async fn navigation_is_guarded_by_session_and_role() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, "http://127.0.0.1:9/api");

    assert_eq!(ctx.navigate("/projects"), Resolution::Redirect(LOGIN_PATH.to_string()));
    assert_eq!(ctx.navigator.current_path(), LOGIN_PATH);

    ctx.session.establish(&token("project_manager")).unwrap();

    assert!(matches!(ctx.navigate("/projects/new"), Resolution::Render(_)));
    assert_eq!(ctx.navigator.current_path(), "/projects/new");

    assert_eq!(ctx.navigate("/admin/users"), Resolution::Redirect(LANDING_PATH.to_string()));
    assert_eq!(ctx.navigator.current_path(), LANDING_PATH);
}

#[tokio::test]
async fn start_restores_session_and_live_channel_follows_identity() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, "http://127.0.0.1:9/api");
    ctx.credentials.save(&token("admin")).unwrap();

    let restored = ctx.start().expect("stored session should be restored");
    assert_eq!(restored.user_id, "u-41");
    assert_eq!(ctx.navigator.current_path(), LANDING_PATH);
    wait_for_identity(&ctx, Some("u-41")).await;

    // A second start must not spawn another dispatcher.
    assert!(ctx.start().is_some());

    ctx.logout();
    assert_eq!(ctx.credentials.load().unwrap(), None);
    assert_eq!(ctx.navigator.current_path(), LOGIN_PATH);
    wait_for_identity(&ctx, None).await;

    ctx.shutdown();
}

#[tokio::test]
async fn live_event_outside_detail_view_notifies() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, "http://127.0.0.1:9/api");
    ctx.session.establish(&token("user")).unwrap();
    ctx.navigate("/projects");

    let before = ctx.refresh.value();
    ctx.dispatcher.dispatch(LiveEvent {
        kind: LiveEventKind::Failed,
        message: "Generation failed".into(),
        report_id: "12".into(),
        status: "failed".into(),
    });

    assert_eq!(ctx.refresh.value(), before + 1);
    assert_eq!(ctx.toasts.snapshot()[0].message, "Generation failed");
}

#[tokio::test]
async fn wizard_submits_through_shared_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "project": { "id": 17 } })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects/analyze-template"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "placeholders": ["{{candidate}}"], "invalid": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects/17/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, &server.uri());
    ctx.session.establish(&token("project_manager")).unwrap();
    ctx.navigate("/projects/new");

    let mut wizard = ctx.new_wizard();
    wizard.draft_mut().name = "Leadership 2025".into();
    wizard.set_template(DraftFile::new("template.docx", "application/octet-stream", b"PK".to_vec()));
    wizard.select_dictionary("3");

    assert!(ctx.leave_needs_confirmation("/projects", &wizard));

    let receipt = wizard.submit().await.expect("submission should succeed");
    assert_eq!(receipt.project_id, "17");
    assert!(!receipt.context_initialized);
    assert!(!ctx.leave_needs_confirmation("/projects", &wizard));
    assert_eq!(ctx.toasts.len(), 1);
}
