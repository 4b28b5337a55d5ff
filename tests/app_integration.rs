//! End-to-end tests for the assembled application
//!
//! The backend deployment and its storage endpoint are served by wiremock;
//! the identity provider and media picker are in-process fakes.

use app_core::auth::{AttemptStatus, AuthAttempt, IdentityProvider, ProviderError};
use app_core::categories::Category;
use app_core::media::{LocalImage, MediaPicker, PickerOptions};
use app_state::session::{Session, SessionSignal, SessionSource};
use app_ui::navigation::{Navigator, Route};
use app_ui::screens::ShareOutcome;
use async_trait::async_trait;
use campus_feed::config::{AuthSettings, BackendSettings, Settings};
use campus_feed::App;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use wiremock::matchers::{bearer_token, body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Fakes
// =============================================================================

/// Identity provider that signs anyone in and hands out a fixed backend token
struct FakeIdentity {
    sessions: SessionSignal,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn create_session(
        &self,
        _identifier: &str,
        _password: &str,
    ) -> Result<AuthAttempt, ProviderError> {
        Ok(AuthAttempt::complete("sess_1"))
    }

    async fn create_reset_session(&self, _identifier: &str) -> Result<AuthAttempt, ProviderError> {
        Ok(AuthAttempt::pending(AttemptStatus::NeedsFirstFactor))
    }

    async fn attempt_first_factor(
        &self,
        _code: &str,
        _new_password: &str,
    ) -> Result<AuthAttempt, ProviderError> {
        Ok(AuthAttempt::complete("sess_2"))
    }

    async fn create_signup(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<AuthAttempt, ProviderError> {
        Ok(AuthAttempt::pending(AttemptStatus::MissingRequirements))
    }

    async fn prepare_email_verification(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn attempt_email_verification(&self, _code: &str) -> Result<AuthAttempt, ProviderError> {
        Ok(AuthAttempt::complete("sess_3"))
    }

    async fn set_active_session(&self, _session_id: &str) -> Result<(), ProviderError> {
        self.sessions.activate();
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sessions.deactivate();
        Ok(())
    }

    async fn backend_token(&self) -> Result<Option<String>, ProviderError> {
        Ok(Some("jwt-token".to_string()))
    }
}

struct FakePicker {
    image: PathBuf,
}

#[async_trait]
impl MediaPicker for FakePicker {
    async fn pick_image(
        &self,
        _options: &PickerOptions,
    ) -> app_core::media::Result<Option<LocalImage>> {
        Ok(Some(LocalImage::new(&self.image)))
    }
}

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    app: App,
    server: MockServer,
    _image: tempfile::NamedTempFile,
}

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        backend: BackendSettings {
            url: server.uri(),
            request_timeout_secs: 5,
            upload_timeout_secs: 5,
            feed_retries: 0,
        },
        auth: AuthSettings {
            allowed_email_domain: "@example.edu".to_string(),
        },
    }
}

async fn harness() -> Harness {
    let server = MockServer::start().await;

    let mut image = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    image.write_all(b"\xFF\xD8\xFFfake-jpeg").unwrap();

    let sessions = SessionSignal::new();
    let identity = std::sync::Arc::new(FakeIdentity {
        sessions: sessions.clone(),
    });
    let picker = std::sync::Arc::new(FakePicker {
        image: image.path().to_path_buf(),
    });

    let app = App::new(settings_for(&server), identity, picker, sessions).unwrap();
    Harness {
        app,
        server,
        _image: image,
    }
}

async fn wait_for_route(app: &App, route: Route) {
    let navigator = app.navigator().clone();
    tokio::time::timeout(Duration::from_secs(2), async move {
        while navigator.current_route() != route {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("route never became {route}"));
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never held");
}

async fn mount_upload_url(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/mutation"))
        .and(body_json(json!({
            "path": "posts:generateUploadUrl",
            "args": {},
            "format": "json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "value": format!("{}/upload/one-time", server.uri())
        })))
        .mount(server)
        .await;
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_guard_follows_session_changes() {
    let h = harness().await;
    let _tasks = h.app.start();

    // Unresolved: nothing moves
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.app.navigator().current_route(), Route::Login);

    h.app.sessions().set(Session::signed_in());
    wait_for_route(&h.app, Route::Feed).await;

    h.app.sessions().set(Session::signed_out());
    wait_for_route(&h.app, Route::Login).await;
}

#[tokio::test]
async fn test_sign_in_syncs_backend_token() {
    let h = harness().await;
    let _tasks = h.app.start();
    h.app.sessions().mark_loaded(false);

    let login = h.app.login_screen();
    login.set_email("asha@example.edu");
    login.set_password("secret");
    login.sign_in().await.unwrap();

    wait_for_route(&h.app, Route::Feed).await;
    let rpc = h.app.rpc().clone();
    wait_until(move || rpc.has_auth_token()).await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .and(bearer_token("jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "value": [{
                "_id": "p1",
                "title": "Hack night",
                "caption": "Bring a laptop",
                "category": "Hackathon",
                "author": { "username": "asha" }
            }]
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let feed = h.app.feed_screen();
    feed.refresh().await;
    assert!(feed.error().is_none());

    h.app.profile_screen().sign_out().await.unwrap();
    wait_for_route(&h.app, Route::Login).await;
    let rpc = h.app.rpc().clone();
    wait_until(move || !rpc.has_auth_token()).await;
}

#[tokio::test]
async fn test_sign_in_rejects_other_domains_without_network() {
    let h = harness().await;
    h.app.sessions().mark_loaded(false);

    let login = h.app.login_screen();
    login.set_email("asha@gmail.com");
    login.set_password("secret");

    let alert = login.sign_in().await.unwrap_err();
    assert!(alert.message.contains("@example.edu"));
    assert!(!h.app.sessions().subscribe().borrow().active);
}

#[tokio::test]
async fn test_share_uploads_then_commits() {
    let h = harness().await;
    mount_upload_url(&h.server).await;

    Mock::given(method("POST"))
        .and(path("/upload/one-time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "storageId": "kg2abc" })))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/mutation"))
        .and(body_json(json!({
            "path": "posts:createPost",
            "args": {
                "storageId": "kg2abc",
                "caption": "Bring a laptop",
                "category": "Hackathon",
                "title": "Hack night",
                "location": "Lab 4",
                "eventDate": "2026-11-02"
            },
            "format": "json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "value": "post_1"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    h.app.navigator().replace(Route::Feed);
    h.app.navigator().push(Route::Create);

    let create = h.app.create_screen();
    assert!(create.pick_image().await.unwrap());
    create.set_title("Hack night");
    create.set_description("Bring a laptop");
    create.set_location("Lab 4");
    create.set_event_date("2026-11-02");
    create.select_category(Category::by_name("Hackathon").unwrap());

    let outcome = create.share().await.unwrap();
    assert_eq!(
        outcome,
        ShareOutcome::Published(backend_client::StorageId::new("kg2abc"))
    );

    assert_eq!(h.app.navigator().current_route(), Route::Feed);
    assert!(create.draft().title.is_empty());
    assert!(create.draft().image.is_none());
    assert!(!create.is_sharing());
}

#[tokio::test]
async fn test_failed_upload_keeps_draft_and_skips_commit() {
    let h = harness().await;
    mount_upload_url(&h.server).await;

    Mock::given(method("POST"))
        .and(path("/upload/one-time"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage unavailable"))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/mutation"))
        .and(body_partial_json(json!({ "path": "posts:createPost" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    h.app.navigator().replace(Route::Feed);
    h.app.navigator().push(Route::Create);

    let create = h.app.create_screen();
    create.pick_image().await.unwrap();
    create.set_title("Hack night");
    create.set_description("Bring a laptop");

    let before = create.draft();
    let alert = create.share().await.unwrap_err();

    assert_eq!(alert.title, "Share failed");
    assert_eq!(create.draft(), before);
    assert!(!create.is_sharing());
    assert_eq!(h.app.navigator().current_route(), Route::Create);
}
