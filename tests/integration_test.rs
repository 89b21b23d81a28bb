// Integration tests for users-admin

use serde_json::json;
use users_admin::api::{User, UserClient, UserPatch, UserPayload};

fn user_json(id: &str, first: &str, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "firstName": first,
        "lastName": "Tester",
        "email": email,
        "phone": "5551234567",
        "createdAt": "2024-03-15T12:00:00Z",
        "updatedAt": "2024-03-16T12:00:00Z"
    })
}

fn sample_user(id: &str, first: &str, email: &str) -> User {
    serde_json::from_value(user_json(id, first, email)).unwrap()
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

// 1) API client against a mock users service
mod api_client {
    use super::*;
    use users_admin::app::update::execute;
    use users_admin::app::{Outcome, Request};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> UserClient {
        UserClient::new(&format!("{}/api/users", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn list_users_returns_service_order() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                user_json("b", "Zed", "zed@example.com"),
                user_json("a", "Ada", "ada@example.com"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let users = client_for(&server).await.list_users().await.unwrap();
        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn get_user_hits_record_url() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json("a1", "Ada", "ada@example.com")))
            .mount(&server)
            .await;

        let user = client_for(&server).await.get_user("a1").await.unwrap();
        assert_eq!(user, sample_user("a1", "Ada", "ada@example.com"));
    }

    #[tokio::test]
    async fn create_user_posts_payload() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "firstName": "Ada",
                "lastName": "Tester",
                "email": "ada@example.com",
                "phone": "5551234567"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(user_json("new", "Ada", "ada@example.com")))
            .expect(1)
            .mount(&server)
            .await;

        let payload = UserPayload {
            first_name: "Ada".into(),
            last_name: "Tester".into(),
            email: "ada@example.com".into(),
            phone: "5551234567".into(),
        };
        let created = client_for(&server).await.create_user(&payload).await.unwrap();
        assert_eq!(created.id, "new");
    }

    #[tokio::test]
    async fn update_user_puts_partial_payload() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/users/a1"))
            .and(body_json(json!({ "email": "new@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json("a1", "Ada", "new@example.com")))
            .expect(1)
            .mount(&server)
            .await;

        let patch = UserPatch {
            email: Some("new@example.com".into()),
            ..Default::default()
        };
        let updated = client_for(&server).await.update_user("a1", &patch).await.unwrap();
        assert_eq!(updated.email, "new@example.com");
    }

    #[tokio::test]
    async fn delete_user_accepts_no_content() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/a1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).await.delete_user("a1").await.unwrap();
    }

    #[tokio::test]
    async fn failures_name_the_operation_and_id() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        // Nothing else is mounted, so every other call gets a 404
        let client = client_for(&server).await;

        let err = client.list_users().await.unwrap_err();
        assert!(err.message().starts_with("Failed to get all users: "), "{err}");
        assert!(err.message().contains("500"), "{err}");

        let err = client.get_user("x9").await.unwrap_err();
        assert!(err.message().starts_with("Failed to get user with id x9: "), "{err}");

        let err = client.create_user(&UserPayload::default()).await.unwrap_err();
        assert!(err.message().starts_with("Failed to create user: "), "{err}");

        let err = client.update_user("x9", &UserPatch::default()).await.unwrap_err();
        assert!(err.message().starts_with("Failed to update user with id x9: "), "{err}");

        let err = client.delete_user("x9").await.unwrap_err();
        assert!(err.message().starts_with("Failed to delete user with id x9: "), "{err}");
        assert!(err.message().contains("404"), "{err}");
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_users().await.unwrap_err();
        assert!(err.message().starts_with("Failed to get all users: "), "{err}");
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        // Port 9 (discard) is closed on test machines
        let client = UserClient::new("http://127.0.0.1:9/api/users").unwrap();
        let err = client.list_users().await.unwrap_err();
        assert!(err.message().starts_with("Failed to get all users: "), "{err}");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_ignored() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/a1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = UserClient::new(&format!("{}/api/users/", server.uri())).unwrap();
        client.delete_user("a1").await.unwrap();
    }

    #[tokio::test]
    async fn execute_maps_requests_to_outcomes() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([user_json("a1", "Ada", "ada@example.com")])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/a1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        match execute(&client, Request::LoadUsers).await {
            Outcome::UsersLoaded(Ok(users)) => assert_eq!(users.len(), 1),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(
            execute(&client, Request::DeleteUser { id: "a1".into() }).await,
            Outcome::UserDeleted(Ok(()))
        ));
        assert!(matches!(
            execute(&client, Request::UpdateUser { id: "zz".into(), patch: UserPatch::default() }).await,
            Outcome::UserSaved(Err(_))
        ));
    }

    #[test]
    fn dispatcher_posts_outcome_back() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let client = UserClient::new("http://127.0.0.1:9/api/users").unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let dispatcher = users_admin::app::update::Dispatcher::new(client, runtime.handle().clone(), tx);
        dispatcher.dispatch(Request::LoadUsers);
        let outcome = rx.recv_timeout(std::time::Duration::from_secs(30)).unwrap();
        assert!(matches!(outcome, Outcome::UsersLoaded(Err(_))));
    }
}

// 2) Rendering of the list screen and its dialogs
mod rendering {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use users_admin::app::{AppState, Outcome, Theme, keymap::Keymap};
    use users_admin::ui;

    fn new_app() -> AppState {
        AppState::new(Theme::mocha(), Keymap::default(), "http://localhost:8080/api/users")
    }

    fn screen(app: &mut AppState) -> String {
        let backend = TestBackend::new(140, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui::render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn loading_text_until_fetch_settles() {
        let mut app = new_app();
        let text = screen(&mut app);
        assert!(text.contains("Loading users..."));
        assert!(!text.contains("First Name"));

        app.apply(Outcome::UsersLoaded(Ok(vec![])));
        assert!(!screen(&mut app).contains("Loading users..."));

        let mut failed = new_app();
        failed.apply(Outcome::UsersLoaded(Err(users_admin::RequestError::new("boom"))));
        assert!(!screen(&mut failed).contains("Loading users..."));
    }

    #[test]
    fn two_users_render_rows_and_count() {
        let mut app = new_app();
        app.apply(Outcome::UsersLoaded(Ok(vec![
            sample_user("1", "Ada", "ada@example.com"),
            sample_user("2", "Grace", "grace@example.com"),
        ])));
        let text = screen(&mut app);
        assert!(text.contains("Total users: 2"));
        assert!(text.contains("Ada"));
        assert!(text.contains("ada@example.com"));
        assert!(text.contains("Grace"));
        assert!(text.contains("grace@example.com"));
        assert!(text.contains("Edit | Delete"));
        assert!(!text.contains("There are no users to display."));
    }

    #[test]
    fn empty_collection_shows_placeholder() {
        let mut app = new_app();
        app.apply(Outcome::UsersLoaded(Ok(vec![])));
        let text = screen(&mut app);
        assert!(text.contains("There are no users to display."));
        assert!(text.contains("First Name"));
        assert!(!text.contains("Edit | Delete"));
    }

    #[test]
    fn failed_fetch_shows_message_without_table() {
        let mut app = new_app();
        app.apply(Outcome::UsersLoaded(Err(users_admin::RequestError::new("boom"))));
        let text = screen(&mut app);
        assert!(text.contains("Failed to load users"));
        assert!(!text.contains("First Name"));
        assert!(!text.contains("Total users"));
        assert!(!text.contains("boom"));
    }

    #[test]
    fn error_hides_previously_loaded_rows() {
        let mut app = new_app();
        app.apply(Outcome::UsersLoaded(Ok(vec![sample_user("1", "Ada", "ada@example.com")])));
        app.begin_load();
        app.apply(Outcome::UsersLoaded(Err(users_admin::RequestError::new("boom"))));
        let text = screen(&mut app);
        assert!(text.contains("Failed to load users"));
        assert!(!text.contains("ada@example.com"));
    }

    #[test]
    fn form_renders_mode_labels_and_errors() {
        let mut app = new_app();
        app.apply(Outcome::UsersLoaded(Ok(vec![sample_user("1", "Ada", "ada@example.com")])));

        app.open_create();
        assert!(app.submit_form().is_none());
        let text = screen(&mut app);
        assert!(text.contains("Create New User"));
        assert!(text.contains("[ Create ]"));
        assert!(text.contains("[ Cancel ]"));
        assert!(text.contains("First name is required"));
        assert!(text.contains("Phone number is required"));

        app.cancel_form();
        app.open_edit();
        let text = screen(&mut app);
        assert!(text.contains("Edit User"));
        assert!(text.contains("[ Update ]"));
    }

    #[test]
    fn delete_dialog_asks_for_confirmation() {
        let mut app = new_app();
        app.apply(Outcome::UsersLoaded(Ok(vec![sample_user("1", "Ada", "ada@example.com")])));
        app.request_delete();
        let text = screen(&mut app);
        assert!(text.contains("Are you sure you want to delete this user?"));
        assert!(text.contains("Ada Tester"));
    }

    #[test]
    fn help_lists_bindings() {
        let mut app = new_app();
        app.open_help();
        let text = screen(&mut app);
        assert!(text.contains("Keybindings"));
        assert!(text.contains("Create user"));
        assert!(text.contains("Reload"));
    }
}

// 3) Theme config roundtrip and init
#[test]
fn theme_roundtrip_and_init() {
    use std::{fs, path::PathBuf, time::{SystemTime, UNIX_EPOCH}};
    use users_admin::app::Theme;

    let mut path = std::env::temp_dir();
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    path.push(format!("ua_theme_{}_{}.conf", std::process::id(), nonce));
    let path_str = path.to_string_lossy().to_string();

    let t = Theme::mocha();
    t.write_file(&path_str).expect("write theme");
    let t2 = Theme::from_file(&path_str).expect("read theme");
    assert_eq!(t.text, t2.text);
    assert_eq!(t.title, t2.title);
    assert_eq!(t.error, t2.error);

    fs::write(&path_str, "text = #010203\nborder = reset\nbogus = #zzzzzz\n").unwrap();
    let t3 = Theme::from_file(&path_str).expect("read theme");
    assert_eq!(t3.text, ratatui::style::Color::Rgb(1, 2, 3));
    assert_eq!(t3.border, ratatui::style::Color::Reset);
    assert_eq!(t3.title, t.title);

    let mut p2 = PathBuf::from(&path_str);
    p2.set_file_name(format!("{}_init.conf", p2.file_stem().unwrap().to_string_lossy()));
    let p2_str = p2.to_string_lossy().to_string();
    let _ = fs::remove_file(&p2_str);
    let _created = Theme::load_or_init(&p2_str);
    assert!(PathBuf::from(&p2_str).exists());

    let _ = fs::remove_file(&path_str);
    let _ = fs::remove_file(&p2_str);
}

// 4) Configuration from flags and environment
#[test]
fn config_defaults_and_flags() {
    use clap::Parser;
    use users_admin::app::config::Config;

    let cfg = Config::try_parse_from(["users-admin", "--api-url", "http://svc:9000/api/users", "-vv"]).unwrap();
    assert_eq!(cfg.api_url, "http://svc:9000/api/users");
    assert_eq!(cfg.log_level(), tracing::Level::DEBUG);

    let cfg = Config::try_parse_from(["users-admin", "--theme", "/tmp/t.conf", "--log-file", "/tmp/ua.log"]).unwrap();
    assert_eq!(cfg.theme_path(), "/tmp/t.conf");
    assert_eq!(cfg.log_path(), std::path::PathBuf::from("/tmp/ua.log"));
    assert_eq!(cfg.log_level(), tracing::Level::WARN);
}
