//! End-to-end tests driving the router with an in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use planhub_api::{AppState, Stores, build_app};
use planhub_auth::jwt::JwtEncoder;
use planhub_core::config::AppConfig;
use planhub_database::memory::MemoryStore;
use planhub_entity::notification::{NotificationCategory, NotificationKind};
use planhub_entity::task::{Project, Task};
use planhub_entity::user::{UserRole, UserSummary};
use planhub_service::FanoutWorker;

struct TestApp {
    app: Router,
    state: AppState,
    store: MemoryStore,
    worker: FanoutWorker,
    encoder: JwtEncoder,
}

impl TestApp {
    async fn new() -> Self {
        let store = MemoryStore::new();
        for (id, name, role) in [
            (3, "Carmen", UserRole::User),
            (7, "Diego", UserRole::User),
            (9, "Elena", UserRole::User),
            (11, "Admin", UserRole::Admin),
            (12, "Outsider", UserRole::User),
        ] {
            store
                .insert_user(UserSummary {
                    id,
                    display_name: name.into(),
                    email: format!("{}@example.org", name.to_lowercase()),
                    role,
                })
                .await;
        }
        store
            .insert_project(
                Project {
                    id: 1,
                    name: "North district".into(),
                    lead_id: Some(3),
                    formulator_id: None,
                },
                vec![7],
            )
            .await;
        store
            .insert_task(Task {
                id: 42,
                project_id: 1,
                title: "Zoning review".into(),
                created_by: 3,
                assignee_id: Some(9),
            })
            .await;

        let config = AppConfig::default();
        let encoder = JwtEncoder::new(&config.auth);
        let stores = Stores {
            notifications: Arc::new(store.clone()),
            chats: Arc::new(store.clone()),
            tasks: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
        };
        let (state, worker) = AppState::build(config, stores);

        Self {
            app: build_app(state.clone()),
            state,
            store,
            worker,
            encoder,
        }
    }

    fn token(&self, user_id: i64, role: UserRole) -> String {
        let (token, _) = self
            .encoder
            .generate_access_token(user_id, role, &format!("user{user_id}"))
            .expect("token");
        token
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<(i64, UserRole)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = user {
            builder = builder.header("authorization", format!("Bearer {}", self.token(id, role)));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize"))
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn send_chat(&self, sender: i64, content: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/tasks/42/chat/messages",
            Some((sender, UserRole::User)),
            Some(json!({ "content": content })),
        )
        .await
    }
}

fn frames(rx: &mut mpsc::Receiver<String>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        out.push(serde_json::from_str(&frame).expect("frame json"));
    }
    out
}

#[tokio::test]
async fn collaborator_message_notifies_creator_and_assignee() {
    let mut t = TestApp::new().await;
    let (_c3, mut rx3) = t
        .state
        .realtime
        .connections
        .register(3, UserRole::User, "user3".into());
    let (c9, mut rx9) = t
        .state
        .realtime
        .connections
        .register(9, UserRole::User, "user9".into());
    t.state.realtime.channels.subscribe("task:42:chat", c9.id);

    let (status, body) = t.send_chat(7, "hola").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"], "hola");
    assert_eq!(body["data"]["sender"]["id"], 7);
    assert_eq!(body["data"]["sender"]["displayName"], "Diego");

    let room = frames(&mut rx9);
    assert_eq!(room.len(), 1);
    assert_eq!(room[0]["type"], "new_chat_message");
    assert_eq!(room[0]["message"]["content"], "hola");

    assert_eq!(t.worker.drain().await, 2);

    for user in [3, 9] {
        let notifications = t.store.notifications_for(user).await;
        assert_eq!(notifications.len(), 1, "user {user}");
        assert_eq!(notifications[0].kind, NotificationKind::NewChatMessage);
        assert_eq!(notifications[0].category, NotificationCategory::Chat);
    }
    assert!(t.store.notifications_for(7).await.is_empty());

    let pushed = frames(&mut rx3);
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0]["type"], "unread_count_updated");
    assert_eq!(pushed[0]["chatCount"], 1);
    assert_eq!(pushed[0]["systemCount"], 0);

    let pushed = frames(&mut rx9);
    assert_eq!(pushed[0]["type"], "unread_count_updated");
}

#[tokio::test]
async fn unrelated_user_is_forbidden_and_nothing_persists() {
    let mut t = TestApp::new().await;

    let (status, body) = t.send_chat(12, "hello?").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = t
        .request(
            Method::GET,
            "/api/tasks/42/chat/messages",
            Some((12, UserRole::User)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert!(t.store.chat_messages(42).await.is_empty());
    assert_eq!(t.worker.drain().await, 0);
}

#[tokio::test]
async fn privileged_non_participant_may_read_chat() {
    let t = TestApp::new().await;
    t.send_chat(7, "first").await;
    t.send_chat(3, "second").await;

    let (status, body) = t
        .request(
            Method::GET,
            "/api/tasks/42/chat/messages?page=1&limit=1",
            Some((11, UserRole::Admin)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["content"], "second");
}

#[tokio::test]
async fn rejects_missing_token_and_bad_input() {
    let t = TestApp::new().await;

    let (status, body) = t
        .request(
            Method::GET,
            "/api/notifications",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, body) = t.send_chat(7, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, _) = t.send_chat(7, &"x".repeat(2001)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .request(
            Method::GET,
            "/api/tasks/42/chat/messages?limit=101",
            Some((7, UserRole::User)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .request(
            Method::GET,
            "/api/notifications?category=urgent",
            Some((3, UserRole::User)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .request(
            Method::POST,
            "/api/tasks/999/chat/messages",
            Some((7, UserRole::User)),
            Some(json!({ "content": "anyone?" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notification_listing_and_read_flow() {
    let mut t = TestApp::new().await;
    t.send_chat(7, "hola").await;
    t.worker.drain().await;

    let user = Some((9, UserRole::User));

    let (status, body) = t
        .request(Method::GET, "/api/notifications/unread-count", user, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chatCount"], 1);
    assert_eq!(body["data"]["systemCount"], 0);

    let (status, body) = t
        .request(
            Method::GET,
            "/api/notifications?onlyUnread=true&category=chat",
            user,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unreadCount"], 1);
    let list = body["data"]["notifications"].as_array().expect("list");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["kind"], "NEW_CHAT_MESSAGE");
    let id = list[0]["id"].as_i64().expect("id");

    let (status, body) = t
        .request(Method::PUT, &format!("/api/notifications/{id}/read"), user, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isRead"], true);

    let (status, _) = t
        .request(Method::PUT, &format!("/api/notifications/{id}/read"), user, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // Not the owner
    let (status, _) = t
        .request(
            Method::PUT,
            &format!("/api/notifications/{id}/read"),
            Some((3, UserRole::User)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = t
        .request(Method::PUT, "/api/notifications/read-all", Some((3, UserRole::User)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    let (_, body) = t
        .request(Method::PUT, "/api/notifications/read-all", Some((3, UserRole::User)), None)
        .await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn opening_task_chat_clears_its_notifications() {
    let mut t = TestApp::new().await;
    t.send_chat(7, "hola").await;
    t.worker.drain().await;

    let user = Some((9, UserRole::User));
    let (status, body) = t
        .request(Method::PUT, "/api/tasks/42/chat/notifications/read", user, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    let (_, body) = t
        .request(Method::PUT, "/api/tasks/42/chat/notifications/read", user, None)
        .await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn assignment_notifies_new_assignee() {
    let mut t = TestApp::new().await;

    let (status, body) = t
        .request(
            Method::PUT,
            "/api/tasks/42/assignee",
            Some((3, UserRole::User)),
            Some(json!({ "assigneeId": 12 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assigneeId"], 12);

    assert_eq!(t.worker.drain().await, 1);
    let notifications = t.store.notifications_for(12).await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::NewTaskAssigned);
    assert_eq!(notifications[0].category, NotificationCategory::System);

    let (status, _) = t
        .request(
            Method::PUT,
            "/api/tasks/42/assignee",
            Some((7, UserRole::User)),
            Some(json!({ "assigneeId": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn room_subscription_uses_chat_access() {
    let t = TestApp::new().await;
    let connections = &t.state.realtime.connections;
    let guard = t.state.chat_service.as_ref();
    let subscribe = r#"{"type":"subscribe","channel":"task:42:chat"}"#;

    let (outsider, mut outsider_rx) = connections.register(12, UserRole::User, "user12".into());
    connections.handle_inbound(&outsider.id, subscribe, guard).await;
    let reply = frames(&mut outsider_rx);
    assert_eq!(reply[0]["type"], "error");
    assert_eq!(reply[0]["code"], "FORBIDDEN");

    let (member, mut member_rx) = connections.register(7, UserRole::User, "user7".into());
    connections.handle_inbound(&member.id, subscribe, guard).await;
    let reply = frames(&mut member_rx);
    assert_eq!(reply[0]["type"], "subscribed");
    assert_eq!(reply[0]["channel"], "task:42:chat");
}

#[tokio::test]
async fn health_reports_connections() {
    let t = TestApp::new().await;
    let _conn = t
        .state
        .realtime
        .connections
        .register(3, UserRole::User, "user3".into());

    let (status, body) = t.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["wsConnections"], 1);
    assert_eq!(body["data"]["onlineUsers"], 1);
}
