//! # 認証・ユーザー API 統合テスト
//!
//! `build_app` で組み立てた実ルーターに Users / Posts サービスのスタブを
//! 差し込み、登録からログイン、Cookie を使った操作までの流れを検証する。
//!
//! ## テストケース
//!
//! - 登録 → ログイン → /api/current → ログアウトの一連フロー
//! - ユーザー不存在とパスワード不一致は同じ 401
//! - 有効期限切れのトークンは 401
//! - プロフィール更新の対象は常に本人
//! - フォロー / フォロー解除

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use chirp_bff::{
    app_builder::{AppDeps, build_app},
    test_utils::{StubPostsServiceClient, StubUsersServiceClient, test_time, user},
};
use chirp_domain::{
    clock::FixedClock,
    user::{FieldUpdate, User, UserId},
};
use chirp_infra::{JwtTokenManager, TokenIssuer, mock::MockPasswordHasher};
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    clock:  Arc<FixedClock>,
    tokens: Arc<JwtTokenManager>,
    users:  StubUsersServiceClient,
}

impl TestApp {
    fn new(users: StubUsersServiceClient) -> Self {
        let clock = Arc::new(FixedClock::new(test_time()));
        let tokens = Arc::new(JwtTokenManager::new(b"integration-secret", clock.clone()));
        let router = build_app(AppDeps {
            users_client:      Arc::new(users.clone()),
            posts_client:      Arc::new(StubPostsServiceClient::new()),
            password_hasher:   Arc::new(MockPasswordHasher::new()),
            identity_verifier: tokens.clone(),
            token_issuer:      tokens.clone(),
            cookie_secure:     false,
        });
        Self {
            router,
            clock,
            tokens,
            users,
        }
    }

    fn with_alice() -> Self {
        let alice = User {
            password_hash: MockPasswordHasher::hash_of("password123"),
            ..user(1, "Alice")
        };
        Self::new(StubUsersServiceClient::with_users([alice, user(2, "Bob")]))
    }

    fn bearer(&self, user_id: i32) -> String {
        let token = self.tokens.issue(UserId::new(user_id)).unwrap();
        format!("Bearer {}", token.as_str())
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn login(&self, email: &str, password: &str) -> Response {
        self.send(json_request(
            Method::POST,
            "/api/login",
            None,
            json!({ "email": email, "password": password }),
        ))
        .await
    }
}

fn json_request(method: Method, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `Set-Cookie` から `name=value` 部分を取り出す
fn session_cookie_pair(response: &Response) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_ログインからログアウトまでの一連フロー() {
    let app = TestApp::with_alice();

    // ログイン
    let response = app.login("alice@example.com", "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("user-jwt="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=259200"));
    let cookie = session_cookie_pair(&response);
    let body = json_body(response).await;
    let access_token = body["data"]["access_token"].as_str().unwrap().to_string();
    assert_eq!(cookie, format!("user-jwt={access_token}"));

    // Cookie で現在のユーザーを取得
    let response = app.send(get_with_cookie("/api/current", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["id"], "1");
    assert_eq!(body["data"]["name"], "Alice");
    assert!(body["data"].get("passwordHash").is_none());

    // ログアウトで Cookie が消される
    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("user-jwt=;"));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_ユーザー不存在とパスワード不一致は同じ401() {
    let app = TestApp::with_alice();

    let wrong_password = app.login("alice@example.com", "wrong").await;
    let unknown_user = app.login("nobody@example.com", "password123").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong_password.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(json_body(wrong_password).await, json_body(unknown_user).await);
}

#[tokio::test]
async fn test_空のメールアドレスは422() {
    let app = TestApp::with_alice();

    let response = app.login("", "password123").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_トークンなしのcurrentは401() {
    let app = TestApp::with_alice();

    let response = app
        .send(
            Request::builder()
                .uri("/api/current")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.users.fetch_by_ids_calls().is_empty());
}

#[tokio::test]
async fn test_有効期限切れのトークンは401() {
    let app = TestApp::with_alice();
    let bearer = app.bearer(1);

    app.clock.advance(Duration::hours(72));
    let response = app
        .send(
            Request::builder()
                .uri("/api/current")
                .header(header::AUTHORIZATION, bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "トークンの有効期限が切れています");
}

#[tokio::test]
async fn test_登録は201でパスワードをハッシュ化して送る() {
    let app = TestApp::new(StubUsersServiceClient::new());

    let response = app
        .send(json_request(
            Method::POST,
            "/api/register",
            None,
            json!({
                "name": "Carol",
                "username": "carol",
                "email": "carol@example.com",
                "password": "s3cret"
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["username"], "carol");
    let created = app.users.created();
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].password_hash,
        MockPasswordHasher::hash_of("s3cret")
    );
}

#[tokio::test]
async fn test_登録の必須項目が欠けていれば422で上流を呼ばない() {
    let app = TestApp::new(StubUsersServiceClient::new());

    let response = app
        .send(json_request(
            Method::POST,
            "/api/register",
            None,
            json!({ "name": "Carol", "email": "carol@example.com", "password": "s3cret" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.users.was_untouched());
}

#[tokio::test]
async fn test_プロフィール更新の対象は認証済みユーザー() {
    let app = TestApp::with_alice();

    let response = app
        .send(json_request(
            Method::PATCH,
            "/api/users",
            Some(&app.bearer(1)),
            json!({ "bio": "hello", "coverImage": "" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updates = app.users.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].user_id, UserId::new(1));
    assert_eq!(updates[0].bio, FieldUpdate::Set("hello".to_string()));
    assert_eq!(updates[0].cover_image, FieldUpdate::Set(String::new()));
    assert!(updates[0].name.is_keep());
}

#[tokio::test]
async fn test_変更のないプロフィール更新は422() {
    let app = TestApp::with_alice();

    let response = app
        .send(json_request(
            Method::PATCH,
            "/api/users",
            Some(&app.bearer(1)),
            json!({}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.users.updates().is_empty());
}

#[tokio::test]
async fn test_フォローすると更新後の自分を返す() {
    let app = TestApp::with_alice();

    let response = app
        .send(json_request(
            Method::POST,
            "/api/follow",
            Some(&app.bearer(1)),
            json!({ "userId": "2" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["followingIds"], json!(["2"]));
    assert_eq!(
        app.users.follow_calls(),
        vec![(UserId::new(1), UserId::new(2))]
    );
}

#[tokio::test]
async fn test_自分自身のフォローは422() {
    let app = TestApp::with_alice();

    let response = app
        .send(json_request(
            Method::POST,
            "/api/follow",
            Some(&app.bearer(1)),
            json!({ "userId": 1 }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.users.follow_calls().is_empty());
}

#[tokio::test]
async fn test_上流がフォロー解除を適用しなければ409() {
    let app = TestApp::with_alice();
    app.users.set_follow_result(false);

    let response = app
        .send(json_request(
            Method::DELETE,
            "/api/follow",
            Some(&app.bearer(1)),
            json!({ "userId": "2" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["type"], "https://chirp.example.com/errors/follow-unknown");
}

#[tokio::test]
async fn test_ユーザー取得は存在しなければ404() {
    let app = TestApp::with_alice();

    let found = app
        .send(Request::builder().uri("/api/users/2").body(Body::empty()).unwrap())
        .await;
    let missing = app
        .send(Request::builder().uri("/api/users/9").body(Body::empty()).unwrap())
        .await;

    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(json_body(found).await["data"]["name"], "Bob");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_新しいユーザー一覧() {
    let app = TestApp::with_alice();

    let response = app
        .send(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["name"], "Bob");
    assert_eq!(body["data"][1]["name"], "Alice");
    assert_eq!(app.users.list_new_limits(), vec![100]);
}
