//! # Request ID レイヤーのテスト
//!
//! `build_app` が組み立てる Request ID 関連レイヤー
//! （SetRequestIdLayer + PropagateRequestIdLayer + task-local への保存）を検証する。
//!
//! - レスポンスに `X-Request-Id` ヘッダーが含まれる
//! - クライアント提供の `X-Request-Id` がそのまま返される
//! - 自動生成の `X-Request-Id` が UUID v7 形式である
//! - 上流呼び出しの時点で同じ Request ID が参照できる

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{Router, body::Body};
use chirp_bff::{
    app_builder::{AppDeps, build_app},
    client::{ServiceError, UsersServiceClient},
    middleware::request_id::current_request_id,
    test_utils::{StubPostsServiceClient, StubUsersServiceClient, test_time, user},
};
use chirp_domain::{
    clock::FixedClock,
    user::{HashedNewUser, PartialUserUpdate, User, UserId},
};
use chirp_infra::{JwtTokenManager, mock::MockPasswordHasher};
use http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

/// 呼び出し時点の Request ID を記録する Users サービスクライアント
#[derive(Clone, Default)]
struct RecordingUsersClient {
    inner: StubUsersServiceClient,
    seen:  Arc<Mutex<Vec<Option<String>>>>,
}

impl RecordingUsersClient {
    fn record(&self) {
        self.seen.lock().unwrap().push(current_request_id());
    }

    fn seen(&self) -> Vec<Option<String>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl UsersServiceClient for RecordingUsersClient {
    async fn fetch_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, ServiceError> {
        self.record();
        self.inner.fetch_by_ids(ids).await
    }

    async fn fetch_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.record();
        self.inner.fetch_by_email(email).await
    }

    async fn create(&self, user: &HashedNewUser) -> Result<User, ServiceError> {
        self.record();
        self.inner.create(user).await
    }

    async fn update_partial(&self, update: &PartialUserUpdate) -> Result<User, ServiceError> {
        self.record();
        self.inner.update_partial(update).await
    }

    async fn follow(&self, user_id: UserId, target: UserId) -> Result<bool, ServiceError> {
        self.record();
        self.inner.follow(user_id, target).await
    }

    async fn unfollow(&self, user_id: UserId, target: UserId) -> Result<bool, ServiceError> {
        self.record();
        self.inner.unfollow(user_id, target).await
    }

    async fn list_new(&self, limit: u32) -> Result<Vec<User>, ServiceError> {
        self.record();
        self.inner.list_new(limit).await
    }
}

fn test_app(users: RecordingUsersClient) -> Router {
    let clock = Arc::new(FixedClock::new(test_time()));
    let tokens = Arc::new(JwtTokenManager::new(b"request-id-secret", clock));
    build_app(AppDeps {
        users_client:      Arc::new(users),
        posts_client:      Arc::new(StubPostsServiceClient::new()),
        password_hasher:   Arc::new(MockPasswordHasher::new()),
        identity_verifier: tokens.clone(),
        token_issuer:      tokens,
        cookie_secure:     false,
    })
}

fn request_id_of(response: &axum::response::Response) -> String {
    response
        .headers()
        .get("x-request-id")
        .expect("レスポンスに x-request-id ヘッダーが含まれること")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_レスポンスにx_request_idヘッダーが含まれる() {
    let app = test_app(RecordingUsersClient::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_クライアント提供のx_request_idがそのまま返される() {
    let app = test_app(RecordingUsersClient::default());
    let custom_id = "client-provided-request-id-123";

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", custom_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(request_id_of(&response), custom_id);
}

#[tokio::test]
async fn test_自動生成のx_request_idがuuid_v7形式である() {
    let app = test_app(RecordingUsersClient::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let parsed = uuid::Uuid::parse_str(&request_id_of(&response))
        .expect("Request ID が UUID としてパースできること");
    assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
}

#[tokio::test]
async fn test_上流呼び出し時に同じrequest_idが参照できる() {
    let users = RecordingUsersClient {
        inner: StubUsersServiceClient::with_users([user(1, "Alice")]),
        ..Default::default()
    };
    let app = test_app(users.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("x-request-id", "trace-me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(users.seen(), vec![Some("trace-me".to_string())]);
}

#[test]
fn test_リクエスト外ではrequest_idは参照できない() {
    assert_eq!(current_request_id(), None);
}
