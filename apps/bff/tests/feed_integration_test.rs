//! # タイムライン・投稿 API 統合テスト
//!
//! `build_app` で組み立てた実ルーターに、Users / Posts サービスのスタブを
//! 差し込んで検証する。
//!
//! ## テストケース
//!
//! - 匿名の投稿一覧は全体の最新投稿
//! - 認証済みの投稿一覧はタイムライン
//! - 不正なトークンは匿名として扱う
//! - 単一投稿はコメント投稿者まで埋まる
//! - ID の検証エラーは 422、存在しない投稿は 404
//! - 投稿作成・いいねは認証必須
//! - 上流の障害は 500（詳細は返さない）

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use chirp_bff::{
    app_builder::{AppDeps, build_app},
    client::ServiceError,
    test_utils::{
        LatestPostsCall,
        StubPostsServiceClient,
        StubUsersServiceClient,
        comment,
        post,
        test_time,
        user,
    },
};
use chirp_domain::{
    clock::FixedClock,
    post::{LikeType, PostId},
    user::{User, UserId},
};
use chirp_infra::{JwtTokenManager, TokenIssuer, mock::MockPasswordHasher};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    tokens: Arc<JwtTokenManager>,
}

impl TestApp {
    fn new(users: &StubUsersServiceClient, posts: &StubPostsServiceClient) -> Self {
        let clock = Arc::new(FixedClock::new(test_time()));
        let tokens = Arc::new(JwtTokenManager::new(b"integration-secret", clock));
        let router = build_app(AppDeps {
            users_client:      Arc::new(users.clone()),
            posts_client:      Arc::new(posts.clone()),
            password_hasher:   Arc::new(MockPasswordHasher::new()),
            identity_verifier: tokens.clone(),
            token_issuer:      tokens.clone(),
            cookie_secure:     false,
        });
        Self { router, tokens }
    }

    fn bearer(&self, user_id: i32) -> String {
        let token = self.tokens.issue(UserId::new(user_id)).unwrap();
        format!("Bearer {}", token.as_str())
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn alice_following_bob() -> User {
    User {
        following_ids: vec![UserId::new(2)],
        ..user(1, "Alice")
    }
}

#[tokio::test]
async fn test_匿名の投稿一覧は全体の最新投稿を投稿者付きで返す() {
    let users = StubUsersServiceClient::with_users([user(1, "Alice"), user(2, "Bob")]);
    let posts = StubPostsServiceClient::with_posts([post(10, 1), post(11, 2)]);
    let app = TestApp::new(&users, &posts);

    let response = app.send(get("/api/posts")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["id"], 11);
    assert_eq!(body["data"][0]["user"]["name"], "Bob");
    assert_eq!(body["data"][1]["user"]["name"], "Alice");
    assert_eq!(
        posts.latest_calls(),
        vec![LatestPostsCall {
            author_ids:     None,
            acting_user_id: None,
            limit:          100,
        }]
    );
}

#[tokio::test]
async fn test_認証済みの投稿一覧はタイムライン() {
    let users = StubUsersServiceClient::with_users([alice_following_bob(), user(2, "Bob")]);
    let posts = StubPostsServiceClient::with_posts([post(10, 1), post(11, 2), post(12, 3)]);
    let app = TestApp::new(&users, &posts);

    let response = app
        .send(
            Request::builder()
                .uri("/api/posts")
                .header(header::AUTHORIZATION, app.bearer(1))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![11, 10]);
    assert_eq!(
        posts.latest_calls()[0].author_ids,
        Some(vec![UserId::new(2), UserId::new(1)])
    );
    assert_eq!(posts.latest_calls()[0].acting_user_id, Some(UserId::new(1)));
}

#[tokio::test]
async fn test_cookieのトークンでもタイムラインになる() {
    let users = StubUsersServiceClient::with_users([alice_following_bob()]);
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);
    let token = app.tokens.issue(UserId::new(1)).unwrap();

    let response = app
        .send(
            Request::builder()
                .uri("/api/posts")
                .header(header::COOKIE, format!("user-jwt={}", token.as_str()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(posts.latest_calls()[0].acting_user_id, Some(UserId::new(1)));
}

#[tokio::test]
async fn test_不正なトークンは匿名として扱う() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let response = app
        .send(
            Request::builder()
                .uri("/api/posts")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(posts.latest_calls()[0].author_ids, None);
    assert_eq!(posts.latest_calls()[0].acting_user_id, None);
}

#[tokio::test]
async fn test_タイムラインで自分が存在しなければ404() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let response = app
        .send(
            Request::builder()
                .uri("/api/posts")
                .header(header::AUTHORIZATION, app.bearer(1))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(posts.call_count(), 0);
}

#[tokio::test]
async fn test_投稿者で絞り込んだ一覧は認証なしで見られる() {
    let users = StubUsersServiceClient::with_users([user(2, "Bob")]);
    let posts = StubPostsServiceClient::with_posts([post(10, 1), post(11, 2)]);
    let app = TestApp::new(&users, &posts);

    let response = app.send(get("/api/posts?userId=2")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["userId"], "2");
    assert_eq!(posts.by_author_calls(), vec![UserId::new(2)]);
}

#[tokio::test]
async fn test_数値でないuser_idは422() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let response = app.send(get("/api/posts?userId=abc")).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(
        body["type"],
        "https://chirp.example.com/errors/invalid-argument"
    );
    assert_eq!(posts.call_count(), 0);
}

#[tokio::test]
async fn test_単一投稿はコメント投稿者まで1回の問い合わせで埋まる() {
    let users = StubUsersServiceClient::with_users([user(1, "Alice"), user(2, "Bob")]);
    let mut target = post(10, 1);
    target.comments = vec![comment(100, 10, 2), comment(101, 10, 1)];
    let posts = StubPostsServiceClient::with_posts([target]);
    let app = TestApp::new(&users, &posts);

    let response = app.send(get("/api/posts/10")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["user"]["name"], "Alice");
    assert_eq!(body["data"]["comments"][0]["user"]["name"], "Bob");
    assert_eq!(body["data"]["comments"][1]["user"]["name"], "Alice");
    assert_eq!(
        users.fetch_by_ids_calls(),
        vec![vec![UserId::new(1), UserId::new(2)]]
    );
    assert_eq!(posts.get_by_id_calls(), vec![(PostId::new(10), None)]);
}

#[tokio::test]
async fn test_投稿idが0なら422で上流を呼ばない() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let by_id = app.send(get("/api/posts/0")).await;
    let comments = app.send(get("/api/comments?postId=0")).await;
    let missing = app.send(get("/api/comments")).await;

    assert_eq!(by_id.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(comments.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(posts.call_count(), 0);
}

#[tokio::test]
async fn test_存在しない投稿は404() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let response = app.send(get("/api/posts/99")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "投稿が見つかりません");
}

#[tokio::test]
async fn test_コメント一覧は投稿者を埋めない() {
    let users = StubUsersServiceClient::with_users([user(2, "Bob")]);
    let mut target = post(10, 1);
    target.comments = vec![comment(100, 10, 2)];
    let posts = StubPostsServiceClient::with_posts([target]);
    let app = TestApp::new(&users, &posts);

    let response = app.send(get("/api/comments?postId=10")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["postId"], "10");
    assert_eq!(body["data"][0]["user"]["id"], "0");
    assert!(users.was_untouched());
}

#[tokio::test]
async fn test_投稿作成は認証必須() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/posts")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"body":"hello"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(posts.call_count(), 0);
}

#[tokio::test]
async fn test_投稿を作成すると201で投稿者付きの投稿を返す() {
    let users = StubUsersServiceClient::with_users([user(1, "Alice")]);
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/posts")
                .header(header::AUTHORIZATION, app.bearer(1))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"body":"hello"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["body"], "hello");
    assert_eq!(body["data"]["user"]["name"], "Alice");
}

#[tokio::test]
async fn test_空白だけの本文は422() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/posts")
                .header(header::AUTHORIZATION, app.bearer(1))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"body":"   "}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(posts.call_count(), 0);
}

#[tokio::test]
async fn test_いいねは201で上流が適用しなければ409() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    posts.set_like_results([true, false]);
    let app = TestApp::new(&users, &posts);
    let like = || {
        Request::builder()
            .method(Method::POST)
            .uri("/api/posts/10/like")
            .header(header::AUTHORIZATION, app.bearer(3))
            .body(Body::empty())
            .unwrap()
    };

    let first = app.send(like()).await;
    let second = app.send(like()).await;

    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = json_body(second).await;
    assert_eq!(body["type"], "https://chirp.example.com/errors/like-unknown");
    assert_eq!(posts.like_calls().len(), 2);
}

#[tokio::test]
async fn test_いいね取り消しは204() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    let app = TestApp::new(&users, &posts);

    let response = app
        .send(
            Request::builder()
                .method(Method::DELETE)
                .uri("/api/posts/10/like")
                .header(header::AUTHORIZATION, app.bearer(3))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        posts.like_calls(),
        vec![(UserId::new(3), PostId::new(10), LikeType::Dislike)]
    );
}

#[tokio::test]
async fn test_上流の障害は500で詳細を返さない() {
    let users = StubUsersServiceClient::new();
    let posts = StubPostsServiceClient::new();
    posts.fail_with(ServiceError::Network("connection refused".to_string()));
    let app = TestApp::new(&users, &posts);

    let response = app.send(get("/api/posts")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "内部エラーが発生しました");
    assert!(!body.to_string().contains("connection refused"));
}
