//! # BFF アプリケーション構築
//!
//! DI（ユースケース・State）の初期化とルーター構築を担当する。
//! `main.rs` は設定の読み込みと具象クライアントの生成、サーバー起動に集中する。
//!
//! 統合テストからも同じルーターを組み立てられるよう、依存はすべて
//! [`AppDeps`] でトレイトオブジェクトとして受け取る。

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use chirp_infra::{IdentityVerifier, PasswordHasher, TokenIssuer};
use chirp_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    client::{PostsServiceClient, UsersServiceClient},
    handler::{
        AuthState,
        PostState,
        UserState,
        create_post,
        current_user,
        dislike_post,
        follow,
        get_post,
        get_user,
        health_check,
        like_post,
        list_comments,
        list_posts,
        list_users,
        login,
        logout,
        register,
        unfollow,
        update_user,
    },
    middleware::{no_store, store_request_id},
    usecase::{AuthUseCaseImpl, PostUseCaseImpl, UserUseCaseImpl},
};

/// ルーターの組み立てに必要な依存
pub struct AppDeps {
    pub users_client:      Arc<dyn UsersServiceClient>,
    pub posts_client:      Arc<dyn PostsServiceClient>,
    pub password_hasher:   Arc<dyn PasswordHasher>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub token_issuer:      Arc<dyn TokenIssuer>,
    pub cookie_secure:     bool,
}

/// ユースケース → State → Router の順に組み立てる
pub fn build_app(deps: AppDeps) -> Router {
    let post_usecase = Arc::new(PostUseCaseImpl::new(
        deps.posts_client.clone(),
        deps.users_client.clone(),
    ));
    let user_usecase = Arc::new(UserUseCaseImpl::new(
        deps.users_client.clone(),
        deps.password_hasher.clone(),
    ));
    let auth_usecase = Arc::new(AuthUseCaseImpl::new(
        deps.users_client,
        deps.password_hasher,
        deps.token_issuer,
    ));

    let auth_state = Arc::new(AuthState {
        auth_usecase,
        cookie_secure: deps.cookie_secure,
    });
    let user_state = Arc::new(UserState {
        user_usecase,
        identity_verifier: deps.identity_verifier.clone(),
    });
    let post_state = Arc::new(PostState {
        post_usecase,
        identity_verifier: deps.identity_verifier,
    });

    let auth_routes = Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .with_state(auth_state);

    let user_routes = Router::new()
        .route("/api/register", post(register))
        .route("/api/current", get(current_user))
        .route("/api/users", get(list_users).patch(update_user))
        .route("/api/users/{id}", get(get_user))
        .route("/api/follow", post(follow).delete(unfollow))
        .with_state(user_state);

    let post_routes = Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{id}", get(get_post))
        .route("/api/posts/{id}/like", post(like_post).delete(dislike_post))
        .route("/api/comments", get(list_comments))
        .with_state(post_state);

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .merge(post_routes)
        .layer(from_fn(no_store));

    // レイヤーは下から順に外側になる:
    // 1. SetRequestIdLayer（最外）: UUID v7 を生成（クライアント提供値があればそれを使う）
    // 2. TraceLayer: request_id 付きのスパンで全ログを包む
    // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
    // 4. store_request_id: 上流呼び出し用に task-local へ保存
    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .layer(from_fn(store_request_id))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
