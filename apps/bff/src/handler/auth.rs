//! # 認証ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/login` - ログイン（`user-jwt` Cookie を設定し、トークンも返す）
//! - `POST /api/logout` - ログアウト（Cookie を削除）
//!
//! セッションはサーバー側に持たない。ログアウトは Cookie を消すだけで、
//! 発行済みトークンは有効期限まで有効なまま。

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use chirp_domain::password::PlainPassword;
use chirp_infra::token::SESSION_LIFETIME;
use chirp_shared::{ApiResponse, ErrorResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{SESSION_COOKIE_NAME, log_and_convert_error},
    usecase::AuthUseCaseImpl,
};

/// 認証ハンドラの共有状態
pub struct AuthState {
    pub auth_usecase:  Arc<AuthUseCaseImpl>,
    /// Cookie に `Secure` を付けるか（HTTPS 配信時のみ true）
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email:    String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponseData {
    pub access_token: String,
}

// --- Cookie ヘルパー ---

fn build_session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .path("/")
        .max_age(time::Duration::seconds(SESSION_LIFETIME.num_seconds()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn build_clear_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

// --- ハンドラ ---

/// POST /api/login
///
/// ユーザーが存在しない場合とパスワード不一致は同じ 401 を返す。
#[utoipa::path(
   post,
   path = "/api/login",
   tag = "auth",
   request_body = LoginRequest,
   responses(
      (status = 200, description = "ログイン成功", body = ApiResponse<LoginResponseData>),
      (status = 401, description = "認証失敗", body = ErrorResponse),
      (status = 422, description = "入力不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Response {
    let password = PlainPassword::new(req.password);

    match state.auth_usecase.login(&req.email, &password).await {
        Ok(token) => {
            let jar = jar.add(build_session_cookie(token.as_str(), state.cookie_secure));
            let body = ApiResponse::new(LoginResponseData {
                access_token: token.as_str().to_string(),
            });
            (StatusCode::OK, jar, Json(body)).into_response()
        }
        Err(e) => log_and_convert_error("ログイン", e),
    }
}

/// POST /api/logout
#[utoipa::path(
   post,
   path = "/api/logout",
   tag = "auth",
   responses(
      (status = 204, description = "ログアウト成功")
   )
)]
pub async fn logout(State(state): State<Arc<AuthState>>, jar: CookieJar) -> Response {
    let jar = jar.add(build_clear_cookie(state.cookie_secure));
    (StatusCode::NO_CONTENT, jar).into_response()
}
