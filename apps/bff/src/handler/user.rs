//! # ユーザー API ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/register` - ユーザー登録
//! - `GET /api/current` - 現在のユーザー（認証必須）
//! - `GET /api/users` - 新しいユーザー一覧
//! - `GET /api/users/{id}` - ユーザー取得
//! - `PATCH /api/users` - プロフィール更新（認証必須）
//! - `POST /api/follow` - フォロー（認証必須）
//! - `DELETE /api/follow` - フォロー解除（認証必須）

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chirp_domain::{
    password::PlainPassword,
    user::{NewUser, PartialUserUpdate, User, UserId},
};
use chirp_infra::IdentityVerifier;
use chirp_shared::{ApiResponse, ErrorResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{IdValue, parse_id};
use crate::{
    error::{BffError, authenticate, log_and_convert_error},
    usecase::UserUseCaseImpl,
};

/// ユーザー API の共有状態
pub struct UserState {
    pub user_usecase:      Arc<UserUseCaseImpl>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
}

// --- リクエスト型 ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name:     String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email:    String,
    #[serde(default)]
    pub password: String,
}

/// プロフィール更新リクエスト
///
/// 省略したフィールドは変更しない。空文字列を送るとその値で上書きする。
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name:          Option<String>,
    pub username:      Option<String>,
    pub bio:           Option<String>,
    pub profile_image: Option<String>,
    pub cover_image:   Option<String>,
}

impl From<UpdateUserRequest> for PartialUserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            user_id:       UserId::default(),
            name:          req.name.into(),
            username:      req.username.into(),
            bio:           req.bio.into(),
            profile_image: req.profile_image.into(),
            cover_image:   req.cover_image.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: IdValue,
}

// --- レスポンス型 ---

/// ユーザーのビュー
///
/// パスワードハッシュに対応するフィールドは持たない。
/// ID は文字列で返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id:              String,
    pub name:            String,
    pub username:        String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email:           String,
    pub bio:             String,
    pub profile_image:   String,
    pub cover_image:     String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following_ids:   Option<Vec<String>>,
    pub followers_count: usize,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        let following_ids = (!user.following_ids.is_empty())
            .then(|| user.following_ids.iter().map(ToString::to_string).collect());

        Self {
            id: user.id.to_string(),
            followers_count: user.followers_count(),
            name: user.name,
            username: user.username,
            email: user.email,
            bio: user.bio,
            profile_image: user.profile_image,
            cover_image: user.cover_image,
            following_ids,
        }
    }
}

fn user_response(status: StatusCode, user: User) -> Response {
    (status, Json(ApiResponse::new(UserData::from(user)))).into_response()
}

// --- ハンドラ ---

/// POST /api/register
///
/// パスワードは BFF でハッシュ化してから Users サービスへ送る。
#[utoipa::path(
   post,
   path = "/api/register",
   tag = "users",
   request_body = RegisterRequest,
   responses(
      (status = 201, description = "登録成功", body = ApiResponse<UserData>),
      (status = 422, description = "入力不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<Arc<UserState>>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    let new_user = match NewUser::new(
        req.name,
        req.username,
        req.email,
        PlainPassword::new(req.password),
    ) {
        Ok(user) => user,
        Err(e) => return BffError::from(e).into_response(),
    };

    match state.user_usecase.create_user(new_user).await {
        Ok(user) => user_response(StatusCode::CREATED, user),
        Err(e) => log_and_convert_error("ユーザー登録", e),
    }
}

/// GET /api/current
#[utoipa::path(
   get,
   path = "/api/current",
   tag = "users",
   security(("session_cookie" = []), ("bearer" = [])),
   responses(
      (status = 200, description = "現在のユーザー", body = ApiResponse<UserData>),
      (status = 401, description = "未認証", body = ErrorResponse),
      (status = 404, description = "ユーザーが存在しない", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn current_user(
    State(state): State<Arc<UserState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let principal = match authenticate(state.identity_verifier.as_ref(), &headers, &jar) {
        Ok(p) => p,
        Err(response) => return response,
    };

    match state.user_usecase.current_user(&principal).await {
        Ok(user) => user_response(StatusCode::OK, user),
        Err(e) => log_and_convert_error("現在のユーザー取得", e),
    }
}

/// GET /api/users
///
/// 新しい順に最大 100 件。
#[utoipa::path(
   get,
   path = "/api/users",
   tag = "users",
   responses(
      (status = 200, description = "ユーザー一覧", body = ApiResponse<Vec<UserData>>)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<Arc<UserState>>) -> Response {
    match state.user_usecase.new_users().await {
        Ok(users) => {
            let data = users.into_iter().map(UserData::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(ApiResponse::new(data))).into_response()
        }
        Err(e) => log_and_convert_error("ユーザー一覧取得", e),
    }
}

/// GET /api/users/{id}
#[utoipa::path(
   get,
   path = "/api/users/{id}",
   tag = "users",
   params(("id" = String, Path, description = "ユーザー ID")),
   responses(
      (status = 200, description = "ユーザー", body = ApiResponse<UserData>),
      (status = 404, description = "ユーザーが存在しない", body = ErrorResponse),
      (status = 422, description = "ID が不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(State(state): State<Arc<UserState>>, Path(id): Path<String>) -> Response {
    let user_id: UserId = match parse_id(&id, "id") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.user_usecase.user_by_id(user_id).await {
        Ok(user) => user_response(StatusCode::OK, user),
        Err(e) => log_and_convert_error("ユーザー取得", e),
    }
}

/// PATCH /api/users
///
/// 更新対象は常に認証済みユーザー本人。
#[utoipa::path(
   patch,
   path = "/api/users",
   tag = "users",
   request_body = UpdateUserRequest,
   security(("session_cookie" = []), ("bearer" = [])),
   responses(
      (status = 200, description = "更新後のユーザー", body = ApiResponse<UserData>),
      (status = 401, description = "未認証", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<Arc<UserState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<UpdateUserRequest>,
) -> Response {
    let principal = match authenticate(state.identity_verifier.as_ref(), &headers, &jar) {
        Ok(p) => p,
        Err(response) => return response,
    };

    match state
        .user_usecase
        .update_user(&principal, PartialUserUpdate::from(req))
        .await
    {
        Ok(user) => user_response(StatusCode::OK, user),
        Err(e) => log_and_convert_error("プロフィール更新", e),
    }
}

/// POST /api/follow
#[utoipa::path(
   post,
   path = "/api/follow",
   tag = "users",
   request_body = FollowRequest,
   security(("session_cookie" = []), ("bearer" = [])),
   responses(
      (status = 200, description = "フォロー後の自分", body = ApiResponse<UserData>),
      (status = 401, description = "未認証", body = ErrorResponse),
      (status = 409, description = "フォローが反映されなかった", body = ErrorResponse),
      (status = 422, description = "対象が不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn follow(
    State(state): State<Arc<UserState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<FollowRequest>,
) -> Response {
    let principal = match authenticate(state.identity_verifier.as_ref(), &headers, &jar) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let target: UserId = match req.user_id.parse("userId") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.user_usecase.follow(&principal, target).await {
        Ok(user) => user_response(StatusCode::OK, user),
        Err(e) => log_and_convert_error("フォロー", e),
    }
}

/// DELETE /api/follow
#[utoipa::path(
   delete,
   path = "/api/follow",
   tag = "users",
   request_body = FollowRequest,
   security(("session_cookie" = []), ("bearer" = [])),
   responses(
      (status = 200, description = "フォロー解除後の自分", body = ApiResponse<UserData>),
      (status = 401, description = "未認証", body = ErrorResponse),
      (status = 409, description = "フォロー解除が反映されなかった", body = ErrorResponse),
      (status = 422, description = "対象が不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn unfollow(
    State(state): State<Arc<UserState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<FollowRequest>,
) -> Response {
    let principal = match authenticate(state.identity_verifier.as_ref(), &headers, &jar) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let target: UserId = match req.user_id.parse("userId") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.user_usecase.unfollow(&principal, target).await {
        Ok(user) => user_response(StatusCode::OK, user),
        Err(e) => log_and_convert_error("フォロー解除", e),
    }
}
