//! # 投稿 API ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/posts?userId=` - 投稿一覧（認証任意）
//! - `POST /api/posts` - 投稿作成（認証必須）
//! - `GET /api/posts/{id}` - 単一投稿（認証任意）
//! - `GET /api/comments?postId=` - コメント一覧
//! - `POST /api/posts/{id}/like` - いいね（認証必須）
//! - `DELETE /api/posts/{id}/like` - いいね取り消し（認証必須）
//!
//! 認証任意のエンドポイントでは、トークンがない・不正な場合に匿名として扱う。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chirp_domain::{
    post::{Comment, Post, PostId},
    user::UserId,
};
use chirp_infra::IdentityVerifier;
use chirp_shared::{ApiResponse, ErrorResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{UserData, parse_id};
use crate::{
    error::{authenticate, authenticate_optional, log_and_convert_error},
    usecase::PostUseCaseImpl,
};

/// 投稿 API の共有状態
pub struct PostState {
    pub post_usecase:      Arc<PostUseCaseImpl>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
}

// --- リクエスト型 ---

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPostsQuery {
    /// 投稿者で絞り込む
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CommentsQuery {
    pub post_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub body: String,
}

// --- レスポンス型 ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentData {
    pub id:         i32,
    pub body:       String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id:    String,
    pub post_id:    String,
    pub user:       UserData,
}

impl From<Comment> for CommentData {
    fn from(comment: Comment) -> Self {
        Self {
            id:         comment.id.as_i32(),
            body:       comment.body,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            user_id:    comment.user_id.to_string(),
            post_id:    comment.post_id.to_string(),
            user:       UserData::from(comment.user),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub id:                   i32,
    pub body:                 String,
    pub created_at:           DateTime<Utc>,
    pub updated_at:           DateTime<Utc>,
    pub user_id:              String,
    pub like_count:           i32,
    pub is_current_user_like: bool,
    pub user:                 UserData,
    pub comments:             Vec<CommentData>,
}

impl From<Post> for PostData {
    fn from(post: Post) -> Self {
        Self {
            id:                   post.id.as_i32(),
            body:                 post.body,
            created_at:           post.created_at,
            updated_at:           post.updated_at,
            user_id:              post.user_id.to_string(),
            like_count:           post.like_count,
            is_current_user_like: post.is_current_user_like,
            user:                 UserData::from(post.user),
            comments:             post.comments.into_iter().map(CommentData::from).collect(),
        }
    }
}

fn posts_response(posts: Vec<Post>) -> Response {
    let data = posts.into_iter().map(PostData::from).collect::<Vec<_>>();
    (StatusCode::OK, Json(ApiResponse::new(data))).into_response()
}

// --- ハンドラ ---

/// GET /api/posts
///
/// - `userId` 指定あり: その投稿者の投稿
/// - 指定なし・匿名: 全体の最新投稿
/// - 指定なし・認証済み: タイムライン
#[utoipa::path(
   get,
   path = "/api/posts",
   tag = "posts",
   params(ListPostsQuery),
   responses(
      (status = 200, description = "投稿一覧", body = ApiResponse<Vec<PostData>>),
      (status = 404, description = "認証済みユーザーが存在しない", body = ErrorResponse),
      (status = 422, description = "userId が不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn list_posts(
    State(state): State<Arc<PostState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<ListPostsQuery>,
) -> Response {
    let author = match query.user_id.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match parse_id::<UserId>(raw, "userId") {
            Ok(id) => Some(id),
            Err(response) => return response,
        },
        None => None,
    };
    let principal = authenticate_optional(state.identity_verifier.as_ref(), &headers, &jar);

    match state
        .post_usecase
        .list_posts(author, principal.as_ref())
        .await
    {
        Ok(posts) => posts_response(posts),
        Err(e) => log_and_convert_error("投稿一覧取得", e),
    }
}

/// POST /api/posts
#[utoipa::path(
   post,
   path = "/api/posts",
   tag = "posts",
   request_body = CreatePostRequest,
   security(("session_cookie" = []), ("bearer" = [])),
   responses(
      (status = 201, description = "作成した投稿", body = ApiResponse<PostData>),
      (status = 401, description = "未認証", body = ErrorResponse),
      (status = 422, description = "本文が空", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn create_post(
    State(state): State<Arc<PostState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<CreatePostRequest>,
) -> Response {
    let principal = match authenticate(state.identity_verifier.as_ref(), &headers, &jar) {
        Ok(p) => p,
        Err(response) => return response,
    };

    match state.post_usecase.create_post(&principal, &req.body).await {
        Ok(post) => (
            StatusCode::CREATED,
            Json(ApiResponse::new(PostData::from(post))),
        )
            .into_response(),
        Err(e) => log_and_convert_error("投稿作成", e),
    }
}

/// GET /api/posts/{id}
///
/// コメントとその投稿者を含む。
#[utoipa::path(
   get,
   path = "/api/posts/{id}",
   tag = "posts",
   params(("id" = String, Path, description = "投稿 ID")),
   responses(
      (status = 200, description = "投稿", body = ApiResponse<PostData>),
      (status = 404, description = "投稿が存在しない", body = ErrorResponse),
      (status = 422, description = "ID が不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn get_post(
    State(state): State<Arc<PostState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let post_id: PostId = match parse_id(&id, "id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let principal = authenticate_optional(state.identity_verifier.as_ref(), &headers, &jar);

    match state
        .post_usecase
        .post_by_id(post_id, principal.as_ref())
        .await
    {
        Ok(post) => (StatusCode::OK, Json(ApiResponse::new(PostData::from(post)))).into_response(),
        Err(e) => log_and_convert_error("投稿取得", e),
    }
}

/// GET /api/comments
///
/// コメントの `user` は埋めない（ゼロ値）。
#[utoipa::path(
   get,
   path = "/api/comments",
   tag = "posts",
   params(CommentsQuery),
   responses(
      (status = 200, description = "コメント一覧", body = ApiResponse<Vec<CommentData>>),
      (status = 422, description = "postId が不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn list_comments(
    State(state): State<Arc<PostState>>,
    Query(query): Query<CommentsQuery>,
) -> Response {
    let post_id = match query.post_id.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match parse_id::<PostId>(raw, "postId") {
            Ok(id) => id,
            Err(response) => return response,
        },
        None => PostId::default(),
    };

    match state.post_usecase.comments(post_id).await {
        Ok(comments) => {
            let data = comments
                .into_iter()
                .map(CommentData::from)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(ApiResponse::new(data))).into_response()
        }
        Err(e) => log_and_convert_error("コメント一覧取得", e),
    }
}

/// POST /api/posts/{id}/like
#[utoipa::path(
   post,
   path = "/api/posts/{id}/like",
   tag = "posts",
   params(("id" = String, Path, description = "投稿 ID")),
   security(("session_cookie" = []), ("bearer" = [])),
   responses(
      (status = 201, description = "いいね成功"),
      (status = 401, description = "未認証", body = ErrorResponse),
      (status = 409, description = "いいねが反映されなかった", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn like_post(
    State(state): State<Arc<PostState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let principal = match authenticate(state.identity_verifier.as_ref(), &headers, &jar) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let post_id: PostId = match parse_id(&id, "id") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.post_usecase.like(&principal, post_id).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => log_and_convert_error("いいね", e),
    }
}

/// DELETE /api/posts/{id}/like
#[utoipa::path(
   delete,
   path = "/api/posts/{id}/like",
   tag = "posts",
   params(("id" = String, Path, description = "投稿 ID")),
   security(("session_cookie" = []), ("bearer" = [])),
   responses(
      (status = 204, description = "いいね取り消し成功"),
      (status = 401, description = "未認証", body = ErrorResponse),
      (status = 409, description = "いいね取り消しが反映されなかった", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn dislike_post(
    State(state): State<Arc<PostState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let principal = match authenticate(state.identity_verifier.as_ref(), &headers, &jar) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let post_id: PostId = match parse_id(&id, "id") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.post_usecase.dislike(&principal, post_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => log_and_convert_error("いいね取り消し", e),
    }
}
