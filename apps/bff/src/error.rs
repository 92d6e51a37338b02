//! # BFF エラーハンドリング
//!
//! ユースケースのエラー型と、axum レスポンスへの変換。
//! セッショントークンの取り出しと認証ヘルパーもここに置く。
//!
//! ## エラーと HTTP ステータスの対応
//!
//! | エラー | ステータス |
//! |--------|-----------|
//! | `InvalidArgument` | 422 |
//! | `Unauthorized` / `AuthError` | 401 |
//! | `NotFound` | 404 |
//! | `FollowUnknown` / `LikeUnknown` | 409 |
//! | `Internal` / `Infra` | 500 |

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chirp_domain::{DomainError, principal::Principal};
use chirp_infra::{AuthError, IdentityVerifier, InfraError};
use chirp_shared::ErrorResponse;
use thiserror::Error;

use crate::client::ServiceError;

/// セッショントークンを保持する Cookie 名
pub const SESSION_COOKIE_NAME: &str = "user-jwt";

/// `NotFound` で返すリソースの種類
pub mod resource {
    pub const USER: &str = "ユーザー";
    pub const POST: &str = "投稿";

    /// 上流の呼び出し名（`users.*` / `posts.*`）からリソースの種類を決める
    pub(crate) fn of_call(call: &str) -> &'static str {
        if call.starts_with("posts.") {
            POST
        } else {
            USER
        }
    }
}

/// ユースケースのエラー
#[derive(Debug, Error)]
pub enum BffError {
    /// 入力が不正（上流を呼ぶ前に検出したもの、または上流が拒否したもの）
    #[error("不正な引数: {0}")]
    InvalidArgument(String),

    /// 資格情報が一致しない
    #[error("認証に失敗しました")]
    Unauthorized,

    /// 対象が存在しない（値はクライアントに返すリソースの種類）
    #[error("{0}が見つかりません")]
    NotFound(&'static str),

    /// フォロー操作が上流で適用されなかった
    #[error("フォロー状態を変更できませんでした")]
    FollowUnknown,

    /// いいね操作が上流で適用されなかった
    #[error("いいねを反映できませんでした")]
    LikeUnknown,

    /// 上流サービスの呼び出しに失敗した
    #[error("{call} の呼び出しに失敗しました: {source}")]
    Internal {
        call:   &'static str,
        #[source]
        source: ServiceError,
    },

    /// パスワードハッシュ化やトークン署名に失敗した
    #[error("インフラエラー: {0}")]
    Infra(#[from] InfraError),
}

impl BffError {
    /// 上流サービスのエラーを、失敗した呼び出し名付きで変換する
    pub fn from_service(call: &'static str, err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => {
                tracing::debug!(call, "上流が対象なしを返した");
                Self::NotFound(resource::of_call(call))
            }
            ServiceError::InvalidArgument(detail) => Self::InvalidArgument(detail),
            source => Self::Internal { call, source },
        }
    }

    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::InvalidArgument(detail.into())
    }
}

impl From<DomainError> for BffError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(detail) => Self::InvalidArgument(detail),
        }
    }
}

impl IntoResponse for BffError {
    fn into_response(self) -> Response {
        match self {
            BffError::InvalidArgument(detail) => invalid_argument_response(&detail),
            BffError::Unauthorized => authentication_failed_response(),
            BffError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::not_found(format!("{what}が見つかりません"))),
            )
                .into_response(),
            BffError::FollowUnknown => conflict_response(
                "follow-unknown",
                "フォロー状態を変更できませんでした",
            ),
            BffError::LikeUnknown => {
                conflict_response("like-unknown", "いいねを反映できませんでした")
            }
            BffError::Internal { .. } | BffError::Infra(_) => internal_error_response(),
        }
    }
}

/// トークン検証エラーを 401 レスポンスに変換する
///
/// `AuthError` は外部クレートの型なので `IntoResponse` を実装できない（孤児ルール）。
fn auth_error_response(err: AuthError) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::unauthorized(err.to_string())),
    )
        .into_response()
}

/// ユースケースのエラーをログ付きでレスポンスに変換する
///
/// 500 になるエラーだけを `tracing::error!` で記録する。
pub fn log_and_convert_error(context: &str, err: BffError) -> Response {
    match &err {
        BffError::Internal { call, source } => {
            tracing::error!(
                error.category = "external_service",
                error.kind = *call,
                "{}で内部エラー: {}",
                context,
                source
            );
        }
        BffError::Infra(e) => {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "crypto",
                "{}で内部エラー: {}",
                context,
                e
            );
        }
        _ => {}
    }
    err.into_response()
}

// --- 認証ヘルパー ---

/// リクエストからセッショントークンを取り出す
///
/// `user-jwt` Cookie を優先し、なければ `Authorization: Bearer` を見る。
pub fn extract_session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// 認証必須の操作で行為者を確定する
pub fn authenticate(
    verifier: &dyn IdentityVerifier,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Result<Principal, Response> {
    let token = extract_session_token(headers, jar).ok_or_else(unauthorized_response)?;

    verifier.authenticate(&token).map_err(|e| {
        tracing::debug!(reason = %e, "セッショントークンを拒否");
        auth_error_response(e)
    })
}

/// 匿名でも実行できる操作で行為者を確定する
///
/// トークンがない、または不正な場合は `None`（匿名として扱う）。
pub fn authenticate_optional(
    verifier: &dyn IdentityVerifier,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Option<Principal> {
    let token = extract_session_token(headers, jar)?;
    match verifier.authenticate(&token) {
        Ok(principal) => Some(principal),
        Err(e) => {
            tracing::debug!(reason = %e, "不正なトークンを匿名として扱う");
            None
        }
    }
}

// --- レスポンスヘルパー ---

/// 認証失敗レスポンス（ログイン時）
pub fn authentication_failed_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(
            "authentication-failed",
            "Authentication Failed",
            401,
            "メールアドレスまたはパスワードが正しくありません",
        )),
    )
        .into_response()
}

/// 未認証レスポンス
pub fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::unauthorized("認証が必要です")),
    )
        .into_response()
}

pub fn invalid_argument_response(detail: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse::invalid_argument(detail)),
    )
        .into_response()
}

pub fn conflict_response(suffix: &str, detail: &str) -> Response {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse::conflict(suffix, detail)),
    )
        .into_response()
}

pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal_error()),
    )
        .into_response()
}
