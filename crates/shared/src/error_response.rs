//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! BFF が返すエラーボディの共通構造体。
//!
//! `ErrorResponse` 自体は純粋なデータ構造で、axum の `IntoResponse` 変換は
//! BFF 側（`apps/bff/src/error.rs`）で行う。

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://chirp.example.com/errors";

/// エラーレスポンス（RFC 9457 Problem Details）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    ///
    /// `error_type_suffix` はベース URI に付加される（例: `"follow-unknown"`）。
    pub fn new(
        error_type_suffix: &str,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
            title: title.into(),
            status,
            detail: detail.into(),
        }
    }

    /// 401 Unauthorized
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new("unauthorized", "Unauthorized", 401, detail)
    }

    /// 404 Not Found
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new("not-found", "Not Found", 404, detail)
    }

    /// 409 Conflict
    pub fn conflict(suffix: &str, detail: impl Into<String>) -> Self {
        Self::new(suffix, "Conflict", 409, detail)
    }

    /// 422 Invalid Argument
    ///
    /// 入力値の検証エラー。上流サービスの InvalidArgument もここに集約する。
    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::new("invalid-argument", "Invalid Argument", 422, detail)
    }

    /// 500 Internal Server Error
    ///
    /// detail は固定値（上流サービスの情報を漏らさない）。
    pub fn internal_error() -> Self {
        Self::new(
            "internal-error",
            "Internal Server Error",
            500,
            "内部エラーが発生しました",
        )
    }
}
