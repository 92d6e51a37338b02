//! # API レスポンスエンベロープ
//!
//! 成功レスポンスの統一形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// 成功レスポンスの統一型
///
/// 同じ型を双方向で使う:
/// - BFF ハンドラ: `Serialize` してフロントエンドへ返す
/// - BFF クライアント: Users / Posts サービスの応答を `Deserialize` で受け取る
///
/// ```
/// use chirp_shared::ApiResponse;
///
/// let response = ApiResponse::new(vec![1, 2, 3]);
/// assert_eq!(response.data.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
