//! 上流サービスレスポンスの共通ハンドリング

use chirp_shared::ApiResponse;
use serde::de::DeserializeOwned;

use super::error::ServiceError;

/// 上流サービスのレスポンスを解釈する
///
/// 成功時は `{ "data": T }` から `T` を取り出す。
/// 失敗時はステータスコードを [`ServiceError`] に分類する。
pub(super) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = response.status();

    if status.is_success() {
        let body = response.json::<ApiResponse<T>>().await?;
        return Ok(body.data);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ServiceError::NotFound);
    }

    let body = response.text().await.unwrap_or_default();

    let error = match status {
        reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::InvalidArgument(body)
        }
        _ => ServiceError::Unexpected(format!("予期しないステータス {status}: {body}")),
    };

    Err(error)
}
