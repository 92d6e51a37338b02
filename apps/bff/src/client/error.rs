//! 上流サービスクライアントのエラー型

use thiserror::Error;

/// Users / Posts サービス呼び出しのエラー
///
/// 上流のステータスコードから分類する。どの呼び出しで起きたかは
/// ユースケース層で `BffError` に変換するときに付与する。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// 対象が存在しない（404）
    #[error("リソースが見つかりません")]
    NotFound,

    /// 上流が入力を拒否した（400 / 422）
    #[error("不正な引数: {0}")]
    InvalidArgument(String),

    /// 接続失敗・タイムアウト・ボディの読み取り失敗
    #[error("ネットワークエラー: {0}")]
    Network(String),

    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Network(err.to_string())
    }
}
