//! # ドメイン層エラー定義
//!
//! 値オブジェクトの生成時に検出した入力違反を表す。
//! BFF 層で `InvalidArgument`（422）に変換される。

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 必須フィールドの欠落や 0 の ID など、上流サービスを呼ぶ前に
    /// 弾くべき入力に使う。
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}

impl DomainError {
    /// `{label}は必須です` 形式のバリデーションエラーを作る
    pub fn required(label: &str) -> Self {
        Self::Validation(format!("{label}は必須です"))
    }
}
