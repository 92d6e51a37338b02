//! # インフラ層エラー定義
//!
//! パスワードハッシュ化やトークン署名で発生するエラーを表現する。
//!
//! `std::io::Error` と同じ struct + enum パターン:
//! - [`InfraError`]: エラー種別と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: 具体的な種別
//!
//! convenience constructor や `From` 実装で生成した時点のスパンが記録される。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// パスワードのハッシュ化または保存済みハッシュの解析に失敗した
    #[error("パスワードハッシュエラー: {0}")]
    PasswordHash(String),

    /// トークンの署名に失敗した
    #[error("トークン署名エラー: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),
}

impl InfraError {
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    pub fn password_hash(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::PasswordHash(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<jsonwebtoken::errors::Error> for InfraError {
    fn from(source: jsonwebtoken::errors::Error) -> Self {
        Self {
            kind:       InfraErrorKind::TokenSigning(source),
            span_trace: SpanTrace::capture(),
        }
    }
}
