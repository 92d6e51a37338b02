//! # 上流サービスクライアント
//!
//! Users サービスと Posts サービスへの通信を担当する。
//! どちらも JSON over HTTP で、1 つの論理呼び出しが 1 リクエストに対応する。
//!
//! タイムアウトとリトライはここでは行わない。共有の `reqwest::Client` に設定した
//! タイムアウトだけが効く。呼び出し元の future が drop されると通信も中断される。

pub mod error;
pub mod posts_service;
mod response;
pub mod types;
pub mod users_service;

pub use error::ServiceError;
pub use posts_service::{PostsServiceClient, PostsServiceClientImpl};
pub use users_service::{UsersServiceClient, UsersServiceClientImpl};
