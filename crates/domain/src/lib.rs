//! # Chirp ドメイン層
//!
//! BFF が扱うエンティティと値オブジェクトを定義する。
//!
//! BFF は何も永続化しない。ここで定義する型はすべて Users / Posts サービスが
//! 返すデータの読み取り専用の投影であり、リクエストごとに組み立てて捨てる。
//!
//! ## モジュール構成
//!
//! - [`user`] - ユーザー、部分更新、登録入力
//! - [`post`] - 投稿、コメント、いいね種別
//! - [`principal`] - 認証済みの行為者
//! - [`password`] - パスワード値オブジェクト
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメインエラー
//!
//! ```rust
//! use chirp_domain::user::{User, UserId};
//!
//! let user = User::default();
//! assert_eq!(user.id, UserId::new(0));
//! assert!(!user.id.is_valid());
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod password;
pub mod post;
pub mod principal;
pub mod user;

pub use error::DomainError;
