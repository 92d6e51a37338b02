//! # ユースケース層
//!
//! BFF のオーケストレーションを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 上流クライアントと暗号処理を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは認証と入出力変換のみ、呼び出し順序はユースケースに集約
//! - **ハイドレーション**: 投稿の `user` 埋めは [`hydrator::Hydrator`] に一本化
//!
//! ## モジュール構成
//!
//! - `hydrator`: 投稿・コメントへの投稿者ユーザーの埋め込み
//! - `post`: タイムライン、投稿、いいね
//! - `user`: 登録、プロフィール、フォロー
//! - `auth`: ログイン

pub mod auth;
pub mod hydrator;
pub mod post;
pub mod user;

pub use auth::AuthUseCaseImpl;
pub use hydrator::Hydrator;
pub use post::PostUseCaseImpl;
pub use user::UserUseCaseImpl;

/// タイムラインと匿名の最新投稿で取得する件数
pub const FEED_LIMIT: u32 = 100;

/// 新しいユーザー一覧で取得する件数
pub const NEW_USERS_LIMIT: u32 = 100;
