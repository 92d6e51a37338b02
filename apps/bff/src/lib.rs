//! # Chirp BFF (Backend for Frontend) ライブラリ
//!
//! フロントエンド専用の API サーバーのコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: DI とルーター構築
//! - `client`: Users / Posts サービスのクライアント
//! - `error`: エラー型と HTTP レスポンスへの変換、認証ヘルパー
//! - `handler`: HTTP ハンドラ
//! - `middleware`: ミドルウェア（Request ID 伝播、キャッシュ制御）
//! - `openapi`: OpenAPI 仕様
//! - `usecase`: タイムライン・投稿・ユーザー・ログインのオーケストレーション

pub mod app_builder;
pub mod client;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod openapi;
pub mod usecase;

#[doc(hidden)]
pub mod test_utils;
