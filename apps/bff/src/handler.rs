//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置し、ここで re-export する
//! - ハンドラは認証・入力の変換・ビュー DTO への変換のみを行い、
//!   上流の呼び出し順序はユースケースに委譲する
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `auth`: ログイン、ログアウト
//! - `user`: 登録、プロフィール、フォロー
//! - `post`: タイムライン、投稿、コメント、いいね

pub mod auth;
pub mod health;
pub mod post;
pub mod user;

use std::str::FromStr;

use axum::response::Response;
pub use auth::{AuthState, login, logout};
pub use health::health_check;
pub use post::{
    CommentData,
    PostData,
    PostState,
    create_post,
    dislike_post,
    get_post,
    like_post,
    list_comments,
    list_posts,
};
use serde::Deserialize;
pub use user::{
    UserData,
    UserState,
    current_user,
    follow,
    get_user,
    list_users,
    register,
    unfollow,
    update_user,
};
use utoipa::ToSchema;

use crate::error::invalid_argument_response;

/// パスやクエリ、ボディで受け取った ID をパースする
///
/// 数値として解釈できなければ 422。0 や負数はここでは通し、
/// ユースケースの検証で拒否する。
pub(crate) fn parse_id<T>(raw: &str, label: &str) -> Result<T, Response>
where
    T: FromStr,
{
    raw.trim()
        .parse()
        .map_err(|_| invalid_argument_response(&format!("{label} が不正です: {raw}")))
}

/// 文字列でも数値でも受け付ける ID
///
/// ビュー DTO は ID を文字列で返すため、クライアントはどちらの形でも送ってくる。
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

impl IdValue {
    pub(crate) fn parse<T>(&self, label: &str) -> Result<T, Response>
    where
        T: FromStr,
    {
        match self {
            Self::Number(n) => parse_id(&n.to_string(), label),
            Self::Text(s) => parse_id(s, label),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chirp_domain::user::UserId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("42", 42)]
    #[case(" 7 ", 7)]
    #[case("0", 0)]
    fn test_idをパースできる(#[case] raw: &str, #[case] expected: i32) {
        let id: UserId = parse_id(raw, "userId").unwrap();

        assert_eq!(id, UserId::new(expected));
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case("99999999999")]
    fn test_数値でないidは422(#[case] raw: &str) {
        let response = parse_id::<UserId>(raw, "userId").unwrap_err();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_id_valueは文字列と数値の両方を受け付ける() {
        let text: IdValue = serde_json::from_str(r#""12""#).unwrap();
        let number: IdValue = serde_json::from_str("12").unwrap();

        assert_eq!(text.parse::<UserId>("userId").unwrap(), UserId::new(12));
        assert_eq!(number.parse::<UserId>("userId").unwrap(), UserId::new(12));
    }
}
