//! # 投稿・コメント
//!
//! Posts サービスは投稿者を ID でしか返さない。`user` フィールドは BFF の
//! ハイドレーションで埋めるまでゼロ値のまま。

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{
    DomainError,
    user::{User, UserId},
};

define_int_id! {
    /// 投稿 ID
    pub struct PostId;
}

define_int_id! {
    /// コメント ID
    pub struct CommentId;
}

/// 投稿本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostBody(String);

impl PostBody {
    /// 空白のみの本文は拒否する。保存される値は入力そのまま。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::required("body"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// コメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id:         CommentId,
    pub body:       String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id:    UserId,
    pub post_id:    PostId,
    pub user:       User,
}

/// 投稿
///
/// `is_current_user_like` は取得時に行為者を渡した場合のみ意味を持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: UserId,
    pub like_count: i32,
    pub is_current_user_like: bool,
    pub user: User,
    pub comments: Vec<Comment>,
}

impl Post {
    /// 投稿者とコメント投稿者の ID（初出順、重複なし）
    pub fn referenced_user_ids(&self) -> Vec<UserId> {
        std::iter::once(self.user_id)
            .chain(self.comments.iter().map(|c| c.user_id))
            .unique()
            .collect()
    }
}

/// いいね操作の種別
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LikeType {
    Like,
    Dislike,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn comment(id: i32, user_id: i32) -> Comment {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Comment {
            id:         CommentId::new(id),
            body:       format!("comment {id}"),
            created_at: at,
            updated_at: at,
            user_id:    UserId::new(user_id),
            post_id:    PostId::new(1),
            user:       User::default(),
        }
    }

    fn post_by(user_id: i32, comments: Vec<Comment>) -> Post {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Post {
            id: PostId::new(1),
            body: "hello".to_string(),
            created_at: at,
            updated_at: at,
            user_id: UserId::new(user_id),
            like_count: 0,
            is_current_user_like: false,
            user: User::default(),
            comments,
        }
    }

    #[test]
    fn test_referenced_user_idsは投稿者を先頭に重複を除く() {
        let post = post_by(10, vec![comment(1, 20), comment(2, 10), comment(3, 20)]);

        assert_eq!(
            post.referenced_user_ids(),
            vec![UserId::new(10), UserId::new(20)]
        );
    }

    #[test]
    fn test_コメントがなければ投稿者のみ() {
        let post = post_by(3, vec![]);

        assert_eq!(post.referenced_user_ids(), vec![UserId::new(3)]);
    }

    #[test]
    fn test_post_bodyは空白のみを拒否する() {
        assert_eq!(
            PostBody::new("   ").unwrap_err(),
            DomainError::required("body")
        );
        assert_eq!(PostBody::new(" hi ").unwrap().as_str(), " hi ");
    }

    #[test]
    fn test_like_typeの文字列表現() {
        let like: &'static str = LikeType::Like.into();

        assert_eq!(like, "like");
        assert_eq!(LikeType::Dislike.to_string(), "dislike");
        assert_eq!(
            serde_json::to_value(LikeType::Dislike).unwrap(),
            serde_json::json!("dislike")
        );
    }
}
