//! # ハイドレーション
//!
//! Posts サービスが返す投稿・コメントは投稿者を ID でしか持たない。
//! 参照されているユーザー ID を集めて Users サービスへ 1 回だけ問い合わせ、
//! `user` フィールドを埋める。
//!
//! 見つからなかった ID にはゼロ値のユーザー（`User::default()`）を入れる。
//! 投稿自体は落とさない。

use std::collections::HashMap;

use chirp_domain::{
    post::Post,
    user::{User, UserId},
};
use itertools::Itertools;

use crate::{client::UsersServiceClient, error::BffError};

pub struct Hydrator<'a> {
    users: &'a dyn UsersServiceClient,
}

impl<'a> Hydrator<'a> {
    pub fn new(users: &'a dyn UsersServiceClient) -> Self {
        Self { users }
    }

    /// 投稿一覧の投稿者を埋める
    ///
    /// 一覧ではコメントを扱わない。問い合わせるのは投稿者の ID だけ。
    pub async fn hydrate_posts(&self, mut posts: Vec<Post>) -> Result<Vec<Post>, BffError> {
        let ids = posts.iter().map(|p| p.user_id).unique().collect::<Vec<_>>();
        let users = self.lookup(&ids).await?;

        for post in &mut posts {
            post.user = resolve(&users, post.user_id);
        }
        Ok(posts)
    }

    /// 単一投稿の投稿者とコメント投稿者を埋める
    pub async fn hydrate_post(&self, mut post: Post) -> Result<Post, BffError> {
        let users = self.lookup(&post.referenced_user_ids()).await?;

        post.user = resolve(&users, post.user_id);
        for comment in &mut post.comments {
            comment.user = resolve(&users, comment.user_id);
        }
        Ok(post)
    }

    async fn lookup(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, BffError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.users
            .fetch_by_ids(ids)
            .await
            .map_err(|e| BffError::from_service("users.fetch_by_ids", e))
    }
}

fn resolve(users: &HashMap<UserId, User>, id: UserId) -> User {
    users.get(&id).cloned().unwrap_or_default()
}
