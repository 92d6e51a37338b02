//! # 投稿ユースケース
//!
//! タイムライン、投稿の作成・取得、コメント取得、いいね。
//!
//! 入力の検証はすべて上流を呼ぶ前に行う。検証に失敗した場合、
//! クライアントは 1 度も呼ばれない。

use std::sync::Arc;

use chirp_domain::{
    post::{Comment, LikeType, Post, PostBody, PostId},
    principal::Principal,
    user::UserId,
};

use super::{FEED_LIMIT, hydrator::Hydrator};
use crate::{
    client::{PostsServiceClient, UsersServiceClient},
    error::{BffError, resource},
};

/// 投稿ユースケース
pub struct PostUseCaseImpl {
    posts_client: Arc<dyn PostsServiceClient>,
    users_client: Arc<dyn UsersServiceClient>,
}

impl PostUseCaseImpl {
    pub fn new(
        posts_client: Arc<dyn PostsServiceClient>,
        users_client: Arc<dyn UsersServiceClient>,
    ) -> Self {
        Self {
            posts_client,
            users_client,
        }
    }

    fn hydrator(&self) -> Hydrator<'_> {
        Hydrator::new(self.users_client.as_ref())
    }

    /// 投稿を作成し、投稿者を埋めて返す
    #[tracing::instrument(skip_all, fields(user_id = %principal.user_id))]
    pub async fn create_post(&self, principal: &Principal, body: &str) -> Result<Post, BffError> {
        let body = PostBody::new(body)?;
        ensure_user_id(principal.user_id)?;

        let post = self
            .posts_client
            .create(principal.user_id, body.as_str())
            .await
            .map_err(|e| BffError::from_service("posts.create", e))?;

        self.hydrator().hydrate_post(post).await
    }

    /// 投稿一覧
    ///
    /// - `author` 指定あり: その投稿者の投稿（行為者による制限はしない）
    /// - 指定なし・匿名: 全体の最新投稿
    /// - 指定なし・認証済み: タイムライン（[`Self::feed`]）
    #[tracing::instrument(skip_all)]
    pub async fn list_posts(
        &self,
        author: Option<UserId>,
        principal: Option<&Principal>,
    ) -> Result<Vec<Post>, BffError> {
        if let Some(author) = author {
            ensure_user_id(author)?;
            let posts = self
                .posts_client
                .list_by_author(author)
                .await
                .map_err(|e| BffError::from_service("posts.list_by_author", e))?;
            return self.hydrator().hydrate_posts(posts).await;
        }

        match principal {
            Some(principal) => self.feed(principal).await,
            None => {
                let posts = self
                    .posts_client
                    .list_latest(None, None, FEED_LIMIT)
                    .await
                    .map_err(|e| BffError::from_service("posts.list_latest", e))?;
                self.hydrator().hydrate_posts(posts).await
            }
        }
    }

    /// タイムライン
    ///
    /// フォロー中のユーザーと自分の投稿を新しい順に取得する。
    #[tracing::instrument(skip_all, fields(user_id = %principal.user_id))]
    pub async fn feed(&self, principal: &Principal) -> Result<Vec<Post>, BffError> {
        let me = principal.user_id;
        ensure_user_id(me)?;

        let mut users = self
            .users_client
            .fetch_by_ids(&[me])
            .await
            .map_err(|e| BffError::from_service("users.fetch_by_ids", e))?;
        let me_user = users.remove(&me).ok_or(BffError::NotFound(resource::USER))?;

        let author_ids = me_user.feed_author_ids();
        let posts = self
            .posts_client
            .list_latest(Some(&author_ids), Some(me), FEED_LIMIT)
            .await
            .map_err(|e| BffError::from_service("posts.list_latest", e))?;

        self.hydrator().hydrate_posts(posts).await
    }

    /// 単一投稿（コメント付き）
    ///
    /// 認証済みの場合は `is_current_user_like` が行為者基準で埋まる。
    #[tracing::instrument(skip_all, fields(%post_id))]
    pub async fn post_by_id(
        &self,
        post_id: PostId,
        principal: Option<&Principal>,
    ) -> Result<Post, BffError> {
        ensure_post_id(post_id)?;

        let post = self
            .posts_client
            .get_by_id(post_id, principal.map(|p| p.user_id))
            .await
            .map_err(|e| BffError::from_service("posts.get_by_id", e))?;

        self.hydrator().hydrate_post(post).await
    }

    /// コメント一覧
    ///
    /// ハイドレーションしない。`user` はゼロ値のまま返す。
    #[tracing::instrument(skip_all, fields(%post_id))]
    pub async fn comments(&self, post_id: PostId) -> Result<Vec<Comment>, BffError> {
        ensure_post_id(post_id)?;

        self.posts_client
            .list_comments(post_id)
            .await
            .map_err(|e| BffError::from_service("posts.list_comments", e))
    }

    pub async fn like(&self, principal: &Principal, post_id: PostId) -> Result<(), BffError> {
        self.apply_like(principal, post_id, LikeType::Like).await
    }

    pub async fn dislike(&self, principal: &Principal, post_id: PostId) -> Result<(), BffError> {
        self.apply_like(principal, post_id, LikeType::Dislike).await
    }

    /// いいね操作を上流へそのまま渡す
    ///
    /// 重複判定は上流の責務。BFF 側では記録しない。
    #[tracing::instrument(skip_all, fields(user_id = %principal.user_id, %post_id, %operation))]
    async fn apply_like(
        &self,
        principal: &Principal,
        post_id: PostId,
        operation: LikeType,
    ) -> Result<(), BffError> {
        ensure_user_id(principal.user_id)?;
        ensure_post_id(post_id)?;

        let applied = self
            .posts_client
            .like(principal.user_id, post_id, operation)
            .await
            .map_err(|e| BffError::from_service("posts.like", e))?;

        if !applied {
            return Err(BffError::LikeUnknown);
        }
        Ok(())
    }
}

pub(super) fn ensure_user_id(id: UserId) -> Result<(), BffError> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(BffError::invalid_argument(format!("不正なユーザー ID: {id}")))
    }
}

fn ensure_post_id(id: PostId) -> Result<(), BffError> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(BffError::invalid_argument(format!("不正な投稿 ID: {id}")))
    }
}
