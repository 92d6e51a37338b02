//! # Posts サービスクライアント
//!
//! ## エンドポイント
//!
//! - `POST /internal/posts` - 投稿作成
//! - `GET /internal/posts?user_id=` - 投稿者で絞り込み
//! - `POST /internal/posts/latest` - 最新投稿（投稿者集合・行為者・件数を指定）
//! - `GET /internal/posts/{id}?acting_user_id=` - 単一投稿（コメント付き）
//! - `GET /internal/posts/{id}/comments` - コメント一覧
//! - `POST /internal/posts/{id}/likes` - いいね / いいね取り消し

use async_trait::async_trait;
use chirp_domain::{
    post::{Comment, LikeType, Post, PostId},
    user::UserId,
};

use super::{
    error::ServiceError,
    response::handle_response,
    types::{
        CommentDto,
        CreatePostServiceRequest,
        LatestPostsRequest,
        LikeServiceRequest,
        OkResponse,
        PostDto,
    },
};
use crate::middleware::request_id::inject_request_id;

/// Posts サービスクライアントトレイト
///
/// 返す投稿・コメントの `user` はゼロ値のまま。埋めるのは Hydrator の役目。
#[async_trait]
pub trait PostsServiceClient: Send + Sync {
    async fn create(&self, user_id: UserId, body: &str) -> Result<Post, ServiceError>;

    async fn list_by_author(&self, user_id: UserId) -> Result<Vec<Post>, ServiceError>;

    /// 新しい順に最大 `limit` 件
    ///
    /// - `author_ids`: `None` なら投稿者で絞り込まない
    /// - `acting_user_id`: 指定すると `is_current_user_like` が埋まる
    async fn list_latest(
        &self,
        author_ids: Option<&[UserId]>,
        acting_user_id: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<Post>, ServiceError>;

    async fn get_by_id(
        &self,
        post_id: PostId,
        acting_user_id: Option<UserId>,
    ) -> Result<Post, ServiceError>;

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, ServiceError>;

    /// いいね操作を適用する
    ///
    /// 上流が操作を適用しなかった場合は `Ok(false)`。
    async fn like(
        &self,
        user_id: UserId,
        post_id: PostId,
        operation: LikeType,
    ) -> Result<bool, ServiceError>;
}

#[derive(Clone)]
pub struct PostsServiceClientImpl {
    base_url: String,
    client:   reqwest::Client,
}

impl PostsServiceClientImpl {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

fn into_posts(dtos: Vec<PostDto>) -> Vec<Post> {
    dtos.into_iter().map(Post::from).collect()
}

#[async_trait]
impl PostsServiceClient for PostsServiceClientImpl {
    async fn create(&self, user_id: UserId, body: &str) -> Result<Post, ServiceError> {
        let url = format!("{}/internal/posts", self.base_url);

        let response = inject_request_id(self.client.post(&url))
            .json(&CreatePostServiceRequest { user_id, body })
            .send()
            .await?;
        let post: PostDto = handle_response(response).await?;
        Ok(post.into())
    }

    async fn list_by_author(&self, user_id: UserId) -> Result<Vec<Post>, ServiceError> {
        let url = format!("{}/internal/posts?user_id={}", self.base_url, user_id);

        let response = inject_request_id(self.client.get(&url)).send().await?;
        let posts: Vec<PostDto> = handle_response(response).await?;
        Ok(into_posts(posts))
    }

    async fn list_latest(
        &self,
        author_ids: Option<&[UserId]>,
        acting_user_id: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<Post>, ServiceError> {
        let url = format!("{}/internal/posts/latest", self.base_url);

        let response = inject_request_id(self.client.post(&url))
            .json(&LatestPostsRequest {
                author_ids,
                acting_user_id,
                limit,
            })
            .send()
            .await?;
        let posts: Vec<PostDto> = handle_response(response).await?;
        Ok(into_posts(posts))
    }

    async fn get_by_id(
        &self,
        post_id: PostId,
        acting_user_id: Option<UserId>,
    ) -> Result<Post, ServiceError> {
        let mut url = format!("{}/internal/posts/{}", self.base_url, post_id);
        if let Some(acting) = acting_user_id {
            url.push_str(&format!("?acting_user_id={acting}"));
        }

        let response = inject_request_id(self.client.get(&url)).send().await?;
        let post: PostDto = handle_response(response).await?;
        Ok(post.into())
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, ServiceError> {
        let url = format!("{}/internal/posts/{}/comments", self.base_url, post_id);

        let response = inject_request_id(self.client.get(&url)).send().await?;
        let comments: Vec<CommentDto> = handle_response(response).await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    async fn like(
        &self,
        user_id: UserId,
        post_id: PostId,
        operation: LikeType,
    ) -> Result<bool, ServiceError> {
        let url = format!("{}/internal/posts/{}/likes", self.base_url, post_id);

        let response = inject_request_id(self.client.post(&url))
            .json(&LikeServiceRequest { user_id, operation })
            .send()
            .await?;
        let result: OkResponse = handle_response(response).await?;
        Ok(result.ok)
    }
}
