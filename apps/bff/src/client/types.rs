//! 上流サービスとの送受信に使う型
//!
//! 受信型はドメイン型へ `From` で変換する。受信時に欠けていたフィールドは
//! ゼロ値で補う。

use chirp_domain::{
    password::PasswordHash,
    post::{Comment, CommentId, LikeType, Post, PostId},
    user::{HashedNewUser, PartialUserUpdate, User, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Users サービス ---

#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub following_ids: Vec<UserId>,
    #[serde(default)]
    pub follower_ids: Vec<UserId>,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        Self {
            id:            dto.id,
            name:          dto.name,
            username:      dto.username,
            email:         dto.email,
            bio:           dto.bio,
            profile_image: dto.profile_image,
            cover_image:   dto.cover_image,
            password_hash: PasswordHash::new(dto.password_hash),
            following_ids: dto.following_ids,
            follower_ids:  dto.follower_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FetchUsersByIdsRequest<'a> {
    pub ids: &'a [UserId],
}

#[derive(Debug, Serialize)]
pub struct CreateUserServiceRequest<'a> {
    pub name:          &'a str,
    pub username:      &'a str,
    pub email:         &'a str,
    pub password_hash: &'a str,
}

impl<'a> From<&'a HashedNewUser> for CreateUserServiceRequest<'a> {
    fn from(user: &'a HashedNewUser) -> Self {
        Self {
            name:          &user.name,
            username:      &user.username,
            email:         &user.email,
            password_hash: user.password_hash.as_str(),
        }
    }
}

/// 部分更新リクエスト
///
/// `Keep` のフィールドはキーごと省略し、上流で「変更なし」と解釈させる。
#[derive(Debug, Serialize)]
pub struct UpdateUserServiceRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name:          Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username:      Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio:           Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image:   Option<&'a str>,
}

impl<'a> From<&'a PartialUserUpdate> for UpdateUserServiceRequest<'a> {
    fn from(update: &'a PartialUserUpdate) -> Self {
        Self {
            name:          update.name.as_set().map(String::as_str),
            username:      update.username.as_set().map(String::as_str),
            bio:           update.bio.as_set().map(String::as_str),
            profile_image: update.profile_image.as_set().map(String::as_str),
            cover_image:   update.cover_image.as_set().map(String::as_str),
        }
    }
}

/// 成否のみを返す操作のレスポンス
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

// --- Posts サービス ---

#[derive(Debug, Clone, Deserialize)]
pub struct CommentDto {
    pub id:         CommentId,
    pub body:       String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id:    UserId,
    pub post_id:    PostId,
}

impl From<CommentDto> for Comment {
    fn from(dto: CommentDto) -> Self {
        Self {
            id:         dto.id,
            body:       dto.body,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            user_id:    dto.user_id,
            post_id:    dto.post_id,
            user:       User::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostDto {
    pub id: PostId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: UserId,
    #[serde(default)]
    pub like_count: i32,
    #[serde(default)]
    pub is_current_user_like: bool,
    #[serde(default)]
    pub comments: Vec<CommentDto>,
}

impl From<PostDto> for Post {
    fn from(dto: PostDto) -> Self {
        Self {
            id: dto.id,
            body: dto.body,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            user_id: dto.user_id,
            like_count: dto.like_count,
            is_current_user_like: dto.is_current_user_like,
            user: User::default(),
            comments: dto.comments.into_iter().map(Comment::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePostServiceRequest<'a> {
    pub user_id: UserId,
    pub body:    &'a str,
}

#[derive(Debug, Serialize)]
pub struct LatestPostsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_ids:     Option<&'a [UserId]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acting_user_id: Option<UserId>,
    pub limit:          u32,
}

#[derive(Debug, Serialize)]
pub struct LikeServiceRequest {
    pub user_id:   UserId,
    pub operation: LikeType,
}
