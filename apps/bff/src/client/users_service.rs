//! # Users サービスクライアント
//!
//! ## エンドポイント
//!
//! - `POST /internal/users/by-ids` - ID 一括取得
//! - `GET /internal/users/by-email` - メールアドレスで取得（パスワードハッシュを含む）
//! - `POST /internal/users` - 作成
//! - `PATCH /internal/users/{id}` - 部分更新
//! - `POST /internal/users/{id}/following/{target}` - フォロー
//! - `DELETE /internal/users/{id}/following/{target}` - フォロー解除
//! - `GET /internal/users/new` - 新しいユーザー一覧

use std::collections::HashMap;

use async_trait::async_trait;
use chirp_domain::user::{HashedNewUser, PartialUserUpdate, User, UserId};

use super::{
    error::ServiceError,
    response::handle_response,
    types::{
        CreateUserServiceRequest,
        FetchUsersByIdsRequest,
        OkResponse,
        UpdateUserServiceRequest,
        UserDto,
    },
};
use crate::middleware::request_id::inject_request_id;

/// Users サービスクライアントトレイト
///
/// テスト時にスタブを差し込めるようトレイトで定義する。
#[async_trait]
pub trait UsersServiceClient: Send + Sync {
    /// ID の集合からユーザーを一括取得する
    ///
    /// 存在しない ID は結果のマップに含まれない（エラーにはしない）。
    async fn fetch_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, ServiceError>;

    /// メールアドレスでユーザーを取得する
    ///
    /// 見つからなければ `ServiceError::NotFound`。
    async fn fetch_by_email(&self, email: &str) -> Result<User, ServiceError>;

    async fn create(&self, user: &HashedNewUser) -> Result<User, ServiceError>;

    async fn update_partial(&self, update: &PartialUserUpdate) -> Result<User, ServiceError>;

    /// `user_id` が `target` をフォローする
    ///
    /// 上流が操作を適用しなかった場合は `Ok(false)`。
    async fn follow(&self, user_id: UserId, target: UserId) -> Result<bool, ServiceError>;

    async fn unfollow(&self, user_id: UserId, target: UserId) -> Result<bool, ServiceError>;

    /// 新しい順にユーザーを取得する
    async fn list_new(&self, limit: u32) -> Result<Vec<User>, ServiceError>;
}

#[derive(Clone)]
pub struct UsersServiceClientImpl {
    base_url: String,
    client:   reqwest::Client,
}

impl UsersServiceClientImpl {
    /// - `base_url`: Users サービスのベース URL（例: `http://localhost:14001`）
    /// - `client`: タイムアウト等を設定済みの共有クライアント
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl UsersServiceClient for UsersServiceClientImpl {
    async fn fetch_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, ServiceError> {
        let url = format!("{}/internal/users/by-ids", self.base_url);

        let response = inject_request_id(self.client.post(&url))
            .json(&FetchUsersByIdsRequest { ids })
            .send()
            .await?;
        let users: Vec<UserDto> = handle_response(response).await?;

        Ok(users
            .into_iter()
            .map(|dto| (dto.id, User::from(dto)))
            .collect())
    }

    async fn fetch_by_email(&self, email: &str) -> Result<User, ServiceError> {
        let url = format!(
            "{}/internal/users/by-email?email={}",
            self.base_url,
            urlencoding::encode(email)
        );

        let response = inject_request_id(self.client.get(&url)).send().await?;
        let user: UserDto = handle_response(response).await?;
        Ok(user.into())
    }

    async fn create(&self, user: &HashedNewUser) -> Result<User, ServiceError> {
        let url = format!("{}/internal/users", self.base_url);

        let response = inject_request_id(self.client.post(&url))
            .json(&CreateUserServiceRequest::from(user))
            .send()
            .await?;
        let user: UserDto = handle_response(response).await?;
        Ok(user.into())
    }

    async fn update_partial(&self, update: &PartialUserUpdate) -> Result<User, ServiceError> {
        let url = format!("{}/internal/users/{}", self.base_url, update.user_id);

        let response = inject_request_id(self.client.patch(&url))
            .json(&UpdateUserServiceRequest::from(update))
            .send()
            .await?;
        let user: UserDto = handle_response(response).await?;
        Ok(user.into())
    }

    async fn follow(&self, user_id: UserId, target: UserId) -> Result<bool, ServiceError> {
        let url = format!(
            "{}/internal/users/{}/following/{}",
            self.base_url, user_id, target
        );

        let response = inject_request_id(self.client.post(&url)).send().await?;
        let result: OkResponse = handle_response(response).await?;
        Ok(result.ok)
    }

    async fn unfollow(&self, user_id: UserId, target: UserId) -> Result<bool, ServiceError> {
        let url = format!(
            "{}/internal/users/{}/following/{}",
            self.base_url, user_id, target
        );

        let response = inject_request_id(self.client.delete(&url)).send().await?;
        let result: OkResponse = handle_response(response).await?;
        Ok(result.ok)
    }

    async fn list_new(&self, limit: u32) -> Result<Vec<User>, ServiceError> {
        let url = format!("{}/internal/users/new?limit={}", self.base_url, limit);

        let response = inject_request_id(self.client.get(&url)).send().await?;
        let users: Vec<UserDto> = handle_response(response).await?;
        Ok(users.into_iter().map(User::from).collect())
    }
}
