//! ユーザーユースケース
//!
//! 登録、プロフィール取得・更新、フォロー / フォロー解除。

use std::sync::Arc;

use chirp_domain::{
    principal::Principal,
    user::{NewUser, PartialUserUpdate, User, UserId},
};
use chirp_infra::PasswordHasher;

use super::{NEW_USERS_LIMIT, post::ensure_user_id};
use crate::{
    client::UsersServiceClient,
    error::{BffError, resource},
};

/// ユーザーユースケース
pub struct UserUseCaseImpl {
    users_client:    Arc<dyn UsersServiceClient>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserUseCaseImpl {
    pub fn new(
        users_client: Arc<dyn UsersServiceClient>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users_client,
            password_hasher,
        }
    }

    /// ユーザーを登録する
    ///
    /// 平文パスワードはここでハッシュ化し、Users サービスにはハッシュだけを送る。
    #[tracing::instrument(skip_all)]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, BffError> {
        let hash = self.password_hasher.hash(&new_user.password)?;
        let hashed = new_user.into_hashed(hash);

        self.users_client
            .create(&hashed)
            .await
            .map_err(|e| BffError::from_service("users.create", e))
    }

    /// プロフィールを部分更新する
    ///
    /// 更新対象は常に認証済みユーザー本人。すべて `Keep` の更新は拒否する。
    #[tracing::instrument(skip_all, fields(user_id = %principal.user_id))]
    pub async fn update_user(
        &self,
        principal: &Principal,
        update: PartialUserUpdate,
    ) -> Result<User, BffError> {
        ensure_user_id(principal.user_id)?;
        if update.is_empty() {
            return Err(BffError::invalid_argument("更新するフィールドがありません"));
        }
        let update = update.for_user(principal.user_id);

        self.users_client
            .update_partial(&update)
            .await
            .map_err(|e| BffError::from_service("users.update_partial", e))
    }

    #[tracing::instrument(skip_all, fields(%user_id))]
    pub async fn user_by_id(&self, user_id: UserId) -> Result<User, BffError> {
        ensure_user_id(user_id)?;

        let mut users = self
            .users_client
            .fetch_by_ids(&[user_id])
            .await
            .map_err(|e| BffError::from_service("users.fetch_by_ids", e))?;
        users.remove(&user_id).ok_or(BffError::NotFound(resource::USER))
    }

    pub async fn current_user(&self, principal: &Principal) -> Result<User, BffError> {
        self.user_by_id(principal.user_id).await
    }

    #[tracing::instrument(skip_all)]
    pub async fn new_users(&self) -> Result<Vec<User>, BffError> {
        self.users_client
            .list_new(NEW_USERS_LIMIT)
            .await
            .map_err(|e| BffError::from_service("users.list_new", e))
    }

    /// `target` をフォローし、更新後の自分を返す
    pub async fn follow(&self, principal: &Principal, target: UserId) -> Result<User, BffError> {
        self.change_follow(principal, target, FollowOperation::Follow)
            .await
    }

    /// `target` のフォローを解除し、更新後の自分を返す
    pub async fn unfollow(&self, principal: &Principal, target: UserId) -> Result<User, BffError> {
        self.change_follow(principal, target, FollowOperation::Unfollow)
            .await
    }

    #[tracing::instrument(skip_all, fields(user_id = %principal.user_id, %target, ?operation))]
    async fn change_follow(
        &self,
        principal: &Principal,
        target: UserId,
        operation: FollowOperation,
    ) -> Result<User, BffError> {
        let me = principal.user_id;
        ensure_user_id(me)?;
        ensure_user_id(target)?;
        if me == target {
            return Err(BffError::invalid_argument("自分自身はフォローできません"));
        }

        let applied = match operation {
            FollowOperation::Follow => self
                .users_client
                .follow(me, target)
                .await
                .map_err(|e| BffError::from_service("users.follow", e))?,
            FollowOperation::Unfollow => self
                .users_client
                .unfollow(me, target)
                .await
                .map_err(|e| BffError::from_service("users.unfollow", e))?,
        };
        if !applied {
            return Err(BffError::FollowUnknown);
        }

        // 操作自体は成功しているので、再取得で自分が見つからなくてもゼロ値で返す
        let mut users = self
            .users_client
            .fetch_by_ids(&[me])
            .await
            .map_err(|e| BffError::from_service("users.fetch_by_ids", e))?;
        Ok(users.remove(&me).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy)]
enum FollowOperation {
    Follow,
    Unfollow,
}
