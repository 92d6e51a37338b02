//! # ログインユースケース
//!
//! メールアドレスでユーザーを取得し、保存済みハッシュと照合してから
//! セッショントークンを発行する。
//!
//! ユーザーが存在しない・パスワード不一致・ハッシュ形式不正はすべて
//! `Unauthorized` に揃え、どれが原因かを応答から区別できないようにする。
//! ユーザーが存在しない場合もダミーの照合を 1 回行い、処理時間を揃える。

use std::sync::Arc;

use chirp_domain::password::PlainPassword;
use chirp_infra::{PasswordHasher, SessionToken, TokenIssuer};

use crate::{
    client::{ServiceError, UsersServiceClient},
    error::BffError,
};

/// ログインユースケース
pub struct AuthUseCaseImpl {
    users_client:    Arc<dyn UsersServiceClient>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_issuer:    Arc<dyn TokenIssuer>,
}

impl AuthUseCaseImpl {
    pub fn new(
        users_client: Arc<dyn UsersServiceClient>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users_client,
            password_hasher,
            token_issuer,
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn login(
        &self,
        email: &str,
        password: &PlainPassword,
    ) -> Result<SessionToken, BffError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(BffError::invalid_argument(
                "メールアドレスとパスワードは必須です",
            ));
        }

        let user = match self.users_client.fetch_by_email(email).await {
            Ok(user) => user,
            Err(ServiceError::NotFound) => {
                self.password_hasher.verify_dummy(password);
                return Err(BffError::Unauthorized);
            }
            Err(e) => return Err(BffError::from_service("users.fetch_by_email", e)),
        };

        match self.password_hasher.verify(password, &user.password_hash) {
            Ok(result) if result.is_match() => {}
            Ok(_) => return Err(BffError::Unauthorized),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "保存済みハッシュを照合できません");
                return Err(BffError::Unauthorized);
            }
        }

        let token = self.token_issuer.issue(user.id)?;
        tracing::info!(user_id = %user.id, "ログイン成功");
        Ok(token)
    }
}
