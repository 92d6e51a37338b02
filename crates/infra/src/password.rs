//! # パスワードハッシュ
//!
//! Argon2id によるハッシュ化と検証。
//! 平文は登録時にここでハッシュ化され、Users サービスにはハッシュだけが渡る。

use argon2::{
    Argon2,
    Params,
    PasswordHasher as _,
    PasswordVerifier as _,
    password_hash::{PasswordHash as Argon2PasswordHash, SaltString, rand_core::OsRng},
};
use chirp_domain::password::{PasswordHash, PasswordVerifyResult, PlainPassword};

use crate::InfraError;

/// ユーザーが存在しないときの検証に使うハッシュ
///
/// 実ユーザーと同じパラメータで検証させ、応答時間からユーザーの有無を推測されないようにする。
const DUMMY_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$olntqw+EoVpwH4B1vUAI0A$5yCA1izLODgz8nQOInDGwbuQB/AS0sIQDwpmIilve5M";

pub trait PasswordHasher: Send + Sync {
    /// ランダムな salt で平文をハッシュ化する
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError>;

    /// 平文と保存済みハッシュを照合する
    ///
    /// # Errors
    ///
    /// 保存済みハッシュが PHC 形式として解析できない場合
    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError>;

    /// 結果を捨てる検証を 1 回行う
    fn verify_dummy(&self, password: &PlainPassword) {
        let _ = self.verify(password, &PasswordHash::new(DUMMY_HASH));
    }
}

/// Argon2id 実装
///
/// パラメータ（RFC 9106 / OWASP 推奨）:
/// - Memory: 64 MB
/// - Iterations: 1
/// - Parallelism: 1
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Result<Self, InfraError> {
        let params = Params::new(65536, 1, 1, None)
            .map_err(|e| InfraError::password_hash(format!("Argon2 パラメータが不正: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_str().as_bytes(), &salt)
            .map_err(|e| InfraError::password_hash(format!("ハッシュ化に失敗: {e}")))?;

        Ok(PasswordHash::new(hash.to_string()))
    }

    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError> {
        let parsed = Argon2PasswordHash::new(hash.as_str())
            .map_err(|e| InfraError::password_hash(format!("不正なハッシュ形式: {e}")))?;

        let matched = self
            .argon2
            .verify_password(password.as_str().as_bytes(), &parsed)
            .is_ok();

        Ok(PasswordVerifyResult::from(matched))
    }
}
