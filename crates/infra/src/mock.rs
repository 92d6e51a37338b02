//! # テスト用モック
//!
//! ユースケーステストで使う軽量な実装。
//! `test-utils` feature を有効にすると他クレートからも利用できる。
//!
//! ```toml
//! [dev-dependencies]
//! chirp-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::Mutex;

use chirp_domain::password::{PasswordHash, PasswordVerifyResult, PlainPassword};

use crate::{InfraError, password::PasswordHasher};

/// `plain$<平文>` を「ハッシュ」とみなすモック
///
/// Argon2 の計算を避けつつ、平文がハッシュを経由したことをテストで確認できる。
/// `verify` の呼び出し回数を記録する（ダミー検証を含む）。
#[derive(Debug, Default)]
pub struct MockPasswordHasher {
    verify_calls: Mutex<usize>,
}

impl MockPasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `password` に対応するモックのハッシュ値
    pub fn hash_of(password: &str) -> PasswordHash {
        PasswordHash::new(format!("plain${password}"))
    }

    pub fn verify_calls(&self) -> usize {
        *self.verify_calls.lock().unwrap()
    }
}

impl PasswordHasher for MockPasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError> {
        Ok(Self::hash_of(password.as_str()))
    }

    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError> {
        *self.verify_calls.lock().unwrap() += 1;

        let Some(stored) = hash.as_str().strip_prefix("plain$") else {
            return Err(InfraError::password_hash("モック形式ではないハッシュ"));
        };
        Ok(PasswordVerifyResult::from(stored == password.as_str()))
    }
}
