//! # Chirp インフラ層
//!
//! BFF が「信頼できる不透明な操作」として使う暗号処理を実装する。
//!
//! - [`password`] - Argon2id によるパスワードのハッシュ化と検証
//! - [`token`] - HMAC 署名付き JWT によるセッショントークンの発行と検証
//! - [`error`] - インフラ層エラー定義
//!
//! ```text
//! bff → infra → domain
//! ```

pub mod error;
pub mod password;
pub mod token;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{InfraError, InfraErrorKind};
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use token::{AuthError, IdentityVerifier, JwtTokenManager, SessionToken, TokenIssuer};
