//! # セッショントークン
//!
//! HMAC 署名付き JWT でセッションを表現する。
//!
//! クレームは `{ sub: ユーザー ID の文字列表現, exp: UNIX 秒 }` のみ。
//! 検証に成功すると [`Principal`] を返し、クレームの型はこのモジュールの外に出さない。
//!
//! ## 検証規則
//!
//! | 条件 | 結果 |
//! |------|------|
//! | 署名不一致・形式不正・HMAC 以外のアルゴリズム | [`AuthError::InvalidToken`] |
//! | `sub` が正の整数として解釈できない | [`AuthError::InvalidPrincipal`] |
//! | `now >= exp` | [`AuthError::Expired`] |

use std::sync::Arc;

use chirp_domain::{
    clock::Clock,
    principal::Principal,
    user::UserId,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::InfraError;

/// セッションの有効期間
pub const SESSION_LIFETIME: Duration = Duration::hours(72);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// 認証エラー
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("トークンが不正です")]
    InvalidToken,

    #[error("トークンのユーザー ID が不正です")]
    InvalidPrincipal,

    #[error("トークンの有効期限が切れています")]
    Expired,
}

/// 発行済みトークン
///
/// Debug 出力ではトークン本体をマスクする。
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    token:      String,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// リクエストのトークンから行為者を確定する
pub trait IdentityVerifier: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Principal, AuthError>;
}

/// ログイン成功時にトークンを発行する
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: UserId) -> Result<SessionToken, InfraError>;
}

/// JWT によるトークンの発行と検証
///
/// 共有シークレットは起動時に一度だけ読み込まれ、以後変更されない。
pub struct JwtTokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation:   Validation,
    clock:        Arc<dyn Clock>,
}

impl JwtTokenManager {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // exp は注入された時計で判定する
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        }
    }

    /// `now` 時点でトークンを検証する
    ///
    /// トークン・時刻・シークレットのみに依存する純粋な判定。
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "トークンの検証に失敗");
                AuthError::InvalidToken
            })?;
        let claims = data.claims;

        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidPrincipal)?;
        if !user_id.is_valid() {
            return Err(AuthError::InvalidPrincipal);
        }

        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;
        let principal = Principal::new(user_id, expires_at);

        if !principal.is_valid_at(now) {
            return Err(AuthError::Expired);
        }
        Ok(principal)
    }
}

impl IdentityVerifier for JwtTokenManager {
    fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        self.verify_at(token, self.clock.now())
    }
}

impl TokenIssuer for JwtTokenManager {
    fn issue(&self, user_id: UserId) -> Result<SessionToken, InfraError> {
        let expires_at = ceil_to_second(self.clock.now() + SESSION_LIFETIME);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;

        Ok(SessionToken { token, expires_at })
    }
}

/// 秒未満を切り上げる
///
/// `exp` は秒単位。発行時刻 + 72 時間より前には失効させない。
fn ceil_to_second(at: DateTime<Utc>) -> DateTime<Utc> {
    let seconds = at.timestamp();
    let seconds = if at.timestamp_subsec_nanos() > 0 {
        seconds + 1
    } else {
        seconds
    };
    DateTime::from_timestamp(seconds, 0).unwrap_or(at)
}
