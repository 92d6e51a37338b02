//! # Principal（認証済みの行為者）
//!
//! セッショントークンの検証に成功したときだけ作られる。
//! クレームそのものはインフラ層の外に出さず、以降の処理はこの型だけを見る。

use chrono::{DateTime, Utc};

use crate::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id:    UserId,
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    pub fn new(user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            expires_at,
        }
    }

    /// `now` 時点で有効か
    ///
    /// ユーザー ID が正で、かつ `now` が有効期限より前であること。
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.user_id.is_valid() && now < self.expires_at
    }
}
