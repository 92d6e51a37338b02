//! # ユーザー
//!
//! | 型 | 用途 |
//! |---|------|
//! | [`UserId`] | ユーザー ID（0 は未設定） |
//! | [`User`] | Users サービスが返すユーザー |
//! | [`NewUser`] | 登録入力（平文パスワードを含む） |
//! | [`HashedNewUser`] | Users サービスへ送る登録内容 |
//! | [`PartialUserUpdate`] / [`FieldUpdate`] | プロフィールの部分更新 |
//!
//! `User::default()` は「ゼロ値のユーザー」で、参照先ユーザーが見つからない
//! 投稿を組み立てるときの埋め草として使う。

use itertools::Itertools;

use crate::{
    DomainError,
    password::{PasswordHash, PlainPassword},
};

define_int_id! {
    /// ユーザー ID
    pub struct UserId;
}

/// ユーザー
///
/// `password_hash` はログイン検証のためだけに保持し、外部へは出さない。
/// 出力用の DTO には対応するフィールドが存在しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id:            UserId,
    pub name:          String,
    pub username:      String,
    pub email:         String,
    pub bio:           String,
    pub profile_image: String,
    pub cover_image:   String,
    pub password_hash: PasswordHash,
    pub following_ids: Vec<UserId>,
    pub follower_ids:  Vec<UserId>,
}

impl User {
    pub fn followers_count(&self) -> usize {
        self.follower_ids.len()
    }

    /// タイムラインに含める投稿者の集合
    ///
    /// フォロー中のユーザーと自分自身。重複は除く。
    pub fn feed_author_ids(&self) -> Vec<UserId> {
        self.following_ids
            .iter()
            .copied()
            .chain(std::iter::once(self.id))
            .unique()
            .collect()
    }
}

/// 登録入力
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name:     String,
    pub username: String,
    pub email:    String,
    pub password: PlainPassword,
}

impl NewUser {
    /// 登録入力を検証して作成する
    ///
    /// すべてのフィールドが必須。
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        password: PlainPassword,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let username = username.into();
        let email = email.into();

        if name.trim().is_empty() {
            return Err(DomainError::required("name"));
        }
        if username.trim().is_empty() {
            return Err(DomainError::required("username"));
        }
        if email.trim().is_empty() {
            return Err(DomainError::required("email"));
        }
        if password.is_empty() {
            return Err(DomainError::required("password"));
        }

        Ok(Self {
            name,
            username,
            email,
            password,
        })
    }

    /// 平文パスワードをハッシュで置き換える
    pub fn into_hashed(self, password_hash: PasswordHash) -> HashedNewUser {
        HashedNewUser {
            name: self.name,
            username: self.username,
            email: self.email,
            password_hash,
        }
    }
}

/// ハッシュ済みの登録内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedNewUser {
    pub name:          String,
    pub username:      String,
    pub email:         String,
    pub password_hash: PasswordHash,
}

/// 部分更新のフィールド
///
/// `Keep` は「変更しない」、`Set` は「この値で上書きする」。
/// 空文字列で上書きすることと、触らないことを区別できる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Keep => None,
            Self::Set(value) => Some(value),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Keep, Self::Set)
    }
}

/// プロフィールの部分更新
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialUserUpdate {
    pub user_id:       UserId,
    pub name:          FieldUpdate<String>,
    pub username:      FieldUpdate<String>,
    pub bio:           FieldUpdate<String>,
    pub profile_image: FieldUpdate<String>,
    pub cover_image:   FieldUpdate<String>,
}

impl PartialUserUpdate {
    /// 更新対象を `user_id` に差し替える
    ///
    /// 呼び出し元が何を指定していても、更新できるのは認証済みユーザー本人のみ。
    pub fn for_user(self, user_id: UserId) -> Self {
        Self { user_id, ..self }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_keep()
            && self.username.is_keep()
            && self.bio.is_keep()
            && self.profile_image.is_keep()
            && self.cover_image.is_keep()
    }
}
