//! # パスワード
//!
//! | 型 | 用途 |
//! |---|------|
//! | [`PlainPassword`] | 登録・ログイン時の入力値 |
//! | [`PasswordHash`] | Users サービスに保存されるハッシュ値 |
//! | [`PasswordVerifyResult`] | 検証の成否 |
//!
//! 平文は BFF の外に出さない。Users サービスへは必ずハッシュだけを渡す。

/// 平文パスワード
///
/// Debug 出力では値をマスクする。
#[derive(Clone)]
pub struct PlainPassword(String);

impl std::fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PlainPassword").field(&"[REDACTED]").finish()
    }
}

impl PlainPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// パスワードハッシュ（PHC 文字列）
///
/// 空文字列はハッシュ未取得を表す（ゼロ値のユーザーなど）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// パスワード検証結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerifyResult {
    Match,
    Mismatch,
}

impl PasswordVerifyResult {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

impl From<bool> for PasswordVerifyResult {
    fn from(matched: bool) -> Self {
        if matched { Self::Match } else { Self::Mismatch }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_平文パスワードのdebug出力はマスクされる() {
        let debug = format!("{:?}", PlainPassword::new("hunter2"));

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_デフォルトのパスワードハッシュは空() {
        assert!(PasswordHash::default().is_empty());
        assert!(!PasswordHash::new("$argon2id$v=19$...").is_empty());
    }

    #[rstest]
    #[case(true, PasswordVerifyResult::Match)]
    #[case(false, PasswordVerifyResult::Mismatch)]
    fn test_boolからの変換(#[case] input: bool, #[case] expected: PasswordVerifyResult) {
        let result = PasswordVerifyResult::from(input);

        assert_eq!(result, expected);
        assert_eq!(result.is_match(), input);
    }
}
