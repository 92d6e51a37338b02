/// 整数ベースの ID 型を定義する宣言型マクロ
///
/// Users / Posts サービスの ID は 32 bit 整数で、0 は「未設定」を意味する。
/// 以下を一括生成する:
/// - Newtype 構造体（`i32` をラップ、serde では数値そのもの）
/// - `derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, From)`
/// - `new()` / `as_i32()` / `is_zero()` / `is_valid()`
/// - `FromStr`（パス・クエリ・JWT subject からのパース用）
///
/// ```rust
/// use chirp_domain::post::PostId;
///
/// let id: PostId = "42".parse().unwrap();
/// assert_eq!(id.as_i32(), 42);
/// assert!(id.is_valid());
/// assert!(PostId::default().is_zero());
/// ```
macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
            derive_more::Display, derive_more::From,
        )]
        #[serde(transparent)]
        #[display("{_0}")]
        $vis struct $Name(i32);

        impl $Name {
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            pub const fn as_i32(self) -> i32 {
                self.0
            }

            /// 未設定（0）かどうか
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }

            /// 実在しうる ID（正の値）かどうか
            pub const fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl std::str::FromStr for $Name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}
