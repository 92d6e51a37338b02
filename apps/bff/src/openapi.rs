//! # OpenAPI 仕様定義
//!
//! utoipa を使用して BFF の OpenAPI 仕様を Rust の型から自動生成する。
//! `ApiDoc::openapi()` で OpenAPI ドキュメントを取得できる。

use utoipa::{
    Modify,
    OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    error::SESSION_COOKIE_NAME,
    handler::{auth, health, post, user},
};

#[derive(OpenApi)]
#[openapi(
   info(
      title = "Chirp API",
      version = "0.1.0",
      description = "ソーシャルフィード Chirp の BFF API"
   ),
   paths(
      // health
      health::health_check,
      // auth
      auth::login,
      auth::logout,
      // users
      user::register,
      user::current_user,
      user::list_users,
      user::get_user,
      user::update_user,
      user::follow,
      user::unfollow,
      // posts
      post::list_posts,
      post::create_post,
      post::get_post,
      post::list_comments,
      post::like_post,
      post::dislike_post,
   ),
   components(schemas(
      chirp_shared::ErrorResponse,
   )),
   tags(
      (name = "health", description = "ヘルスチェック"),
      (name = "auth", description = "認証"),
      (name = "users", description = "ユーザー・フォロー"),
      (name = "posts", description = "タイムライン・投稿・いいね"),
   ),
   modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// セキュリティスキーム定義
///
/// `user-jwt` Cookie と `Authorization: Bearer` の 2 通りを登録する。
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
        );
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
