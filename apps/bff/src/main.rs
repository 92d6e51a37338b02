//! # Chirp BFF サーバー
//!
//! フロントエンド専用の API サーバー。
//!
//! ## 役割
//!
//! BFF はフロントエンドと Users / Posts サービスの間に位置し、
//! 以下の責務を担う:
//!
//! - **認証**: セッショントークン（JWT）の発行と検証
//! - **アグリゲーション**: 投稿と投稿者ユーザーを 1 つのレスポンスにまとめる
//! - **パスワード処理**: 平文は BFF でハッシュ化し、上流へは渡さない
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Browser    │────▶│     BFF      │────▶│Users Service │
//! │              │     │  port: 13000 │     │  port: 14001 │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                             ▼
//!                      ┌──────────────┐
//!                      │Posts Service │
//!                      │  port: 14002 │
//!                      └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `BFF_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `BFF_PORT` | **Yes** | ポート番号 |
//! | `USERS_SERVICE_URL` | **Yes** | Users サービスの URL |
//! | `POSTS_SERVICE_URL` | **Yes** | Posts サービスの URL |
//! | `JWT_SECRET` | **Yes** | セッショントークンの HMAC 鍵 |
//! | `UPSTREAM_TIMEOUT_SECS` | No | 上流呼び出しのタイムアウト秒（デフォルト: 10） |
//! | `COOKIE_SECURE` | No | Cookie に `Secure` を付ける（`true` で有効） |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p chirp-bff
//! ```

mod config;

use std::{net::SocketAddr, sync::Arc};

use chirp_bff::{
    app_builder::{AppDeps, build_app},
    client::{PostsServiceClientImpl, UsersServiceClientImpl},
};
use chirp_domain::clock::SystemClock;
use chirp_infra::{Argon2PasswordHasher, JwtTokenManager};
use chirp_shared::observability::{TracingConfig, init_tracing};
use config::BffConfig;
use tokio::net::TcpListener;

/// BFF サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. クライアント・暗号処理の初期化とルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("bff");
    init_tracing(&tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "bff").entered();

    let config = BffConfig::from_env()?;
    tracing::info!(?config, "BFF サーバーを起動します");

    let http_client = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()?;

    let token_manager = Arc::new(JwtTokenManager::new(
        config.jwt_secret.as_bytes(),
        Arc::new(SystemClock),
    ));

    let app = build_app(AppDeps {
        users_client:      Arc::new(UsersServiceClientImpl::new(
            &config.users_service_url,
            http_client.clone(),
        )),
        posts_client:      Arc::new(PostsServiceClientImpl::new(
            &config.posts_service_url,
            http_client,
        )),
        password_hasher:   Arc::new(Argon2PasswordHasher::new()?),
        identity_verifier: token_manager.clone(),
        token_issuer:      token_manager,
        cookie_secure:     config.cookie_secure,
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("BFF サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
