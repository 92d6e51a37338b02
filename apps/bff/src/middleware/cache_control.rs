//! # キャッシュ制御
//!
//! API レスポンスは行為者（Cookie / Authorization）ごとに内容が変わる。
//! 共有キャッシュやブラウザに保存されないよう `Cache-Control: no-store` を付け、
//! `Vary` で資格情報ヘッダーを明示する。

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

pub async fn no_store(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::VARY, HeaderValue::from_static("Cookie, Authorization"));
    response
}
