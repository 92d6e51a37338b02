//! # OpenAPI YAML 生成ツール
//!
//! BFF の Rust 型から OpenAPI 仕様を YAML 形式で標準出力に出力する。
//! 生成後、utoipa が自動登録する未使用コンポーネントスキーマを除去する。
//!
//! ## 使い方
//!
//! ```bash
//! cargo run --bin generate-openapi -p chirp-bff > openapi/openapi.yaml
//! ```

use std::collections::HashSet;

use chirp_bff::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let mut openapi = ApiDoc::openapi();
    remove_unused_schemas(&mut openapi)?;
    print!("{}", openapi.to_yaml()?);
    Ok(())
}

/// どこからも `$ref` されていないコンポーネントスキーマを除去する
///
/// `body = ApiResponse<T>` は `T` を inline 展開するが、utoipa は `T` 単体の
/// スキーマも登録する。そのままだと未使用スキーマが YAML に残る。
fn remove_unused_schemas(openapi: &mut utoipa::openapi::OpenApi) -> anyhow::Result<()> {
    let json = serde_json::to_string(openapi)?;

    // JSON 形式: "$ref":"#/components/schemas/SchemaName"
    let prefix = "#/components/schemas/";
    let used_schemas: HashSet<&str> = json
        .match_indices(prefix)
        .filter_map(|(start, _)| {
            let rest = &json[start + prefix.len()..];
            rest.find('"').map(|end| &rest[..end])
        })
        .collect();

    if let Some(components) = &mut openapi.components {
        components
            .schemas
            .retain(|name, _| used_schemas.contains(name.as_str()));
    }
    Ok(())
}
