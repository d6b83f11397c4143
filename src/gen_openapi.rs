use std::fs;

use anyhow::Context;
use newsdesk::api::ApiDoc;
use utoipa::OpenApi;

fn gen_my_openapi() -> anyhow::Result<String> {
    ApiDoc::openapi()
        .to_pretty_json()
        .context("Cannot serialize OpenAPI document")
}

fn main() -> anyhow::Result<()> {
    let doc = gen_my_openapi()?;
    fs::write("./auto-openapi.json", doc).context("Cannot write ./auto-openapi.json")
}
