#![deny(missing_docs)]

//! # Demo Command
//!
//! Registers a small resource API and writes its OpenAPI document.
//!
//! 1. **Describe**: Sample claims, path, query, body and payload types.
//! 2. **Register**: `POST /api/endpoint/:id` and `GET /api/endpoint`.
//! 3. **Write**: JSON to stdout, or to `--output` (YAML for `.yaml`/`.yml`).

use apiculi_core::{
    ApiDoc, AppResult, CollectionItemData, Describe, Endpoint, Field, SingleItemData, WalkResult,
    Walker,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the demo command.
#[derive(clap::Args, Debug, Clone)]
pub struct DemoArgs {
    /// Document title.
    #[clap(long, env = "APICULI_TITLE", default_value = "Apiculi Demo")]
    pub title: String,

    /// Document version.
    #[clap(long, env = "APICULI_API_VERSION", default_value = "v1.0.0")]
    pub api_version: String,

    /// Server URLs, repeatable or comma separated.
    #[clap(long, env = "APICULI_SERVER", value_delimiter = ',')]
    pub server: Vec<String>,

    /// Output file; stdout when omitted.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

struct Claims;

impl Describe for Claims {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<String>(Field::new("sub").description("authenticated user"));
        })
    }
}

struct ResourcePath;

impl Describe for ResourcePath {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<u64>(Field::new("id").description("resource identifier").example("7"));
        })
    }
}

struct ListQuery;

impl Describe for ListQuery {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<Option<u32>>(Field::new("page").description("page to fetch"))
                .field::<Option<u32>>(Field::new("PerPage").rename("perPage"))
                .field::<Option<Vec<String>>>(
                    Field::new("tags").description("comma separated tag filter"),
                );
        })
    }
}

struct NewResource;

impl Describe for NewResource {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<String>(Field::new("name").example("sample"))
                .field::<Vec<String>>("tags")
                .field::<Option<String>>(Field::new("note").description("free text"));
        })
    }
}

struct Resource;

impl Describe for Resource {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<u64>("id")
                .field::<String>("name")
                .field::<Vec<String>>("tags")
                .field::<Option<String>>("note");
        })
    }
}

/// Builds the demo document.
pub fn build(args: &DemoArgs) -> AppResult<ApiDoc> {
    let mut doc = ApiDoc::new(&args.title, &args.api_version);
    doc.describe("Sample resources documented from their Rust types.")
        .add_jwt_bearer_auth("bearerAuth");
    for server in &args.server {
        doc.add_server(server, "");
    }

    let resources = doc.route_group("resources", &["Sample", "resources"])?;
    doc.register::<Claims, ResourcePath, (), NewResource, SingleItemData<Resource>>(
        &Endpoint::post("/api/endpoint/:id"),
        resources.route("Create one resource", "Stores a resource under `id`."),
    )?
    .register::<(), (), ListQuery, (), CollectionItemData<Resource>>(
        &Endpoint::get("/api/endpoint"),
        resources.route("List resources", "Pages through every resource."),
    )?;

    Ok(doc)
}

/// Executes the demo command.
pub fn execute(args: &DemoArgs) -> AppResult<()> {
    let doc = build(args)?;

    match &args.output {
        Some(path) => {
            let rendered = if is_yaml(path) {
                doc.to_yaml()?
            } else {
                doc.to_json()?
            };
            fs::write(path, rendered)?;
            info!(path = %path.display(), paths = doc.document().paths.len(), "demo.written");
        }
        None => println!("{}", doc.to_json()?),
    }
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}
