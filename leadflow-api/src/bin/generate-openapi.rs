//! OpenAPI Specification Generator Binary
//!
//! Writes the LeadFlow OpenAPI specification to stdout, as JSON by default
//! or as YAML with `--yaml`.
//!
//! Usage:
//!   cargo run -p leadflow-api --bin generate-openapi > openapi.json

use leadflow_api::ApiDoc;

fn main() {
    let yaml = std::env::args().skip(1).any(|arg| arg == "--yaml");

    let rendered = if yaml {
        ApiDoc::to_yaml()
    } else {
        ApiDoc::to_json().map_err(|e| e.to_string())
    };

    match rendered {
        Ok(spec) => println!("{}", spec),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
