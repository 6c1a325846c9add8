//! Generates the feature store's OpenAPI specification as JSON to stdout.
//!
//! Usage: cargo run -p featurestore-api --bin generate-openapi --features openapi

use featurestore_api::openapi::ApiDoc;

fn main() {
    match ApiDoc::to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to serialize OpenAPI spec: {e}");
            std::process::exit(1);
        }
    }
}
