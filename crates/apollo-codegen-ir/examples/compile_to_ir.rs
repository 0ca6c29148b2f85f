//! This example compiles the operations and fragments of a document and prints the result as JSON
//!
//! ```sh
//! cargo run --example compile_to_ir -- schema.graphql query.graphql
//! ```

use anyhow::anyhow;
use anyhow::Context;
use apollo_codegen_ir::compile_to_ir;
use apollo_compiler::ast::Document;
use apollo_compiler::diagnostic::ToCliReport;
use apollo_compiler::Schema;

#[cfg(not(test))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let (Some(schema_path), Some(document_path)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: compile_to_ir <schema.graphql> <document.graphql>");
    };
    let schema_source = std::fs::read_to_string(&schema_path)
        .with_context(|| format!("failed to read {schema_path}"))?;
    let document_source = std::fs::read_to_string(&document_path)
        .with_context(|| format!("failed to read {document_path}"))?;
    println!(
        "{}",
        compile_sources(&schema_source, &schema_path, &document_source, &document_path)?
    );
    Ok(())
}

fn compile_sources(
    schema_source: &str,
    schema_path: &str,
    document_source: &str,
    document_path: &str,
) -> anyhow::Result<String> {
    let schema = Schema::parse_and_validate(schema_source, schema_path)
        .map_err(|invalid| anyhow!("{}", invalid.errors))?;
    let document = Document::parse(document_source, document_path)
        .map_err(|invalid| anyhow!("{}", invalid.errors))?;
    let compiled = compile_to_ir(&*schema, &document)
        .map_err(|err| anyhow!("{}", err.to_diagnostic(&document.sources)))?;
    Ok(serde_json::to_string_pretty(&compiled)?)
}

#[test]
fn test_compile_sources() {
    let schema = "type Query { me: User } type User { id: ID! name: String }";
    let document = "query Me { me { ...UserName } } fragment UserName on User { name }";
    let json = compile_sources(schema, "schema.graphql", document, "me.graphql").unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["operations"]["Me"]["fragmentsReferenced"],
        serde_json::json!(["UserName"])
    );
    assert_eq!(
        value["operations"]["Me"]["fields"][0]["fields"][0]["responseName"],
        "name"
    );

    let err = compile_sources(schema, "schema.graphql", "query Me { you }", "me.graphql")
        .unwrap_err()
        .to_string();
    assert!(err.contains("cannot query field `you` on type `Query`"));
}
