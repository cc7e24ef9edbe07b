//! Tests for the `specgen` commands, run in-process against temp directories.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WIDGETS: &str = r#"
openapi: 3.0.3
info: { title: Widgets, version: 1.0.0 }
paths:
  /widgets/{widget_id}:
    get:
      operationId: getWidget
      security:
        - api_key: [read]
      parameters:
        - { name: widget_id, in: path, required: true, schema: { type: string } }
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema: { $ref: '#/components/schemas/widget' }
components:
  schemas:
    widget:
      type: object
      properties:
        id: { type: string }
"#;

const GADGETS: &str = r#"
paths:
  /gadgets:
    get:
      operationId: listGadgets
      responses:
        '200': { description: OK }
"#;

const TEMPLATE: &str = "package {{ package_name }}\n\
{% for r in routes %}{{ r.method }} {{ r.path }} {{ r.handler }}\n{% endfor %}";

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

fn run(args: &[&str]) -> i32 {
    let mut argv = vec!["specgen".to_string()];
    argv.extend(args.iter().map(|s| (*s).to_string()));
    specgen_cli::run(argv)
}

#[test]
fn test_merge_writes_yaml() {
    let dir = TempDir::new().unwrap();
    let widgets = write(dir.path(), "widgets.yaml", WIDGETS);
    let gadgets = write(dir.path(), "gadgets.yaml", GADGETS);
    let out = dir.path().join("merged.yaml");

    assert_eq!(run(&["merge", &widgets, &gadgets, "-o", out.to_str().unwrap()]), 0);

    let merged: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert!(merged["paths"]["/gadgets"].is_mapping());
    assert!(merged["paths"]["/widgets/{widget_id}"].is_mapping());
    assert_eq!(merged["openapi"].as_str(), Some("3.0.3"));
}

#[test]
fn test_merge_conflict_fails() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.yaml", GADGETS);
    let b = write(dir.path(), "b.yaml", GADGETS);
    let out = dir.path().join("merged.yaml");

    assert_eq!(run(&["merge", &a, &b, "-o", out.to_str().unwrap()]), 1);
    assert!(!out.exists());
}

#[test]
fn test_compile_writes_ir() {
    let dir = TempDir::new().unwrap();
    let widgets = write(dir.path(), "widgets.yaml", WIDGETS);
    let out = dir.path().join("ir.json");

    let code = run(&[
        "compile",
        &widgets,
        "--package",
        "widgetsapi",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);

    let ir: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(ir["package_name"], "widgetsapi");
    assert_eq!(ir["handlers"][0]["name"], "GetWidget");
    assert_eq!(ir["security"][0]["name"], "api_key");
    assert_eq!(ir["routes"][0]["permutation"], 0);
}

#[test]
fn test_compile_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let widgets = write(dir.path(), "widgets.yaml", WIDGETS);
    let config = write(
        dir.path(),
        "specgen.toml",
        "package_name = \"configured\"\nmodels_package = \"example.com/models\"\n",
    );
    let out = dir.path().join("ir.json");

    let code = run(&["compile", &widgets, "--config", &config, "-o", out.to_str().unwrap()]);
    assert_eq!(code, 0);

    let ir: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(ir["package_name"], "configured");
    assert_eq!(ir["models_package"], "example.com/models");
}

#[test]
fn test_render_template() {
    let dir = TempDir::new().unwrap();
    let widgets = write(dir.path(), "widgets.yaml", WIDGETS);
    let gadgets = write(dir.path(), "gadgets.yaml", GADGETS);
    let template = write(dir.path(), "routes.tera", TEMPLATE);
    let out = dir.path().join("routes.txt");

    let code = run(&[
        "render",
        &template,
        out.to_str().unwrap(),
        &widgets,
        &gadgets,
        "--package",
        "server",
    ]);
    assert_eq!(code, 0);

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "package server\nGET /gadgets ListGadgets\nGET /widgets/{widget_id} GetWidget\n"
    );
}

#[test]
fn test_render_without_overwrite_writes_new_file() {
    let dir = TempDir::new().unwrap();
    let widgets = write(dir.path(), "widgets.yaml", WIDGETS);
    let template = write(dir.path(), "routes.tera", TEMPLATE);
    let out = write(dir.path(), "routes.txt", "hand edited\n");

    let code = run(&["render", &template, &out, &widgets, "--overwrite=false"]);
    assert_eq!(code, 0);

    assert_eq!(fs::read_to_string(&out).unwrap(), "hand edited\n");
    let new_file = dir.path().join("routes.txt.new");
    assert!(fs::read_to_string(new_file).unwrap().starts_with("package api\n"));
}

#[test]
fn test_compile_error_exit_code() {
    let dir = TempDir::new().unwrap();
    let broken = write(
        dir.path(),
        "broken.yaml",
        "paths: {}\ncomponents: { schemas: { name: { type: string } } }\n",
    );
    assert_eq!(run(&["compile", &broken]), 1);
}
