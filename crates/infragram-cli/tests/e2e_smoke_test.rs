use std::{fs, path::PathBuf};

use tempfile::tempdir;

use infragram_cli::{Args, Command, Outcome, RenderArgs, ValidateArgs, format_report, run};

/// Collects all .toml schemas from a directory
fn collect_schemas(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "off".to_string(),
    }
}

fn render_args(schema: &PathBuf, png: Option<PathBuf>, drawio: Option<PathBuf>) -> Args {
    args(Command::Render(RenderArgs {
        schema: schema.to_string_lossy().to_string(),
        png: png.map(|p| p.to_string_lossy().to_string()),
        drawio: drawio.map(|p| p.to_string_lossy().to_string()),
    }))
}

#[test]
fn e2e_smoke_test_demo_schemas() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let schemas = collect_schemas(demos_dir());
    assert!(!schemas.is_empty(), "No demo schemas found in demos/");

    let mut failed = Vec::new();

    for schema in &schemas {
        let stem = schema.file_stem().unwrap().to_string_lossy().to_string();
        let png = temp_dir.path().join(format!("{stem}.png"));
        let drawio = temp_dir.path().join(format!("{stem}.drawio"));

        match run(&render_args(schema, Some(png.clone()), Some(drawio.clone()))) {
            Ok(Outcome::Rendered(paths)) => {
                assert_eq!(paths, vec![png.clone(), drawio.clone()]);
                let bytes = fs::read(&png).expect("PNG was written");
                assert!(bytes.starts_with(b"\x89PNG"));
            }
            Ok(other) => panic!("Unexpected outcome {other:?}"),
            Err(e) => {
                failed.push((schema.clone(), e));
                continue;
            }
        }

        let check = args(Command::Validate(ValidateArgs {
            document: drawio.to_string_lossy().to_string(),
            expect: Vec::new(),
        }));
        match run(&check) {
            Ok(Outcome::Validated(report)) => {
                assert!(report.valid(), "{}", format_report(&report));
            }
            Ok(other) => panic!("Unexpected outcome {other:?}"),
            Err(e) => failed.push((drawio.clone(), e)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemo schemas that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo schema(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_validate_with_expected_kinds() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let schema = demos_dir().join("checkout.toml");
    let drawio = temp_dir.path().join("checkout.drawio");

    run(&render_args(&schema, None, Some(drawio.clone()))).expect("Failed to render");
    assert!(!temp_dir.path().join("checkout.png").exists());

    let check = |expect: &[&str]| {
        let outcome = run(&args(Command::Validate(ValidateArgs {
            document: drawio.to_string_lossy().to_string(),
            expect: expect.iter().map(|s| s.to_string()).collect(),
        })))
        .expect("Failed to validate");
        match outcome {
            Outcome::Validated(report) => report,
            Outcome::Rendered(_) => panic!("Expected a validation report"),
        }
    };

    let complete = check(&["database", "cache", "service"]);
    assert_eq!(complete.completeness().unwrap().percentage(), 100.0);

    let partial = check(&["database", "firewall"]);
    let completeness = partial.completeness().unwrap();
    assert!(partial.valid());
    assert_eq!(completeness.percentage(), 50.0);
    assert_eq!(completeness.missing(), &["mxgraph.aws4.waf".to_string()]);
    assert!(format_report(&partial).contains("missing: mxgraph.aws4.waf"));
}

#[test]
fn e2e_invalid_document_is_reported_not_raised() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let drawio = temp_dir.path().join("broken.drawio");
    fs::write(&drawio, "<mxfile><diagram>").unwrap();

    let outcome = run(&args(Command::Validate(ValidateArgs {
        document: drawio.to_string_lossy().to_string(),
        expect: Vec::new(),
    })))
    .expect("Validation never fails on bad input");

    match outcome {
        Outcome::Validated(report) => {
            assert!(!report.valid());
            assert!(format_report(&report).starts_with("INVALID"));
        }
        Outcome::Rendered(_) => panic!("Expected a validation report"),
    }
}

#[test]
fn e2e_schema_parse_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let schema = temp_dir.path().join("bad.toml");
    fs::write(&schema, "title = \"unterminated\n").unwrap();

    let result = run(&render_args(&schema, None, None));
    assert!(matches!(result, Err(infragram::InfragramError::Parse { .. })));
}

#[test]
fn e2e_default_output_paths_follow_schema() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let schema = temp_dir.path().join("tiny.toml");
    fs::write(
        &schema,
        r#"
        title = "Tiny"

        [outputs]
        raster = false

        [[components]]
        id = "web"
        kind = "server"
        "#,
    )
    .unwrap();

    let outcome = run(&render_args(&schema, None, None)).expect("Failed to render");
    match outcome {
        Outcome::Rendered(paths) => {
            assert_eq!(paths, vec![temp_dir.path().join("tiny.drawio")]);
        }
        Outcome::Validated(_) => panic!("Expected rendered paths"),
    }
}
