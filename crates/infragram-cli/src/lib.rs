//! CLI logic for the infragram diagram tool.
//!
//! `render` reads a TOML schema and writes the PNG and/or draw.io artifacts;
//! `validate` checks a draw.io document and, given expected kinds, how
//! complete it is.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, RenderArgs, ValidateArgs};

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use infragram::{
    DiagramBuilder, InfragramError,
    config::AppConfig,
    kind::Kind,
    schema::{OutputSet, Schema},
    validate::{ValidationReport, validate},
};

/// What a successful run produced.
#[derive(Debug)]
pub enum Outcome {
    /// Paths of the artifacts written, PNG first.
    Rendered(Vec<PathBuf>),
    /// The document was read; it may still be invalid.
    Validated(ValidationReport),
}

/// Run the infragram CLI application
///
/// # Errors
///
/// Returns `InfragramError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Schema parse and construction errors
/// - Rendering errors
///
/// An invalid document is not an error; it is returned as
/// [`Outcome::Validated`].
pub fn run(args: &Args) -> Result<Outcome, InfragramError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Render(render) => run_render(render, app_config).map(Outcome::Rendered),
        Command::Validate(check) => run_validate(check, app_config).map(Outcome::Validated),
    }
}

fn run_render(args: &RenderArgs, config: AppConfig) -> Result<Vec<PathBuf>, InfragramError> {
    info!(
        schema_path = args.schema,
        png = args.png.as_deref().unwrap_or("-"),
        drawio = args.drawio.as_deref().unwrap_or("-");
        "Processing schema"
    );

    let source = fs::read_to_string(&args.schema)?;
    let builder = DiagramBuilder::new(config);
    let schema = builder.parse(&source)?;
    let schema = select_outputs(schema, args);

    if schema.outputs().is_empty() {
        warn!("Schema requests no outputs; nothing to render");
        return Ok(Vec::new());
    }

    let rendered = builder.render(&schema)?;
    let mut written = Vec::new();

    if let Some(raster) = rendered.raster() {
        let path = output_path(args.png.as_deref(), &args.schema, "png");
        fs::write(&path, raster.png())?;
        info!(output_file = path.display().to_string(); "PNG exported successfully");
        written.push(path);
    }
    if let Some(document) = rendered.document() {
        let path = output_path(args.drawio.as_deref(), &args.schema, "drawio");
        fs::write(&path, document.xml())?;
        info!(output_file = path.display().to_string(); "draw.io document exported successfully");
        written.push(path);
    }

    Ok(written)
}

/// Explicit output flags replace the schema's own output selection.
fn select_outputs(schema: Schema, args: &RenderArgs) -> Schema {
    match (args.png.is_some(), args.drawio.is_some()) {
        (true, true) => schema.with_outputs(OutputSet::both()),
        (true, false) => schema.with_outputs(OutputSet::raster_only()),
        (false, true) => schema.with_outputs(OutputSet::document_only()),
        (false, false) => schema,
    }
}

fn output_path(explicit: Option<&str>, schema_path: &str, extension: &str) -> PathBuf {
    match explicit {
        Some(path) => PathBuf::from(path),
        None => Path::new(schema_path).with_extension(extension),
    }
}

fn run_validate(args: &ValidateArgs, config: AppConfig) -> Result<ValidationReport, InfragramError> {
    info!(document_path = args.document; "Validating document");

    let text = fs::read_to_string(&args.document)?;
    let builder = DiagramBuilder::new(config);

    let report = if args.expect.is_empty() {
        validate(&text, None::<&[&str]>)
    } else {
        let expected: Vec<&str> = args
            .expect
            .iter()
            .map(|kind| builder.registry().resolve(&Kind::from(kind.as_str())).document().kind_tag())
            .collect();
        validate(&text, Some(expected.as_slice()))
    };

    info!(
        valid = report.valid(),
        errors = report.errors().len();
        "Validation finished"
    );
    Ok(report)
}

/// Human-readable summary of a validation report.
pub fn format_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let status = if report.valid() { "valid" } else { "INVALID" };
    let _ = writeln!(
        out,
        "{status}: {} vertices, {} edges",
        report.vertex_count(),
        report.edge_count()
    );
    for error in report.errors() {
        let _ = writeln!(out, "  error: {error}");
    }
    if let Some(completeness) = report.completeness() {
        let _ = writeln!(out, "completeness: {:.1}%", completeness.percentage());
        if !completeness.missing().is_empty() {
            let _ = writeln!(out, "  missing: {}", completeness.missing().join(", "));
        }
        if !completeness.extra().is_empty() {
            let _ = writeln!(out, "  extra: {}", completeness.extra().join(", "));
        }
    }
    out
}
