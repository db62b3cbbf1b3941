//! Structural validation of emitted draw.io documents.
//!
//! The validator re-parses document text on its own and never sees the Schema
//! that produced it, so it can check documents from any mxGraph writer. It
//! never fails: every problem, including unparsable input, is reported as a
//! [`ValidationError`] inside the returned [`ValidationReport`].

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use log::debug;
use roxmltree::{Document, Node};
use thiserror::Error;

const BOOTSTRAP_ROOT: &str = "0";
const BOOTSTRAP_LAYER: &str = "1";

/// One structural problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("document is not well-formed XML: {0}")]
    Parse(String),

    #[error("required element `{0}` is missing")]
    MissingElement(&'static str),

    #[error("bootstrap cell `{0}` is missing")]
    MissingBootstrap(&'static str),

    #[error("bootstrap cell `1` must have parent `0`, found {found:?}")]
    BootstrapParent { found: Option<String> },

    #[error("cell id `{0}` is used more than once")]
    DuplicateId(String),

    #[error("cell #{position} under `root` has no id")]
    MissingId { position: usize },

    #[error("edge `{edge}` references unknown cell `{endpoint}`")]
    DanglingEdge { edge: String, endpoint: String },

    #[error("edge `{edge}` has no `{attribute}` attribute")]
    MissingEdgeEndpoint { edge: String, attribute: &'static str },

    #[error("cell `{cell}` has unknown parent `{parent}`")]
    UnknownParent { cell: String, parent: String },

    #[error("cell `{cell}` has no parent")]
    MissingParent { cell: String },
}

/// Kind tags found in a document compared against an expected list.
#[derive(Debug, Clone, PartialEq)]
pub struct Completeness {
    percentage: f64,
    missing: Vec<String>,
    extra: Vec<String>,
    found: Vec<String>,
    expected: Vec<String>,
}

impl Completeness {
    /// Share of expected tags present, from 0 to 100. An empty expected
    /// list is complete.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Expected tags that no vertex carries.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Tags in the document that were not expected.
    pub fn extra(&self) -> &[String] {
        &self.extra
    }

    pub fn found(&self) -> &[String] {
        &self.found
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
    completeness: Option<Completeness>,
    vertex_count: usize,
    edge_count: usize,
}

impl ValidationReport {
    /// `true` when no structural error was found.
    ///
    /// Completeness does not affect validity.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Present only when an expected kind list was supplied.
    pub fn completeness(&self) -> Option<&Completeness> {
        self.completeness.as_ref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// A cell under `root`, with any `<object>`/`<UserObject>` wrapper unfolded.
#[derive(Debug)]
struct Cell<'a> {
    id: Option<&'a str>,
    parent: Option<&'a str>,
    style: Option<&'a str>,
    vertex: bool,
    edge: bool,
    source: Option<&'a str>,
    target: Option<&'a str>,
}

impl<'a> Cell<'a> {
    fn read(node: Node<'a, '_>) -> Option<Self> {
        match node.tag_name().name() {
            "mxCell" => Some(Self::from_parts(node.attribute("id"), node)),
            "object" | "UserObject" => {
                let inner = node.children().find(|child| child.has_tag_name("mxCell"))?;
                Some(Self::from_parts(node.attribute("id"), inner))
            }
            _ => None,
        }
    }

    fn from_parts(id: Option<&'a str>, cell: Node<'a, '_>) -> Self {
        Self {
            id,
            parent: cell.attribute("parent"),
            style: cell.attribute("style"),
            vertex: cell.attribute("vertex") == Some("1"),
            edge: cell.attribute("edge") == Some("1"),
            source: cell.attribute("source"),
            target: cell.attribute("target"),
        }
    }
}

/// Validates an mxGraph document.
///
/// Checks that the text is well-formed and that at least one
/// `mxGraphModel` exists. Every model must have a `root` holding the
/// bootstrap cells `0` and `1`, unique cell ids, and `parent`, `source` and
/// `target` references to cells of the same model. When `expected` is given,
/// the kind tags of all non-container vertices on every page are compared
/// against it.
///
/// # Examples
///
/// ```
/// use infragram::validate::validate;
///
/// let doc = r#"<mxfile><diagram><mxGraphModel><root>
///     <mxCell id="0"/>
///     <mxCell id="1" parent="0"/>
///     <mxCell id="a" vertex="1" parent="1" style="shape=mxgraph.aws4.user;"/>
/// </root></mxGraphModel></diagram></mxfile>"#;
///
/// let report = validate(doc, Some(&["mxgraph.aws4.user"][..]));
/// assert!(report.valid());
/// assert_eq!(report.completeness().unwrap().percentage(), 100.0);
///
/// assert!(!validate("<mxfile>", None::<&[&str]>).valid());
/// ```
pub fn validate<S: AsRef<str>>(text: &str, expected: Option<&[S]>) -> ValidationReport {
    let document = match Document::parse(text) {
        Ok(document) => document,
        Err(err) => {
            debug!(err:% = err; "Document failed to parse");
            return ValidationReport {
                errors: vec![ValidationError::Parse(err.to_string())],
                ..ValidationReport::default()
            };
        }
    };

    let mut report = ValidationReport::default();
    let models: Vec<Node<'_, '_>> = document
        .descendants()
        .filter(|node| node.has_tag_name("mxGraphModel"))
        .collect();
    if models.is_empty() {
        report.errors.push(ValidationError::MissingElement("mxGraphModel"));
        return report;
    }

    // Every page has its own id space, so structure is checked per model.
    let mut cells: Vec<Cell<'_>> = Vec::new();
    for model in models {
        let Some(root) = model.children().find(|node| node.has_tag_name("root")) else {
            report.errors.push(ValidationError::MissingElement("root"));
            continue;
        };
        let page: Vec<Cell<'_>> = root
            .children()
            .filter(Node::is_element)
            .filter_map(Cell::read)
            .collect();

        let ids = check_ids(&page, &mut report.errors);
        check_bootstrap(&page, &mut report.errors);
        check_references(&page, &ids, &mut report.errors);
        cells.extend(page);
    }

    report.vertex_count = cells.iter().filter(|cell| cell.vertex).count();
    report.edge_count = cells.iter().filter(|cell| cell.edge).count();
    report.completeness = expected.map(|expected| completeness(&cells, expected));

    debug!(
        valid = report.valid(),
        errors = report.errors.len(),
        vertices = report.vertex_count,
        edges = report.edge_count;
        "Document validated"
    );
    report
}

fn check_ids<'a>(cells: &[Cell<'a>], errors: &mut Vec<ValidationError>) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for (position, cell) in cells.iter().enumerate() {
        match cell.id {
            None => errors.push(ValidationError::MissingId { position }),
            Some(id) if !seen.insert(id) => {
                if reported.insert(id) {
                    errors.push(ValidationError::DuplicateId(id.to_string()));
                }
            }
            Some(_) => {}
        }
    }
    seen
}

fn check_bootstrap(cells: &[Cell<'_>], errors: &mut Vec<ValidationError>) {
    let by_id: HashMap<&str, &Cell<'_>> = cells
        .iter()
        .filter_map(|cell| cell.id.map(|id| (id, cell)))
        .collect();

    if !by_id.contains_key(BOOTSTRAP_ROOT) {
        errors.push(ValidationError::MissingBootstrap(BOOTSTRAP_ROOT));
    }
    match by_id.get(BOOTSTRAP_LAYER) {
        None => errors.push(ValidationError::MissingBootstrap(BOOTSTRAP_LAYER)),
        Some(layer) if layer.parent != Some(BOOTSTRAP_ROOT) => {
            errors.push(ValidationError::BootstrapParent {
                found: layer.parent.map(str::to_string),
            });
        }
        Some(_) => {}
    }
}

fn check_references(cells: &[Cell<'_>], ids: &HashSet<&str>, errors: &mut Vec<ValidationError>) {
    for cell in cells {
        let Some(id) = cell.id else {
            continue;
        };

        match cell.parent {
            None if id != BOOTSTRAP_ROOT => errors.push(ValidationError::MissingParent {
                cell: id.to_string(),
            }),
            Some(parent) if !ids.contains(parent) => errors.push(ValidationError::UnknownParent {
                cell: id.to_string(),
                parent: parent.to_string(),
            }),
            _ => {}
        }

        if !cell.edge {
            continue;
        }
        for (attribute, endpoint) in [("source", cell.source), ("target", cell.target)] {
            match endpoint {
                None => errors.push(ValidationError::MissingEdgeEndpoint {
                    edge: id.to_string(),
                    attribute,
                }),
                Some(endpoint) if !ids.contains(endpoint) => {
                    errors.push(ValidationError::DanglingEdge {
                        edge: id.to_string(),
                        endpoint: endpoint.to_string(),
                    });
                }
                Some(_) => {}
            }
        }
    }
}

fn completeness<S: AsRef<str>>(cells: &[Cell<'_>], expected: &[S]) -> Completeness {
    let expected: IndexSet<&str> = expected.iter().map(|tag| tag.as_ref()).collect();
    let found: IndexSet<&str> = cells
        .iter()
        .filter(|cell| cell.vertex)
        .filter_map(|cell| cell.style)
        .filter(|style| !is_structural(style))
        .filter_map(kind_tag)
        .collect();

    let missing: Vec<String> = expected
        .iter()
        .filter(|tag| !found.contains(*tag))
        .map(|tag| tag.to_string())
        .collect();
    let extra: Vec<String> = found
        .iter()
        .filter(|tag| !expected.contains(*tag))
        .map(|tag| tag.to_string())
        .collect();
    let percentage = if expected.is_empty() {
        100.0
    } else {
        (expected.len() - missing.len()) as f64 / expected.len() as f64 * 100.0
    };

    Completeness {
        percentage,
        missing,
        extra,
        found: found.iter().map(|tag| tag.to_string()).collect(),
        expected: expected.iter().map(|tag| tag.to_string()).collect(),
    }
}

fn style_tokens(style: &str) -> impl Iterator<Item = &str> {
    style.split(';').map(str::trim).filter(|token| !token.is_empty())
}

/// Containers and edge labels carry no kind.
fn is_structural(style: &str) -> bool {
    style_tokens(style).any(|token| match token.split_once('=') {
        Some(("container", value)) => value == "1",
        Some((key, _)) => key == "edgeLabel",
        None => token == "edgeLabel",
    })
}

/// `resIcon`, else `shape`, else the first bare style name.
fn kind_tag(style: &str) -> Option<&str> {
    let mut shape = None;
    let mut bare = None;
    for token in style_tokens(style) {
        match token.split_once('=') {
            Some(("resIcon", value)) if !value.is_empty() => return Some(value),
            Some(("shape", value)) if shape.is_none() && !value.is_empty() => shape = Some(value),
            Some(_) => {}
            None if bare.is_none() => bare = Some(token),
            None => {}
        }
    }
    shape.or(bare)
}
