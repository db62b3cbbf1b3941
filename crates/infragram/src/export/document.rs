//! draw.io (mxGraph) document backend.
//!
//! The document is an `mxfile` → `diagram` → `mxGraphModel` → `root` tree
//! holding:
//!
//! 1. the bootstrap cells `id="0"` and `id="1" parent="0"`,
//! 2. one vertex cell per Schema entity in canonical order, parented to its
//!    Container's cell or to cell `1`,
//! 3. one edge cell per resolvable Connection, in Connection order,
//! 4. optionally one label cell per labelled edge.
//!
//! Cell ids are generated as `{prefix}-{n}` from a single counter and stored
//! in the id map; edges look their endpoints up in that same map.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use log::{debug, info, warn};

use infragram_core::{
    color::Color,
    geometry::Bounds,
    identifier::Id,
    registry::{ContainerStyle, DocumentAttrs, StyleRegistry},
    schema::{Component, Container, Entity, Schema},
    stroke::StrokeStyle,
};

use crate::{
    config::{DocumentConfig, EdgeLabelMode, EdgeRouting},
    export::{RenderStyle, Renderer, display_label},
    layout::{Layout, Role},
    manifest::{RenderManifest, ResolvedEdge, resolve_connections},
    xml::{SerializationError, XmlWriter, is_valid_name, number},
};

const BOOTSTRAP_ROOT: &str = "0";
const BOOTSTRAP_LAYER: &str = "1";
const NO_ATTRIBUTES: [(&str, &str); 0] = [];

/// Attribute names an `<object>` wrapper already uses for itself.
const RESERVED_ATTRIBUTES: [&str; 2] = ["id", "label"];

/// A serialised draw.io document.
#[derive(Debug, Clone)]
pub struct DocumentOutput {
    xml: String,
    id_map: IndexMap<Id, String>,
    manifest: RenderManifest,
}

impl DocumentOutput {
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Schema id → generated cell id, in canonical order.
    pub fn id_map(&self) -> &IndexMap<Id, String> {
        &self.id_map
    }

    pub fn manifest(&self) -> &RenderManifest {
        &self.manifest
    }

    pub fn into_xml(self) -> String {
        self.xml
    }
}

/// Ordered `key=value;` mxGraph style string.
#[derive(Debug, Default)]
struct MxStyle {
    entries: Vec<(&'static str, String)>,
}

impl MxStyle {
    fn set(mut self, key: &'static str, value: impl ToString) -> Self {
        self.entries.push((key, value.to_string()));
        self
    }

    fn color(self, key: &'static str, color: Option<Color>) -> Self {
        match color {
            Some(color) => self.set(key, color.to_hex()),
            None => self,
        }
    }

    fn stroke_pattern(self, pattern: &StrokeStyle) -> Self {
        match pattern.dash_pattern() {
            Some(dash) => self.set("dashed", 1).set("dashPattern", dash),
            None => self.set("dashed", 0),
        }
    }

    fn build(&self) -> String {
        let mut style = String::new();
        for (key, value) in &self.entries {
            let _ = write!(style, "{key}={value};");
        }
        style
    }
}

pub struct DocumentRenderer<'a> {
    registry: &'a StyleRegistry,
    style: &'a RenderStyle,
    options: DocumentConfig,
}

struct Cells {
    prefix: String,
    next: usize,
}

impl Cells {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("{}-{}", self.prefix, self.next)
    }
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(registry: &'a StyleRegistry, style: &'a RenderStyle, options: DocumentConfig) -> Self {
        Self {
            registry,
            style,
            options,
        }
    }

    /// Renders with an explicit modification time instead of the clock.
    ///
    /// `modified` is written only when given; the rest of the document is a
    /// pure function of the inputs.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`] if any text cannot be written as XML.
    pub fn render_at(
        &self,
        schema: &Schema,
        layout: &Layout,
        modified: Option<DateTime<Utc>>,
    ) -> Result<DocumentOutput, SerializationError> {
        let mut cells = Cells {
            prefix: self.options.id_prefix().to_string(),
            next: 0,
        };
        let mut id_map: IndexMap<Id, String> = IndexMap::new();
        let mut manifest = RenderManifest::default();

        let mut writer = XmlWriter::new()?;
        self.open_model(&mut writer, schema, layout, modified)?;
        writer.start("root", NO_ATTRIBUTES)?;
        writer.empty("mxCell", [("id", BOOTSTRAP_ROOT)])?;
        writer.empty("mxCell", [("id", BOOTSTRAP_LAYER), ("parent", BOOTSTRAP_ROOT)])?;

        for entity in schema.entities() {
            let id = entity.id();
            let Some(placement) = layout.get(id) else {
                continue;
            };
            let parent = match placement.parent().and_then(|parent| id_map.get(&parent)) {
                Some(cell) => cell.clone(),
                None => BOOTSTRAP_LAYER.to_string(),
            };
            let cell_id = cells.next_id();

            match entity.entity() {
                Entity::Component(component) => {
                    manifest.push_node(id, Role::Component);
                    self.component_cell(&mut writer, component, &cell_id, &parent, placement.relative())?;
                }
                Entity::Container(container) => {
                    manifest.push_node(id, Role::Container);
                    let style = self
                        .registry
                        .container_style(placement.depth())
                        .overridden_by(container.style());
                    self.container_cell(
                        &mut writer,
                        container,
                        &style,
                        &cell_id,
                        &parent,
                        placement.relative(),
                    )?;
                }
            }
            id_map.insert(id, cell_id);
        }

        let (edges, skipped) = resolve_connections(schema, layout, "document");
        for edge in &edges {
            // Both endpoints have placements, so both are in the id map.
            let (Some(source), Some(target)) = (
                id_map.get(&edge.connection.source()),
                id_map.get(&edge.connection.target()),
            ) else {
                continue;
            };
            let edge_id = cells.next_id();
            self.edge_cells(&mut writer, edge, &edge_id, source, target, &mut cells)?;
            manifest.push_edge(edge);
        }
        for skip in skipped {
            manifest.push_skipped(skip);
        }

        writer.end("root")?;
        writer.end("mxGraphModel")?;
        writer.end("diagram")?;
        writer.end("mxfile")?;
        let xml = writer.finish()?;

        info!(
            cells = cells.next,
            vertices = id_map.len(),
            edges = manifest.edges().len(),
            skipped = manifest.skipped().len();
            "Document rendered"
        );

        Ok(DocumentOutput {
            xml,
            id_map,
            manifest,
        })
    }

    /// Opens `mxfile`, `diagram` and `mxGraphModel`.
    fn open_model(
        &self,
        writer: &mut XmlWriter,
        schema: &Schema,
        layout: &Layout,
        modified: Option<DateTime<Utc>>,
    ) -> Result<(), SerializationError> {
        let canvas = schema.canvas();
        let page = layout.extent();
        let grid = if canvas.grid_size() > 0 { "1" } else { "0" };

        let modified = modified.map(|time| time.to_rfc3339_opts(SecondsFormat::Millis, true));
        let mut mxfile = vec![("host", "infragram")];
        if let Some(modified) = &modified {
            mxfile.push(("modified", modified.as_str()));
        }
        mxfile.push(("agent", concat!("infragram/", env!("CARGO_PKG_VERSION"))));
        mxfile.push(("type", "device"));
        writer.start("mxfile", mxfile)?;

        let title = if schema.title().is_empty() {
            "Page-1"
        } else {
            schema.title()
        };
        let diagram_id = format!("{}-diagram", self.options.id_prefix());
        writer.start("diagram", [("id", diagram_id.as_str()), ("name", title)])?;

        let (dx, dy) = (number(canvas.width()), number(canvas.height()));
        let grid_size = canvas.grid_size().to_string();
        let page_width = number(canvas.width().max(page.width()));
        let page_height = number(canvas.height().max(page.height()));
        let background = self.style.background(schema).to_hex();
        writer.start(
            "mxGraphModel",
            [
                ("dx", dx.as_str()),
                ("dy", dy.as_str()),
                ("grid", grid),
                ("gridSize", grid_size.as_str()),
                ("guides", "1"),
                ("tooltips", "1"),
                ("connect", "1"),
                ("arrows", "1"),
                ("fold", "1"),
                ("page", "1"),
                ("pageScale", "1"),
                ("pageWidth", page_width.as_str()),
                ("pageHeight", page_height.as_str()),
                ("background", background.as_str()),
                ("math", "0"),
                ("shadow", "0"),
            ],
        )
    }

    fn component_cell(
        &self,
        writer: &mut XmlWriter,
        component: &Component,
        cell_id: &str,
        parent: &str,
        bounds: Bounds,
    ) -> Result<(), SerializationError> {
        let attrs = self.registry.resolve(component.kind()).document();
        let label = display_label(component.label(), component.id());
        let style = component_style(attrs, self.style.font_size());

        let metadata: Vec<(&str, &str)> = component
            .metadata()
            .iter()
            .filter(|(key, _)| {
                let usable = is_metadata_key(key);
                if !usable {
                    warn!(
                        entity:% = component.id(),
                        key = key.as_str();
                        "Dropping metadata key that is not a plain XML name"
                    );
                }
                usable
            })
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        if metadata.is_empty() {
            writer.start(
                "mxCell",
                [
                    ("id", cell_id),
                    ("value", label.as_str()),
                    ("style", style.as_str()),
                    ("vertex", "1"),
                    ("parent", parent),
                ],
            )?;
            geometry(writer, bounds)?;
            return writer.end("mxCell");
        }

        // The wrapper owns the id and label; the inner cell keeps the rest.
        let mut object = vec![("label", label.as_str()), ("id", cell_id)];
        object.extend(metadata);
        writer.start("object", object)?;
        writer.start(
            "mxCell",
            [("style", style.as_str()), ("vertex", "1"), ("parent", parent)],
        )?;
        geometry(writer, bounds)?;
        writer.end("mxCell")?;
        writer.end("object")
    }

    fn container_cell(
        &self,
        writer: &mut XmlWriter,
        container: &Container,
        style: &ContainerStyle,
        cell_id: &str,
        parent: &str,
        bounds: Bounds,
    ) -> Result<(), SerializationError> {
        let mx_style = MxStyle::default()
            .set("rounded", 0)
            .set("whiteSpace", "wrap")
            .set("html", 0)
            .set("container", 1)
            .set("collapsible", 0)
            .set("fillColor", style.fill().to_hex())
            .set("strokeColor", style.stroke().to_hex())
            .set("fontColor", style.text().to_hex())
            .set("strokeWidth", number(style.stroke_width()))
            .stroke_pattern(style.stroke_style())
            .set("verticalAlign", "top")
            .set("align", "left")
            .set("spacingLeft", 10)
            .set("fontStyle", 1)
            .set("fontSize", number(self.style.font_size()))
            .build();
        let label = display_label(container.label(), container.id());

        writer.start(
            "mxCell",
            [
                ("id", cell_id),
                ("value", label.as_str()),
                ("style", mx_style.as_str()),
                ("vertex", "1"),
                ("parent", parent),
            ],
        )?;
        geometry(writer, bounds)?;
        writer.end("mxCell")
    }

    fn edge_cells(
        &self,
        writer: &mut XmlWriter,
        edge: &ResolvedEdge<'_>,
        edge_id: &str,
        source: &str,
        target: &str,
        cells: &mut Cells,
    ) -> Result<(), SerializationError> {
        let stroke = self.style.edge_stroke(edge.connection);
        let mut style = MxStyle::default();
        style = match self.style.edge_routing() {
            EdgeRouting::Straight => style,
            EdgeRouting::Curved => style.set("curved", 1),
            EdgeRouting::Orthogonal => style.set("edgeStyle", "orthogonalEdgeStyle"),
        };
        let style = style
            .set("rounded", 0)
            .set("html", 0)
            .set("endArrow", "block")
            .set("endFill", 1)
            .set("strokeColor", stroke.color.to_hex())
            .set("strokeWidth", number(stroke.width))
            .stroke_pattern(&stroke.pattern)
            .color("fontColor", stroke.label_color)
            .build();

        let label = edge.connection.label().filter(|label| !label.is_empty());
        let inline = self.options.edge_label_mode() == EdgeLabelMode::Inline;

        let mut attributes = vec![("id", edge_id)];
        if let Some(label) = label.filter(|_| inline) {
            attributes.push(("value", label));
        }
        attributes.extend([
            ("style", style.as_str()),
            ("edge", "1"),
            ("parent", BOOTSTRAP_LAYER),
            ("source", source),
            ("target", target),
        ]);
        writer.start("mxCell", attributes)?;
        writer.empty("mxGeometry", [("relative", "1"), ("as", "geometry")])?;
        writer.end("mxCell")?;

        if let Some(label) = label.filter(|_| !inline) {
            let label_style = MxStyle::default()
                .set("edgeLabel", "1")
                .set("html", 0)
                .set("resizable", 0)
                .set("align", "center")
                .set("verticalAlign", "middle")
                .color("fontColor", stroke.label_color)
                .build();
            let label_id = cells.next_id();
            writer.start(
                "mxCell",
                [
                    ("id", label_id.as_str()),
                    ("value", label),
                    ("style", label_style.as_str()),
                    ("vertex", "1"),
                    ("connectable", "0"),
                    ("parent", edge_id),
                ],
            )?;
            writer.start("mxGeometry", [("relative", "1"), ("as", "geometry")])?;
            writer.empty("mxPoint", [("as", "offset")])?;
            writer.end("mxGeometry")?;
            writer.end("mxCell")?;
        }

        debug!(edge = edge_id, source = source, target = target; "Edge cell emitted");
        Ok(())
    }
}

impl Renderer for DocumentRenderer<'_> {
    type Output = DocumentOutput;
    type Error = SerializationError;

    /// Stamps `modified` with the current time when the document
    /// configuration asks for a timestamp.
    fn render(&self, schema: &Schema, layout: &Layout) -> Result<DocumentOutput, SerializationError> {
        let modified = self.options.timestamp().then(Utc::now);
        self.render_at(schema, layout, modified)
    }
}

fn component_style(attrs: &DocumentAttrs, font_size: f32) -> String {
    let mut style = MxStyle::default();
    if attrs.res_icon().is_some() {
        style = style
            .set("sketch", 0)
            .set("outlineConnect", 0)
            .set("gradientColor", "none");
    } else {
        style = style.set("rounded", 1).set("whiteSpace", "wrap");
    }
    style = style
        .set("html", 0)
        .color("fillColor", attrs.fill())
        .color("strokeColor", attrs.stroke())
        .color("fontColor", attrs.font_color())
        .set("fontSize", number(font_size));
    if attrs.label_below() {
        style = style
            .set("verticalLabelPosition", "bottom")
            .set("verticalAlign", "top")
            .set("align", "center")
            .set("aspect", "fixed");
    }
    style = style.set("shape", attrs.shape());
    if let Some(icon) = attrs.res_icon() {
        style = style.set("resIcon", icon);
    }
    style.build()
}

fn geometry(writer: &mut XmlWriter, bounds: Bounds) -> Result<(), SerializationError> {
    let (x, y) = (number(bounds.min_x()), number(bounds.min_y()));
    let (width, height) = (number(bounds.width()), number(bounds.height()));
    writer.empty(
        "mxGeometry",
        [
            ("x", x.as_str()),
            ("y", y.as_str()),
            ("width", width.as_str()),
            ("height", height.as_str()),
            ("as", "geometry"),
        ],
    )
}

fn is_metadata_key(key: &str) -> bool {
    is_valid_name(key)
        && !key.contains(':')
        && !key.to_ascii_lowercase().starts_with("xml")
        && !RESERVED_ATTRIBUTES.contains(&key)
}
