//! PNG backend.
//!
//! The diagram is first drawn as an SVG document with the `svg` crate and
//! then rasterised with `usvg`/`resvg` into a `tiny-skia` pixmap.
//!
//! Containers become `<g class="cluster">` groups that enclose their
//! children, Components become `<g class="node">` groups, and edges are
//! drawn last so they sit on top of every node.

use log::{debug, info};
use svg::{
    Document, Node,
    node::{Blob, element as svg_element},
};
use thiserror::Error;

use infragram_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    registry::{RasterAttrs, RasterShape, StyleRegistry},
    schema::{Component, Container, Schema},
};

use crate::{
    config::{EdgeRouting, RasterConfig},
    export::{EdgeStroke, RenderStyle, Renderer, display_label},
    layout::{Layout, Role},
    manifest::{RenderManifest, ResolvedEdge, resolve_connections},
    xml::{self, SerializationError, number},
};

#[derive(Debug, Error)]
pub enum RasterError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate a {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
    #[error("invalid raster scale {0}; expected a positive finite number")]
    InvalidScale(f32),
}

/// Rendered PNG together with the SVG it was rasterised from.
#[derive(Debug, Clone)]
pub struct RasterOutput {
    png: Vec<u8>,
    svg: String,
    manifest: RenderManifest,
}

impl RasterOutput {
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn manifest(&self) -> &RenderManifest {
        &self.manifest
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }
}

const LABEL_BACKGROUND_PADDING: f32 = 4.0;
const CLUSTER_LABEL_INSET: f32 = 10.0;

pub struct RasterRenderer<'a> {
    registry: &'a StyleRegistry,
    style: &'a RenderStyle,
    options: RasterConfig,
    header_height: f32,
}

impl<'a> RasterRenderer<'a> {
    pub fn new(
        registry: &'a StyleRegistry,
        style: &'a RenderStyle,
        options: RasterConfig,
        header_height: f32,
    ) -> Self {
        Self {
            registry,
            style,
            options,
            header_height,
        }
    }

    /// Builds the SVG document without rasterising it.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`] if a label cannot be written as XML.
    pub fn render_svg(
        &self,
        schema: &Schema,
        layout: &Layout,
    ) -> Result<(String, RenderManifest), SerializationError> {
        let canvas = schema.canvas();
        let size = layout
            .extent()
            .max(Size::new(canvas.width(), canvas.height()));

        let (edges, skipped) = resolve_connections(schema, layout, "raster");
        let mut manifest = RenderManifest::default();

        let mut doc = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("width", number(size.width()))
            .set("height", number(size.height()))
            .set(
                "viewBox",
                format!("0 0 {} {}", number(size.width()), number(size.height())),
            );
        if !schema.title().is_empty() {
            let mut title = svg_element::Element::new("title");
            title.append(Blob::new(xml::escape(schema.title())?));
            doc = doc.add(title);
        }
        doc = doc.add(marker_definitions(
            edges
                .iter()
                .map(|edge| self.style.edge_stroke(edge.connection).color),
        ));
        doc = doc.add(paint(
            svg_element::Rectangle::new()
                .set("width", "100%")
                .set("height", "100%"),
            "fill",
            self.style.background(schema),
        ));

        let mut diagram = self.render_scope(
            svg_element::Group::new().set("class", "diagram"),
            schema.containers(),
            schema.components(),
            layout,
            &mut manifest,
        )?;
        for edge in &edges {
            diagram = diagram.add(self.render_edge(edge)?);
            manifest.push_edge(edge);
        }
        for skip in skipped {
            manifest.push_skipped(skip);
        }

        let text = doc.add(diagram).to_string();
        debug!(nodes = manifest.nodes().len(), edges = manifest.edges().len(); "SVG document rendered");
        Ok((text, manifest))
    }

    fn render_scope(
        &self,
        mut parent: svg_element::Group,
        containers: &[Container],
        components: &[Component],
        layout: &Layout,
        manifest: &mut RenderManifest,
    ) -> Result<svg_element::Group, SerializationError> {
        for container in containers {
            let Some(placement) = layout.get(container.id()) else {
                continue;
            };
            manifest.push_node(container.id(), Role::Container);

            let cluster = self.render_cluster(container, placement.absolute(), placement.depth())?;
            let cluster = self.render_scope(
                cluster,
                container.containers(),
                container.components(),
                layout,
                manifest,
            )?;
            parent = parent.add(cluster);
        }

        for component in components {
            let Some(placement) = layout.get(component.id()) else {
                continue;
            };
            manifest.push_node(component.id(), Role::Component);
            parent = parent.add(self.render_node(component, placement.absolute())?);
        }
        Ok(parent)
    }

    fn render_cluster(
        &self,
        container: &Container,
        bounds: Bounds,
        depth: usize,
    ) -> Result<svg_element::Group, SerializationError> {
        let style = self
            .registry
            .container_style(depth)
            .overridden_by(container.style());

        let mut frame = svg_element::Rectangle::new()
            .set("x", number(bounds.min_x()))
            .set("y", number(bounds.min_y()))
            .set("width", number(bounds.width()))
            .set("height", number(bounds.height()))
            .set("stroke-width", number(style.stroke_width()));
        frame = paint(frame, "fill", style.fill());
        frame = paint(frame, "stroke", style.stroke());
        if let Some(dash) = style.stroke_style().dash_array() {
            frame = frame.set("stroke-dasharray", dash);
        }

        let label_origin = Point::new(
            bounds.min_x() + CLUSTER_LABEL_INSET,
            bounds.min_y() + self.header_height / 2.0,
        );
        let label = self
            .text(
                &display_label(container.label(), container.id()),
                label_origin,
                style.text(),
                "start",
            )?
            .set("font-weight", "bold");

        Ok(svg_element::Group::new()
            .set("class", "cluster")
            .set("id", xml::attribute_value(&format!("cluster-{}", container.id()))?)
            .add(frame)
            .add(label))
    }

    fn render_node(
        &self,
        component: &Component,
        bounds: Bounds,
    ) -> Result<svg_element::Group, SerializationError> {
        let attrs = self.registry.resolve(component.kind()).raster();

        let mut group = svg_element::Group::new()
            .set("class", "node")
            .set("id", xml::attribute_value(&format!("node-{}", component.id()))?)
            .add(shape_element(attrs.shape(), bounds, attrs));
        if let Some(rim) = cylinder_rim(attrs.shape(), bounds) {
            group = group.add(
                paint(rim, "stroke", attrs.stroke())
                    .set("fill", "none")
                    .set("stroke-width", number(attrs.stroke_width())),
            );
        }

        Ok(group.add(self.text(
            &display_label(component.label(), component.id()),
            bounds.center(),
            attrs.text(),
            "middle",
        )?))
    }

    fn render_edge(&self, edge: &ResolvedEdge<'_>) -> Result<svg_element::Group, SerializationError> {
        let stroke = self.style.edge_stroke(edge.connection);
        let source = edge.source.absolute();
        let target = edge.target.absolute();
        let start = source.boundary_point_towards(target.center());
        let end = target.boundary_point_towards(source.center());

        let mut path = svg_element::Path::new()
            .set("d", create_path_data_for_routing(start, end, self.style.edge_routing()))
            .set("fill", "none")
            .set("stroke-width", number(stroke.width))
            .set("marker-end", format!("url(#{})", marker_id(stroke.color)));
        path = paint(path, "stroke", stroke.color);
        if let Some(dash) = stroke.pattern.dash_array() {
            path = path.set("stroke-dasharray", dash);
        }

        let mut group = svg_element::Group::new()
            .set("class", "edge")
            .set("data-source", xml::attribute_value(&edge.connection.source().to_string())?)
            .set("data-target", xml::attribute_value(&edge.connection.target().to_string())?)
            .add(path);

        if let Some(label) = edge.connection.label().filter(|label| !label.is_empty()) {
            group = self.render_edge_label(group, label, start.midpoint(end), &stroke)?;
        }
        Ok(group)
    }

    fn render_edge_label(
        &self,
        group: svg_element::Group,
        label: &str,
        mid: Point,
        stroke: &EdgeStroke,
    ) -> Result<svg_element::Group, SerializationError> {
        let text_size = self.estimate_text_size(label);
        let background = svg_element::Rectangle::new()
            .set("x", number(mid.x() - text_size.width() / 2.0 - LABEL_BACKGROUND_PADDING))
            .set("y", number(mid.y() - text_size.height() / 2.0 - LABEL_BACKGROUND_PADDING))
            .set("width", number(text_size.width() + LABEL_BACKGROUND_PADDING * 2.0))
            .set("height", number(text_size.height() + LABEL_BACKGROUND_PADDING * 2.0))
            .set("fill", "white")
            .set("fill-opacity", 0.8)
            .set("rx", 3);

        let color = stroke.label_color.unwrap_or_else(Color::default);
        Ok(group
            .add(background)
            .add(self.text(label, mid, color, "middle")?))
    }

    /// Label text vertically centred on `anchor`. Multi-line labels become
    /// a group holding one `<text>` per line.
    fn text(
        &self,
        label: &str,
        anchor: Point,
        color: Color,
        align: &'static str,
    ) -> Result<svg_element::Group, SerializationError> {
        let lines: Vec<&str> = label.lines().collect();
        let line_height = self.style.font_size() * 1.2;
        let first_y = anchor.y() - line_height * (lines.len().saturating_sub(1)) as f32 / 2.0;

        let mut group = paint(
            svg_element::Group::new()
                .set("font-family", xml::attribute_value(self.style.font_family())?)
                .set("font-size", number(self.style.font_size()))
                .set("text-anchor", align)
                .set("dominant-baseline", "central"),
            "fill",
            color,
        );
        if lines.is_empty() {
            return Ok(group);
        }
        for (i, line) in lines.iter().enumerate() {
            let text = svg_element::Text::new("")
                .set("x", number(anchor.x()))
                .set("y", number(first_y + line_height * i as f32))
                .add(Blob::new(xml::escape(line)?));
            group = group.add(text);
        }
        Ok(group)
    }

/// Rough label size; rasterised glyphs are not measured.
    fn estimate_text_size(&self, label: &str) -> Size {
        let font_size = self.style.font_size();
        let longest = label.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        let lines = label.lines().count().max(1);
        Size::new(
            longest as f32 * font_size * 0.6,
            lines as f32 * font_size * 1.2,
        )
    }

    /// Rasterises an SVG document to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`RasterError`] if the scale is invalid, the SVG cannot be
    /// parsed, the pixmap cannot be allocated or PNG encoding fails.
    pub fn rasterize(&self, svg: &str) -> Result<Vec<u8>, RasterError> {
        let scale = self.options.scale();
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RasterError::InvalidScale(scale));
        }

        let mut opt = usvg::Options::default();
        if self.options.load_system_fonts() {
            opt.fontdb_mut().load_system_fonts();
        }
        opt.font_family = self.style.font_family().to_string();

        let tree =
            usvg::Tree::from_str(svg, &opt).map_err(|err| RasterError::SvgParse(err.to_string()))?;

        let size = tree.size();
        let width = (size.width() * scale).ceil().max(1.0) as u32;
        let height = (size.height() * scale).ceil().max(1.0) as u32;
        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(RasterError::PixmapAlloc { width, height })?;

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        info!(width = width, height = height; "Diagram rasterised");

        pixmap
            .encode_png()
            .map_err(|err| RasterError::PngEncode(err.to_string()))
    }
}

impl Renderer for RasterRenderer<'_> {
    type Output = RasterOutput;
    type Error = RasterError;

    fn render(&self, schema: &Schema, layout: &Layout) -> Result<RasterOutput, RasterError> {
        let (svg, manifest) = self.render_svg(schema, layout)?;
        let png = self.rasterize(&svg)?;
        Ok(RasterOutput { png, svg, manifest })
    }
}

/// Sets `attribute` to the color's hex value and, for translucent colors,
/// the matching `-opacity` attribute.
fn paint<N: Node>(mut node: N, attribute: &'static str, color: Color) -> N {
    node.assign(attribute, color.to_hex());
    if color.alpha() < 1.0 {
        let opacity = match attribute {
            "fill" => "fill-opacity",
            _ => "stroke-opacity",
        };
        node.assign(opacity, number(color.alpha()));
    }
    node
}

fn marker_id(color: Color) -> String {
    format!("arrow-{}", color.to_hex().trim_start_matches('#'))
}

/// One arrow-head marker per distinct edge color.
fn marker_definitions(colors: impl Iterator<Item = Color>) -> svg_element::Definitions {
    let mut seen: Vec<String> = Vec::new();
    let mut defs = svg_element::Definitions::new();

    for color in colors {
        let id = marker_id(color);
        if seen.contains(&id) {
            continue;
        }
        let arrow = svg_element::Marker::new()
            .set("id", id.clone())
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(paint(
                svg_element::Path::new().set("d", "M 0 0 L 10 5 L 0 10 z"),
                "fill",
                color,
            ));
        defs = defs.add(arrow);
        seen.push(id);
    }

    defs
}

/// Fill and stroke from the Kind's raster attributes.
fn outline<N: Node>(node: N, attrs: &RasterAttrs) -> Box<dyn Node> {
    let mut node = paint(paint(node, "fill", attrs.fill()), "stroke", attrs.stroke());
    node.assign("stroke-width", number(attrs.stroke_width()));
    Box::new(node)
}

fn shape_element(shape: RasterShape, b: Bounds, attrs: &RasterAttrs) -> Box<dyn Node> {
    let (x, y, w, h) = (b.min_x(), b.min_y(), b.width(), b.height());
    match shape {
        RasterShape::Rectangle | RasterShape::RoundedRectangle => {
            let mut rect = svg_element::Rectangle::new()
                .set("x", number(x))
                .set("y", number(y))
                .set("width", number(w))
                .set("height", number(h));
            if shape == RasterShape::RoundedRectangle {
                rect = rect.set("rx", number(8.0_f32.min(h / 4.0)));
            }
            outline(rect, attrs)
        }
        RasterShape::Ellipse => {
            let center = b.center();
            let ellipse = svg_element::Ellipse::new()
                .set("cx", number(center.x()))
                .set("cy", number(center.y()))
                .set("rx", number(w / 2.0))
                .set("ry", number(h / 2.0));
            outline(ellipse, attrs)
        }
        RasterShape::Cylinder => {
            let (rx, ry) = (w / 2.0, cylinder_ry(h));
            let body = svg_element::Path::new().set(
                "d",
                format!(
                    "M {x0} {top} A {rx} {ry} 0 0 1 {x1} {top} L {x1} {bottom} A {rx} {ry} 0 0 1 {x0} {bottom} Z",
                    x0 = number(x),
                    x1 = number(x + w),
                    top = number(y + ry),
                    bottom = number(y + h - ry),
                    rx = number(rx),
                    ry = number(ry),
                ),
            );
            outline(body, attrs)
        }
        RasterShape::Hexagon => {
            let inset = (w * 0.2).min(h / 2.0);
            outline(
                polygon(&[
                    (x + inset, y),
                    (x + w - inset, y),
                    (x + w, y + h / 2.0),
                    (x + w - inset, y + h),
                    (x + inset, y + h),
                    (x, y + h / 2.0),
                ]),
                attrs,
            )
        }
        RasterShape::Parallelogram => {
            let skew = (w * 0.15).min(20.0);
            outline(
                polygon(&[(x + skew, y), (x + w, y), (x + w - skew, y + h), (x, y + h)]),
                attrs,
            )
        }
    }
}

fn cylinder_ry(height: f32) -> f32 {
    (height * 0.15).min(12.0)
}

/// Front half of the cylinder's top ellipse.
fn cylinder_rim(shape: RasterShape, b: Bounds) -> Option<svg_element::Path> {
    if shape != RasterShape::Cylinder {
        return None;
    }
    let (rx, ry) = (b.width() / 2.0, cylinder_ry(b.height()));
    let top = b.min_y() + ry;
    Some(svg_element::Path::new().set(
        "d",
        format!(
            "M {} {} A {} {} 0 0 0 {} {}",
            number(b.min_x()),
            number(top),
            number(rx),
            number(ry),
            number(b.max_x()),
            number(top)
        ),
    ))
}

fn polygon(points: &[(f32, f32)]) -> svg_element::Polygon {
    let points = points
        .iter()
        .map(|(x, y)| format!("{},{}", number(*x), number(*y)))
        .collect::<Vec<_>>()
        .join(" ");
    svg_element::Polygon::new().set("points", points)
}

/// Create a path data string for the given routing style
pub fn create_path_data_for_routing(start: Point, end: Point, routing: EdgeRouting) -> String {
    match routing {
        EdgeRouting::Straight => create_path_data_from_points(start, end),
        EdgeRouting::Curved => create_curved_path_data_from_points(start, end),
        EdgeRouting::Orthogonal => create_orthogonal_path_data_from_points(start, end),
    }
}

/// Create a path data string from two points
pub fn create_path_data_from_points(start: Point, end: Point) -> String {
    format!(
        "M {} {} L {} {}",
        number(start.x()),
        number(start.y()),
        number(end.x()),
        number(end.y())
    )
}

/// Cubic bezier whose control points bow the line into an arc
pub fn create_curved_path_data_from_points(start: Point, end: Point) -> String {
    let ctrl1_x = start.x() + (end.x() - start.x()) / 4.0;
    let ctrl1_y = start.y() - (end.y() - start.y()) / 2.0;

    let ctrl2_x = end.x() - (end.x() - start.x()) / 4.0;
    let ctrl2_y = end.y() + (start.y() - end.y()) / 2.0;

    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        number(start.x()),
        number(start.y()),
        number(ctrl1_x),
        number(ctrl1_y),
        number(ctrl2_x),
        number(ctrl2_y),
        number(end.x()),
        number(end.y())
    )
}

/// Path made of horizontal and vertical segments only, bending at the
/// midpoint along the dominant axis
pub fn create_orthogonal_path_data_from_points(start: Point, end: Point) -> String {
    let mid = start.midpoint(end);
    let dx = (end.x() - start.x()).abs();
    let dy = (end.y() - start.y()).abs();

    let (first, second) = if dx > dy {
        (Point::new(mid.x(), start.y()), Point::new(mid.x(), end.y()))
    } else {
        (Point::new(start.x(), mid.y()), Point::new(end.x(), mid.y()))
    };

    format!(
        "M {} {} L {} {} L {} {} L {} {}",
        number(start.x()),
        number(start.y()),
        number(first.x()),
        number(first.y()),
        number(second.x()),
        number(second.y()),
        number(end.x()),
        number(end.y())
    )
}

#[cfg(test)]
mod tests {
    use infragram_core::{identifier::Id, schema::Connection};

    use super::*;
    use crate::layout::Engine;

    fn sample() -> Schema {
        Schema::new("Sample")
            .with_container(
                Container::new("vpc", "VPC")
                    .with_component(Component::new("api", "service", "API"))
                    .with_component(Component::new("db", "database", "Orders <DB>")),
            )
            .with_component(Component::new("user", "user", "User"))
            .with_connection(Connection::new("user", "api").with_label("HTTPS"))
            .with_connection(Connection::new("api", "db"))
            .with_connection(Connection::new("api", "z"))
    }

    fn svg_for(schema: &Schema) -> (String, RenderManifest) {
        let layout = Engine::default().calculate(schema).unwrap();
        let registry = StyleRegistry::default();
        let style = RenderStyle::default();
        RasterRenderer::new(&registry, &style, RasterConfig::new(1.0, false), 30.0)
            .render_svg(schema, &layout)
            .unwrap()
    }

    #[test]
    fn test_svg_groups_and_manifest() {
        let (svg, manifest) = svg_for(&sample());
        let doc = roxmltree::Document::parse(&svg).unwrap();

        let clusters = doc
            .descendants()
            .filter(|n| n.attribute("class") == Some("cluster"))
            .count();
        let nodes: Vec<&str> = doc
            .descendants()
            .filter(|n| n.attribute("class") == Some("node"))
            .filter_map(|n| n.attribute("id"))
            .collect();
        let edges = doc
            .descendants()
            .filter(|n| n.attribute("class") == Some("edge"))
            .count();

        assert_eq!(clusters, 1);
        assert_eq!(nodes, vec!["node-api", "node-db", "node-user"]);
        assert_eq!(edges, 2);
        assert_eq!(manifest.edges().len(), 2);
        assert_eq!(manifest.skipped().len(), 1);
        assert_eq!(manifest.skipped()[0].missing(), Id::new("z"));
    }

    #[test]
    fn test_nodes_nested_inside_cluster() {
        let (svg, _) = svg_for(&sample());
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let cluster = doc
            .descendants()
            .find(|n| n.attribute("id") == Some("cluster-vpc"))
            .unwrap();
        let inner: Vec<&str> = cluster
            .children()
            .filter(|n| n.attribute("class") == Some("node"))
            .filter_map(|n| n.attribute("id"))
            .collect();
        assert_eq!(inner, vec!["node-api", "node-db"]);
    }

    #[test]
    fn test_labels_escaped() {
        let (svg, _) = svg_for(&sample());
        assert!(svg.contains("Orders &lt;DB&gt;"));
        let doc = roxmltree::Document::parse(&svg).unwrap();
        assert!(
            doc.descendants()
                .filter(|n| n.has_tag_name("text"))
                .any(|n| n.text().map(str::trim) == Some("Orders <DB>"))
        );
    }

    #[test]
    fn test_multi_line_label_one_text_per_line() {
        let schema = Schema::new("Lines").with_component(Component::new("a", "server", "first\nsecond"));
        let (svg, _) = svg_for(&schema);
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let node = doc
            .descendants()
            .find(|n| n.attribute("id") == Some("node-a"))
            .unwrap();
        let lines: Vec<&str> = node
            .descendants()
            .filter(|n| n.has_tag_name("text"))
            .filter_map(|n| n.text().map(str::trim))
            .collect();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_special_characters_in_ids_stay_well_formed() {
        let schema = Schema::new("Ids & <titles>")
            .with_component(Component::new("a&b", "server", "A"))
            .with_component(Component::new("c\"d", "server", "C"))
            .with_connection(Connection::new("a&b", "c\"d"));
        let (svg, manifest) = svg_for(&schema);
        assert!(roxmltree::Document::parse(&svg).is_ok());
        assert_eq!(manifest.edges().len(), 1);
    }

    #[test]
    fn test_svg_is_deterministic() {
        assert_eq!(svg_for(&sample()).0, svg_for(&sample()).0);
    }

    #[test]
    fn test_rasterize_produces_png() {
        let schema = sample();
        let layout = Engine::default().calculate(&schema).unwrap();
        let registry = StyleRegistry::default();
        let style = RenderStyle::default();
        let output = RasterRenderer::new(&registry, &style, RasterConfig::new(0.5, false), 30.0)
            .render(&schema, &layout)
            .unwrap();

        assert_eq!(&output.png()[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(output.manifest().component_ids().len(), 3);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let registry = StyleRegistry::default();
        let style = RenderStyle::default();
        let renderer = RasterRenderer::new(&registry, &style, RasterConfig::new(0.0, false), 30.0);
        assert!(matches!(
            renderer.rasterize("<svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            Err(RasterError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_orthogonal_path_horizontal_first() {
        let path = create_orthogonal_path_data_from_points(Point::new(0.0, 0.0), Point::new(100.0, 20.0));
        assert_eq!(path, "M 0 0 L 50 0 L 50 20 L 100 20");
    }

    #[test]
    fn test_straight_path() {
        let path = create_path_data_for_routing(Point::new(1.5, 2.0), Point::new(3.0, 4.0), EdgeRouting::Straight);
        assert_eq!(path, "M 1.5 2 L 3 4");
    }
}
