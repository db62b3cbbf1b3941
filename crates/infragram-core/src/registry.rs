//! Kind → rendering attribute lookup shared by both backends.
//!
//! A [`StyleRegistry`] is an immutable value: it is assembled once with a
//! [`StyleRegistryBuilder`] and then handed to the renderers by reference.
//! Every kind is registered with a [`KindStyle`], which carries the raster
//! *and* the document attributes together, so a kind can never be supported
//! by one backend and missing from the other.
//!
//! Lookups never fail. A kind that was not registered resolves to the
//! registry's fallback style, and a nesting depth past the last container
//! bucket resolves to the last bucket.
//!
//! ```
//! use infragram_core::{
//!     color::Color,
//!     kind::Kind,
//!     registry::{DocumentAttrs, KindStyle, RasterAttrs, RasterShape, StyleRegistry},
//! };
//!
//! let black = Color::new("black").unwrap();
//! let queue = KindStyle::new(
//!     RasterAttrs::new(RasterShape::Parallelogram, Color::new("#fde7f3").unwrap(), black),
//!     DocumentAttrs::new("mxgraph.aws4.resourceIcon").with_res_icon("mxgraph.aws4.sqs"),
//! );
//!
//! let registry = StyleRegistry::builder().register(Kind::Queue, queue).build();
//! assert_eq!(registry.resolve(&Kind::Queue).document().kind_tag(), "mxgraph.aws4.sqs");
//! // Unregistered kinds fall back instead of failing.
//! assert_eq!(registry.resolve(&Kind::Cache).document().kind_tag(), "rectangle");
//! ```

use indexmap::IndexMap;

use crate::{
    color::Color,
    kind::Kind,
    schema::{Schema, Style},
    stroke::StrokeStyle,
};

/// Outline drawn for a component in the raster backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RasterShape {
    Rectangle,
    #[default]
    RoundedRectangle,
    Cylinder,
    Ellipse,
    Hexagon,
    Parallelogram,
}

/// Raster-side attributes of a kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterAttrs {
    shape: RasterShape,
    fill: Color,
    stroke: Color,
    text: Color,
    stroke_width: f32,
}

impl RasterAttrs {
    pub fn new(shape: RasterShape, fill: Color, stroke: Color) -> Self {
        Self {
            shape,
            fill,
            stroke,
            text: Color::default(),
            stroke_width: 1.5,
        }
    }

    pub fn with_text(mut self, text: Color) -> Self {
        self.text = text;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn shape(&self) -> RasterShape {
        self.shape
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn stroke(&self) -> Color {
        self.stroke
    }

    pub fn text(&self) -> Color {
        self.text
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }
}

/// Document-side attributes of a kind, expressed as mxGraph style keys.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAttrs {
    shape: String,
    res_icon: Option<String>,
    fill: Option<Color>,
    stroke: Option<Color>,
    font_color: Option<Color>,
    label_below: bool,
}

impl DocumentAttrs {
    /// Creates attributes for the given mxGraph `shape` value.
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            res_icon: None,
            fill: None,
            stroke: None,
            font_color: None,
            label_below: false,
        }
    }

    /// Sets the `resIcon` value. Icon shapes draw their label below the icon.
    pub fn with_res_icon(mut self, res_icon: impl Into<String>) -> Self {
        self.res_icon = Some(res_icon.into());
        self.label_below = true;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_stroke(mut self, stroke: Color) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn with_font_color(mut self, font_color: Color) -> Self {
        self.font_color = Some(font_color);
        self
    }

    pub fn with_label_below(mut self, label_below: bool) -> Self {
        self.label_below = label_below;
        self
    }

    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn res_icon(&self) -> Option<&str> {
        self.res_icon.as_deref()
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn stroke(&self) -> Option<Color> {
        self.stroke
    }

    pub fn font_color(&self) -> Option<Color> {
        self.font_color
    }

    pub fn label_below(&self) -> bool {
        self.label_below
    }

    /// Tag a document reader sees for this kind: the `resIcon` value when
    /// present, otherwise the `shape`.
    pub fn kind_tag(&self) -> &str {
        self.res_icon.as_deref().unwrap_or(&self.shape)
    }
}

/// Both backends' attributes for one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindStyle {
    raster: RasterAttrs,
    document: DocumentAttrs,
}

impl KindStyle {
    pub fn new(raster: RasterAttrs, document: DocumentAttrs) -> Self {
        Self { raster, document }
    }

    pub fn raster(&self) -> &RasterAttrs {
        &self.raster
    }

    pub fn document(&self) -> &DocumentAttrs {
        &self.document
    }
}

/// Appearance of a Container at one nesting depth.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerStyle {
    fill: Color,
    stroke: Color,
    text: Color,
    stroke_width: f32,
    stroke_style: StrokeStyle,
}

impl ContainerStyle {
    pub fn new(fill: Color, stroke: Color) -> Self {
        Self {
            fill,
            stroke,
            text: Color::default(),
            stroke_width: 1.0,
            stroke_style: StrokeStyle::Solid,
        }
    }

    pub fn with_text(mut self, text: Color) -> Self {
        self.text = text;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn with_stroke_style(mut self, stroke_style: StrokeStyle) -> Self {
        self.stroke_style = stroke_style;
        self
    }

    /// Applies a Container's own style on top of the depth bucket.
    ///
    /// A solid stroke in the override keeps the bucket's pattern, since solid
    /// is also the unset default.
    pub fn overridden_by(&self, style: Option<&Style>) -> Self {
        let Some(style) = style else {
            return self.clone();
        };
        Self {
            fill: style.fill_color().unwrap_or(self.fill),
            stroke: style.stroke_color().unwrap_or(self.stroke),
            text: style.color().unwrap_or(self.text),
            stroke_width: style.width().unwrap_or(self.stroke_width),
            stroke_style: if style.stroke().is_solid() {
                self.stroke_style.clone()
            } else {
                style.stroke().clone()
            },
        }
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn stroke(&self) -> Color {
        self.stroke
    }

    pub fn text(&self) -> Color {
        self.text
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn stroke_style(&self) -> &StrokeStyle {
        &self.stroke_style
    }
}

/// Immutable kind → style table with per-depth container buckets.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    kinds: IndexMap<Kind, KindStyle>,
    fallback: KindStyle,
    containers: Vec<ContainerStyle>,
}

impl StyleRegistry {
    /// Starts an empty registry that uses the built-in fallback style.
    pub fn builder() -> StyleRegistryBuilder {
        StyleRegistryBuilder::new(catalog::fallback())
    }

    /// Returns the style for `kind`, or the fallback when it is unregistered.
    pub fn resolve(&self, kind: &Kind) -> &KindStyle {
        self.kinds.get(kind).unwrap_or(&self.fallback)
    }

    pub fn is_registered(&self, kind: &Kind) -> bool {
        self.kinds.contains_key(kind)
    }

    pub fn fallback(&self) -> &KindStyle {
        &self.fallback
    }

    /// Returns the bucket for `depth`, clamped to the deepest bucket.
    pub fn container_style(&self, depth: usize) -> &ContainerStyle {
        let last = self.containers.len() - 1;
        &self.containers[depth.min(last)]
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &Kind> {
        self.kinds.keys()
    }

    /// Document kind tags for every Component in `schema`, deduplicated and
    /// in canonical traversal order. This is the expected list to hand to the
    /// structural validator for a completeness check.
    pub fn expected_kind_tags(&self, schema: &Schema) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for entity in schema.entities() {
            if let crate::schema::Entity::Component(component) = entity.entity() {
                let tag = self.resolve(component.kind()).document().kind_tag();
                if !tags.iter().any(|existing| existing == tag) {
                    tags.push(tag.to_string());
                }
            }
        }
        tags
    }
}

impl Default for StyleRegistry {
    /// The built-in cloud catalog: every [`Kind::BUILTIN`] variant mapped to
    /// an AWS-flavoured icon, with three container depth buckets.
    fn default() -> Self {
        let builder = Kind::BUILTIN
            .into_iter()
            .fold(Self::builder(), |builder, kind| {
                let style = catalog::builtin(&kind);
                builder.register(kind, style)
            });
        catalog::container_buckets()
            .into_iter()
            .fold(builder, StyleRegistryBuilder::container_bucket)
            .build()
    }
}

/// Assembles a [`StyleRegistry`].
#[derive(Debug, Clone)]
pub struct StyleRegistryBuilder {
    kinds: IndexMap<Kind, KindStyle>,
    fallback: KindStyle,
    containers: Vec<ContainerStyle>,
}

impl StyleRegistryBuilder {
    pub fn new(fallback: KindStyle) -> Self {
        Self {
            kinds: IndexMap::new(),
            fallback,
            containers: Vec::new(),
        }
    }

    /// Registers both backends' attributes for `kind`, replacing any earlier
    /// registration of the same kind.
    pub fn register(mut self, kind: Kind, style: KindStyle) -> Self {
        self.kinds.insert(kind, style);
        self
    }

    pub fn fallback(mut self, fallback: KindStyle) -> Self {
        self.fallback = fallback;
        self
    }

    /// Appends the bucket for the next nesting depth.
    pub fn container_bucket(mut self, style: ContainerStyle) -> Self {
        self.containers.push(style);
        self
    }

    pub fn build(self) -> StyleRegistry {
        let containers = if self.containers.is_empty() {
            catalog::container_buckets()
        } else {
            self.containers
        };
        StyleRegistry {
            kinds: self.kinds,
            fallback: self.fallback,
            containers,
        }
    }
}

mod catalog {
    use super::*;

    fn hex(value: &str) -> Color {
        Color::new(value).expect("built-in catalog colors are valid")
    }

    pub(super) fn fallback() -> KindStyle {
        KindStyle::new(
            RasterAttrs::new(RasterShape::RoundedRectangle, hex("#ffffff"), hex("#666666")),
            DocumentAttrs::new("rectangle")
                .with_fill(hex("#ffffff"))
                .with_stroke(hex("#666666")),
        )
    }

    pub(super) fn container_buckets() -> Vec<ContainerStyle> {
        vec![
            ContainerStyle::new(hex("#f7f8fa"), hex("#232f3e")).with_text(hex("#232f3e")),
            ContainerStyle::new(hex("#e6f2f8"), hex("#147eba"))
                .with_text(hex("#147eba"))
                .with_stroke_style(StrokeStyle::Dashed),
            ContainerStyle::new(hex("#f2f6e8"), hex("#7aa116"))
                .with_text(hex("#248814"))
                .with_stroke_style(StrokeStyle::Dashed),
        ]
    }

    /// Icon, category color and raster outline per built-in kind.
    pub(super) fn builtin(kind: &Kind) -> KindStyle {
        let (icon, color, shape) = match kind {
            Kind::Server => ("mxgraph.aws4.ec2", "#ed7100", RasterShape::Rectangle),
            Kind::Database => ("mxgraph.aws4.rds", "#c925d1", RasterShape::Cylinder),
            Kind::Queue => ("mxgraph.aws4.sqs", "#e7157b", RasterShape::Parallelogram),
            Kind::Cache => ("mxgraph.aws4.elasticache", "#c925d1", RasterShape::Cylinder),
            Kind::Storage => ("mxgraph.aws4.s3", "#7aa116", RasterShape::Cylinder),
            Kind::LoadBalancer => (
                "mxgraph.aws4.elastic_load_balancing",
                "#8c4fff",
                RasterShape::Hexagon,
            ),
            Kind::Gateway => ("mxgraph.aws4.api_gateway", "#e7157b", RasterShape::Hexagon),
            Kind::Function => ("mxgraph.aws4.lambda", "#ed7100", RasterShape::RoundedRectangle),
            Kind::Cdn => ("mxgraph.aws4.cloudfront", "#8c4fff", RasterShape::Ellipse),
            Kind::Dns => ("mxgraph.aws4.route_53", "#8c4fff", RasterShape::Ellipse),
            Kind::Firewall => ("mxgraph.aws4.waf", "#dd344c", RasterShape::Hexagon),
            Kind::Monitoring => ("mxgraph.aws4.cloudwatch", "#e7157b", RasterShape::RoundedRectangle),
            Kind::Service => (
                "mxgraph.aws4.elastic_container_service",
                "#ed7100",
                RasterShape::RoundedRectangle,
            ),
            Kind::Network => (
                "mxgraph.aws4.vpc_virtual_private_cloud_vpc",
                "#8c4fff",
                RasterShape::Rectangle,
            ),
            Kind::User => return standalone("mxgraph.aws4.user", RasterShape::Ellipse),
            Kind::Client => return standalone("mxgraph.aws4.client", RasterShape::RoundedRectangle),
            Kind::Other(_) => return fallback(),
        };

        let category = hex(color);
        KindStyle::new(
            RasterAttrs::new(shape, category.with_alpha(0.15), category),
            DocumentAttrs::new("mxgraph.aws4.resourceIcon")
                .with_res_icon(icon)
                .with_fill(category)
                .with_stroke(hex("#ffffff"))
                .with_font_color(hex("#232f3e")),
        )
    }

    /// Kinds whose mxGraph shape is itself the icon.
    fn standalone(shape_name: &str, shape: RasterShape) -> KindStyle {
        let ink = hex("#232f3e");
        KindStyle::new(
            RasterAttrs::new(shape, hex("#ffffff"), ink),
            DocumentAttrs::new(shape_name)
                .with_fill(ink)
                .with_font_color(ink)
                .with_label_below(true),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Component, Container};

    fn red() -> Color {
        Color::new("red").unwrap()
    }

    #[test]
    fn test_default_registry_covers_builtin_kinds() {
        let registry = StyleRegistry::default();
        for kind in Kind::BUILTIN {
            assert!(registry.is_registered(&kind), "{kind} not registered");
        }
        assert_eq!(
            registry.resolve(&Kind::Database).document().kind_tag(),
            "mxgraph.aws4.rds"
        );
        assert_eq!(
            registry.resolve(&Kind::User).document().kind_tag(),
            "mxgraph.aws4.user"
        );
    }

    #[test]
    fn test_unknown_kind_resolves_to_fallback() {
        let registry = StyleRegistry::default();
        let other = Kind::Other("mainframe".to_string());
        assert!(!registry.is_registered(&other));
        assert_eq!(registry.resolve(&other), registry.fallback());
    }

    #[test]
    fn test_register_replaces_previous_entry() {
        let first = KindStyle::new(
            RasterAttrs::new(RasterShape::Rectangle, red(), red()),
            DocumentAttrs::new("first"),
        );
        let second = KindStyle::new(
            RasterAttrs::new(RasterShape::Ellipse, red(), red()),
            DocumentAttrs::new("second"),
        );
        let registry = StyleRegistry::builder()
            .register(Kind::Server, first)
            .register(Kind::Server, second)
            .build();

        assert_eq!(registry.kinds().count(), 1);
        assert_eq!(registry.resolve(&Kind::Server).document().kind_tag(), "second");
        assert_eq!(registry.resolve(&Kind::Server).raster().shape(), RasterShape::Ellipse);
    }

    #[test]
    fn test_container_style_clamps_depth() {
        let shallow = ContainerStyle::new(red(), red());
        let deep = ContainerStyle::new(red(), red()).with_stroke_width(3.0);
        let registry = StyleRegistry::builder()
            .container_bucket(shallow.clone())
            .container_bucket(deep.clone())
            .build();

        assert_eq!(registry.container_style(0), &shallow);
        assert_eq!(registry.container_style(1), &deep);
        assert_eq!(registry.container_style(42), &deep);
    }

    #[test]
    fn test_build_without_buckets_uses_catalog_buckets() {
        let registry = StyleRegistry::builder().build();
        assert_eq!(registry.container_style(0), StyleRegistry::default().container_style(0));
    }

    #[test]
    fn test_container_override_merges_fields() {
        let bucket = ContainerStyle::new(red(), red()).with_stroke_style(StrokeStyle::Dashed);
        let style = Style::new()
            .with_fill_color(Color::new("blue").unwrap())
            .with_width(2.5);

        let merged = bucket.overridden_by(Some(&style));
        assert_eq!(merged.fill(), Color::new("blue").unwrap());
        assert_eq!(merged.stroke(), red());
        assert_eq!(merged.stroke_width(), 2.5);
        assert_eq!(merged.stroke_style(), &StrokeStyle::Dashed);
        assert_eq!(bucket.overridden_by(None), bucket);
    }

    #[test]
    fn test_expected_kind_tags_dedup_in_canonical_order() {
        let schema = Schema::new("tags")
            .with_component(Component::new("web", "server", "Web"))
            .with_container(
                Container::new("data", "Data")
                    .with_component(Component::new("db", "database", "DB"))
                    .with_component(Component::new("replica", "postgres", "Replica")),
            )
            .with_component(Component::new("legacy", "mainframe", "Legacy"));

        let tags = StyleRegistry::default().expected_kind_tags(&schema);
        assert_eq!(tags, vec!["mxgraph.aws4.rds", "mxgraph.aws4.ec2", "rectangle"]);
    }
}
