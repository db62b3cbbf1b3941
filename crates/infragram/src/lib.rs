//! Infragram - infrastructure diagrams rendered to PNG and draw.io from one
//! layout.
//!
//! A [`Schema`](schema::Schema) describes Components, nested Containers and
//! the Connections between them. [`DiagramBuilder`] lays the Schema out once
//! and hands the same [`Layout`](layout::Layout) to both backends, so the
//! PNG and the draw.io document always show the same nodes and edges. The
//! emitted document can be checked on its own with [`validate::validate`].
//!
//! ```
//! use infragram::{
//!     DiagramBuilder,
//!     schema::{Component, Connection, Container, Schema},
//!     validate::validate,
//! };
//!
//! let schema = Schema::new("Checkout")
//!     .with_container(
//!         Container::new("vpc", "VPC")
//!             .with_component(Component::new("api", "service", "API"))
//!             .with_component(Component::new("db", "database", "Orders")),
//!     )
//!     .with_connection(Connection::new("api", "db").with_label("SQL"));
//!
//! let builder = DiagramBuilder::default();
//! let layout = builder.layout(&schema).unwrap();
//! let document = builder.render_document(&schema, &layout).unwrap();
//!
//! let expected = builder.expected_kind_tags(&schema);
//! let report = validate(document.xml(), Some(expected.as_slice()));
//! assert!(report.valid());
//! assert_eq!(report.completeness().unwrap().percentage(), 100.0);
//! ```

pub mod config;
pub mod export;
pub mod layout;
pub mod manifest;
pub mod validate;
pub mod xml;

mod error;

pub use infragram_core::{color, geometry, identifier, kind, registry, schema, stroke};

pub use error::InfragramError;

use log::{debug, info, trace};

use infragram_core::{registry::StyleRegistry, schema::Schema};

use config::{AppConfig, DanglingPolicy};
use export::{
    RenderStyle, Renderer,
    document::{DocumentOutput, DocumentRenderer},
    raster::{RasterOutput, RasterRenderer},
};
use layout::{Engine, Layout};

/// Lays out and renders Schemas with one configuration and style registry.
///
/// The builder holds no per-render state; one instance can serve any number
/// of Schemas, from any number of threads.
///
/// # Examples
///
/// ```
/// use infragram::{
///     DiagramBuilder,
///     config::AppConfig,
///     schema::{Component, OutputSet, Schema},
/// };
///
/// let schema = Schema::new("Single")
///     .with_outputs(OutputSet::document_only())
///     .with_component(Component::new("web", "server", "Web"));
///
/// let rendered = DiagramBuilder::new(AppConfig::default())
///     .render(&schema)
///     .unwrap();
/// assert!(rendered.raster().is_none());
/// assert!(rendered.document().is_some());
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
    registry: StyleRegistry,
}

impl DiagramBuilder {
    /// Creates a builder using the built-in style catalog.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            registry: StyleRegistry::default(),
        }
    }

    /// Replaces the style registry.
    pub fn with_registry(mut self, registry: StyleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Parses a TOML schema document.
    ///
    /// # Errors
    ///
    /// Returns [`InfragramError::Parse`] with the source attached when the
    /// text is not a valid schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use infragram::DiagramBuilder;
    ///
    /// let source = r#"
    ///     title = "Minimal"
    ///
    ///     [[components]]
    ///     id = "web"
    ///     kind = "server"
    /// "#;
    /// let schema = DiagramBuilder::default().parse(source).unwrap();
    /// assert_eq!(schema.components().len(), 1);
    /// ```
    pub fn parse(&self, source: &str) -> Result<Schema, InfragramError> {
        info!("Parsing schema");

        let schema: Schema =
            toml::from_str(source).map_err(|err| InfragramError::new_parse_error(err, source))?;

        debug!(
            title = schema.title(),
            connections = schema.connections().len();
            "Schema parsed successfully"
        );
        trace!(schema:? = schema; "Parsed schema");

        Ok(schema)
    }

    /// Indexes the Schema and computes its layout.
    ///
    /// # Errors
    ///
    /// Returns [`InfragramError::Construction`] for duplicate or empty ids,
    /// and for dangling Connections when the dangling policy is
    /// [`DanglingPolicy::Reject`].
    pub fn layout(&self, schema: &Schema) -> Result<Layout, InfragramError> {
        if self.config.dangling() == DanglingPolicy::Reject {
            schema.index()?.check_connections(schema.connections())?;
        }

        let layout = Engine::new(self.config.layout().clone()).calculate(schema)?;
        debug!(
            entities = layout.len(),
            diagnostics = layout.diagnostics().len();
            "Layout ready for rendering"
        );
        Ok(layout)
    }

    /// Renders the PNG backend for an already laid-out Schema.
    ///
    /// # Errors
    ///
    /// Returns [`InfragramError::Config`] for an invalid style color, or
    /// [`InfragramError::Raster`] if rasterisation fails.
    pub fn render_raster(&self, schema: &Schema, layout: &Layout) -> Result<RasterOutput, InfragramError> {
        let style = self.render_style()?;
        let renderer = RasterRenderer::new(
            &self.registry,
            &style,
            self.config.raster().clone(),
            self.config.layout().header_height(),
        );
        Ok(renderer.render(schema, layout)?)
    }

    /// Renders the draw.io backend for an already laid-out Schema.
    ///
    /// # Errors
    ///
    /// Returns [`InfragramError::Config`] for an invalid style color, or
    /// [`InfragramError::Serialization`] if text cannot be written as XML.
    pub fn render_document(
        &self,
        schema: &Schema,
        layout: &Layout,
    ) -> Result<DocumentOutput, InfragramError> {
        let style = self.render_style()?;
        let renderer = DocumentRenderer::new(&self.registry, &style, self.config.document().clone());
        Ok(renderer.render(schema, layout)?)
    }

    /// Lays the Schema out once and runs every backend its output set asks for.
    ///
    /// # Errors
    ///
    /// Returns the first error from layout or from either backend.
    pub fn render(&self, schema: &Schema) -> Result<Rendered, InfragramError> {
        let outputs = schema.outputs();
        info!(
            title = schema.title(),
            raster = outputs.raster(),
            document = outputs.document();
            "Rendering diagram"
        );

        let layout = self.layout(schema)?;
        let raster = if outputs.raster() {
            Some(self.render_raster(schema, &layout)?)
        } else {
            None
        };
        let document = if outputs.document() {
            Some(self.render_document(schema, &layout)?)
        } else {
            None
        };

        Ok(Rendered {
            layout,
            raster,
            document,
        })
    }

    /// Kind tags the Schema's Components will carry in the draw.io document.
    pub fn expected_kind_tags(&self, schema: &Schema) -> Vec<String> {
        expected_kind_tags(schema, &self.registry)
    }

    fn render_style(&self) -> Result<RenderStyle, InfragramError> {
        RenderStyle::from_config(self.config.style()).map_err(InfragramError::Config)
    }
}

/// Artifacts of one [`DiagramBuilder::render`] call.
#[derive(Debug)]
pub struct Rendered {
    layout: Layout,
    raster: Option<RasterOutput>,
    document: Option<DocumentOutput>,
}

impl Rendered {
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn raster(&self) -> Option<&RasterOutput> {
        self.raster.as_ref()
    }

    pub fn document(&self) -> Option<&DocumentOutput> {
        self.document.as_ref()
    }
}

/// Kind tags of the Schema's Components under `registry`, deduplicated in
/// canonical order. This is the expected list for [`validate::validate`].
pub fn expected_kind_tags(schema: &Schema, registry: &StyleRegistry) -> Vec<String> {
    registry.expected_kind_tags(schema)
}

#[cfg(test)]
mod tests {
    use infragram_core::schema::{Component, Connection, OutputSet};

    use super::*;
    use crate::config::{DocumentConfig, LayoutConfig, RasterConfig, StyleConfig};

    fn dangling_schema() -> Schema {
        Schema::new("dangling")
            .with_outputs(OutputSet::document_only())
            .with_component(Component::new("a", "server", "A"))
            .with_connection(Connection::new("a", "z"))
    }

    #[test]
    fn test_skip_policy_renders_without_edge() {
        let rendered = DiagramBuilder::default().render(&dangling_schema()).unwrap();
        let document = rendered.document().unwrap();
        assert!(document.manifest().edges().is_empty());
        assert_eq!(document.manifest().skipped().len(), 1);
    }

    #[test]
    fn test_reject_policy_fails() {
        let config = AppConfig::default().with_dangling(DanglingPolicy::Reject);
        let result = DiagramBuilder::new(config).render(&dangling_schema());
        assert!(matches!(result, Err(InfragramError::Construction(_))));
    }

    #[test]
    fn test_duplicate_id_is_construction_error() {
        let schema = Schema::new("dup")
            .with_component(Component::new("a", "server", "A"))
            .with_component(Component::new("a", "database", "B"));
        let result = DiagramBuilder::default().layout(&schema);
        assert!(matches!(result, Err(InfragramError::Construction(_))));
    }

    #[test]
    fn test_invalid_style_color_is_config_error() {
        let style: StyleConfig = toml::from_str(r#"edge_color = "not-a-color""#).unwrap();
        let config = AppConfig::new(
            LayoutConfig::default(),
            style,
            RasterConfig::default(),
            DocumentConfig::default(),
        );
        let builder = DiagramBuilder::new(config);
        let schema = Schema::new("s").with_component(Component::new("a", "server", "A"));
        let layout = builder.layout(&schema).unwrap();

        let result = builder.render_document(&schema, &layout);
        assert!(matches!(result, Err(InfragramError::Config(_))));
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let source = "title = \"broken\"\n[[components]\nid = \"web\"\n";
        match DiagramBuilder::default().parse(source) {
            Err(InfragramError::Parse { src, err }) => {
                assert_eq!(src, source);
                assert!(err.span().is_some());
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_output_set_renders_nothing() {
        let schema = Schema::new("none")
            .with_outputs(toml::from_str("raster = false\ndocument = false").unwrap())
            .with_component(Component::new("a", "server", "A"));
        let rendered = DiagramBuilder::default().render(&schema).unwrap();
        assert!(rendered.raster().is_none());
        assert!(rendered.document().is_none());
        assert_eq!(rendered.layout().len(), 1);
    }
}
