//! Diagram intermediate representation.
//!
//! A [`Schema`] owns every entity of a diagram: top-level [`Component`]s,
//! recursively nested [`Container`]s and the [`Connection`]s between them.
//! It is built once, either through the builder methods below or by
//! deserialising a TOML/JSON description, and is read-only afterwards.
//!
//! Entity ids share one flat namespace regardless of nesting depth. That
//! invariant is not checked at construction; it is checked by
//! [`Schema::index`], which every layout and render pass calls first.
//!
//! # Example
//!
//! ```
//! use infragram_core::schema::{Component, Connection, Container, Schema};
//!
//! let schema = Schema::new("Checkout")
//!     .with_container(
//!         Container::new("vpc", "VPC")
//!             .with_component(Component::new("api", "service", "API"))
//!             .with_component(Component::new("db", "database", "Orders DB")),
//!     )
//!     .with_connection(Connection::new("api", "db").with_label("SQL"));
//!
//! let index = schema.index().unwrap();
//! assert_eq!(index.len(), 3);
//! assert_eq!(index.get("db".into()).unwrap().depth(), 1);
//! ```

use std::{convert::Infallible, fmt, str::FromStr};

use indexmap::{IndexMap, map::Entry};
use log::debug;
use serde::Deserialize;

use crate::{
    color::Color,
    error::ConstructionError,
    geometry::{Point, Size},
    identifier::Id,
    kind::Kind,
    stroke::StrokeStyle,
};

/// Category of the whole diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum DiagramKind {
    #[default]
    Architecture,
    Network,
    Deployment,
    DataFlow,
    Other(String),
}

impl FromStr for DiagramKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "architecture" => Self::Architecture,
            "network" => Self::Network,
            "deployment" => Self::Deployment,
            "dataflow" | "data_flow" | "data-flow" => Self::DataFlow,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl From<String> for DiagramKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Architecture => f.write_str("architecture"),
            Self::Network => f.write_str("network"),
            Self::Deployment => f.write_str("deployment"),
            Self::DataFlow => f.write_str("dataflow"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Visual override for a Connection or a Container.
///
/// Every field is optional; unset fields fall back to the registry or the
/// renderer's defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Style {
    color: Option<Color>,
    stroke_color: Option<Color>,
    fill_color: Option<Color>,
    width: Option<f32>,
    stroke: StrokeStyle,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text/font color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_stroke_color(mut self, color: Color) -> Self {
        self.stroke_color = Some(color);
        self
    }

    pub fn with_fill_color(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    /// Stroke width in pixels.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn stroke_color(&self) -> Option<Color> {
        self.stroke_color
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.fill_color
    }

    pub fn width(&self) -> Option<f32> {
        self.width
    }

    pub fn stroke(&self) -> &StrokeStyle {
        &self.stroke
    }
}

/// Drawing surface settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Canvas {
    width: f32,
    height: f32,
    grid_size: u32,
    background: Option<Color>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            grid_size: 10,
            background: None,
        }
    }
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }
}

/// Which artifacts the producer asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSet {
    raster: bool,
    document: bool,
}

impl Default for OutputSet {
    fn default() -> Self {
        Self::both()
    }
}

impl OutputSet {
    pub fn both() -> Self {
        Self {
            raster: true,
            document: true,
        }
    }

    pub fn raster_only() -> Self {
        Self {
            raster: true,
            document: false,
        }
    }

    pub fn document_only() -> Self {
        Self {
            raster: false,
            document: true,
        }
    }

    pub fn raster(&self) -> bool {
        self.raster
    }

    pub fn document(&self) -> bool {
        self.document
    }

    pub fn is_empty(&self) -> bool {
        !self.raster && !self.document
    }
}

/// Leaf entity of the diagram.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Component {
    id: Id,
    kind: Kind,
    #[serde(default)]
    label: String,
    #[serde(default)]
    position: Option<Point>,
    #[serde(default)]
    size: Option<Size>,
    #[serde(default)]
    metadata: IndexMap<String, String>,
}

impl Component {
    /// Creates a component; `kind` is mapped to a [`Kind`] variant here.
    pub fn new(id: impl Into<Id>, kind: impl Into<Kind>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: label.into(),
            position: None,
            size: None,
            metadata: IndexMap::new(),
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn metadata(&self) -> &IndexMap<String, String> {
        &self.metadata
    }

    fn set_geometry(&mut self, position: Point, size: Size) {
        self.position = Some(position);
        self.size = Some(size);
    }
}

/// Grouping entity; owns its nested subtree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Container {
    id: Id,
    #[serde(default)]
    label: String,
    #[serde(default)]
    position: Option<Point>,
    #[serde(default)]
    size: Option<Size>,
    #[serde(default)]
    components: Vec<Component>,
    #[serde(default)]
    containers: Vec<Container>,
    #[serde(default)]
    style: Option<Style>,
}

impl Container {
    pub fn new(id: impl Into<Id>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            position: None,
            size: None,
            components: Vec::new(),
            containers: Vec::new(),
            style: None,
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.containers.push(container);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.containers.is_empty()
    }

    fn set_geometry(&mut self, position: Point, size: Size) {
        self.position = Some(position);
        self.size = Some(size);
    }
}

/// Directed edge between two entity ids.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Connection {
    source: Id,
    target: Id,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    style: Option<Style>,
}

impl Connection {
    pub fn new(source: impl Into<Id>, target: impl Into<Id>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
            style: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }
}

/// The whole diagram.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Schema {
    title: String,
    kind: DiagramKind,
    canvas: Canvas,
    outputs: OutputSet,
    components: Vec<Component>,
    containers: Vec<Container>,
    connections: Vec<Connection>,
}

impl Schema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: DiagramKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_outputs(mut self, outputs: OutputSet) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.containers.push(container);
        self
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> &DiagramKind {
        &self.kind
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn outputs(&self) -> OutputSet {
        self.outputs
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Visits every entity in canonical order: within each scope the child
    /// Containers come first (each followed by its own subtree), then the
    /// scope's Components.
    pub fn entities(&self) -> Vec<EntityRef<'_>> {
        let mut out = Vec::new();
        collect_scope(&self.containers, &self.components, None, 0, &mut out);
        out
    }

    /// Builds the flat id index, rejecting empty and duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::DuplicateId`] when two entities share an
    /// id, even if they live in different Containers, and
    /// [`ConstructionError::EmptyId`] for an entity without an id.
    pub fn index(&self) -> Result<SchemaIndex<'_>, ConstructionError> {
        let mut entries = IndexMap::new();
        for entity in self.entities() {
            let id = entity.id();
            if id.is_empty() {
                return Err(ConstructionError::EmptyId {
                    label: entity.label().to_string(),
                });
            }
            match entries.entry(id) {
                Entry::Occupied(_) => return Err(ConstructionError::DuplicateId(id)),
                Entry::Vacant(slot) => {
                    slot.insert(entity);
                }
            }
        }
        debug!(entities = entries.len(), connections = self.connections.len(); "Schema indexed");
        Ok(SchemaIndex { entries })
    }

    /// Returns a copy of the schema with explicit geometry written onto
    /// every entity for which `lookup` yields a position and size.
    pub fn with_geometry(&self, mut lookup: impl FnMut(Id) -> Option<(Point, Size)>) -> Schema {
        fn visit(
            containers: &mut [Container],
            components: &mut [Component],
            lookup: &mut impl FnMut(Id) -> Option<(Point, Size)>,
        ) {
            for container in containers.iter_mut() {
                if let Some((position, size)) = lookup(container.id) {
                    container.set_geometry(position, size);
                }
                visit(&mut container.containers, &mut container.components, lookup);
            }
            for component in components.iter_mut() {
                if let Some((position, size)) = lookup(component.id) {
                    component.set_geometry(position, size);
                }
            }
        }

        let mut schema = self.clone();
        visit(&mut schema.containers, &mut schema.components, &mut lookup);
        schema
    }
}

fn collect_scope<'a>(
    containers: &'a [Container],
    components: &'a [Component],
    parent: Option<Id>,
    depth: usize,
    out: &mut Vec<EntityRef<'a>>,
) {
    for container in containers {
        out.push(EntityRef {
            entity: Entity::Container(container),
            parent,
            depth,
        });
        collect_scope(
            &container.containers,
            &container.components,
            Some(container.id),
            depth + 1,
            out,
        );
    }
    for component in components {
        out.push(EntityRef {
            entity: Entity::Component(component),
            parent,
            depth,
        });
    }
}

/// Borrowed view of either entity type.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Component(&'a Component),
    Container(&'a Container),
}

impl Entity<'_> {
    pub fn id(&self) -> Id {
        match self {
            Self::Component(component) => component.id,
            Self::Container(container) => container.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Component(component) => &component.label,
            Self::Container(container) => &container.label,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Component(component) => component.position,
            Self::Container(container) => container.position,
        }
    }

    pub fn size(&self) -> Option<Size> {
        match self {
            Self::Component(component) => component.size,
            Self::Container(container) => container.size,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }
}

/// An entity together with its place in the nesting tree.
#[derive(Debug, Clone, Copy)]
pub struct EntityRef<'a> {
    entity: Entity<'a>,
    parent: Option<Id>,
    depth: usize,
}

impl<'a> EntityRef<'a> {
    pub fn entity(&self) -> Entity<'a> {
        self.entity
    }

    pub fn id(&self) -> Id {
        self.entity.id()
    }

    pub fn label(&self) -> &'a str {
        match self.entity {
            Entity::Component(component) => &component.label,
            Entity::Container(container) => &container.label,
        }
    }

    /// Enclosing Container id, `None` at top level.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Nesting depth; top-level entities are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Flat id → entity lookup over a validated Schema, in canonical order.
#[derive(Debug)]
pub struct SchemaIndex<'a> {
    entries: IndexMap<Id, EntityRef<'a>>,
}

impl<'a> SchemaIndex<'a> {
    pub fn get(&self, id: Id) -> Option<&EntityRef<'a>> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRef<'a>> {
        self.entries.values()
    }

    /// Returns the first endpoint of `connection` that is not in the index.
    pub fn missing_endpoint(&self, connection: &Connection) -> Option<Id> {
        [connection.source, connection.target]
            .into_iter()
            .find(|id| !self.contains(*id))
    }

    /// Strict variant of connection resolution used when dangling
    /// connections must be rejected instead of skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::DanglingConnection`] for the first
    /// connection with an unknown endpoint.
    pub fn check_connections(&self, connections: &[Connection]) -> Result<(), ConstructionError> {
        for (index, connection) in connections.iter().enumerate() {
            if let Some(missing) = self.missing_endpoint(connection) {
                return Err(ConstructionError::DanglingConnection {
                    index,
                    source_id: connection.source,
                    target_id: connection.target,
                    missing,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_schema() -> Schema {
        Schema::new("nested")
            .with_component(Component::new("user", "user", "User"))
            .with_container(
                Container::new("vpc", "VPC")
                    .with_component(Component::new("lb", "lb", "LB"))
                    .with_container(
                        Container::new("private", "Private subnet")
                            .with_component(Component::new("db", "db", "DB")),
                    ),
            )
            .with_connection(Connection::new("user", "lb"))
            .with_connection(Connection::new("lb", "db"))
    }

    #[test]
    fn test_entities_canonical_order() {
        let schema = nested_schema();
        let ids: Vec<String> = schema.entities().iter().map(|e| e.id().to_string()).collect();
        assert_eq!(ids, vec!["vpc", "private", "db", "lb", "user"]);
    }

    #[test]
    fn test_entities_parent_and_depth() {
        let schema = nested_schema();
        let index = schema.index().unwrap();

        let db = index.get("db".into()).unwrap();
        assert_eq!(db.depth(), 2);
        assert_eq!(db.parent(), Some(Id::new("private")));

        let user = index.get("user".into()).unwrap();
        assert_eq!(user.depth(), 0);
        assert_eq!(user.parent(), None);
    }

    #[test]
    fn test_index_rejects_duplicates_across_containers() {
        let schema = Schema::new("dup")
            .with_container(Container::new("a", "A").with_component(Component::new("x", "server", "")))
            .with_container(Container::new("b", "B").with_component(Component::new("x", "server", "")));

        assert_eq!(
            schema.index().unwrap_err(),
            ConstructionError::DuplicateId(Id::new("x"))
        );
    }

    #[test]
    fn test_index_rejects_container_component_clash() {
        let schema = Schema::new("dup")
            .with_container(Container::new("api", "API"))
            .with_component(Component::new("api", "service", "API"));
        assert!(matches!(
            schema.index(),
            Err(ConstructionError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_index_rejects_empty_id() {
        let schema = Schema::new("empty").with_component(Component::new("", "server", "Nameless"));
        assert!(matches!(
            schema.index(),
            Err(ConstructionError::EmptyId { .. })
        ));
    }

    #[test]
    fn test_check_connections_reports_missing_endpoint() {
        let schema = nested_schema().with_connection(Connection::new("lb", "z"));
        let index = schema.index().unwrap();

        let err = index.check_connections(schema.connections()).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::DanglingConnection {
                index: 2,
                source_id: Id::new("lb"),
                target_id: Id::new("z"),
                missing: Id::new("z"),
            }
        );
    }

    #[test]
    fn test_connection_may_target_container() {
        let schema = nested_schema().with_connection(Connection::new("user", "vpc"));
        let index = schema.index().unwrap();
        assert!(index.check_connections(schema.connections()).is_ok());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let source = r##"
            title = "Shop"
            kind = "network"

            [canvas]
            width = 800
            height = 600
            grid_size = 20
            background = "#fafafa"

            [outputs]
            raster = false

            [[components]]
            id = "web"
            kind = "Server"
            label = "Web"
            metadata = { team = "storefront" }

            [[containers]]
            id = "data"
            label = "Data tier"
            style = { fill_color = "lightblue", stroke = "dashed" }

            [[containers.components]]
            id = "db"
            kind = "postgres"
            label = "DB"
            position = { x = 10, y = 20 }

            [[connections]]
            source = "web"
            target = "db"
            label = "reads"
        "##;

        let schema: Schema = toml::from_str(source).unwrap();
        assert_eq!(schema.title(), "Shop");
        assert_eq!(schema.kind(), &DiagramKind::Network);
        assert_eq!(schema.canvas().grid_size(), 20);
        assert!(!schema.outputs().raster());
        assert!(schema.outputs().document());
        assert_eq!(schema.components()[0].kind(), &Kind::Server);
        assert_eq!(schema.components()[0].metadata()["team"], "storefront");

        let container = &schema.containers()[0];
        assert_eq!(container.style().unwrap().stroke(), &StrokeStyle::Dashed);
        let db = &container.components()[0];
        assert_eq!(db.kind(), &Kind::Database);
        assert_eq!(db.position(), Some(Point::new(10.0, 20.0)));
        assert_eq!(schema.connections()[0].label(), Some("reads"));
    }
}
