//! Deterministic grid layout.
//!
//! The [`Engine`] walks every scope (the Schema's top level and each
//! Container) and places the scope's direct children on a grid, left to
//! right and then top to bottom, wrapping when the next child would end past
//! the configured row width. Children are visited in canonical order:
//! Containers first, then Components, each in declaration order.
//!
//! Containers are sized innermost-first. A Container's size is its explicit
//! size expanded to its children's extent plus the margin, or a default size
//! when it has no children. A header band for the Container's label is
//! reserved above the first row.
//!
//! Layout does not fail on bad geometry. Non-positive, non-finite or huge
//! sizes and positions outside the parent's content area are clamped, and
//! each clamp is recorded as a [`Diagnostic`] on the resulting [`Layout`].

use std::{collections::HashMap, fmt};

use indexmap::IndexMap;
use log::{debug, info, warn};

use infragram_core::{
    error::ConstructionError,
    geometry::{Bounds, Point, Size},
    identifier::Id,
    schema::{Component, Container, Entity, Schema},
};

use crate::config::LayoutConfig;

/// Largest coordinate or length the engine places.
pub const MAX_COORDINATE: f32 = 1.0e6;

/// What a placed entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Component,
    Container,
}

/// Geometry assigned to one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    parent: Option<Id>,
    depth: usize,
    relative: Bounds,
    absolute: Bounds,
    role: Role,
}

impl Placement {
    /// Enclosing Container, `None` at top level.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bounds relative to the enclosing Container's top-left corner.
    pub fn relative(&self) -> Bounds {
        self.relative
    }

    /// Bounds in canvas coordinates.
    pub fn absolute(&self) -> Bounds {
        self.absolute
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Category of a non-fatal layout problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A zero, negative or non-finite size was raised to the minimum.
    DegenerateSize,
    /// A non-finite coordinate was replaced with the scope's origin.
    NonFinitePosition,
    /// A position left of or above the parent's content area, or beyond
    /// [`MAX_COORDINATE`], was moved into range.
    OutOfRange,
}

/// A geometry correction applied during layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    entity: Id,
    kind: DiagnosticKind,
    message: String,
}

impl Diagnostic {
    pub fn entity(&self) -> Id {
        self.entity
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.entity, self.message)
    }
}

/// Result of laying out a Schema.
///
/// Placements are stored in canonical traversal order, so iterating them
/// visits every Container before its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    placements: IndexMap<Id, Placement>,
    extent: Size,
    diagnostics: Vec<Diagnostic>,
}

impl Layout {
    pub fn get(&self, id: Id) -> Option<&Placement> {
        self.placements.get(&id)
    }

    pub fn placements(&self) -> impl Iterator<Item = (Id, &Placement)> {
        self.placements.iter().map(|(id, placement)| (*id, placement))
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Size of the laid-out content including the outer margin.
    pub fn extent(&self) -> Size {
        self.extent
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns a copy of `schema` with every Position and Size made explicit.
    ///
    /// Laying out the returned Schema again yields the same placements.
    pub fn apply(&self, schema: &Schema) -> Schema {
        schema.with_geometry(|id| {
            self.get(id).map(|placement| {
                let relative = placement.relative();
                (relative.min_point(), relative.to_size())
            })
        })
    }
}

/// Grid layout engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: LayoutConfig,
}

struct State {
    relative: HashMap<Id, Bounds>,
    diagnostics: Vec<Diagnostic>,
}

impl Engine {
    /// Creates an engine; unusable config values fall back to defaults.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    /// Lays out every entity of `schema`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] if the Schema has duplicate or empty
    /// ids. Geometry problems never fail; see [`Layout::diagnostics`].
    pub fn calculate(&self, schema: &Schema) -> Result<Layout, ConstructionError> {
        let index = schema.index()?;
        let margin = self.config.margin();

        let mut state = State {
            relative: HashMap::with_capacity(index.len()),
            diagnostics: Vec::new(),
        };
        let content = self.place_scope(schema.containers(), schema.components(), margin, &mut state);
        let (right, bottom) = content.map_or((0.0, 0.0), |union| (union.max_x(), union.max_y()));
        let extent = Size::new(
            (right + margin).max(margin * 2.0),
            (bottom + margin).max(margin * 2.0),
        );

        // Canonical order puts every Container before its subtree, so the
        // parent's absolute bounds are always known when a child is reached.
        let mut placements: IndexMap<Id, Placement> = IndexMap::with_capacity(index.len());
        for entity in index.iter() {
            let id = entity.id();
            let Some(relative) = state.relative.get(&id).copied() else {
                continue;
            };
            let offset = entity
                .parent()
                .and_then(|parent| placements.get(&parent))
                .map(|parent| parent.absolute.min_point())
                .unwrap_or_default();
            let role = match entity.entity() {
                Entity::Component(_) => Role::Component,
                Entity::Container(_) => Role::Container,
            };
            placements.insert(
                id,
                Placement {
                    parent: entity.parent(),
                    depth: entity.depth(),
                    relative,
                    absolute: relative.translate(offset),
                    role,
                },
            );
        }

        info!(
            entities = placements.len(),
            diagnostics = state.diagnostics.len();
            "Layout calculated"
        );

        Ok(Layout {
            placements,
            extent,
            diagnostics: state.diagnostics,
        })
    }

    /// Places one scope's children and returns the union of their bounds,
    /// or `None` for an empty scope.
    ///
    /// Children never start left of `margin` or above `top`, so the union
    /// lies inside the scope's content area.
    fn place_scope(
        &self,
        containers: &[Container],
        components: &[Component],
        top: f32,
        state: &mut State,
    ) -> Option<Bounds> {
        let margin = self.config.margin();
        let origin = Point::new(margin, top);
        let mut children: Vec<(Id, Size, Option<Point>)> =
            Vec::with_capacity(containers.len() + components.len());

        for container in containers {
            let size = self.size_container(container, state);
            let position = self.sanitize_position(container.id(), container.position(), origin, state);
            children.push((container.id(), size, position));
        }
        for component in components {
            let size = self
                .sanitize_size(component.id(), component.size(), state)
                .unwrap_or(self.config.component_size());
            let position = self.sanitize_position(component.id(), component.position(), origin, state);
            children.push((component.id(), size, position));
        }

        let spacing = self.config.spacing();
        let mut cursor = origin;
        let mut row_height = 0.0f32;
        let mut union: Option<Bounds> = None;

        for (id, size, explicit) in children {
            let position = match explicit {
                Some(position) => position,
                None => {
                    if cursor.x() > margin && cursor.x() + size.width() > self.config.max_row_width()
                    {
                        cursor = Point::new(margin, cursor.y() + row_height + spacing);
                        row_height = 0.0;
                    }
                    let position = cursor;
                    cursor = Point::new(cursor.x() + size.width() + spacing, cursor.y());
                    row_height = row_height.max(size.height());
                    position
                }
            };

            let bounds = position.to_bounds(size);
            debug!(entity:% = id, x = bounds.min_x(), y = bounds.min_y(); "Placed entity");
            state.relative.insert(id, bounds);

            union = Some(match union {
                Some(union) => union.merge(&bounds),
                None => bounds,
            });
        }

        union
    }

    fn size_container(&self, container: &Container, state: &mut State) -> Size {
        let explicit = self.sanitize_size(container.id(), container.size(), state);
        let top = self.config.margin() + self.config.header_height();

        match self.place_scope(container.containers(), container.components(), top, state) {
            None => explicit.unwrap_or(self.config.empty_container_size()),
            Some(union) => {
                let margin = self.config.margin();
                let min = self.config.min_size();
                let required = Size::new(
                    (union.max_x() + margin).max(min),
                    (union.max_y() + margin).max(min),
                );
                explicit.map_or(required, |size| size.max(required))
            }
        }
    }

    fn sanitize_size(&self, id: Id, size: Option<Size>, state: &mut State) -> Option<Size> {
        let size = size?;
        let in_range = |value: f32| value <= MAX_COORDINATE;
        if size.is_positive() && in_range(size.width()) && in_range(size.height()) {
            return Some(size);
        }

        let min = self.config.min_size();
        let clamp = |value: f32| {
            if value.is_finite() && value > 0.0 {
                value.min(MAX_COORDINATE)
            } else {
                min
            }
        };
        let clamped = Size::new(clamp(size.width()), clamp(size.height()));
        self.report(
            state,
            id,
            DiagnosticKind::DegenerateSize,
            format!(
                "size {}x{} clamped to {}x{}",
                size.width(),
                size.height(),
                clamped.width(),
                clamped.height()
            ),
        );
        Some(clamped)
    }

    /// Keeps an explicit position inside the rectangle from `origin` to
    /// [`MAX_COORDINATE`] on both axes.
    fn sanitize_position(
        &self,
        id: Id,
        position: Option<Point>,
        origin: Point,
        state: &mut State,
    ) -> Option<Point> {
        let mut position = position?;
        if !position.is_finite() {
            let finite = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
            let replaced = Point::new(finite(position.x(), origin.x()), finite(position.y(), origin.y()));
            self.report(
                state,
                id,
                DiagnosticKind::NonFinitePosition,
                format!(
                    "position ({}, {}) replaced with ({}, {})",
                    position.x(),
                    position.y(),
                    replaced.x(),
                    replaced.y()
                ),
            );
            position = replaced;
        }

        let clamped = Point::new(
            position.x().clamp(origin.x(), MAX_COORDINATE.max(origin.x())),
            position.y().clamp(origin.y(), MAX_COORDINATE.max(origin.y())),
        );
        if clamped != position {
            self.report(
                state,
                id,
                DiagnosticKind::OutOfRange,
                format!(
                    "position ({}, {}) moved to ({}, {})",
                    position.x(),
                    position.y(),
                    clamped.x(),
                    clamped.y()
                ),
            );
        }
        Some(clamped)
    }

    fn report(&self, state: &mut State, entity: Id, kind: DiagnosticKind, message: String) {
        warn!(entity:% = entity, kind:? = kind; "Layout corrected geometry: {message}");
        state.diagnostics.push(Diagnostic {
            entity,
            kind,
            message,
        });
    }
}
