//! Configuration types for Infragram rendering.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out, styled and serialised. All types implement
//! [`serde::Deserialize`] with per-field defaults, so a configuration file
//! only needs to name the settings it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`LayoutConfig`] - Grid spacing, margins and default sizes.
//! - [`StyleConfig`] - Background, edge color, routing and font settings.
//! - [`RasterConfig`] - PNG scale factor and font loading.
//! - [`DocumentConfig`] - Generated id prefix, edge label mode and timestamp.
//!
//! # Example
//!
//! ```
//! # use infragram::config::{AppConfig, EdgeRouting};
//! let config: AppConfig = toml::from_str(r#"
//!     dangling = "reject"
//!
//!     [layout]
//!     spacing = 60
//!
//!     [style]
//!     edge_routing = "orthogonal"
//! "#).unwrap();
//!
//! assert_eq!(config.layout().spacing(), 60.0);
//! assert_eq!(config.style().edge_routing(), EdgeRouting::Orthogonal);
//! assert_eq!(config.layout().margin(), 20.0);
//! ```

use log::warn;
use serde::Deserialize;

use infragram_core::{color::Color, geometry::Size};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// What to do with connections whose endpoints do not exist.
    #[serde(default)]
    dangling: DanglingPolicy,

    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    raster: RasterConfig,

    #[serde(default)]
    document: DocumentConfig,
}

impl AppConfig {
    pub fn new(
        layout: LayoutConfig,
        style: StyleConfig,
        raster: RasterConfig,
        document: DocumentConfig,
    ) -> Self {
        Self {
            dangling: DanglingPolicy::default(),
            layout,
            style,
            raster,
            document,
        }
    }

    pub fn with_dangling(mut self, dangling: DanglingPolicy) -> Self {
        self.dangling = dangling;
        self
    }

    pub fn dangling(&self) -> DanglingPolicy {
        self.dangling
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn raster(&self) -> &RasterConfig {
        &self.raster
    }

    pub fn document(&self) -> &DocumentConfig {
        &self.document
    }
}

/// Handling of connections that reference an id missing from the Schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingPolicy {
    /// Skip the connection in every backend and report it in the manifest.
    #[default]
    Skip,
    /// Fail the render with a construction error.
    Reject,
}

/// Grid layout parameters.
///
/// All lengths are in diagram units (pixels at raster scale 1.0).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Space between a scope's edge and its first children.
    margin: f32,
    /// Gap between neighbouring children, horizontally and vertically.
    spacing: f32,
    /// Rows wrap once the next child would end past this x coordinate.
    max_row_width: f32,
    /// Height of the label band reserved at the top of every Container.
    header_height: f32,
    /// Size given to Components without an explicit Size.
    component_size: Size,
    /// Size given to Containers with no children and no explicit Size.
    empty_container_size: Size,
    /// Degenerate sizes are clamped up to this value on each axis.
    min_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            spacing: 40.0,
            max_row_width: 1000.0,
            header_height: 30.0,
            component_size: Size::new(120.0, 60.0),
            empty_container_size: Size::new(200.0, 120.0),
            min_size: 10.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_max_row_width(mut self, max_row_width: f32) -> Self {
        self.max_row_width = max_row_width;
        self
    }

    pub fn with_header_height(mut self, header_height: f32) -> Self {
        self.header_height = header_height;
        self
    }

    pub fn with_component_size(mut self, component_size: Size) -> Self {
        self.component_size = component_size;
        self
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn max_row_width(&self) -> f32 {
        self.max_row_width
    }

    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    pub fn component_size(&self) -> Size {
        self.component_size
    }

    pub fn empty_container_size(&self) -> Size {
        self.empty_container_size
    }

    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    /// Returns a copy with every unusable value replaced by its default.
    ///
    /// Lengths must be finite and not negative, `min_size` must be positive
    /// and default sizes must be positive on both axes. Each replacement is
    /// logged at warn.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let length = |name: &str, value: f32, fallback: f32| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                warn!(field = name, value = value, fallback = fallback; "Ignoring invalid layout setting");
                fallback
            }
        };
        let size = |name: &str, value: Size, fallback: Size| {
            if value.is_positive() {
                value
            } else {
                warn!(
                    field = name,
                    width = value.width(),
                    height = value.height();
                    "Ignoring invalid layout size"
                );
                fallback
            }
        };

        let min_size = if self.min_size.is_finite() && self.min_size > 0.0 {
            self.min_size
        } else {
            warn!(field = "min_size", value = self.min_size, fallback = defaults.min_size; "Ignoring invalid layout setting");
            defaults.min_size
        };

        Self {
            margin: length("margin", self.margin, defaults.margin),
            spacing: length("spacing", self.spacing, defaults.spacing),
            max_row_width: length("max_row_width", self.max_row_width, defaults.max_row_width),
            header_height: length("header_height", self.header_height, defaults.header_height),
            component_size: size("component_size", self.component_size, defaults.component_size),
            empty_container_size: size(
                "empty_container_size",
                self.empty_container_size,
                defaults.empty_container_size,
            ),
            min_size,
        }
    }
}

/// How edges are routed between their endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRouting {
    #[default]
    Straight,
    Curved,
    Orthogonal,
}

/// Visual styling shared by both backends.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Background color used when the Schema's canvas does not set one.
    background_color: Option<String>,
    /// Stroke color of connections without a style override.
    edge_color: Option<String>,
    edge_routing: EdgeRouting,
    font_family: String,
    font_size: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            edge_color: None,
            edge_routing: EdgeRouting::default(),
            font_family: "Arial".to_string(),
            font_size: 12.0,
        }
    }
}

impl StyleConfig {
    pub fn with_edge_routing(mut self, edge_routing: EdgeRouting) -> Self {
        self.edge_routing = edge_routing;
        self
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_optional_color(self.background_color.as_deref(), "background")
    }

    /// Returns the parsed default edge [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string is not a valid color.
    pub fn edge_color(&self) -> Result<Option<Color>, String> {
        parse_optional_color(self.edge_color.as_deref(), "edge")
    }

    pub fn edge_routing(&self) -> EdgeRouting {
        self.edge_routing
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }
}

fn parse_optional_color(value: Option<&str>, what: &str) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {what} color in config: {err}"))
}

/// PNG output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Pixels per diagram unit.
    scale: f32,
    /// Load the host's fonts into the rasteriser's font database. Without
    /// any fonts loaded, labels are not drawn into the PNG.
    load_system_fonts: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            load_system_fonts: true,
        }
    }
}

impl RasterConfig {
    pub fn new(scale: f32, load_system_fonts: bool) -> Self {
        Self {
            scale,
            load_system_fonts,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn load_system_fonts(&self) -> bool {
        self.load_system_fonts
    }
}

/// Placement of connection labels in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLabelMode {
    /// The label is the edge cell's own `value`.
    #[default]
    Inline,
    /// The label is a child vertex cell whose parent is the edge.
    SubCell,
}

/// Document output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Generated cell ids are `{id_prefix}-{n}`.
    id_prefix: String,
    edge_label_mode: EdgeLabelMode,
    /// Stamp the `mxfile` element with the render time.
    timestamp: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            id_prefix: "cell".to_string(),
            edge_label_mode: EdgeLabelMode::default(),
            timestamp: false,
        }
    }
}

impl DocumentConfig {
    pub fn with_id_prefix(mut self, id_prefix: impl Into<String>) -> Self {
        self.id_prefix = id_prefix.into();
        self
    }

    pub fn with_edge_label_mode(mut self, edge_label_mode: EdgeLabelMode) -> Self {
        self.edge_label_mode = edge_label_mode;
        self
    }

    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    pub fn edge_label_mode(&self) -> EdgeLabelMode {
        self.edge_label_mode
    }

    pub fn timestamp(&self) -> bool {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.dangling(), DanglingPolicy::Skip);
        assert_eq!(config.layout().max_row_width(), 1000.0);
        assert_eq!(config.raster().scale(), 1.0);
        assert_eq!(config.document().id_prefix(), "cell");
        assert_eq!(config.document().edge_label_mode(), EdgeLabelMode::Inline);
        assert!(!config.document().timestamp());
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r##"
            [layout]
            component_size = { width = 160, height = 90 }

            [style]
            background_color = "#fafafa"

            [document]
            id_prefix = "n"
            edge_label_mode = "sub_cell"
            "##,
        )
        .unwrap();

        assert_eq!(config.layout().component_size(), Size::new(160.0, 90.0));
        assert_eq!(config.layout().spacing(), 40.0);
        assert_eq!(
            config.style().background_color().unwrap().unwrap().to_hex(),
            "#fafafa"
        );
        assert_eq!(config.document().id_prefix(), "n");
        assert_eq!(config.document().edge_label_mode(), EdgeLabelMode::SubCell);
    }

    #[test]
    fn test_sanitized_replaces_unusable_layout_values() {
        let config: AppConfig = toml::from_str(
            r#"
            [layout]
            margin = -4
            spacing = 12
            min_size = 0
            component_size = { width = 0, height = 50 }
            "#,
        )
        .unwrap();
        let layout = config.layout().sanitized();

        assert_eq!(layout.margin(), 20.0);
        assert_eq!(layout.spacing(), 12.0);
        assert_eq!(layout.min_size(), 10.0);
        assert_eq!(layout.component_size(), Size::new(120.0, 60.0));
        assert_eq!(layout.empty_container_size(), Size::new(200.0, 120.0));
    }

    #[test]
    fn test_invalid_edge_color_is_reported() {
        let config: AppConfig = toml::from_str(
            r#"
            [style]
            edge_color = "not-a-color"
            "#,
        )
        .unwrap();
        let err = config.style().edge_color().unwrap_err();
        assert!(err.starts_with("Invalid edge color in config"));
    }
}
