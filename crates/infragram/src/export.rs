//! Rendering backends.
//!
//! Each backend turns a Schema plus its [`Layout`] into one artifact and a
//! [`RenderManifest`](crate::manifest::RenderManifest). Backends share the
//! resolved [`RenderStyle`] and the style registry; neither mutates its
//! inputs, so both may run concurrently over the same layout.

pub mod document;
pub mod raster;

use infragram_core::{
    color::Color,
    identifier::Id,
    schema::{Connection, Schema},
    stroke::StrokeStyle,
};

use crate::{
    config::{EdgeRouting, StyleConfig},
    layout::Layout,
};

/// A backend producing one artifact from a laid-out Schema.
pub trait Renderer {
    type Output;
    type Error;

    fn render(&self, schema: &Schema, layout: &Layout) -> Result<Self::Output, Self::Error>;
}

const DEFAULT_EDGE_COLOR: &str = "#545b64";
const DEFAULT_EDGE_WIDTH: f32 = 1.5;

/// [`StyleConfig`] with every color parsed and every default filled in.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    background: Option<Color>,
    edge_color: Color,
    edge_routing: EdgeRouting,
    font_family: String,
    font_size: f32,
}

impl RenderStyle {
    /// # Errors
    ///
    /// Returns an error message if a configured color is invalid.
    pub fn from_config(config: &StyleConfig) -> Result<Self, String> {
        let edge_color = match config.edge_color()? {
            Some(color) => color,
            None => Color::new(DEFAULT_EDGE_COLOR)?,
        };
        Ok(Self {
            background: config.background_color()?,
            edge_color,
            edge_routing: config.edge_routing(),
            font_family: config.font_family().to_string(),
            font_size: config.font_size(),
        })
    }

    /// Canvas background: the Schema's own, then the configured one, then white.
    pub fn background(&self, schema: &Schema) -> Color {
        schema
            .canvas()
            .background()
            .or(self.background)
            .unwrap_or_else(white)
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

    /// Stroke of a connection: its own stroke color, then its color, then
    /// the configured default.
    pub fn edge_stroke(&self, connection: &Connection) -> EdgeStroke {
        let style = connection.style();
        EdgeStroke {
            color: style
                .and_then(|style| style.stroke_color().or(style.color()))
                .unwrap_or(self.edge_color),
            width: style
                .and_then(|style| style.width())
                .filter(|width| width.is_finite() && *width > 0.0)
                .unwrap_or(DEFAULT_EDGE_WIDTH),
            pattern: style
                .map(|style| style.stroke().clone())
                .unwrap_or_default(),
            label_color: style.and_then(|style| style.color()),
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
            .expect("default style configuration is valid")
    }
}

fn white() -> Color {
    Color::new("white").unwrap_or_default()
}

/// Resolved stroke of one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStroke {
    pub color: Color,
    pub width: f32,
    pub pattern: StrokeStyle,
    pub label_color: Option<Color>,
}

/// Text shown for an entity: its label, or its id when the label is blank.
pub(crate) fn display_label(label: &str, id: Id) -> String {
    if label.trim().is_empty() {
        id.to_string()
    } else {
        label.to_string()
    }
}
