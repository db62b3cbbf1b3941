//! Stroke pattern definitions shared by both rendering backends.
//!
//! [`StrokeStyle`] follows SVG `stroke-dasharray` semantics. The raster
//! backend writes [`StrokeStyle::dash_array`] into SVG, the document backend
//! translates it to the mxGraph `dashed`/`dashPattern` style keys.
//!
//! | Variant | dasharray |
//! |--------------|--------------|
//! | `Solid` | none |
//! | `Dashed` | `5,5` |
//! | `Dotted` | `2,3` |
//! | `DashDot` | `10,5,2,5` |
//! | `Custom(p)` | `p` |

use std::{convert::Infallible, str::FromStr};

use serde::Deserialize;

/// Visual pattern of a stroke.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum StrokeStyle {
    /// Solid continuous line (default)
    #[default]
    Solid,
    /// 5px dash, 5px gap
    Dashed,
    /// 2px dot, 3px gap
    Dotted,
    /// 10px dash, 5px gap, 2px dot, 5px gap
    DashDot,
    /// Custom dasharray pattern, comma or space separated
    Custom(String),
}

impl FromStr for StrokeStyle {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "solid" => Self::Solid,
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            "dash-dot" | "dashdot" => Self::DashDot,
            _ => Self::Custom(s.to_string()),
        })
    }
}

impl From<String> for StrokeStyle {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(style) => style,
            Err(never) => match never {},
        }
    }
}

impl StrokeStyle {
    /// Returns the dasharray for this style, or `None` for solid lines.
    pub fn dash_array(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5".to_string()),
            Self::Dotted => Some("2,3".to_string()),
            Self::DashDot => Some("10,5,2,5".to_string()),
            Self::Custom(pattern) => Some(pattern.clone()),
        }
    }

    /// Returns the dasharray with separators normalised to single spaces,
    /// the form mxGraph expects in `dashPattern`.
    pub fn dash_pattern(&self) -> Option<String> {
        self.dash_array().map(|pattern| {
            pattern
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    pub fn is_solid(&self) -> bool {
        matches!(self, Self::Solid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_named() {
        assert_eq!("dashed".parse::<StrokeStyle>().unwrap(), StrokeStyle::Dashed);
        assert_eq!("dashdot".parse::<StrokeStyle>().unwrap(), StrokeStyle::DashDot);
        assert_eq!(
            "4,2".parse::<StrokeStyle>().unwrap(),
            StrokeStyle::Custom("4,2".to_string())
        );
    }

    #[test]
    fn test_dash_array() {
        assert_eq!(StrokeStyle::Solid.dash_array(), None);
        assert_eq!(StrokeStyle::Dotted.dash_array().as_deref(), Some("2,3"));
    }

    #[test]
    fn test_dash_pattern_normalises_separators() {
        let style = StrokeStyle::Custom("10, 5,2  5".to_string());
        assert_eq!(style.dash_pattern().as_deref(), Some("10 5 2 5"));
    }
}
