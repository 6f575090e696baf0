//! Document configuration: measurement units, orientation, page formats and
//! viewer display preferences.
//!
//! Every value here can be parsed from the short tokens callers commonly pass
//! around (`"mm"`, `"P"`, `"A4"`), and invalid tokens fail with
//! [`PdfError::Configuration`].

use crate::error::{PdfError, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// User-space unit. All coordinates passed to the drawing API are in this unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Unit {
    #[cfg_attr(feature = "serde", serde(rename = "pt"))]
    Point,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "mm"))]
    Millimeter,
    #[cfg_attr(feature = "serde", serde(rename = "cm"))]
    Centimeter,
    #[cfg_attr(feature = "serde", serde(rename = "in"))]
    Inch,
}

impl Unit {
    /// Scale factor: number of points in one unit.
    pub fn scale(&self) -> f64 {
        match self {
            Unit::Point => 1.0,
            Unit::Millimeter => 72.0 / 25.4,
            Unit::Centimeter => 72.0 / 2.54,
            Unit::Inch => 72.0,
        }
    }
}

impl FromStr for Unit {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pt" => Ok(Unit::Point),
            "mm" => Ok(Unit::Millimeter),
            "cm" => Ok(Unit::Centimeter),
            "in" => Ok(Unit::Inch),
            other => Err(PdfError::Configuration(format!("Incorrect unit: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "p", alias = "P"))]
    Portrait,
    #[cfg_attr(feature = "serde", serde(alias = "l", alias = "L"))]
    Landscape,
}

impl FromStr for Orientation {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p" | "portrait" => Ok(Orientation::Portrait),
            "l" | "landscape" => Ok(Orientation::Landscape),
            _ => Err(PdfError::Configuration(format!(
                "Incorrect orientation: {s}"
            ))),
        }
    }
}

/// Page format. Named formats are defined in points; custom formats are given
/// in the document's user unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Portrait dimensions in points for the named formats.
    pub fn points(&self) -> Option<(f64, f64)> {
        match self {
            PageSize::A3 => Some((841.89, 1190.55)),
            PageSize::A4 => Some((595.28, 841.89)),
            PageSize::A5 => Some((420.94, 595.28)),
            PageSize::Letter => Some((612.0, 792.0)),
            PageSize::Legal => Some((612.0, 1008.0)),
            PageSize::Custom { .. } => None,
        }
    }

    /// Portrait dimensions `(width, height)` in user units for scale factor `k`.
    ///
    /// Custom sizes are normalized so that width never exceeds height.
    pub fn dimensions(&self, k: f64) -> Result<(f64, f64)> {
        match *self {
            PageSize::Custom { width, height } => {
                if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
                    return Err(PdfError::Configuration(format!(
                        "Invalid page size: {width}x{height}"
                    )));
                }
                if width > height {
                    Ok((height, width))
                } else {
                    Ok((width, height))
                }
            }
            named => {
                let (w, h) = named.points().unwrap_or((0.0, 0.0));
                Ok((w / k, h / k))
            }
        }
    }
}

impl FromStr for PageSize {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            _ => Err(PdfError::Configuration(format!("Unknown page size: {s}"))),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::A3 => write!(f, "A3"),
            PageSize::A4 => write!(f, "A4"),
            PageSize::A5 => write!(f, "A5"),
            PageSize::Letter => write!(f, "Letter"),
            PageSize::Legal => write!(f, "Legal"),
            PageSize::Custom { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

/// Validates a page rotation, which must be a multiple of 90 degrees.
pub fn validate_rotation(rotation: i32) -> Result<i32> {
    if rotation % 90 != 0 {
        return Err(PdfError::Configuration(format!(
            "Incorrect rotation value: {rotation}"
        )));
    }
    Ok(rotation)
}

/// Initial zoom requested from the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Zoom {
    #[default]
    Default,
    FullPage,
    FullWidth,
    Real,
    Percent(f64),
}

/// Page layout requested from the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Layout {
    #[default]
    Default,
    Single,
    Continuous,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayMode {
    #[cfg_attr(feature = "serde", serde(default))]
    pub zoom: Zoom,
    #[cfg_attr(feature = "serde", serde(default))]
    pub layout: Layout,
}

impl DisplayMode {
    pub fn new(zoom: Zoom, layout: Layout) -> Self {
        Self { zoom, layout }
    }
}

/// Page margins in user units. `right` defaults to `left` when omitted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarginConfig {
    pub left: f64,
    pub top: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub right: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageBreakConfig {
    pub enabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub margin: f64,
}

/// Everything needed to construct a [`Document`](crate::Document).
///
/// ```rust
/// use quire_pdf::config::{DocumentConfig, Orientation, PageSize, Unit};
/// use quire_pdf::Document;
///
/// let config = DocumentConfig {
///     orientation: Orientation::Landscape,
///     unit: Unit::Point,
///     page_size: PageSize::Letter,
///     ..DocumentConfig::default()
/// };
/// let doc = Document::with_config(&config).unwrap();
/// assert_eq!(doc.page_width(), 792.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DocumentConfig {
    pub orientation: Orientation,
    pub unit: Unit,
    pub page_size: PageSize,
    pub compression: bool,
    pub margins: Option<MarginConfig>,
    pub page_break: Option<PageBreakConfig>,
    pub display: DisplayMode,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            unit: Unit::Millimeter,
            page_size: PageSize::A4,
            compression: true,
            margins: None,
            page_break: None,
            display: DisplayMode::default(),
            title: None,
            author: None,
            subject: None,
            keywords: None,
            creator: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_scale() {
        assert_eq!(Unit::Point.scale(), 1.0);
        assert!((Unit::Millimeter.scale() - 2.834645669).abs() < 1e-6);
        assert!((Unit::Centimeter.scale() - 28.34645669).abs() < 1e-6);
        assert_eq!(Unit::Inch.scale(), 72.0);
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!("mm".parse::<Unit>().unwrap(), Unit::Millimeter);
        assert_eq!("in".parse::<Unit>().unwrap(), Unit::Inch);
        let err = "yd".parse::<Unit>().unwrap_err();
        assert!(matches!(err, PdfError::Configuration(_)));
        assert!(err.to_string().contains("yd"));
    }

    #[test]
    fn test_orientation_parse() {
        assert_eq!("P".parse::<Orientation>().unwrap(), Orientation::Portrait);
        assert_eq!(
            "Landscape".parse::<Orientation>().unwrap(),
            Orientation::Landscape
        );
        assert!("sideways".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_named_page_sizes() {
        assert_eq!(PageSize::A4.points(), Some((595.28, 841.89)));
        assert_eq!(PageSize::Legal.points(), Some((612.0, 1008.0)));
        assert_eq!("letter".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert!("b5".parse::<PageSize>().is_err());

        let (w, h) = PageSize::A4.dimensions(Unit::Millimeter.scale()).unwrap();
        assert!((w - 210.0).abs() < 0.01);
        assert!((h - 297.0).abs() < 0.01);
    }

    #[test]
    fn test_custom_page_size_normalized() {
        let size = PageSize::Custom {
            width: 300.0,
            height: 100.0,
        };
        assert_eq!(size.dimensions(1.0).unwrap(), (100.0, 300.0));

        let bad = PageSize::Custom {
            width: -1.0,
            height: 100.0,
        };
        assert!(matches!(
            bad.dimensions(1.0),
            Err(PdfError::Configuration(_))
        ));
    }

    #[test]
    fn test_rotation_validation() {
        assert_eq!(validate_rotation(0).unwrap(), 0);
        assert_eq!(validate_rotation(270).unwrap(), 270);
        assert_eq!(validate_rotation(-90).unwrap(), -90);
        assert!(validate_rotation(45).is_err());
    }

    #[test]
    fn test_default_config() {
        let config = DocumentConfig::default();
        assert_eq!(config.unit, Unit::Millimeter);
        assert_eq!(config.page_size, PageSize::A4);
        assert!(config.compression);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let config: DocumentConfig = serde_json::from_str(
            r#"{"orientation":"l","unit":"pt","page_size":"letter","compression":false}"#,
        )
        .unwrap();
        assert_eq!(config.orientation, Orientation::Landscape);
        assert_eq!(config.unit, Unit::Point);
        assert_eq!(config.page_size, PageSize::Letter);
        assert!(!config.compression);
    }
}
