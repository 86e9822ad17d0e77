//! Core value types shared by filters, the remapper and the pipeline.
//!
//! Images are plain `image` crate RGB buffers. Heatmaps are row-major
//! `f32` grids of the same size holding per-pixel "keep original" weights.

use crate::core::error::HeatmapError;
use image::{GrayImage, ImageBuffer, Luma, Rgb};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit, 3-channel image in **RGB** channel order.
///
/// Filters receive a shared reference and always return a new buffer.
pub type Image = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Multiplier that maps an 8-bit grayscale sample onto the [0, 1] range.
pub const NORMALIZED: f32 = 1.0 / 255.0;

/// Ordered mapping of attribute name to its current value.
pub type Attributes = IndexMap<String, Value>;

/// Values an attribute can hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// Boolean flag
    Boolean(bool),
    /// UTF-8 string
    String(String),
}

/// Declared type of a filter attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// Whole numbers
    Integer,
    /// Real numbers
    Float,
    /// On/off flags
    Boolean,
    /// Free text
    String,
}

/// Width and height of an image or heatmap, in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Columns
    pub width: u32,
    /// Rows
    pub height: u32,
}

impl Value {
    /// Type tag of this value.
    pub fn get_type(&self) -> AttributeType {
        match self {
            Value::Integer(_) => AttributeType::Integer,
            Value::Float(_) => AttributeType::Float,
            Value::Boolean(_) => AttributeType::Boolean,
            Value::String(_) => AttributeType::String,
        }
    }

    /// The integer payload.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// The numeric payload as `f64`; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v),
            Value::Integer(i) => Some(i as f64),
            _ => None,
        }
    }

    /// Parse a command-line style literal into the given attribute type.
    pub fn parse_as(text: &str, attr_type: AttributeType) -> Option<Value> {
        match attr_type {
            AttributeType::Integer => text.trim().parse().ok().map(Value::Integer),
            AttributeType::Float => text.trim().parse().ok().map(Value::Float),
            AttributeType::Boolean => match text.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(Value::Boolean(true)),
                "false" | "no" | "off" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            AttributeType::String => Some(Value::String(text.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => fmt::Display::fmt(v, f),
            Value::Float(v) => write!(f, "{:.4}", v),
            Value::Boolean(v) => fmt::Display::fmt(v, f),
            Value::String(v) => write!(f, "{:?}", v),
        }
    }
}

impl AttributeType {
    /// Whether `value` can be stored in an attribute of this type.
    ///
    /// Float attributes also accept integers.
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (AttributeType::Integer, Value::Integer(_))
                | (AttributeType::Float, Value::Float(_) | Value::Integer(_))
                | (AttributeType::Boolean, Value::Boolean(_))
                | (AttributeType::String, Value::String(_))
        )
    }

    /// Name shown in listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            AttributeType::Integer => "Integer",
            AttributeType::Float => "Float",
            AttributeType::Boolean => "Boolean",
            AttributeType::String => "String",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl Dimensions {
    /// `width` by `height` pixels.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an image buffer.
    pub fn of(image: &Image) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ============================================================================
// Heatmap
// ============================================================================

/// A per-pixel attention weight grid.
///
/// Values are in [0, 1]: 1.0 means full attention (keep the original pixel),
/// 0.0 means the pixel receives the full effect of every filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    dimensions: Dimensions,
    data: Vec<f32>,
}

impl Heatmap {
    /// Build a heatmap from a row-major weight buffer.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, HeatmapError> {
        let dimensions = Dimensions::new(width, height);
        if data.len() != dimensions.area() {
            return Err(HeatmapError::BufferSize {
                dimensions,
                expected: dimensions.area(),
                got: data.len(),
            });
        }
        Ok(Self { dimensions, data })
    }

    /// A heatmap with every weight set to `value`.
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        let dimensions = Dimensions::new(width, height);
        Self {
            dimensions,
            data: vec![value; dimensions.area()],
        }
    }

    /// Build a heatmap by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            dimensions: Dimensions::new(width, height),
            data,
        }
    }

    /// Normalize an 8-bit grayscale heatmap into [0, 1].
    pub fn from_gray(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        Self {
            dimensions: Dimensions::new(width, height),
            data: gray.as_raw().iter().map(|&v| v as f32 * NORMALIZED).collect(),
        }
    }

    /// Quantize back to an 8-bit grayscale image for previews.
    pub fn to_gray(&self) -> GrayImage {
        let Dimensions { width, height } = self.dimensions;
        GrayImage::from_fn(width, height, |x, y| {
            let v = self.get(x, y).clamp(0.0, 1.0);
            Luma([(v / NORMALIZED).round() as u8])
        })
    }

    /// Grid size.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Column count.
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Row count.
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Weight at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the heatmap.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.dimensions.width as usize + x as usize]
    }

    /// Row-major weights.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Apply `f` to every weight, producing a new heatmap of the same size.
    pub fn map<F>(&self, f: F) -> Heatmap
    where
        F: Fn(f32) -> f32,
    {
        Heatmap {
            dimensions: self.dimensions,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Whether this heatmap can drive filters on `image`.
    pub fn matches(&self, image: &Image) -> bool {
        self.dimensions == Dimensions::of(image)
    }
}
