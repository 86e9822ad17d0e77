//! Filter trait and filter metadata.
//!
//! The Filter trait is the capability every image transformation shares.
//! A filter type is stateless: its configurable state lives in the
//! attribute map of the [`FilterInstance`](crate::core::instance::FilterInstance)
//! that wraps it, and each call to `run` sees the attributes through a
//! [`FilterContext`].

use crate::core::attribute::AttributeDefinition;
use crate::core::context::FilterContext;
use crate::core::error::{AttributeResult, PipelineResult};
use crate::core::types::{Attributes, Image};
use serde::{Deserialize, Serialize};

/// Listing group of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Smoothing
    Blur,
    /// Saturation and brightness
    Color,
    /// Grain
    Noise,
    /// Mosaic and other block effects
    Stylize,
    /// Anything registered by a caller
    #[default]
    Custom,
}

impl Category {
    const LISTING_ORDER: [Category; 5] = [
        Category::Color,
        Category::Blur,
        Category::Stylize,
        Category::Noise,
        Category::Custom,
    ];

    /// Heading used in listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Blur => "Blur",
            Category::Color => "Color",
            Category::Noise => "Noise",
            Category::Stylize => "Stylize",
            Category::Custom => "Custom",
        }
    }

    /// Every category, in listing order.
    pub fn all() -> &'static [Category] {
        &Self::LISTING_ORDER
    }
}

/// Static description of a filter type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterMetadata {
    /// Stable identifier, e.g. `gaussian_blur`. Stack comparisons use it.
    pub id: String,
    /// Label, e.g. `Gaussian Blur`
    pub name: String,
    /// Listing group
    pub category: Category,
    /// One-line summary
    pub description: String,
    /// Version of the filter's behaviour
    pub version: String,
    /// Attribute declarations in display order
    pub attributes: Vec<AttributeDefinition>,
    /// Extra search terms
    pub tags: Vec<String>,
}

impl FilterMetadata {
    /// Start describing a filter.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> FilterMetadataBuilder {
        FilterMetadataBuilder::new(id, name)
    }

    /// Declared attribute names, in order.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Find an attribute declaration by name.
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attribute map holding every declared default.
    pub fn default_attributes(&self) -> Attributes {
        self.attributes
            .iter()
            .map(|a| (a.name.clone(), a.default_value.clone()))
            .collect()
    }
}

/// Fluent construction of [`FilterMetadata`].
pub struct FilterMetadataBuilder(FilterMetadata);

impl FilterMetadataBuilder {
    /// Metadata in [`Category::Custom`] with no attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self(FilterMetadata {
            id: id.into(),
            name: name.into(),
            category: Category::default(),
            description: String::new(),
            version: "1.0.0".to_string(),
            attributes: Vec::new(),
            tags: Vec::new(),
        })
    }

    /// Listing group.
    pub fn category(mut self, category: Category) -> Self {
        self.0.category = category;
        self
    }

    /// Summary line.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.description = description.into();
        self
    }

    /// Behaviour version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.0.version = version.into();
        self
    }

    /// Append an attribute declaration.
    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.0.attributes.push(attribute);
        self
    }

    /// Append search terms.
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.0.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Finish.
    pub fn build(self) -> FilterMetadata {
        self.0
    }
}

/// The capability shared by all heatmap-modulated filters.
///
/// # Contract
///
/// `run` must not mutate its inputs and must return an image of the same
/// dimensions as `ctx.image()`. The heatmap value at a pixel is the weight
/// of the original pixel in the result: 1.0 leaves it untouched, 0.0 applies
/// the full effect.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// struct Darken;
///
/// impl Filter for Darken {
///     fn metadata(&self) -> FilterMetadata {
///         FilterMetadata::builder("darken", "Darken")
///             .category(Category::Color)
///             .attribute(
///                 AttributeDefinition::new("amount", AttributeType::Float, Value::Float(0.5))
///                     .with_range(0.0, 1.0),
///             )
///             .build()
///     }
///
///     fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
///         let keep = 1.0 - ctx.get_float("amount")? as f32;
///         Ok(ctx.map_weighted(|_, px, weight| {
///             px.map(|c| lerp(c, c as f32 * keep, weight))
///         }))
///     }
///
///     fn clone_box(&self) -> Box<dyn Filter> {
///         Box::new(self.clone())
///     }
/// }
/// ```
pub trait Filter: Send + Sync {
    /// Describe the filter. Called at registration and for every new instance,
    /// so it must return the same value each time.
    fn metadata(&self) -> FilterMetadata;

    /// Check constraints that span several attributes.
    ///
    /// Per-attribute type and range checks are done from the metadata before
    /// this is called. Default implementation accepts everything.
    fn validate(&self, _attributes: &Attributes) -> AttributeResult<()> {
        Ok(())
    }

    /// Produce the filtered image.
    fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image>;

    /// Clone this filter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Filter>;
}

impl Clone for Box<dyn Filter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
