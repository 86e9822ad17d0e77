//! Filter registry: the catalogue of available filter implementations.

use crate::core::filter::{Category, Filter, FilterMetadata};
use crate::core::instance::FilterInstance;
use crate::filters::builtin;
use indexmap::IndexMap;
use std::sync::Arc;

/// Produces a fresh filter implementation.
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn Filter> + Send + Sync>;

/// One catalogue slot.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Builds new implementations.
    pub factory: FilterFactory,
    /// Metadata captured at registration.
    pub metadata: FilterMetadata,
}

/// The catalogue of filters a session can use.
///
/// Registration order is the catalogue order: the available side of a
/// [`FilterStack`](crate::stack::FilterStack) is always listed in it.
pub struct FilterRegistry {
    entries: IndexMap<String, RegistryEntry>,
    by_category: IndexMap<Category, Vec<String>>,
}

impl FilterRegistry {
    /// An empty catalogue.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            by_category: IndexMap::new(),
        }
    }

    /// The built-in catalogue.
    pub fn with_builtins() -> Self {
        let mut catalogue = Self::new();
        builtin::register_all(&mut catalogue);
        catalogue
    }

    /// Register a filter type. Registering an existing ID replaces it in place.
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn Filter> + Send + Sync + 'static,
    {
        let metadata = factory().metadata();
        let key = metadata.id.clone();
        let category = metadata.category;
        let slot = RegistryEntry { factory: Arc::new(factory), metadata };

        if let Some(previous) = self.entries.insert(key.clone(), slot) {
            if let Some(ids) = self.by_category.get_mut(&previous.metadata.category) {
                ids.retain(|i| i != &key);
            }
        }
        log::debug!("Registered filter '{}'", key);
        self.by_category.entry(category).or_default().push(key);
    }

    /// A fresh implementation of `id`.
    pub fn create(&self, id: &str) -> Option<Box<dyn Filter>> {
        self.entries.get(id).map(|slot| (slot.factory)())
    }

    /// Create a configured instance with default attributes.
    pub fn instantiate(&self, id: &str) -> Option<FilterInstance> {
        self.create(id).map(FilterInstance::new)
    }

    /// One instance of every registered filter, in catalogue order.
    pub fn instantiate_all(&self) -> Vec<FilterInstance> {
        self.entries
            .values()
            .map(|slot| FilterInstance::new((slot.factory)()))
            .collect()
    }

    /// Metadata of `id`, without building the filter.
    pub fn get_metadata(&self, id: &str) -> Option<&FilterMetadata> {
        self.get_entry(id).map(|slot| &slot.metadata)
    }

    /// The catalogue slot of `id`.
    pub fn get_entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Whether `id` is in the catalogue.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Catalogue position of a filter.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.get_index_of(id)
    }

    /// IDs in catalogue order.
    pub fn filter_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Slots in catalogue order.
    pub fn filters(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(id, slot)| (id.as_str(), slot))
    }

    /// IDs filed under `category`, in registration order.
    pub fn filters_by_category(&self, category: &Category) -> Vec<&str> {
        self.by_category
            .get(category)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Search filters by ID, name, description or tag.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&needle);

        self.filters()
            .filter(|(_, slot)| {
                let m = &slot.metadata;
                hit(m.id.as_str())
                    || hit(m.name.as_str())
                    || hit(m.description.as_str())
                    || m.tags.iter().any(|t| hit(t.as_str()))
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of catalogued filters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is catalogued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filters grouped by category, in [`Category::all`] order, sorted by name.
    pub fn grouped_by_category(&self) -> IndexMap<Category, Vec<&FilterMetadata>> {
        let mut grouped: IndexMap<Category, Vec<&FilterMetadata>> = IndexMap::new();

        for category in Category::all() {
            let mut members: Vec<&FilterMetadata> = self
                .filters_by_category(category)
                .into_iter()
                .filter_map(|id| self.get_metadata(id))
                .collect();
            if members.is_empty() {
                continue;
            }
            members.sort_by(|a, b| a.name.cmp(&b.name));
            grouped.insert(*category, members);
        }

        grouped
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Assembles a catalogue from the built-ins plus custom filters.
pub struct RegistryBuilder {
    custom: FilterRegistry,
    builtins: bool,
}

impl RegistryBuilder {
    /// A builder that includes the built-ins.
    pub fn new() -> Self {
        Self {
            custom: FilterRegistry::new(),
            builtins: true,
        }
    }

    /// Toggle the built-in filters.
    pub fn with_builtins(mut self, builtins: bool) -> Self {
        self.builtins = builtins;
        self
    }

    /// Register a custom filter. Custom filters follow the built-ins.
    pub fn register<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Filter> + Send + Sync + 'static,
    {
        self.custom.register(factory);
        self
    }

    /// Finish the catalogue.
    pub fn build(self) -> FilterRegistry {
        if !self.builtins {
            return self.custom;
        }

        let mut catalogue = FilterRegistry::with_builtins();
        for slot in self.custom.entries.into_values() {
            let factory = slot.factory;
            catalogue.register(move || factory());
        }
        catalogue
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::FilterContext;
    use crate::core::error::PipelineResult;
    use crate::core::types::Image;

    #[derive(Debug, Clone)]
    struct Passthrough;

    impl Filter for Passthrough {
        fn metadata(&self) -> FilterMetadata {
            FilterMetadata::builder("passthrough", "Passthrough")
                .description("Returns the input unchanged")
                .tags(["debug"])
                .build()
        }

        fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
            Ok(ctx.image().clone())
        }

        fn clone_box(&self) -> Box<dyn Filter> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_custom_filter_lookup() {
        let mut catalogue = FilterRegistry::new();
        catalogue.register(|| Box::new(Passthrough));

        assert!(catalogue.contains("passthrough"));
        assert!(catalogue.create("missing").is_none());
        assert_eq!(catalogue.instantiate("passthrough").unwrap().name(), "passthrough");
        assert_eq!(catalogue.get_metadata("passthrough").unwrap().name, "Passthrough");
        assert_eq!(catalogue.search("DEBUG"), vec!["passthrough"]);
    }

    #[test]
    fn test_builtins_catalogue_order() {
        let registry = FilterRegistry::with_builtins();
        let ids: Vec<&str> = registry.filter_ids().collect();
        assert_eq!(
            ids,
            vec!["desaturate", "darken", "gaussian_blur", "box_blur", "pixelate", "noise"]
        );
        assert_eq!(registry.position("gaussian_blur"), Some(2));

        let instances = registry.instantiate_all();
        assert_eq!(instances.len(), registry.len());
        assert_eq!(instances[0].name(), "desaturate");
    }

    #[test]
    fn test_search() {
        let registry = FilterRegistry::with_builtins();

        let results = registry.search("blur");
        assert!(results.contains(&"gaussian_blur"));
        assert!(results.contains(&"box_blur"));

        assert!(registry.search("nonexistent").is_empty());
    }

    #[test]
    fn test_grouped_listing() {
        let registry = FilterRegistry::with_builtins();

        let blur = registry.filters_by_category(&Category::Blur);
        assert_eq!(blur, vec!["gaussian_blur", "box_blur"]);

        let grouped = registry.grouped_by_category();
        let first = grouped.keys().next().copied();
        assert_eq!(first, Some(Category::Color));
        assert_eq!(grouped[&Category::Blur][0].name, "Box Blur");
    }

    #[test]
    fn test_builder_appends_custom_filters() {
        let registry = RegistryBuilder::new()
            .register(|| Box::new(Passthrough))
            .build();
        assert_eq!(registry.filter_ids().last(), Some("passthrough"));

        let bare = RegistryBuilder::new()
            .with_builtins(false)
            .register(|| Box::new(Passthrough))
            .build();
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = FilterRegistry::new();
        registry.register(|| Box::new(Passthrough));
        registry.register(|| Box::new(Passthrough));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.filters_by_category(&Category::Custom).len(), 1);
    }
}
