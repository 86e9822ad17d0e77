//! Available/active filter stack management.
//!
//! A [`FilterStack`] owns every filter instance of a session, split into two
//! disjoint ordered lists. The active list is what the pipeline runs, in
//! order; the available list is always kept in catalogue order.
//!
//! Each list has its own selection, tracked by [`FilterId`] so that it
//! follows a filter when neighbours move. A selection is cleared when its
//! filter leaves the list.

use crate::core::error::{FilterId, GazeResult, StackError, StackResult, StackSide};
use crate::core::instance::FilterInstance;
use crate::core::types::Value;
use crate::filters::registry::FilterRegistry;

/// Two disjoint lists of filter instances with one selection each.
#[derive(Debug, Clone, Default)]
pub struct FilterStack {
    available: Vec<FilterInstance>,
    active: Vec<FilterInstance>,
    /// Every instance ever added, in catalogue order.
    catalogue: Vec<FilterId>,
    selected_available: Option<FilterId>,
    selected_active: Option<FilterId>,
}

impl FilterStack {
    /// Create a stack where every instance starts available, in the given order.
    pub fn new(instances: Vec<FilterInstance>) -> Self {
        let catalogue = instances.iter().map(|i| i.id).collect();
        Self {
            available: instances,
            active: Vec::new(),
            catalogue,
            selected_available: None,
            selected_active: None,
        }
    }

    /// One available instance of every registered filter.
    pub fn from_registry(registry: &FilterRegistry) -> Self {
        Self::new(registry.instantiate_all())
    }

    /// Append an instance to the end of the catalogue, as available.
    pub fn add_instance(&mut self, instance: FilterInstance) -> FilterId {
        let id = instance.id;
        self.catalogue.push(id);
        self.available.push(instance);
        id
    }

    /// Available filters, in catalogue order.
    pub fn available(&self) -> &[FilterInstance] {
        &self.available
    }

    /// Active filters, in run order.
    pub fn active(&self) -> &[FilterInstance] {
        &self.active
    }

    /// Total number of instances across both lists.
    pub fn len(&self) -> usize {
        self.available.len() + self.active.len()
    }

    /// Whether the stack holds no instances at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select the available filter at `index`.
    pub fn select_available(&mut self, index: usize) -> StackResult<()> {
        self.selected_available = Some(Self::id_at(&self.available, StackSide::Available, index)?);
        Ok(())
    }

    /// Select the active filter at `index`.
    pub fn select_active(&mut self, index: usize) -> StackResult<()> {
        self.selected_active = Some(Self::id_at(&self.active, StackSide::Active, index)?);
        Ok(())
    }

    /// Index of the selected available filter.
    pub fn selected_available(&self) -> Option<usize> {
        self.selected_available
            .and_then(|id| Self::index_of(&self.available, id))
    }

    /// Index of the selected active filter.
    pub fn selected_active(&self) -> Option<usize> {
        self.selected_active.and_then(|id| Self::index_of(&self.active, id))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Move the selected available filter to the end of the active list.
    pub fn add(&mut self) -> StackResult<()> {
        let index = self.require(StackSide::Available)?;
        let instance = self.available.remove(index);
        log::debug!("Activated '{}' ({})", instance.name(), instance.id);

        self.selected_available = None;
        self.active.push(instance);
        Ok(())
    }

    /// Move the selected active filter back to its catalogue position.
    pub fn remove(&mut self) -> StackResult<()> {
        let index = self.require(StackSide::Active)?;
        let instance = self.active.remove(index);
        log::debug!("Deactivated '{}' ({})", instance.name(), instance.id);

        self.selected_active = None;
        self.restore(instance);
        Ok(())
    }

    /// Move every active filter back to the available list.
    pub fn remove_all(&mut self) {
        if self.active.is_empty() {
            return;
        }
        log::debug!("Deactivated all {} filter(s)", self.active.len());

        self.selected_active = None;
        for instance in std::mem::take(&mut self.active) {
            self.restore(instance);
        }
    }

    /// Swap the selected active filter with the one before it.
    ///
    /// Does nothing when it is already first.
    pub fn move_up(&mut self) -> StackResult<()> {
        let index = self.require(StackSide::Active)?;
        if index > 0 {
            self.active.swap(index, index - 1);
        }
        Ok(())
    }

    /// Swap the selected active filter with the one after it.
    ///
    /// Does nothing when it is already last.
    pub fn move_down(&mut self) -> StackResult<()> {
        let index = self.require(StackSide::Active)?;
        if index + 1 < self.active.len() {
            self.active.swap(index, index + 1);
        }
        Ok(())
    }

    /// Clone the active list for one pipeline run.
    pub fn snapshot(&self) -> Vec<FilterInstance> {
        self.active.clone()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Find an instance in either list.
    pub fn find(&self, id: FilterId) -> Option<&FilterInstance> {
        self.available
            .iter()
            .chain(self.active.iter())
            .find(|i| i.id == id)
    }

    /// Which list an instance is in, and where.
    pub fn position(&self, id: FilterId) -> Option<(StackSide, usize)> {
        if let Some(index) = Self::index_of(&self.available, id) {
            return Some((StackSide::Available, index));
        }
        Self::index_of(&self.active, id).map(|index| (StackSide::Active, index))
    }

    /// Set an attribute on an instance in either list.
    pub fn set_attribute(&mut self, id: FilterId, name: &str, value: Value) -> GazeResult<()> {
        let instance = self
            .available
            .iter_mut()
            .chain(self.active.iter_mut())
            .find(|i| i.id == id)
            .ok_or(StackError::UnknownFilter(id))?;
        instance.set_attribute(name, value)?;
        Ok(())
    }

    fn id_at(list: &[FilterInstance], side: StackSide, index: usize) -> StackResult<FilterId> {
        list.get(index)
            .map(|i| i.id)
            .ok_or(StackError::IndexOutOfRange {
                side,
                index,
                len: list.len(),
            })
    }

    fn index_of(list: &[FilterInstance], id: FilterId) -> Option<usize> {
        list.iter().position(|i| i.id == id)
    }

    /// Index of the selected filter on `side`, or `NoSelection`.
    fn require(&self, side: StackSide) -> StackResult<usize> {
        let index = match side {
            StackSide::Available => self.selected_available(),
            StackSide::Active => self.selected_active(),
        };
        index.ok_or(StackError::NoSelection(side))
    }

    fn rank(&self, id: FilterId) -> usize {
        self.catalogue
            .iter()
            .position(|&c| c == id)
            .unwrap_or(self.catalogue.len())
    }

    fn restore(&mut self, instance: FilterInstance) {
        let rank = self.rank(instance.id);
        let at = self
            .available
            .iter()
            .position(|i| self.rank(i.id) > rank)
            .unwrap_or(self.available.len());
        self.available.insert(at, instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GazeError;

    fn stack() -> FilterStack {
        FilterStack::from_registry(&FilterRegistry::with_builtins())
    }

    fn names(list: &[FilterInstance]) -> Vec<&str> {
        list.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn test_starts_all_available() {
        let stack = stack();
        assert_eq!(stack.available().len(), 6);
        assert!(stack.active().is_empty());
        assert_eq!(stack.selected_available(), None);
    }

    #[test]
    fn test_add_moves_selected_to_end() {
        let mut stack = stack();
        stack.select_available(2).unwrap();
        stack.add().unwrap();
        stack.select_available(0).unwrap();
        stack.add().unwrap();

        assert_eq!(names(stack.active()), vec!["gaussian_blur", "desaturate"]);
        assert_eq!(names(stack.available()), vec!["darken", "box_blur", "pixelate", "noise"]);
        assert_eq!(stack.selected_available(), None);
    }

    #[test]
    fn test_actions_require_selection() {
        let mut stack = stack();
        assert_eq!(stack.add(), Err(StackError::NoSelection(StackSide::Available)));
        assert_eq!(stack.remove(), Err(StackError::NoSelection(StackSide::Active)));
        assert_eq!(stack.move_up(), Err(StackError::NoSelection(StackSide::Active)));
        assert_eq!(stack.move_down(), Err(StackError::NoSelection(StackSide::Active)));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut stack = stack();
        assert_eq!(
            stack.select_active(0),
            Err(StackError::IndexOutOfRange {
                side: StackSide::Active,
                index: 0,
                len: 0
            })
        );
        assert!(stack.select_available(6).is_err());
    }

    #[test]
    fn test_remove_restores_catalogue_order() {
        let mut stack = stack();
        for _ in 0..3 {
            stack.select_available(0).unwrap();
            stack.add().unwrap();
        }
        assert_eq!(names(stack.active()), vec!["desaturate", "darken", "gaussian_blur"]);

        stack.select_active(1).unwrap();
        stack.remove().unwrap();
        assert_eq!(names(stack.available()), vec!["darken", "box_blur", "pixelate", "noise"]);
        assert_eq!(stack.selected_active(), None);

        stack.remove_all();
        assert!(stack.active().is_empty());
        assert_eq!(
            names(stack.available()),
            vec!["desaturate", "darken", "gaussian_blur", "box_blur", "pixelate", "noise"]
        );
    }

    #[test]
    fn test_move_follows_selection() {
        let mut stack = stack();
        for _ in 0..3 {
            stack.select_available(0).unwrap();
            stack.add().unwrap();
        }

        stack.select_active(2).unwrap();
        stack.move_up().unwrap();
        assert_eq!(names(stack.active()), vec!["desaturate", "gaussian_blur", "darken"]);
        assert_eq!(stack.selected_active(), Some(1));

        stack.move_up().unwrap();
        stack.move_up().unwrap();
        assert_eq!(names(stack.active()), vec!["gaussian_blur", "desaturate", "darken"]);
        assert_eq!(stack.selected_active(), Some(0));

        stack.select_active(2).unwrap();
        stack.move_down().unwrap();
        assert_eq!(names(stack.active()), vec!["gaussian_blur", "desaturate", "darken"]);
    }

    #[test]
    fn test_selection_follows_identity() {
        let mut stack = stack();
        for _ in 0..2 {
            stack.select_available(0).unwrap();
            stack.add().unwrap();
        }

        stack.select_active(1).unwrap();
        stack.select_available(0).unwrap();
        stack.add().unwrap();
        assert_eq!(names(stack.active()), vec!["desaturate", "darken", "gaussian_blur"]);
        assert_eq!(stack.selected_active(), Some(1));

        // box_blur is selected; desaturate returns in front of it
        stack.select_available(0).unwrap();
        stack.select_active(0).unwrap();
        stack.remove().unwrap();
        assert_eq!(stack.selected_available(), Some(1));
        assert_eq!(stack.available()[1].name(), "box_blur");
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut stack = stack();
        stack.select_available(1).unwrap();
        stack.add().unwrap();

        let snapshot = stack.snapshot();
        let id = snapshot[0].id;
        stack.set_attribute(id, "amount", Value::Float(0.9)).unwrap();

        assert_eq!(snapshot[0].get_attribute("amount"), Some(&Value::Float(0.5)));
        assert_eq!(stack.find(id).unwrap().get_attribute("amount"), Some(&Value::Float(0.9)));
        assert_eq!(stack.position(id), Some((StackSide::Active, 0)));
    }

    #[test]
    fn test_set_attribute_errors() {
        let mut stack = stack();
        let id = stack.available()[1].id;

        assert!(matches!(
            stack.set_attribute(FilterId::new(), "amount", Value::Float(0.1)),
            Err(GazeError::Stack(StackError::UnknownFilter(_)))
        ));
        assert!(matches!(
            stack.set_attribute(id, "amount", Value::Float(7.0)),
            Err(GazeError::Attribute(_))
        ));
    }

    #[test]
    fn test_duplicate_instances() {
        let registry = FilterRegistry::with_builtins();
        let mut stack = FilterStack::new(Vec::new());
        let first = stack.add_instance(registry.instantiate("noise").unwrap());
        let second = stack.add_instance(registry.instantiate("noise").unwrap());
        assert_ne!(first, second);

        stack.select_available(1).unwrap();
        stack.add().unwrap();
        stack.select_available(0).unwrap();
        stack.add().unwrap();
        stack.remove_all();

        let ids: Vec<FilterId> = stack.available().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![first, second]);
    }
}
