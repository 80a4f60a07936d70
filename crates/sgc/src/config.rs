//! Heap configuration.

use crate::error::HeapError;

/// Sizing parameters for a [`crate::Heap`].
///
/// Both capacities are fixed for the life of the heap; the collector
/// never grows either space.
///
/// # Examples
///
/// ```rust
/// use sgc::HeapConfig;
///
/// let config = HeapConfig {
///     heap_cells: 4096,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HeapConfig {
    /// Cells per semispace. Total heap storage is twice this.
    pub heap_cells: usize,

    /// Capacity of the root registry.
    pub root_slots: usize,
}

impl HeapConfig {
    /// Default semispace capacity. Dynamic scope keeps every call
    /// environment on the chain reachable from its callees, so deep
    /// recursion is heap-hungry even when it is tail recursion; the
    /// default leaves room for tens of thousands of live frames.
    pub const DEFAULT_HEAP_CELLS: usize = 256 * 1024;

    /// Default root registry capacity. The registry's high-water mark
    /// grows with evaluator recursion depth, not with heap size.
    pub const DEFAULT_ROOT_SLOTS: usize = 4096;

    /// Smallest usable semispace.
    pub const MIN_HEAP_CELLS: usize = 64;

    /// Smallest usable registry.
    pub const MIN_ROOT_SLOTS: usize = 16;

    /// Check that the configuration can back a working heap.
    pub fn validate(&self) -> Result<(), HeapError> {
        if self.heap_cells < Self::MIN_HEAP_CELLS {
            return Err(HeapError::Config(format!(
                "heap_cells must be at least {}, got {}",
                Self::MIN_HEAP_CELLS,
                self.heap_cells
            )));
        }
        if self.heap_cells >= u32::MAX as usize {
            return Err(HeapError::Config(format!(
                "heap_cells must fit a 32-bit cell reference, got {}",
                self.heap_cells
            )));
        }
        if self.root_slots < Self::MIN_ROOT_SLOTS {
            return Err(HeapError::Config(format!(
                "root_slots must be at least {}, got {}",
                Self::MIN_ROOT_SLOTS,
                self.root_slots
            )));
        }
        Ok(())
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            heap_cells: Self::DEFAULT_HEAP_CELLS,
            root_slots: Self::DEFAULT_ROOT_SLOTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(HeapConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tiny_heap_rejected() {
        let config = HeapConfig {
            heap_cells: 8,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HeapError::Config(_))));
    }

    #[test]
    fn test_tiny_registry_rejected() {
        let config = HeapConfig {
            root_slots: 2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HeapError::Config(_))));
    }

    #[test]
    fn test_oversized_heap_rejected() {
        let config = HeapConfig {
            heap_cells: u32::MAX as usize,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
