//! Structure ordering strategies
//!
//! Greedy placement is order-sensitive, so the order is injectable. Every
//! strategy is a total order: ties always fall back to input index.

use crate::structures::StructureSpec;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Decides which structure the search places next
pub trait OrderingStrategy: Send + Sync {
    /// Short name reported on the resulting layout
    fn name(&self) -> &str;

    /// Permutation of `0..specs.len()` giving placement order
    fn order(&self, specs: &[StructureSpec]) -> Vec<usize>;
}

/// Explicit priority first, then mandatory before optional, then larger
/// minimum footprint, then input order
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityOrdering;

impl OrderingStrategy for PriorityOrdering {
    fn name(&self) -> &str {
        "priority"
    }

    fn order(&self, specs: &[StructureSpec]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..specs.len()).collect();
        indices.sort_by_key(|&i| {
            let spec = &specs[i];
            (
                spec.priority.unwrap_or(u32::MAX),
                !spec.mandatory,
                Reverse(OrderedFloat(spec.min_area())),
                i,
            )
        });
        indices
    }
}

/// Largest maximum footprint first
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestFirst;

impl OrderingStrategy for LargestFirst {
    fn name(&self) -> &str {
        "largest_first"
    }

    fn order(&self, specs: &[StructureSpec]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..specs.len()).collect();
        indices.sort_by_key(|&i| (Reverse(OrderedFloat(specs[i].max_area())), i));
        indices
    }
}

/// Smallest minimum footprint first
#[derive(Debug, Clone, Copy, Default)]
pub struct SmallestFirst;

impl OrderingStrategy for SmallestFirst {
    fn name(&self) -> &str {
        "smallest_first"
    }

    fn order(&self, specs: &[StructureSpec]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..specs.len()).collect();
        indices.sort_by_key(|&i| (OrderedFloat(specs[i].min_area()), i));
        indices
    }
}

/// As supplied
#[derive(Debug, Clone, Copy, Default)]
pub struct InputOrder;

impl OrderingStrategy for InputOrder {
    fn name(&self) -> &str {
        "input_order"
    }

    fn order(&self, specs: &[StructureSpec]) -> Vec<usize> {
        (0..specs.len()).collect()
    }
}

/// Built-in strategies, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingKind {
    Priority,
    LargestFirst,
    SmallestFirst,
    InputOrder,
}

impl OrderingKind {
    pub fn strategy(self) -> Box<dyn OrderingStrategy> {
        match self {
            OrderingKind::Priority => Box::new(PriorityOrdering),
            OrderingKind::LargestFirst => Box::new(LargestFirst),
            OrderingKind::SmallestFirst => Box::new(SmallestFirst),
            OrderingKind::InputOrder => Box::new(InputOrder),
        }
    }
}
