// src/curriculum/ordering.rs

use serde::Serialize;

use crate::{
    error::AppError,
    models::{module::Module, phase::Phase, section::Section},
};

/// A row that occupies a numbered slot among its siblings.
pub trait Ordered {
    fn id(&self) -> i64;
    fn order(&self) -> i32;
    fn set_order(&mut self, order: i32);
}

impl Ordered for Phase {
    fn id(&self) -> i64 {
        self.id
    }
    fn order(&self) -> i32 {
        self.phase_order
    }
    fn set_order(&mut self, order: i32) {
        self.phase_order = order;
    }
}

impl Ordered for Section {
    fn id(&self) -> i64 {
        self.id
    }
    fn order(&self) -> i32 {
        self.section_order
    }
    fn set_order(&mut self, order: i32) {
        self.section_order = order;
    }
}

impl Ordered for Module {
    fn id(&self) -> i64 {
        self.id
    }
    fn order(&self) -> i32 {
        self.module_order
    }
    fn set_order(&mut self, order: i32) {
        self.module_order = order;
    }
}

/// One row's new position, written back by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderAssignment {
    pub id: i64,
    pub order: i32,
}

/// Result of planning a drag-and-drop move.
#[derive(Debug)]
pub struct ReorderPlan<T> {
    /// Siblings in their new display order with `order` already renumbered.
    pub items: Vec<T>,
    /// One entry per sibling. Empty when the move changes nothing.
    pub assignments: Vec<OrderAssignment>,
}

impl<T> ReorderPlan<T> {
    pub fn is_noop(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Removes the element at `from` and reinserts it at `to`.
/// Elements between the two indices shift by one; nothing else moves.
pub fn array_move<T>(mut items: Vec<T>, from: usize, to: usize) -> Result<Vec<T>, AppError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(AppError::BadRequest(format!(
            "Move {} -> {} is out of range for {} items",
            from, to, len
        )));
    }

    let moved = items.remove(from);
    items.insert(to, moved);
    Ok(items)
}

/// Assigns `order = position + 1` to every element, moved or not.
pub fn assign_orders<T: Ordered>(items: &mut [T]) -> Vec<OrderAssignment> {
    items
        .iter_mut()
        .enumerate()
        .map(|(position, item)| {
            let order = position as i32 + 1;
            item.set_order(order);
            OrderAssignment {
                id: item.id(),
                order,
            }
        })
        .collect()
}

/// Plans a reorder of `siblings`, which must be in current display order.
///
/// `from_index` has to point at `moved_id`; anything else means the caller is
/// looking at an outdated list and should re-fetch.
pub fn plan_reorder<T: Ordered>(
    siblings: Vec<T>,
    moved_id: i64,
    from_index: usize,
    to_index: usize,
) -> Result<ReorderPlan<T>, AppError> {
    match siblings.get(from_index) {
        Some(item) if item.id() == moved_id => {}
        Some(_) => {
            return Err(AppError::Conflict(
                "Sibling list has changed since it was loaded; refresh and retry".to_string(),
            ));
        }
        None if siblings.iter().any(|s| s.id() == moved_id) => {
            return Err(AppError::BadRequest(format!(
                "from_index {} is out of range for {} items",
                from_index,
                siblings.len()
            )));
        }
        None => {
            return Err(AppError::NotFound(format!(
                "Item {} is not in this list",
                moved_id
            )));
        }
    }

    if from_index == to_index {
        return Ok(ReorderPlan {
            items: siblings,
            assignments: Vec::new(),
        });
    }

    let mut items = array_move(siblings, from_index, to_index)?;
    let assignments = assign_orders(&mut items);

    Ok(ReorderPlan { items, assignments })
}

/// Next order value for a freshly created sibling.
pub fn next_order(existing: impl IntoIterator<Item = i32>) -> i32 {
    existing.into_iter().max().unwrap_or(0) + 1
}
