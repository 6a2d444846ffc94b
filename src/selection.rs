//! Checkable list with a user-controlled display order.
//!
//! The backing items come from outside (e.g. all prefix prompts) and can be
//! replaced at any time with [`SelectionList::set_items`]. Display order only
//! changes through [`SelectionList::reorder`] or when items disappear.
//! [`DragState`] turns pointer gestures into `reorder` calls.

use std::collections::{HashMap, HashSet};

use crate::prompt::Prompt;

/// Items tracked by a [`SelectionList`] are keyed by a stable id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Prompt {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct SelectionList<T> {
    /// Items in display order.
    items: Vec<T>,
    /// Keys of checked items.
    checked: HashSet<String>,
}

impl<T> Default for SelectionList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            checked: HashSet::new(),
        }
    }
}

impl<T: Keyed + Clone> SelectionList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in display order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reconciles with a fresh set of backing items.
    ///
    /// Surviving keys keep their display position and checked flag (and pick
    /// up the new item value). Missing keys are dropped. New keys go to the
    /// end, unchecked, in the order they appear in `items`. The order of
    /// `items` itself never reorders survivors.
    pub fn set_items(&mut self, items: Vec<T>) {
        let mut natural_order: Vec<String> = Vec::with_capacity(items.len());
        let mut incoming: HashMap<String, T> = HashMap::with_capacity(items.len());
        for item in items {
            let key = item.key().to_string();
            if !incoming.contains_key(&key) {
                natural_order.push(key.clone());
                incoming.insert(key, item);
            }
        }

        let mut next: Vec<T> = Vec::with_capacity(incoming.len());
        for existing in &self.items {
            if let Some(item) = incoming.remove(existing.key()) {
                next.push(item);
            }
        }
        for key in natural_order {
            if let Some(item) = incoming.remove(&key) {
                next.push(item);
            }
        }

        let live: HashSet<&str> = next.iter().map(|item| item.key()).collect();
        self.checked.retain(|key| live.contains(key.as_str()));
        self.items = next;
    }

    /// Moves the item at `from` to `to` (remove, then insert).
    ///
    /// Returns false without changing anything if either index is out of
    /// bounds or they are equal.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.checked.contains(key)
    }

    /// Sets the checked flag for a tracked key. Unknown keys are ignored.
    pub fn set_checked(&mut self, key: &str, checked: bool) -> bool {
        if !self.items.iter().any(|item| item.key() == key) {
            return false;
        }
        if checked {
            self.checked.insert(key.to_string());
        } else {
            self.checked.remove(key);
        }
        true
    }

    /// Flips the checked flag of the item at `index`.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let key = self.items.get(index)?.key().to_string();
        let now_checked = !self.checked.contains(&key);
        self.set_checked(&key, now_checked);
        Some(now_checked)
    }

    /// Checked items, in display order.
    pub fn checked_in_order(&self) -> Vec<T> {
        self.items
            .iter()
            .filter(|item| self.checked.contains(item.key()))
            .cloned()
            .collect()
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    /// Unchecks everything. Order is untouched.
    pub fn clear_all(&mut self) {
        self.checked.clear();
    }
}

/// Screen extent of one rendered row, used for drag hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    /// Display index of the item on this row.
    pub index: usize,
    pub top: u16,
    pub height: u16,
}

impl RowSpan {
    fn contains(&self, y: u16) -> bool {
        y >= self.top && y < self.top.saturating_add(self.height)
    }

    /// Twice the distance from `y`'s cell center to this row's center.
    fn distance2(&self, y: u16) -> u32 {
        let center2 = 2 * u32::from(self.top) + u32::from(self.height);
        let pointer2 = 2 * u32::from(y) + 1;
        center2.abs_diff(pointer2)
    }
}

/// Single-pointer drag-to-reorder gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: usize,
        /// Provisional drop target, `None` while over the source row.
        target: Option<usize>,
        rows: Vec<RowSpan>,
    },
}

impl DragState {
    pub fn is_active(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn source(&self) -> Option<usize> {
        match self {
            DragState::Dragging { source, .. } => Some(*source),
            DragState::Idle => None,
        }
    }

    pub fn target(&self) -> Option<usize> {
        match self {
            DragState::Dragging { target, .. } => *target,
            DragState::Idle => None,
        }
    }

    /// Starts a drag from the row showing `source`.
    ///
    /// Ignored (returns false) while another drag is in flight or when
    /// `source` is not among `rows`.
    pub fn begin(&mut self, source: usize, rows: Vec<RowSpan>) -> bool {
        if self.is_active() || !rows.iter().any(|r| r.index == source) {
            return false;
        }
        *self = DragState::Dragging {
            source,
            target: None,
            rows,
        };
        true
    }

    /// Tracks the pointer; the row with the nearest center becomes the
    /// provisional target. Returns the target to highlight.
    pub fn motion(&mut self, y: u16) -> Option<usize> {
        let DragState::Dragging {
            source,
            target,
            rows,
        } = self
        else {
            return None;
        };
        let source = *source;
        *target = rows
            .iter()
            .min_by_key(|r| r.distance2(y))
            .map(|r| r.index)
            .filter(|index| *index != source);
        *target
    }

    /// Ends the drag. Returns `(from, to)` for [`SelectionList::reorder`]
    /// when released over a row other than the source.
    pub fn release(&mut self, y: u16) -> Option<(usize, usize)> {
        let DragState::Dragging { source, rows, .. } = std::mem::take(self) else {
            return None;
        };
        let over = rows.iter().find(|r| r.contains(y))?;
        (over.index != source).then_some((source, over.index))
    }

    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }
}
