//! ## Treap buffer
//! Bounded set of distinct values where each value carries an independently drawn
//! priority in `[0, 1)`. Values are kept in a randomized binary search tree ("treap"):
//! - ordered by a [`Comparator`] over values (binary search tree invariant),
//! - max-heap ordered by priority, so the root always holds the maximum priority.
//!
//! With independent uniform priorities the expected depth is `O(log n)`, which bounds
//! insert, delete and lookup without any explicit rebalancing bookkeeping.
//!
//! The buffer only tracks `capacity`; callers are responsible for checking
//! [`TreapBuffer::is_full`] before inserting.

use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};

/// Total order over buffered values.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering;
}

/// Comparator using the natural [`Ord`] of the value type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        lhs.cmp(rhs)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        self(lhs, rhs)
    }
}

type Link<T> = Option<Box<Node<T>>>;

/// Tree node owned exclusively by its parent (or by the buffer for the root).
struct Node<T> {
    value: T,
    priority: f64,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    #[inline]
    fn new(value: T, priority: f64) -> Box<Self> {
        Box::new(Self {
            value,
            priority,
            left: None,
            right: None,
        })
    }
}

/// Capacity-bounded treap of distinct values.
pub struct TreapBuffer<T, C = NaturalOrder> {
    root: Link<T>,
    capacity: usize,
    size: usize,
    order: C,
}

impl<T: Ord> TreapBuffer<T> {
    /// Creates an empty buffer ordered by `T`'s natural order
    pub fn new(capacity: usize) -> Self {
        Self::with_comparator(capacity, NaturalOrder)
    }
}

impl<T, C: Comparator<T>> TreapBuffer<T, C> {
    /// Creates an empty buffer ordered by `order`
    pub fn with_comparator(capacity: usize, order: C) -> Self {
        Self {
            root: None,
            capacity,
            size: 0,
            order,
        }
    }

    /// Insert `value` with `priority`, replacing any existing entry for the same value.
    ///
    /// Returns `true` when an older entry was replaced. The new node descends to its
    /// leaf position and is rotated up for as long as its priority exceeds its parent's.
    pub fn insert(&mut self, value: T, priority: f64) -> bool {
        let replaced = self.delete(&value);
        let root = self.root.take();
        self.root = Some(insert_node(root, Node::new(value, priority), &self.order));
        self.size += 1;
        replaced
    }

    /// Delete `value` from the buffer. Returns `false` if it was not present.
    pub fn delete(&mut self, value: &T) -> bool {
        match delete_node(&mut self.root, value, &self.order) {
            Some(_) => {
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Return whether `value` is stored in the buffer
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Return priority stored for `value`
    pub fn get(&self, value: &T) -> Option<f64> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match self.order.compare(value, &node.value) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node.priority),
            };
        }
        None
    }

    /// Remove the root, i.e. the value holding the maximum priority.
    pub fn pop_max(&mut self) -> Option<(T, f64)> {
        let node = unlink(&mut self.root)?;
        self.size -= 1;
        let Node {
            value, priority, ..
        } = *node;
        Some((value, priority))
    }
}

impl<T, C> TreapBuffer<T, C> {
    /// Return value and priority stored in the root
    #[inline]
    pub fn peek_max(&self) -> Option<(&T, f64)> {
        self.root.as_deref().map(|node| (&node.value, node.priority))
    }

    /// Return maximum priority currently stored, or `None` for an empty buffer
    #[inline]
    pub fn peek_max_priority(&self) -> Option<f64> {
        self.root.as_deref().map(|node| node.priority)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return whether the buffer holds `capacity` values
    #[inline]
    pub fn is_full(&self) -> bool {
        self.size >= self.capacity
    }

    /// Return the number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn depth_of<T>(link: &Link<T>) -> usize {
            match link {
                Some(node) => 1 + depth_of(&node.left).max(depth_of(&node.right)),
                None => 0,
            }
        }
        depth_of(&self.root)
    }

    /// Iterate over stored values and their priorities in comparator order
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    /// Drop every stored value
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }
}

impl<T: Debug, C> Debug for TreapBuffer<T, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ size: {}, capacity: {}, root: ", self.size, self.capacity)?;
        match self.peek_max() {
            Some((value, priority)) => {
                write!(f, "<value: {:?}, priority: {:.6}> }}", value, priority)
            }
            None => write!(f, "nil }}"),
        }
    }
}

/// In-order iterator over a [`TreapBuffer`]
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut link: Option<&'a Node<T>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some((&node.value, node.priority))
    }
}

/// Lift the left child above `node`
#[inline]
fn rotate_right<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    match node.left.take() {
        Some(mut pivot) => {
            node.left = pivot.right.take();
            pivot.right = Some(node);
            pivot
        }
        None => node,
    }
}

/// Lift the right child above `node`
#[inline]
fn rotate_left<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    match node.right.take() {
        Some(mut pivot) => {
            node.right = pivot.left.take();
            pivot.left = Some(node);
            pivot
        }
        None => node,
    }
}

fn insert_node<T, C: Comparator<T>>(link: Link<T>, new: Box<Node<T>>, order: &C) -> Box<Node<T>> {
    let Some(mut root) = link else {
        return new;
    };
    match order.compare(&new.value, &root.value) {
        Ordering::Less => {
            let child = insert_node(root.left.take(), new, order);
            // equal priorities never rotate
            let lift = child.priority > root.priority;
            root.left = Some(child);
            if lift {
                rotate_right(root)
            } else {
                root
            }
        }
        Ordering::Greater => {
            let child = insert_node(root.right.take(), new, order);
            let lift = child.priority > root.priority;
            root.right = Some(child);
            if lift {
                rotate_left(root)
            } else {
                root
            }
        }
        // `insert` deletes equal values before descending
        Ordering::Equal => root,
    }
}

/// Find and detach the node holding `value`
fn delete_node<T, C: Comparator<T>>(link: &mut Link<T>, value: &T, order: &C) -> Option<Box<Node<T>>> {
    let node = link.as_mut()?;
    match order.compare(value, &node.value) {
        Ordering::Less => delete_node(&mut node.left, value, order),
        Ordering::Greater => delete_node(&mut node.right, value, order),
        Ordering::Equal => unlink(link),
    }
}

/// Detach the node at `link`, rotating it down until it has at most one child.
///
/// The child with the higher priority is lifted at every step, so the heap
/// invariant holds on the way down and no successor search is needed.
fn unlink<T>(link: &mut Link<T>) -> Option<Box<Node<T>>> {
    let mut node = link.take()?;
    match (node.left.take(), node.right.take()) {
        (None, child) | (child, None) => {
            *link = child;
            Some(node)
        }
        (Some(left), Some(right)) => {
            let lift_right = left.priority < right.priority;
            node.left = Some(left);
            node.right = Some(right);
            let (pivot, removed) = if lift_right {
                let mut pivot = rotate_left(node);
                let removed = unlink(&mut pivot.left);
                (pivot, removed)
            } else {
                let mut pivot = rotate_right(node);
                let removed = unlink(&mut pivot.right);
                (pivot, removed)
            };
            *link = Some(pivot);
            removed
        }
    }
}

#[cfg(test)]
impl<T, C: Comparator<T>> TreapBuffer<T, C> {
    /// Panic unless search tree order, heap order and `size` are all consistent
    pub(crate) fn assert_invariants(&self) {
        fn walk<T>(node: &Node<T>) -> usize {
            let mut count = 1;
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                assert!(child.priority <= node.priority, "heap order violated");
                count += walk(child);
            }
            count
        }

        let count = self.root.as_deref().map_or(0, walk);
        assert_eq!(count, self.size, "size does not match number of nodes");

        let values: Vec<&T> = self.iter().map(|(value, _)| value).collect();
        for pair in values.windows(2) {
            assert_eq!(
                self.order.compare(pair[0], pair[1]),
                Ordering::Less,
                "search tree order violated"
            );
        }
    }
}
