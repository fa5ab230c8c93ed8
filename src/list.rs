use crate::iter::{Iter, IterMut};

pub(crate) type Link<T> = Option<Box<Node<T>>>;

pub(crate) struct Node<T> {
    pub(crate) data: T,
    pub(crate) next: Link<T>,
}

/// A singly-linked list whose nodes own their payloads.
///
/// Positions are indexed from 0. Insertion and removal clamp out-of-range
/// positions instead of failing: adding past the end appends, removing past
/// the end takes the last node.
pub struct LinkedList<T> {
    head: Link<T>,
    len: usize,
}

impl<T> LinkedList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Number of nodes in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `data` as a new node at position `index`.
    ///
    /// An `index` greater than the length appends at the end.
    pub fn add_at(&mut self, index: usize, data: T) {
        let index = index.min(self.len);
        let mut node = Box::new(Node { data, next: None });

        if index == 0 {
            node.next = self.head.take();
            self.head = Some(node);
        } else {
            match self.node_mut(index - 1) {
                Some(prev) => {
                    node.next = prev.next.take();
                    prev.next = Some(node);
                }
                None => return,
            }
        }
        self.len += 1;
    }

    /// Unlink the node at position `index` and hand its payload back.
    ///
    /// An `index` past the last node removes the last node. Returns `None`
    /// only when the list is empty.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let index = index.min(self.len - 1);

        let mut removed = if index == 0 {
            let mut node = self.head.take()?;
            self.head = node.next.take();
            node
        } else {
            let prev = self.node_mut(index - 1)?;
            let mut node = prev.next.take()?;
            prev.next = node.next.take();
            node
        };
        removed.next = None;
        self.len -= 1;
        Some(removed.data)
    }

    /// Payload of the node at position `index`, walking from the head.
    pub fn get(&self, index: usize) -> Option<&T> {
        let mut node = self.head.as_deref()?;
        for _ in 0..index {
            node = node.next.as_deref()?;
        }
        Some(&node.data)
    }

    /// Release every node, leaving the list empty.
    pub fn clear(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
        self.len = 0;
    }

    /// Iterate over payloads from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.head.as_deref())
    }

    /// Iterate mutably over payloads from head to tail.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.head.as_deref_mut())
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut Node<T>> {
        let mut node = self.head.as_deref_mut()?;
        for _ in 0..index {
            node = node.next.as_deref_mut()?;
        }
        Some(node)
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Unlinks node by node so long buckets don't recurse through `Box` drops.
impl<T> Drop for LinkedList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LinkedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(list: &LinkedList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_add_at_positions() {
        let mut list = LinkedList::new();
        list.add_at(0, 2);
        list.add_at(0, 1);
        list.add_at(2, 4);
        list.add_at(2, 3);
        assert_eq!(collect(&list), vec![1, 2, 3, 4]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_add_past_end_appends() {
        let mut list = LinkedList::new();
        list.add_at(10, 1);
        list.add_at(10, 2);
        assert_eq!(collect(&list), vec![1, 2]);
    }

    #[test]
    fn test_remove_at() {
        let mut list = LinkedList::new();
        for i in 0..5 {
            list.add_at(i, i as i32);
        }

        assert_eq!(list.remove_at(2), Some(2));
        assert_eq!(list.remove_at(0), Some(0));
        assert_eq!(collect(&list), vec![1, 3, 4]);

        // Out of range takes the last node.
        assert_eq!(list.remove_at(100), Some(4));
        assert_eq!(collect(&list), vec![1, 3]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_from_empty() {
        let mut list: LinkedList<i32> = LinkedList::new();
        assert_eq!(list.remove_at(0), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_get_and_iter_mut() {
        let mut list = LinkedList::new();
        list.add_at(0, 10);
        list.add_at(1, 20);

        for value in list.iter_mut() {
            *value += 1;
        }
        assert_eq!(list.get(0), Some(&11));
        assert_eq!(list.get(1), Some(&21));
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut list = LinkedList::new();
        list.add_at(0, String::from("a"));
        list.add_at(1, String::from("b"));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);

        list.add_at(5, String::from("c"));
        assert_eq!(list.get(0).map(String::as_str), Some("c"));
    }

    #[test]
    fn test_long_list_drop() {
        let mut list = LinkedList::new();
        for i in 0..200_000 {
            list.add_at(0, i);
        }
        assert_eq!(list.len(), 200_000);
        drop(list);
    }
}
