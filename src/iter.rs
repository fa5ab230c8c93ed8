use crate::list::{LinkedList, Node};
use crate::table::Record;

/// Borrowing iterator over the payloads of a [`LinkedList`], head to tail.
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(head: Option<&'a Node<T>>) -> Self {
        Self { next: head }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.data
        })
    }
}

/// Mutable iterator over the payloads of a [`LinkedList`], head to tail.
pub struct IterMut<'a, T> {
    next: Option<&'a mut Node<T>>,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(head: Option<&'a mut Node<T>>) -> Self {
        Self { next: head }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|node| {
            self.next = node.next.as_deref_mut();
            &mut node.data
        })
    }
}

/// Iterator over the `(key, value)` bytes of every record in a hash table.
///
/// Walks the buckets in index order; within a bucket, records come out in
/// list order (most recently inserted first).
pub struct Records<'a> {
    buckets: std::slice::Iter<'a, LinkedList<Record>>,
    current: Option<Iter<'a, Record>>,
    remaining: usize,
}

impl<'a> Records<'a> {
    pub(crate) fn new(buckets: &'a [LinkedList<Record>], len: usize) -> Self {
        Self {
            buckets: buckets.iter(),
            current: None,
            remaining: len,
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.as_mut().and_then(|records| records.next()) {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((record.key(), record.value()));
            }
            // Current bucket exhausted, move to the next one
            self.current = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Records<'_> {}

/// Iterator over the `(key, value)` strings held by a server.
pub struct ServerEntries<'a> {
    records: Records<'a>,
}

impl<'a> ServerEntries<'a> {
    pub(crate) fn new(records: Records<'a>) -> Self {
        Self { records }
    }
}

impl<'a> Iterator for ServerEntries<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        // Servers only ever store bytes taken from `&str`, so decoding never
        // skips a record in practice.
        for (key, value) in self.records.by_ref() {
            if let (Ok(key), Ok(value)) = (std::str::from_utf8(key), std::str::from_utf8(value)) {
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.records.len()))
    }
}
