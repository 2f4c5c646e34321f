//! Bounded ring/stack on the ordered-list primitive alone.
//!
//! With a non-zero `max_items`, pushing onto a full deque first evicts the
//! current head, whichever end the new item goes to.

use crate::list::{ListHead, ListIter, ListLink, ListLinks};
use core::fmt;
use slotmap::{DefaultKey, SlotMap};

struct DeqNode<T> {
    link: ListLink<DefaultKey>,
    value: T,
}

struct DeqNodes<T>(SlotMap<DefaultKey, DeqNode<T>>);

impl<T> ListLinks<DefaultKey> for DeqNodes<T> {
    #[inline]
    fn link(&self, id: DefaultKey) -> &ListLink<DefaultKey> {
        &self.0[id].link
    }
    #[inline]
    fn link_mut(&mut self, id: DefaultKey) -> &mut ListLink<DefaultKey> {
        &mut self.0[id].link
    }
}

pub struct Deque<T> {
    list: ListHead<DefaultKey>,
    nodes: DeqNodes<T>,
    max_items: usize,
}

impl<T> Deque<T> {
    /// `max_items == 0` means unbounded.
    pub fn new(max_items: usize) -> Self {
        Self {
            list: ListHead::new(),
            nodes: DeqNodes(SlotMap::with_key()),
            max_items,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Push at the front. Returns the evicted head if the deque was full.
    pub fn push_head(&mut self, value: T) -> Option<T> {
        let evicted = self.make_room();
        let id = self.insert(value);
        self.list.add_head(&mut self.nodes, id);
        evicted
    }

    /// Push at the back. Returns the evicted head if the deque was full.
    pub fn push_tail(&mut self, value: T) -> Option<T> {
        let evicted = self.make_room();
        let id = self.insert(value);
        self.list.add_tail(&mut self.nodes, id);
        evicted
    }

    pub fn pop_head(&mut self) -> Option<T> {
        let id = self.list.first()?;
        self.take(id)
    }

    pub fn pop_tail(&mut self) -> Option<T> {
        let id = self.list.last(&self.nodes)?;
        self.take(id)
    }

    pub fn head(&self) -> Option<&T> {
        self.list.first().map(|id| &self.nodes.0[id].value)
    }

    pub fn tail(&self) -> Option<&T> {
        self.list.last(&self.nodes).map(|id| &self.nodes.0[id].value)
    }

    /// Head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            it: self.list.iter(&self.nodes),
        }
    }

    pub fn clear(&mut self) {
        while self.pop_head().is_some() {}
    }

    fn make_room(&mut self) -> Option<T> {
        if self.max_items == 0 || self.len() < self.max_items {
            return None;
        }
        let id = self.list.first()?;
        log::trace!("Deque full ({} items), evicting head", self.max_items);
        self.take(id)
    }

    fn insert(&mut self, value: T) -> DefaultKey {
        self.nodes.0.insert_with_key(|id| DeqNode {
            link: ListLink::detached(id),
            value,
        })
    }

    fn take(&mut self, id: DefaultKey) -> Option<T> {
        self.list.del(&mut self.nodes, id);
        self.nodes.0.remove(id).map(|n| n.value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Deque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, T> {
    nodes: &'a DeqNodes<T>,
    it: ListIter<'a, DefaultKey, DeqNodes<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let nodes = self.nodes;
        self.it.next().map(|id| &nodes.0[id].value)
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        let nodes = self.nodes;
        self.it.next_back().map(|id| &nodes.0[id].value)
    }
}
