//! Circular doubly-linked list over arena ids.
//!
//! There is no sentinel node: the head only remembers the first id, and
//! the first node's `prev` is the last node. A detached link points at
//! itself, so a one-element list is a node linked to itself.

/// List link embedded in every node.
#[derive(Debug)]
pub(crate) struct ListLink<I> {
    prev: I,
    next: I,
}

impl<I: Copy> ListLink<I> {
    /// A link not on any list; both ends point back at `own`.
    pub(crate) fn detached(own: I) -> Self {
        Self {
            prev: own,
            next: own,
        }
    }
}

/// Storage that can resolve an id to its list link.
pub(crate) trait ListLinks<I> {
    fn link(&self, id: I) -> &ListLink<I>;
    fn link_mut(&mut self, id: I) -> &mut ListLink<I>;
}

#[derive(Debug)]
pub(crate) struct ListHead<I> {
    first: Option<I>,
}

impl<I> ListHead<I>
where
    I: Copy + Eq,
{
    pub(crate) const fn new() -> Self {
        Self { first: None }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub(crate) fn first(&self) -> Option<I> {
        self.first
    }

    pub(crate) fn last<N: ListLinks<I> + ?Sized>(&self, nodes: &N) -> Option<I> {
        self.first.map(|f| nodes.link(f).prev)
    }

    /// Successor of `id`, or `None` when `id` is the last node.
    pub(crate) fn next<N: ListLinks<I> + ?Sized>(&self, nodes: &N, id: I) -> Option<I> {
        let n = nodes.link(id).next;
        if Some(n) == self.first {
            None
        } else {
            Some(n)
        }
    }

    /// Insert a detached node at the front.
    pub(crate) fn add_head<N: ListLinks<I> + ?Sized>(&mut self, nodes: &mut N, id: I) {
        self.add_tail(nodes, id);
        self.first = Some(id);
    }

    /// Insert a detached node at the back.
    pub(crate) fn add_tail<N: ListLinks<I> + ?Sized>(&mut self, nodes: &mut N, id: I) {
        let Some(first) = self.first else {
            let l = nodes.link_mut(id);
            l.prev = id;
            l.next = id;
            self.first = Some(id);
            return;
        };
        let last = nodes.link(first).prev;
        {
            let l = nodes.link_mut(id);
            l.prev = last;
            l.next = first;
        }
        nodes.link_mut(last).next = id;
        nodes.link_mut(first).prev = id;
    }

    /// Unlink `id` and leave it detached.
    pub(crate) fn del<N: ListLinks<I> + ?Sized>(&mut self, nodes: &mut N, id: I) {
        let (prev, next) = {
            let l = nodes.link(id);
            (l.prev, l.next)
        };
        if next == id {
            // Only node on the list.
            debug_assert!(self.first == Some(id));
            self.first = None;
        } else {
            nodes.link_mut(prev).next = next;
            nodes.link_mut(next).prev = prev;
            if self.first == Some(id) {
                self.first = Some(next);
            }
        }
        *nodes.link_mut(id) = ListLink::detached(id);
    }

    pub(crate) fn iter<'a, N: ListLinks<I> + ?Sized>(&self, nodes: &'a N) -> ListIter<'a, I, N> {
        ListIter {
            nodes,
            front: self.first,
            back: self.last(nodes),
        }
    }
}

/// Double-ended walk over a list; stops when the two ends meet.
pub(crate) struct ListIter<'a, I, N: ?Sized> {
    nodes: &'a N,
    front: Option<I>,
    back: Option<I>,
}

impl<'a, I, N> Iterator for ListIter<'a, I, N>
where
    I: Copy + Eq,
    N: ListLinks<I> + ?Sized,
{
    type Item = I;

    fn next(&mut self) -> Option<I> {
        let id = self.front?;
        if self.back == Some(id) {
            self.front = None;
            self.back = None;
        } else {
            self.front = Some(self.nodes.link(id).next);
        }
        Some(id)
    }
}

impl<'a, I, N> DoubleEndedIterator for ListIter<'a, I, N>
where
    I: Copy + Eq,
    N: ListLinks<I> + ?Sized,
{
    fn next_back(&mut self) -> Option<I> {
        let id = self.back?;
        if self.front == Some(id) {
            self.front = None;
            self.back = None;
        } else {
            self.back = Some(self.nodes.link(id).prev);
        }
        Some(id)
    }
}
