//! Intrusive hash-chain primitive over arena ids.
//!
//! Each node carries `next` plus a back-reference to whichever slot points
//! at it: a bucket head or the predecessor's `next`. Unlinking a node only
//! touches that slot and the successor, so no chain walk is needed.

/// The slot that holds the id of a chained node.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Pprev<I> {
    Head(usize),
    Next(I),
}

/// Chain link embedded in every node.
#[derive(Debug)]
pub(crate) struct HNode<I> {
    next: Option<I>,
    pprev: Option<Pprev<I>>, // None while unhashed
}

impl<I> HNode<I> {
    pub(crate) const fn unhashed() -> Self {
        Self {
            next: None,
            pprev: None,
        }
    }

    pub(crate) fn is_hashed(&self) -> bool {
        self.pprev.is_some()
    }
}

/// Bucket head: first node of the chain, if any.
#[derive(Debug)]
pub(crate) struct HHead<I> {
    first: Option<I>,
}

impl<I> HHead<I> {
    pub(crate) const fn new() -> Self {
        Self { first: None }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

/// Storage that can resolve an id to its chain link.
pub(crate) trait HLinks<I> {
    fn hnode(&self, id: I) -> &HNode<I>;
    fn hnode_mut(&mut self, id: I) -> &mut HNode<I>;
}

/// Push `id` at the front of bucket `bkt`.
pub(crate) fn add_head<I, N>(heads: &mut [HHead<I>], nodes: &mut N, bkt: usize, id: I)
where
    I: Copy + Eq,
    N: HLinks<I> + ?Sized,
{
    debug_assert!(!nodes.hnode(id).is_hashed(), "node already chained");
    let first = heads[bkt].first;
    if let Some(f) = first {
        nodes.hnode_mut(f).pprev = Some(Pprev::Next(id));
    }
    let n = nodes.hnode_mut(id);
    n.next = first;
    n.pprev = Some(Pprev::Head(bkt));
    heads[bkt].first = Some(id);
}

/// Unlink `id` from whatever chain holds it and reset it to unhashed.
/// Unhashed nodes are left alone.
pub(crate) fn del<I, N>(heads: &mut [HHead<I>], nodes: &mut N, id: I)
where
    I: Copy + Eq,
    N: HLinks<I> + ?Sized,
{
    let n = nodes.hnode_mut(id);
    let Some(pprev) = n.pprev.take() else {
        return;
    };
    let next = n.next.take();
    match pprev {
        Pprev::Head(bkt) => heads[bkt].first = next,
        Pprev::Next(p) => nodes.hnode_mut(p).next = next,
    }
    if let Some(nx) = next {
        nodes.hnode_mut(nx).pprev = Some(pprev);
    }
}

#[inline]
pub(crate) fn first<I: Copy>(head: &HHead<I>) -> Option<I> {
    head.first
}

/// Successor of `id` in its chain. Capturing this before mutating `id`
/// is what makes a walk safe against removal of the current node.
#[inline]
pub(crate) fn next<I, N>(nodes: &N, id: I) -> Option<I>
where
    I: Copy,
    N: HLinks<I> + ?Sized,
{
    nodes.hnode(id).next
}

/// Walks one chain front to back.
pub(crate) struct ChainIter<'a, I, N: ?Sized> {
    nodes: &'a N,
    cur: Option<I>,
}

impl<'a, I, N> ChainIter<'a, I, N>
where
    I: Copy,
    N: HLinks<I> + ?Sized,
{
    pub(crate) fn new(nodes: &'a N, head: &HHead<I>) -> Self {
        Self {
            nodes,
            cur: head.first,
        }
    }
}

impl<'a, I, N> Iterator for ChainIter<'a, I, N>
where
    I: Copy,
    N: HLinks<I> + ?Sized,
{
    type Item = I;

    #[inline]
    fn next(&mut self) -> Option<I> {
        let id = self.cur?;
        self.cur = self.nodes.hnode(id).next;
        Some(id)
    }
}
