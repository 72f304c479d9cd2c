//! Traversal order over the dense entry store.
//!
//! Plain tables traverse entries in array order `[0, len)`. Ordered tables
//! thread a doubly linked list through the entries by index, so insertion
//! order (or access order) survives the slot shuffling done by
//! swap-with-last removal.

/// List boundary marker. Never a valid index: tables hold at most
/// `MAX_CAPACITY` (`1 << 30`) entries.
pub(crate) const ENDPOINT: u32 = u32::MAX - 1;

#[derive(Clone, Debug)]
pub(crate) enum Links {
    /// Array order; nothing to maintain.
    Array,
    Ordered(OrderLinks),
}

#[derive(Clone, Debug)]
pub(crate) struct OrderLinks {
    pred: Vec<u32>,
    succ: Vec<u32>,
    head: u32,
    tail: u32,
    access_order: bool,
}

#[inline]
fn opt(i: u32) -> Option<usize> {
    (i != ENDPOINT).then_some(i as usize)
}

impl OrderLinks {
    pub(crate) fn new(access_order: bool) -> Self {
        Self {
            pred: Vec::new(),
            succ: Vec::new(),
            head: ENDPOINT,
            tail: ENDPOINT,
            access_order,
        }
    }

    fn unlink(&mut self, i: usize) {
        let (p, s) = (self.pred[i], self.succ[i]);
        match p {
            ENDPOINT => self.head = s,
            p => self.succ[p as usize] = s,
        }
        match s {
            ENDPOINT => self.tail = p,
            s => self.pred[s as usize] = p,
        }
    }

    fn link_as_tail(&mut self, i: usize) {
        let idx = i as u32;
        self.pred[i] = self.tail;
        self.succ[i] = ENDPOINT;
        match self.tail {
            ENDPOINT => self.head = idx,
            t => self.succ[t as usize] = idx,
        }
        self.tail = idx;
    }

    /// Points the neighbours of the entry now stored at `i` back at `i`.
    fn relink_moved(&mut self, i: usize) {
        let idx = i as u32;
        match self.pred[i] {
            ENDPOINT => self.head = idx,
            p => self.succ[p as usize] = idx,
        }
        match self.succ[i] {
            ENDPOINT => self.tail = idx,
            s => self.pred[s as usize] = idx,
        }
    }
}

impl Links {
    pub(crate) fn ordered(access_order: bool) -> Self {
        Links::Ordered(OrderLinks::new(access_order))
    }

    /// Same ordering discipline, no entries.
    pub(crate) fn empty_like(&self) -> Links {
        match self {
            Links::Array => Links::Array,
            Links::Ordered(l) => Links::ordered(l.access_order),
        }
    }

    pub(crate) fn access_order(&self) -> bool {
        matches!(self, Links::Ordered(l) if l.access_order)
    }

    pub(crate) fn is_array_order(&self) -> bool {
        matches!(self, Links::Array)
    }

    /// Entry `i` was just appended to the store.
    pub(crate) fn on_insert(&mut self, i: usize) {
        if let Links::Ordered(l) = self {
            debug_assert_eq!(i, l.pred.len());
            l.pred.push(ENDPOINT);
            l.succ.push(ENDPOINT);
            l.link_as_tail(i);
        }
    }

    /// Entry `i` was looked up. Returns true if the order changed.
    pub(crate) fn on_access(&mut self, i: usize) -> bool {
        match self {
            Links::Ordered(l) if l.access_order && l.tail != i as u32 => {
                l.unlink(i);
                l.link_as_tail(i);
                true
            }
            _ => false,
        }
    }

    /// Entry `i` is being removed and the entry at `last` relocated into its
    /// slot. Must run before the store performs the same swap.
    pub(crate) fn on_remove(&mut self, i: usize, last: usize) {
        if let Links::Ordered(l) = self {
            l.unlink(i);
            l.pred.swap_remove(i);
            l.succ.swap_remove(i);
            if i != last {
                l.relink_moved(i);
            }
        }
    }

    /// Where a traversal should resume after `removed` was swap-removed with
    /// `last`, given that it would have resumed at `upcoming`.
    pub(crate) fn adjust_after_remove(
        &self,
        upcoming: Option<usize>,
        removed: usize,
        last: usize,
    ) -> Option<usize> {
        match self {
            // The old last entry now sits in the slot just visited.
            Links::Array if removed != last => Some(removed),
            Links::Array => upcoming,
            Links::Ordered(_) if upcoming == Some(last) => Some(removed),
            Links::Ordered(_) => upcoming,
        }
    }

    pub(crate) fn first(&self, len: usize) -> Option<usize> {
        match self {
            Links::Array => (len > 0).then_some(0),
            Links::Ordered(l) => opt(l.head),
        }
    }

    pub(crate) fn last(&self, len: usize) -> Option<usize> {
        match self {
            Links::Array => len.checked_sub(1),
            Links::Ordered(l) => opt(l.tail),
        }
    }

    pub(crate) fn next(&self, i: usize, len: usize) -> Option<usize> {
        match self {
            Links::Array => (i + 1 < len).then_some(i + 1),
            Links::Ordered(l) => opt(l.succ[i]),
        }
    }

    pub(crate) fn prev(&self, i: usize) -> Option<usize> {
        match self {
            Links::Array => i.checked_sub(1),
            Links::Ordered(l) => opt(l.pred[i]),
        }
    }

    pub(crate) fn clear(&mut self) {
        if let Links::Ordered(l) = self {
            l.pred.clear();
            l.succ.clear();
            l.head = ENDPOINT;
            l.tail = ENDPOINT;
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        if let Links::Ordered(l) = self {
            l.pred.reserve(additional);
            l.succ.reserve(additional);
        }
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        if let Links::Ordered(l) = self {
            l.pred.shrink_to_fit();
            l.succ.shrink_to_fit();
        }
    }

    /// Panics unless the list visits each of `len` indices exactly once in
    /// both directions.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self, len: usize) {
        let forward: Vec<usize> =
            std::iter::successors(self.first(len), |&i| self.next(i, len)).collect();
        let mut backward: Vec<usize> =
            std::iter::successors(self.last(len), |&i| self.prev(i)).collect();
        backward.reverse();
        assert_eq!(forward.len(), len, "forward walk length");
        assert_eq!(forward, backward, "backward walk is not the reverse");
        let mut seen = vec![false; len];
        for i in forward {
            assert!(!seen[i], "index {i} visited twice");
            seen[i] = true;
        }
        if let Links::Ordered(l) = self {
            assert_eq!(l.pred.len(), len);
            assert_eq!(l.succ.len(), len);
        }
    }
}
