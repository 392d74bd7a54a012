//! The sorted side of the sliding window.
//!
//! `OrderedWindow` is a treap over `Sample`s living in an arena. Nodes never
//! move once placed; rotations and merges only rewrite child links. That is
//! what lets a `Handle` stay valid while other samples come and go. A slot
//! that is vacated bumps its generation so an old handle can't silently
//! resolve to whatever sample is put there next.
use std::cmp::Ordering;
use std::ops::Index;

use super::sample::Sample;
use crate::util::Xorshift;

// Priorities only need to be well spread; a fixed seed keeps every run of
// the filter shaped identically.
const PRIORITY_SEED: u64 = 0x00C0_FFEE;

/// A stable reference to one sample in an `OrderedWindow`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    slot: usize,
    generation: u32,
}

#[derive(Debug)]
struct Node<T> {
    sample: Sample<T>,
    priority: u32,
    // number of nodes in the subtree rooted here, this one included
    size: usize,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

#[derive(Debug)]
pub struct OrderedWindow<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    root: Option<usize>,
    priorities: Xorshift,
}

impl<T> OrderedWindow<T>
where
    T: Ord,
{
    pub fn with_capacity(capacity: usize) -> OrderedWindow<T> {
        OrderedWindow {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: None,
            priorities: Xorshift::new(PRIORITY_SEED),
        }
    }

    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    /// Resolve `handle`, or `None` if its sample has since been removed.
    pub fn get(&self, handle: Handle) -> Option<&Sample<T>> {
        self.slots
            .get(handle.slot)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_ref())
            .map(|node| &node.sample)
    }

    /// Insert `sample`, returning the handle that names it from now on.
    ///
    /// `sample` must not compare equal to anything already stored. The filter
    /// guarantees this by never reusing a sequence index.
    pub fn insert(&mut self, sample: Sample<T>) -> Handle {
        let slot = self.alloc(sample);
        let root = self.root;
        let (lo, hi) = self.split(root, slot);
        let lo = self.merge(lo, Some(slot));
        self.root = self.merge(lo, hi);
        self.handle(slot)
    }

    /// Remove the sample behind `handle`. Stale handles remove nothing.
    pub fn remove(&mut self, handle: Handle) -> Option<Sample<T>> {
        self.get(handle)?;
        let root = self.root;
        self.root = self.detach(root, handle.slot);

        let slot = &mut self.slots[handle.slot];
        slot.generation = slot.generation.wrapping_add(1);
        let node = slot.node.take()?;
        self.free.push(handle.slot);
        Some(node.sample)
    }

    /// The `k`-th smallest sample, counting from zero.
    pub fn select(&self, k: usize) -> Option<Handle> {
        let mut k = k;
        let mut link = self.root;
        while let Some(t) = link {
            let node = self.node(t);
            let left = self.size(node.left);
            match k.cmp(&left) {
                Ordering::Less => link = node.left,
                Ordering::Equal => return Some(self.handle(t)),
                Ordering::Greater => {
                    k -= left + 1;
                    link = node.right;
                }
            }
        }
        None
    }

    /// How many stored samples order strictly before the one behind `handle`.
    pub fn rank_of(&self, handle: Handle) -> Option<usize> {
        let key = self.get(handle)?;
        let mut rank = 0;
        let mut link = self.root;
        while let Some(t) = link {
            let node = self.node(t);
            match key.cmp(&node.sample) {
                Ordering::Less => link = node.left,
                Ordering::Equal => return Some(rank + self.size(node.left)),
                Ordering::Greater => {
                    rank += self.size(node.left) + 1;
                    link = node.right;
                }
            }
        }
        None
    }

    /// The greatest sample ordering before the one behind `handle`.
    pub fn predecessor(&self, handle: Handle) -> Option<Handle> {
        let key = self.get(handle)?;
        let mut best = None;
        let mut link = self.root;
        while let Some(t) = link {
            let node = self.node(t);
            if node.sample < *key {
                best = Some(t);
                link = node.right;
            } else {
                link = node.left;
            }
        }
        best.map(|t| self.handle(t))
    }

    /// The least sample ordering after the one behind `handle`.
    pub fn successor(&self, handle: Handle) -> Option<Handle> {
        let key = self.get(handle)?;
        let mut best = None;
        let mut link = self.root;
        while let Some(t) = link {
            let node = self.node(t);
            if node.sample > *key {
                best = Some(t);
                link = node.left;
            } else {
                link = node.right;
            }
        }
        best.map(|t| self.handle(t))
    }

    #[cfg(test)]
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            window: self,
            stack: Vec::new(),
        };
        iter.descend(self.root);
        iter
    }

    fn handle(&self, slot: usize) -> Handle {
        Handle {
            slot: slot,
            generation: self.slots[slot].generation,
        }
    }

    fn node(&self, slot: usize) -> &Node<T> {
        match self.slots[slot].node {
            Some(ref node) => node,
            None => unreachable!("vacant slot {} is linked into the window", slot),
        }
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<T> {
        match self.slots[slot].node {
            Some(ref mut node) => node,
            None => unreachable!("vacant slot {} is linked into the window", slot),
        }
    }

    fn size(&self, link: Option<usize>) -> usize {
        link.map_or(0, |t| self.node(t).size)
    }

    fn refresh(&mut self, slot: usize) {
        let size = {
            let node = self.node(slot);
            1 + self.size(node.left) + self.size(node.right)
        };
        self.node_mut(slot).size = size;
    }

    fn alloc(&mut self, sample: Sample<T>) -> usize {
        let node = Node {
            sample: sample,
            priority: self.priorities.next_val(),
            size: 1,
            left: None,
            right: None,
        };
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot].node = Some(node);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    // Split the subtree at `link` into the samples ordering before `pivot`
    // and the rest. `pivot` itself is not linked anywhere yet.
    fn split(&mut self, link: Option<usize>, pivot: usize) -> (Option<usize>, Option<usize>) {
        let t = match link {
            Some(t) => t,
            None => return (None, None),
        };
        if self.node(t).sample < self.node(pivot).sample {
            let right = self.node(t).right;
            let (lo, hi) = self.split(right, pivot);
            self.node_mut(t).right = lo;
            self.refresh(t);
            (Some(t), hi)
        } else {
            let left = self.node(t).left;
            let (lo, hi) = self.split(left, pivot);
            self.node_mut(t).left = hi;
            self.refresh(t);
            (lo, Some(t))
        }
    }

    // Every sample under `lo` must order before every sample under `hi`.
    fn merge(&mut self, lo: Option<usize>, hi: Option<usize>) -> Option<usize> {
        let (a, b) = match (lo, hi) {
            (None, hi) => return hi,
            (lo, None) => return lo,
            (Some(a), Some(b)) => (a, b),
        };
        if self.node(a).priority > self.node(b).priority {
            let right = self.node(a).right;
            let merged = self.merge(right, hi);
            self.node_mut(a).right = merged;
            self.refresh(a);
            Some(a)
        } else {
            let left = self.node(b).left;
            let merged = self.merge(lo, left);
            self.node_mut(b).left = merged;
            self.refresh(b);
            Some(b)
        }
    }

    fn detach(&mut self, link: Option<usize>, target: usize) -> Option<usize> {
        let t = link?;
        if t == target {
            let (left, right) = {
                let node = self.node(t);
                (node.left, node.right)
            };
            return self.merge(left, right);
        }
        if self.node(target).sample < self.node(t).sample {
            let left = self.node(t).left;
            let left = self.detach(left, target);
            self.node_mut(t).left = left;
        } else {
            let right = self.node(t).right;
            let right = self.detach(right, target);
            self.node_mut(t).right = right;
        }
        self.refresh(t);
        Some(t)
    }
}

impl<T> Index<Handle> for OrderedWindow<T>
where
    T: Ord,
{
    type Output = Sample<T>;

    fn index(&self, handle: Handle) -> &Sample<T> {
        match self.get(handle) {
            Some(sample) => sample,
            None => panic!("stale window handle {:?}", handle),
        }
    }
}

/// In-order walk over the window
#[cfg(test)]
pub struct Iter<'a, T> {
    window: &'a OrderedWindow<T>,
    stack: Vec<usize>,
}

#[cfg(test)]
impl<'a, T> Iter<'a, T>
where
    T: Ord,
{
    fn descend(&mut self, mut link: Option<usize>) {
        while let Some(t) = link {
            self.stack.push(t);
            link = self.window.node(t).left;
        }
    }
}

#[cfg(test)]
impl<'a, T> Iterator for Iter<'a, T>
where
    T: Ord,
{
    type Item = &'a Sample<T>;

    fn next(&mut self) -> Option<&'a Sample<T>> {
        let t = self.stack.pop()?;
        let window: &'a OrderedWindow<T> = self.window;
        let node = window.node(t);
        self.descend(node.right);
        Some(&node.sample)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};

    fn filled(values: &[i32]) -> (OrderedWindow<i32>, Vec<Handle>) {
        let mut window = OrderedWindow::with_capacity(values.len());
        let handles = values
            .iter()
            .enumerate()
            .map(|(i, v)| window.insert(Sample::new(*v, i as u64)))
            .collect();
        (window, handles)
    }

    #[test]
    fn insert_keeps_order() {
        fn inner(data: Vec<i32>) -> bool {
            let (window, _) = filled(&data);
            let stored: Vec<i32> = window.iter().map(|s| s.v).collect();
            let mut expected = data.clone();
            expected.sort();
            stored == expected && window.len() == data.len()
        }
        QuickCheck::new().quickcheck(inner as fn(Vec<i32>) -> bool);
    }

    #[test]
    fn handles_survive_unrelated_removal() {
        fn inner(data: Vec<i32>, gone: usize) -> TestResult {
            if data.is_empty() {
                return TestResult::discard();
            }
            let gone = gone % data.len();
            let (mut window, handles) = filled(&data);

            let removed = window.remove(handles[gone]).map(|s| s.v);
            if removed != Some(data[gone]) {
                return TestResult::failed();
            }
            for (i, h) in handles.iter().enumerate() {
                let found = window.get(*h).map(|s| (s.v, s.seq));
                let expected = if i == gone {
                    None
                } else {
                    Some((data[i], i as u64))
                };
                if found != expected {
                    return TestResult::failed();
                }
            }
            TestResult::from_bool(window.len() == data.len() - 1)
        }
        QuickCheck::new().quickcheck(inner as fn(Vec<i32>, usize) -> TestResult);
    }

    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let (mut window, handles) = filled(&[4, 2, 9]);
        assert_eq!(window.remove(handles[1]).map(|s| s.v), Some(2));
        let fresh = window.insert(Sample::new(2, 3));

        assert!(window.get(handles[1]).is_none());
        assert!(window.remove(handles[1]).is_none());
        assert_eq!(window[fresh].seq, 3);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn select_and_rank_of_agree() {
        fn inner(data: Vec<i32>) -> bool {
            let (window, handles) = filled(&data);
            let sorted: Vec<i32> = window.iter().map(|s| s.v).collect();
            for (k, v) in sorted.iter().enumerate() {
                let h = match window.select(k) {
                    Some(h) => h,
                    None => return false,
                };
                if window[h].v != *v || window.rank_of(h) != Some(k) {
                    return false;
                }
            }
            window.select(data.len()).is_none()
                && handles.iter().all(|h| window.rank_of(*h).is_some())
        }
        QuickCheck::new().quickcheck(inner as fn(Vec<i32>) -> bool);
    }

    #[test]
    fn neighbours_follow_rank() {
        fn inner(data: Vec<i32>) -> bool {
            let (window, handles) = filled(&data);
            handles.iter().all(|h| {
                let rank = window.rank_of(*h).unwrap();
                let prev = window.predecessor(*h).and_then(|p| window.rank_of(p));
                let next = window.successor(*h).and_then(|n| window.rank_of(n));
                prev == rank.checked_sub(1)
                    && next == Some(rank + 1).filter(|r| *r < data.len())
            })
        }
        QuickCheck::new().quickcheck(inner as fn(Vec<i32>) -> bool);
    }

    #[test]
    fn equal_values_order_by_arrival() {
        let (window, handles) = filled(&[5, 5, 5]);
        assert_eq!(window.rank_of(handles[0]), Some(0));
        assert_eq!(window.rank_of(handles[1]), Some(1));
        assert_eq!(window.rank_of(handles[2]), Some(2));
        assert_eq!(window.successor(handles[0]), Some(handles[1]));
        assert_eq!(window.predecessor(handles[0]), None);
    }

    #[test]
    fn sliding_churn_keeps_size() {
        let mut xshft = Xorshift::new(1972);
        let mut window = OrderedWindow::with_capacity(16);
        let mut queue = std::collections::VecDeque::new();
        for seq in 0..4096u64 {
            let v = xshft.next_val() % 32;
            queue.push_back(window.insert(Sample::new(v, seq)));
            if queue.len() > 15 {
                let h = queue.pop_front().unwrap();
                assert!(window.remove(h).is_some());
            }
            assert_eq!(window.len(), queue.len());
        }
        // Slots are recycled rather than grown without bound.
        assert!(window.slots.len() <= 16);
    }
}
