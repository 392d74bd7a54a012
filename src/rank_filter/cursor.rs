//! Incremental upkeep of the output position inside the sorted window.
//!
//! The cursor names the sample that currently holds the requested rank. Each
//! roll step removes one sample and adds another; depending on which side of
//! the cursor those two land, the cursor either stays where it is or moves by
//! exactly one position. It is never searched for again after seating.
use super::sample::Sample;
use super::window::{Handle, OrderedWindow};

/// Where the departing and arriving values fall relative to the cursor
///
/// Comparisons are on plain values. Ties are settled by arrival order: the
/// departing sample is the oldest in the window and so ranks before any equal
/// value, the arriving sample is the newest and ranks after any equal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Departing above, arriving at or above. The cursor keeps its place.
    Above,
    /// Departing at or below, arriving below. The cursor keeps its place
    /// unless it is the departing sample, in which case it steps back.
    Below,
    /// Departing above, arriving below. The cursor steps back one.
    Back,
    /// Departing at or below, arriving at or above. The cursor steps
    /// forward one.
    Forward,
}

impl Shift {
    pub fn classify<T>(rank_value: &T, prev: &T, next: &T) -> Shift
    where
        T: Ord,
    {
        match (rank_value < prev, rank_value <= next) {
            (true, true) => Shift::Above,
            (false, false) => Shift::Below,
            (true, false) => Shift::Back,
            (false, true) => Shift::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RankCursor {
    handle: Handle,
}

impl RankCursor {
    /// Place the cursor on the `rank_pos`-th smallest sample of a full
    /// window.
    pub fn seat<T>(window: &OrderedWindow<T>, rank_pos: usize) -> RankCursor
    where
        T: Ord,
    {
        match window.select(rank_pos) {
            Some(handle) => RankCursor { handle: handle },
            None => unreachable!(
                "rank position {} outside a window of {}",
                rank_pos,
                window.len()
            ),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn value<'a, T>(&self, window: &'a OrderedWindow<T>) -> &'a T
    where
        T: Ord,
    {
        &window[self.handle].v
    }

    /// Swap `prev` out of the window for `next`, keeping the cursor on the
    /// same rank. Returns the handle of the inserted sample.
    ///
    /// `prev` must be the oldest sample in the window and `next` newer than
    /// all of them.
    pub fn roll<T>(&mut self, window: &mut OrderedWindow<T>, prev: Handle, next: Sample<T>) -> Handle
    where
        T: Ord,
    {
        let shift = Shift::classify(self.value(window), &window[prev].v, &next.v);
        let departing = self.handle == prev;

        // Inserting first and erasing last means the cursor always has a
        // live neighbour to move to, even when it is the departing sample.
        let inserted = window.insert(next);
        match shift {
            Shift::Above => debug_assert!(!departing),
            Shift::Below => {
                if departing {
                    self.step_back(window);
                }
            }
            Shift::Back => self.step_back(window),
            Shift::Forward => self.step_forward(window),
        }
        window.remove(prev);
        inserted
    }

    fn step_back<T>(&mut self, window: &OrderedWindow<T>)
    where
        T: Ord,
    {
        match window.predecessor(self.handle) {
            Some(handle) => self.handle = handle,
            None => unreachable!("rank cursor stepped back off the window"),
        }
    }

    fn step_forward<T>(&mut self, window: &OrderedWindow<T>)
    where
        T: Ord,
    {
        match window.successor(self.handle) {
            Some(handle) => self.handle = handle,
            None => unreachable!("rank cursor stepped forward off the window"),
        }
    }
}
