//! A one dimensional rank-order filter. Every output sample is the value
//! holding a chosen rank among the `2 * half_length + 1` input samples
//! centred on it: rank 0.0 is a running minimum, 1.0 a running maximum and
//! 0.5 a running median.
//!
//! Near either end of the input the window runs past the data. The missing
//! samples are filled by reflection about the end sample, so for an input
//! `a b c d ...` and a half length of 2 the first window is `c b a b c`.
//!
//! The window is kept sorted in a balanced order-statistic tree. A cursor
//! names the sample at the requested rank and is nudged by at most one
//! position each time the window rolls forward, so each output costs
//! O(log window) rather than a fresh sort.
//!
//! # Examples
//!
//! ```
//! use rank_filter::RankFilter;
//!
//! let filter = RankFilter::median(1);
//! let smoothed = filter.apply_to_vec(&[5, 3, 8, 1, 9, 2, 7]).unwrap();
//! assert_eq!(smoothed, vec![3, 5, 3, 8, 2, 7, 2]);
//! ```
use std::collections::VecDeque;
use std::slice;

use log::debug;
use thiserror::Error;

mod cursor;
mod sample;
mod window;

use self::cursor::RankCursor;
use self::sample::Sample;
use self::window::{Handle, OrderedWindow};

/// Precondition failures
///
/// Each of these is caller misuse. They are detected before anything is
/// written to the destination.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum Error {
    /// The source is too short to reflect a window of this size. A source
    /// needs at least `half_length + 1` samples.
    #[error("half length {half_length} needs at least {} samples, source has {len}", .half_length + 1)]
    WindowTooLarge {
        /// The requested half length
        half_length: usize,
        /// The source length
        len: usize,
    },
    /// The destination cannot hold one output per source sample.
    #[error("destination holds {available} samples, {needed} are needed")]
    DestinationTooSmall {
        /// The source length
        needed: usize,
        /// The destination length
        available: usize,
    },
    /// The rank is not within `[0, 1]`, or is NaN.
    #[error("rank {rank} is outside of [0, 1]")]
    RankOutOfRange {
        /// The offending rank
        rank: f64,
    },
}

/// Settings for a rank-order filter
///
/// A `RankFilter` holds no state between calls and can be applied to any
/// number of independent inputs.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct RankFilter {
    half_length: usize,
    rank: f64,
}

impl RankFilter {
    /// Create a new RankFilter
    ///
    /// The window spans `2 * half_length + 1` samples. `rank` selects a
    /// position in the sorted window, from 0.0 (minimum) to 1.0 (maximum).
    ///
    /// # Examples
    /// ```
    /// use rank_filter::{Error, RankFilter};
    ///
    /// let filter = RankFilter::new(2, 0.25).unwrap();
    /// assert_eq!(filter.window_len(), 5);
    /// assert_eq!(filter.rank_pos(), 1);
    ///
    /// assert_eq!(
    ///     RankFilter::new(2, 1.5),
    ///     Err(Error::RankOutOfRange { rank: 1.5 })
    /// );
    /// ```
    pub fn new(half_length: usize, rank: f64) -> Result<RankFilter, Error> {
        let filter = RankFilter {
            half_length: half_length,
            rank: rank,
        };
        filter.check_rank()?;
        Ok(filter)
    }

    /// A running median over `2 * half_length + 1` samples
    pub fn median(half_length: usize) -> RankFilter {
        RankFilter {
            half_length: half_length,
            rank: 0.5,
        }
    }

    /// Half the window, not counting the centre sample
    pub fn half_length(&self) -> usize {
        self.half_length
    }

    /// The requested rank, between 0.0 and 1.0
    pub fn rank(&self) -> f64 {
        self.rank
    }

    /// Total number of samples in each window
    pub fn window_len(&self) -> usize {
        2 * self.half_length + 1
    }

    /// Zero-based position in the sorted window that becomes the output
    ///
    /// This is `rank * (window_len - 1)` rounded to the nearest integer,
    /// halves rounding away from zero.
    ///
    /// # Examples
    /// ```
    /// use rank_filter::RankFilter;
    ///
    /// // a window of 3 has positions 0, 1 and 2; 0.25 * 2 = 0.5 rounds up
    /// assert_eq!(RankFilter::new(1, 0.25).unwrap().rank_pos(), 1);
    /// assert_eq!(RankFilter::new(1, 0.24).unwrap().rank_pos(), 0);
    /// ```
    pub fn rank_pos(&self) -> usize {
        (self.rank * (2 * self.half_length) as f64).round() as usize
    }

    /// Filter `src` into the front of `dst`
    ///
    /// Exactly `src.len()` values are written; anything in `dst` past that is
    /// left alone.
    ///
    /// # Examples
    /// ```
    /// use rank_filter::RankFilter;
    ///
    /// let src = [4, 1, 7, 3];
    /// let mut dst = [0; 6];
    /// RankFilter::new(1, 1.0).unwrap().apply(&src, &mut dst).unwrap();
    /// assert_eq!(dst, [4, 7, 7, 7, 0, 0]);
    /// ```
    pub fn apply<T>(&self, src: &[T], dst: &mut [T]) -> Result<(), Error>
    where
        T: Ord + Clone,
    {
        if dst.len() < src.len() {
            debug!(
                "rejecting rank filter: destination of {} for source of {}",
                dst.len(),
                src.len()
            );
            return Err(Error::DestinationTooSmall {
                needed: src.len(),
                available: dst.len(),
            });
        }
        for (slot, v) in dst.iter_mut().zip(self.iter(src)?) {
            *slot = v;
        }
        Ok(())
    }

    /// Filter `src` into a freshly allocated vector
    ///
    /// # Examples
    /// ```
    /// use rank_filter::RankFilter;
    ///
    /// let filter = RankFilter::new(2, 0.0).unwrap();
    /// let floor = filter.apply_to_vec(&[6, 2, 8, 5, 9, 7]).unwrap();
    /// assert_eq!(floor, vec![2, 2, 2, 2, 5, 5]);
    /// ```
    pub fn apply_to_vec<T>(&self, src: &[T]) -> Result<Vec<T>, Error>
    where
        T: Ord + Clone,
    {
        Ok(self.iter(src)?.collect())
    }

    /// Lazily filter `src`, yielding one output per source sample
    ///
    /// # Examples
    /// ```
    /// use rank_filter::RankFilter;
    ///
    /// let words = ["pear", "fig", "apple", "kiwi"];
    /// let mut iter = RankFilter::median(1).iter(&words).unwrap();
    /// assert_eq!(iter.len(), 4);
    /// assert_eq!(iter.next(), Some("fig"));
    /// assert_eq!(iter.next(), Some("fig"));
    /// ```
    pub fn iter<'a, T>(&self, src: &'a [T]) -> Result<Iter<'a, T>, Error>
    where
        T: Ord + Clone,
    {
        if self.half_length >= src.len() {
            debug!(
                "rejecting rank filter: half length {} for source of {}",
                self.half_length,
                src.len()
            );
            return Err(Error::WindowTooLarge {
                half_length: self.half_length,
                len: src.len(),
            });
        }
        self.check_rank()?;
        debug!(
            "rank filter over {} samples: half_length={} rank={} rank_pos={}",
            src.len(),
            self.half_length,
            self.rank,
            self.rank_pos()
        );
        Ok(Iter::new(src, self.half_length, self.rank_pos()))
    }

    fn check_rank(&self) -> Result<(), Error> {
        if (0.0..=1.0).contains(&self.rank) {
            Ok(())
        } else {
            debug!("rejecting rank filter: rank {}", self.rank);
            Err(Error::RankOutOfRange { rank: self.rank })
        }
    }
}

/// Write the rank-order filtered `src` into the front of `dst`
///
/// Behaves as `RankFilter::apply` with these settings. See the module
/// documentation for the meaning of the arguments.
///
/// Preconditions are checked in order (destination size, window size, rank)
/// and the first one violated is reported.
///
/// # Examples
/// ```
/// use rank_filter::{rank_order_filter_1d, Error};
///
/// let src = [5, 3, 8, 1, 9, 2, 7];
/// let mut dst = [0; 7];
/// rank_order_filter_1d(&src, &mut dst, 1, 0.5).unwrap();
/// assert_eq!(dst, [3, 5, 3, 8, 2, 7, 2]);
///
/// assert_eq!(
///     rank_order_filter_1d(&src, &mut dst, 7, 0.5),
///     Err(Error::WindowTooLarge { half_length: 7, len: 7 })
/// );
/// ```
pub fn rank_order_filter_1d<T>(
    src: &[T],
    dst: &mut [T],
    half_length: usize,
    rank: f64,
) -> Result<(), Error>
where
    T: Ord + Clone,
{
    RankFilter {
        half_length: half_length,
        rank: rank,
    }.apply(src, dst)
}

/// Iterator over rank-order filtered samples, see `RankFilter::iter`
#[derive(Debug)]
pub struct Iter<'a, T>
where
    T: 'a,
{
    rest: slice::Iter<'a, T>,
    window: OrderedWindow<T>,
    // Handles in arrival order; the front is the next sample to leave.
    queue: VecDeque<Handle>,
    cursor: RankCursor,
    rank_pos: usize,
    values_seen: u64,
    // Counts down by two per reflected sample at the tail.
    reflect_pos: usize,
    primed: bool,
    remaining: usize,
}

impl<'a, T> Iter<'a, T>
where
    T: Ord + Clone,
{
    // Callers have checked that `half_length < src.len()` and that
    // `rank_pos < 2 * half_length + 1`.
    fn new(src: &'a [T], half_length: usize, rank_pos: usize) -> Iter<'a, T> {
        let length = 2 * half_length + 1;
        let mut window = OrderedWindow::with_capacity(length + 1);
        let mut queue = VecDeque::with_capacity(length + 1);
        let mut values_seen = 0;

        // Positions -half_length..=-1 mirror src[half_length]..=src[1].
        let reflected = src[1..=half_length].iter().rev();
        let forward = src[..=half_length].iter();
        for v in reflected.chain(forward) {
            queue.push_back(window.insert(Sample::new(v.clone(), values_seen)));
            values_seen += 1;
        }
        let cursor = RankCursor::seat(&window, rank_pos);

        Iter {
            rest: src[half_length + 1..].iter(),
            window: window,
            queue: queue,
            cursor: cursor,
            rank_pos: rank_pos,
            values_seen: values_seen,
            reflect_pos: length - 1,
            primed: false,
            remaining: src.len(),
        }
    }

    fn roll(&mut self) {
        let prev = match self.queue.pop_front() {
            Some(prev) => prev,
            None => unreachable!("rank filter window drained"),
        };

        // Past the end of the source the tail is mirrored out of the window's
        // own history, walking back two positions for each new one.
        let v = match self.rest.next() {
            Some(v) => v.clone(),
            None => {
                self.reflect_pos -= 2;
                self.window[self.queue[self.reflect_pos]].v.clone()
            }
        };
        let next = Sample::new(v, self.values_seen);
        self.values_seen += 1;

        let inserted = self.cursor.roll(&mut self.window, prev, next);
        self.queue.push_back(inserted);

        debug_assert_eq!(self.window.len(), self.queue.len());
        debug_assert_eq!(self.window.rank_of(self.cursor.handle()), Some(self.rank_pos));
    }
}

impl<'a, T> Iterator for Iter<'a, T>
where
    T: Ord + Clone,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if !self.primed {
            self.primed = true;
        } else if self.rest.len() > 0 || self.reflect_pos > 0 {
            self.roll();
        } else {
            return None;
        }
        self.remaining -= 1;
        Some(self.cursor.value(&self.window).clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> where T: Ord + Clone {}
