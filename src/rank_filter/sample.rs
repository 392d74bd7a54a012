use std::cmp;

/// A value inside the window, tagged with the order it arrived in.
///
/// `seq` is handed out from a counter that only ever increases, so no two
/// samples of one filter run share it.
#[derive(Debug, Clone)]
pub struct Sample<T> {
    pub v: T,
    pub seq: u64,
}

impl<T> Sample<T> {
    pub fn new(v: T, seq: u64) -> Sample<T> {
        Sample { v: v, seq: seq }
    }
}

// Samples order by value first. Equal values fall back on `seq`, which makes
// the order total and puts the earliest arrival first.
impl<T> Ord for Sample<T>
where
    T: Ord,
{
    fn cmp(&self, other: &Sample<T>) -> cmp::Ordering {
        self.v
            .cmp(&other.v)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl<T> PartialOrd for Sample<T>
where
    T: Ord,
{
    fn partial_cmp(&self, other: &Sample<T>) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Sample<T>
where
    T: Ord,
{
    fn eq(&self, other: &Sample<T>) -> bool {
        self.cmp(other) == cmp::Ordering::Equal
    }
}

impl<T> Eq for Sample<T> where T: Ord {}
