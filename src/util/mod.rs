//! Small helpers shared by the filter, its benches and its fuzz target.

/// A splitmix64-flavoured pseudo-random generator
///
/// This is not a source of randomness worth the name. It exists to hand out
/// well-spread, reproducible numbers: treap priorities inside the ordered
/// window and synthetic input data in benches.
#[derive(Debug, Clone, Copy)]
pub struct Xorshift {
    seed: u64,
}

impl Xorshift {
    /// Create a new generator from `seed`. Equal seeds give equal sequences.
    pub fn new(seed: u64) -> Xorshift {
        Xorshift { seed: seed }
    }

    /// Return the next value in the sequence
    pub fn next_val(&mut self) -> u32 {
        // implementation inspired by
        // https://github.com/astocko/xorshift/blob/master/src/splitmix64.rs
        use std::num::Wrapping as w;

        let mut z = w(self.seed) + w(0x9E37_79B9_7F4A_7C15_u64);
        let nxt_seed = z.0;
        z = (z ^ (z >> 30)) * w(0xBF58_476D_1CE4_E5B9_u64);
        z = (z ^ (z >> 27)) * w(0x94D0_49BB_1331_11EB_u64);
        self.seed = nxt_seed;
        (z ^ (z >> 31)).0 as u32
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        fn inner(seed: u64) -> bool {
            let mut lhs = Xorshift::new(seed);
            let mut rhs = Xorshift::new(seed);
            (0..64).all(|_| lhs.next_val() == rhs.next_val())
        }
        quickcheck::QuickCheck::new().quickcheck(inner as fn(u64) -> bool);
    }

    #[test]
    fn values_are_spread() {
        let mut xshft = Xorshift::new(1972);
        let mut vals: Vec<u32> = (0..1024).map(|_| xshft.next_val()).collect();
        vals.sort();
        vals.dedup();
        assert!(vals.len() > 1000);
    }
}
