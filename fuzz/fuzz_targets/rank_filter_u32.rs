#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate rank_filter;
extern crate byteorder;

use std::io::Cursor;
use byteorder::{BigEndian, ReadBytesExt};
use rank_filter::util::Xorshift;
use rank_filter::{Error, RankFilter};

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);

    // unbounded, out of range ranks must be rejected
    let rank: f64 = if let Ok(res) = cursor.read_f64::<BigEndian>() {
        res
    } else {
        return;
    };
    // bounded 2**12
    let len: usize = if let Ok(res) = cursor.read_u16::<BigEndian>() {
        (res % 4096) as usize
    } else {
        return;
    };
    let half_length: usize = if let Ok(res) = cursor.read_u16::<BigEndian>() {
        res as usize
    } else {
        return;
    };
    // bounded 2**8, keeps plenty of duplicates in the window
    let spread: u32 = if let Ok(res) = cursor.read_u8() {
        u32::from(res) + 1
    } else {
        return;
    };
    // unbounded
    let seed: u64 = if let Ok(res) = cursor.read_u64::<BigEndian>() {
        res
    } else {
        return;
    };

    let mut xshft = Xorshift::new(seed);
    let src: Vec<u32> = (0..len).map(|_| xshft.next_val() % spread).collect();

    let filter = match RankFilter::new(half_length, rank) {
        Ok(filter) => filter,
        Err(Error::RankOutOfRange { .. }) => {
            assert!(!(rank >= 0.0 && rank <= 1.0));
            return;
        }
        Err(e) => panic!("unexpected error {:?}", e),
    };
    let out = match filter.apply_to_vec(&src) {
        Ok(out) => out,
        Err(Error::WindowTooLarge { .. }) => {
            assert!(half_length >= len);
            return;
        }
        Err(e) => panic!("unexpected error {:?}", e),
    };
    assert_eq!(out.len(), src.len());

    // Every output is a value from the input, and the extremes of a window
    // bound whatever rank was asked for.
    let lows = RankFilter::new(half_length, 0.0).unwrap().apply_to_vec(&src).unwrap();
    let highs = RankFilter::new(half_length, 1.0).unwrap().apply_to_vec(&src).unwrap();
    for (p, v) in out.iter().enumerate() {
        assert!(src.contains(v));
        assert!(lows[p] <= *v && *v <= highs[p]);
    }
});
