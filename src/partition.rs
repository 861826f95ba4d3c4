//! The `(I, J) -> (IL, IS, JL, JS)` block partition used both to split a
//! transfer length into source blocks and to split a source block into
//! sub-blocks, and the byte-offset arithmetic built on top of it for
//! locating a symbol within a source object.

/// A partition of `I` items into `J` groups: `JL` groups of size `IL` and
/// `JS` groups of size `IS`, with `IL = IS + 1` (or `IL = 0` when `I < J`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub il: u64,
    pub is: u64,
    pub jl: u64,
    pub js: u64,
}

/// Splits `i` into `j` groups as evenly as possible.
pub fn partition(i: u64, j: u64) -> Partition {
    if j == 0 {
        return Partition { il: 0, is: 0, jl: 0, js: 0 };
    }
    let mut il = i.div_ceil(j);
    let is = i / j;
    let jl = i - is * j;
    let js = j - jl;
    if jl == 0 {
        il = 0;
    }
    Partition { il, is, jl, js }
}

/// Number of symbols in sub-block `n` (0-indexed) of a `(kt, z)`
/// partition: `IL` for the first `JL` blocks, `IS` for the rest.
pub fn block_symbols(kt: u64, z: u64, sbn: u32) -> u64 {
    let p = partition(kt, z);
    let sbn = sbn as u64;
    if sbn < p.jl {
        p.il
    } else if sbn - p.jl < p.js {
        p.is
    } else {
        0
    }
}

/// Byte offset (from the start of a source block) of symbol `p`'s data
/// within sub-symbol `symbol_id`, under the `(t, al)` sub-partition
/// derived from `t / al` groups. `k` is the block's symbol count.
pub fn symbol_offset(k: u64, t: u64, al: u64, p: u64, symbol_id: u64) -> u64 {
    let sub = partition(t / al, k.max(1));
    let long_region = sub.il * sub.jl;
    let byte_pos = if p < long_region {
        (p / sub.il) * k * sub.il + symbol_id * sub.il + (p % sub.il)
    } else {
        let p2 = p - long_region;
        long_region * k + (p2 / sub.is) * k * sub.is + symbol_id * sub.is + (p2 % sub.is)
    };
    byte_pos * al
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_accounts_for_all_items() {
        for (i, j) in [(10u64, 3u64), (100, 7), (1, 1), (0, 4), (5, 5)] {
            let p = partition(i, j);
            assert_eq!(p.il * p.jl + p.is * p.js, i, "i={i} j={j}");
            assert_eq!(p.jl + p.js, if j == 0 { 0 } else { j });
        }
    }

    #[test]
    fn partition_handles_fewer_items_than_groups() {
        let p = partition(2, 5);
        assert_eq!(p.il, 0);
        assert_eq!(p.is, 0);
        assert_eq!(p.jl, 2);
        assert_eq!(p.js, 3);
    }

    #[test]
    fn block_symbols_sum_to_kt() {
        let kt = 37u64;
        let z = 5u64;
        let total: u64 = (0..z as u32).map(|sbn| block_symbols(kt, z, sbn)).sum();
        assert_eq!(total, kt);
    }

    #[test]
    fn symbol_offsets_are_strictly_increasing_within_a_block() {
        let (k, t, al) = (10u64, 40u64, 4u64);
        let mut last = None;
        for p in 0..(t / al) {
            let off = symbol_offset(k, t, al, p, 0);
            if let Some(prev) = last {
                assert!(off > prev);
            }
            last = Some(off);
        }
    }
}
