//! Positional index and dense class-n-gram count arrays.
//!
//! Implements §4.1 (`array_offset`) and §4.2 (count arrays) of the word
//! class induction design: a bijection between ordered class-id tuples and
//! flat offsets, and the dense arrays it addresses.

use crate::error::ClusterCatError;

/// Map an ordered tuple of class ids `(c_0, .., c_{n-1})` to a flat offset
/// into a dense array of length `K^n`.
///
/// `offset = ((c_0*K + c_1)*K + ...)*K + c_{n-1}`. Defined for `classes`
/// non-empty; for a single class id the offset is that id. Bijective on
/// `[0,K)^n -> [0,K^n)` for any `K >= 1`.
#[inline]
pub fn array_offset(classes: &[u32], num_classes: u32) -> u64 {
    debug_assert!(!classes.is_empty());
    let mut offset: u64 = 0;
    for &c in classes {
        offset = offset * (num_classes as u64) + (c as u64);
    }
    offset
}

/// Dense, per-order class n-gram count arrays for orders `1..=max_array`.
///
/// `arrays[n-1]` holds `K^n` counts, addressed via [`array_offset`]. All
/// increments during corpus scan are single-threaded (or through per-thread
/// scratch copies merged afterwards); reads are plain loads and may happen
/// concurrently with other reads.
#[derive(Debug, Clone)]
pub struct CountArrays {
    arrays: Vec<Vec<u64>>,
    num_classes: u32,
    max_array: u8,
}

impl CountArrays {
    /// Allocate zeroed count arrays for orders `1..=max_array`.
    ///
    /// Fails if any order's `K^n` would exceed
    /// [`crate::config::COUNT_ARRAY_MAX_ENTRIES`], surfacing the failure to
    /// the caller (the exchange driver), which must either decrease `K` or
    /// abort with exit code 12.
    pub fn allocate(max_array: u8, num_classes: u32) -> Result<Self, ClusterCatError> {
        let mut arrays = Vec::with_capacity(max_array as usize);
        for order in 1..=max_array {
            let len = checked_pow(num_classes as u64, order as u32)
                .ok_or(ClusterCatError::CountArrayAllocation { order, num_classes })?;
            if len > crate::config::COUNT_ARRAY_MAX_ENTRIES {
                return Err(ClusterCatError::CountArrayAllocation { order, num_classes });
            }
            arrays.push(vec![0u64; len as usize]);
        }
        Ok(CountArrays { arrays, num_classes, max_array })
    }

    pub fn max_array(&self) -> u8 {
        self.max_array
    }

    pub fn num_classes(&self) -> u32 {
        self.num_classes
    }

    /// Zero every order's array in place.
    pub fn clear(&mut self) {
        for arr in &mut self.arrays {
            arr.iter_mut().for_each(|c| *c = 0);
        }
    }

    /// Increment the count of the class n-gram named by `classes`
    /// (`classes.len()` determines the order, 1-indexed).
    #[inline]
    pub fn increment(&mut self, classes: &[u32]) {
        let order = classes.len();
        let offset = array_offset(classes, self.num_classes) as usize;
        self.arrays[order - 1][offset] += 1;
    }

    /// Decrement the count of the class n-gram named by `classes`. Used by
    /// "apply move" to subtract the contribution of the old assignment.
    #[inline]
    pub fn decrement(&mut self, classes: &[u32]) {
        let order = classes.len();
        let offset = array_offset(classes, self.num_classes) as usize;
        debug_assert!(self.arrays[order - 1][offset] > 0);
        self.arrays[order - 1][offset] -= 1;
    }

    /// Read the count of the class n-gram named by `classes`.
    #[inline]
    pub fn read(&self, classes: &[u32]) -> u64 {
        let order = classes.len();
        let offset = array_offset(classes, self.num_classes) as usize;
        self.arrays[order - 1][offset]
    }

    /// Add `delta` to the count of the class n-gram named by `classes`.
    /// Used by "apply move" to fold in the new assignment's contribution.
    #[inline]
    pub fn add_count(&mut self, classes: &[u32], delta: u64) {
        let order = classes.len();
        let offset = array_offset(classes, self.num_classes) as usize;
        self.arrays[order - 1][offset] += delta;
    }

    /// Subtract `delta` from the count of the class n-gram named by
    /// `classes`. Used by "apply move" to remove the old assignment's
    /// contribution.
    #[inline]
    pub fn sub_count(&mut self, classes: &[u32], delta: u64) {
        let order = classes.len();
        let offset = array_offset(classes, self.num_classes) as usize;
        debug_assert!(self.arrays[order - 1][offset] >= delta);
        self.arrays[order - 1][offset] = self.arrays[order - 1][offset].saturating_sub(delta);
    }

    /// Total of the order-1 array — equals the total token count (including
    /// `<s>`/`</s>`).
    pub fn total_unigrams(&self) -> u64 {
        self.arrays[0].iter().sum()
    }

    /// Raw slice access to one order's array, for bitwise round-trip tests.
    pub fn order_slice(&self, order: u8) -> &[u64] {
        &self.arrays[order as usize - 1]
    }
}

/// `base^exp`, returning `None` on overflow instead of panicking.
fn checked_pow(base: u64, exp: u32) -> Option<u64> {
    let mut result: u64 = 1;
    for _ in 0..exp {
        result = result.checked_mul(base)?;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_unigram_is_identity() {
        assert_eq!(array_offset(&[0], 5), 0);
        assert_eq!(array_offset(&[4], 5), 4);
    }

    #[test]
    fn offset_bigram_matches_formula() {
        // K=3: offset(c0,c1) = c0*3 + c1
        assert_eq!(array_offset(&[0, 0], 3), 0);
        assert_eq!(array_offset(&[1, 2], 3), 1 * 3 + 2);
        assert_eq!(array_offset(&[2, 2], 3), 2 * 3 + 2);
    }

    #[test]
    fn offset_trigram_matches_formula() {
        let k = 4u32;
        assert_eq!(array_offset(&[1, 2, 3], k), ((1 * 4 + 2) * 4 + 3));
    }

    #[test]
    fn offset_is_bijective_over_full_range() {
        let k = 4u32;
        for n in 1..=3u32 {
            let mut seen = std::collections::HashSet::new();
            let total = (k as u64).pow(n);
            // Enumerate every tuple of length n in [0,k)^n.
            let mut tuple = vec![0u32; n as usize];
            for idx in 0..total {
                let mut rem = idx;
                for slot in (0..n as usize).rev() {
                    tuple[slot] = (rem % k as u64) as u32;
                    rem /= k as u64;
                }
                let off = array_offset(&tuple, k);
                assert!(off < total);
                assert!(seen.insert(off), "offset {off} collided for tuple {tuple:?}");
            }
            assert_eq!(seen.len() as u64, total);
        }
    }

    #[test]
    fn allocate_rejects_oversized_arrays() {
        let err = CountArrays::allocate(3, 1_000_000_000).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn increment_and_read_round_trip() {
        let mut arrays = CountArrays::allocate(2, 3).unwrap();
        arrays.increment(&[1]);
        arrays.increment(&[1]);
        arrays.increment(&[1, 2]);
        assert_eq!(arrays.read(&[1]), 2);
        assert_eq!(arrays.read(&[1, 2]), 1);
        arrays.decrement(&[1]);
        assert_eq!(arrays.read(&[1]), 1);
    }

    #[test]
    fn clear_zeroes_all_orders() {
        let mut arrays = CountArrays::allocate(2, 3).unwrap();
        arrays.increment(&[0]);
        arrays.increment(&[0, 1]);
        arrays.clear();
        assert_eq!(arrays.total_unigrams(), 0);
        assert_eq!(arrays.read(&[0, 1]), 0);
    }
}
