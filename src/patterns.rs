//! Cutting-pattern enumeration for a single stock length.
//!
//! Walks the grid `{0..=max_count_0} x {0..=max_count_1} x ...` in
//! lexicographic order (last slot fastest). A branch is abandoned as soon as
//! the pieces placed so far, plus the kerf they need, exceed the bar. Every
//! combination below such a branch would fail the same check, so the output
//! matches a full grid scan exactly.

use std::ops::ControlFlow;

use crate::progress::CancelToken;
use crate::types::{Pattern, round2};

/// Nodes visited between cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Kerf lost when cutting `pieces` pieces from one bar.
pub fn kerf_loss(pieces: u64, kerf_width: u32) -> u64 {
    pieces.saturating_sub(1) * kerf_width as u64
}

/// Largest count of `demand_length` that fits in `stock_length`, ignoring kerf.
/// A zero length never fits.
pub fn max_count(stock_length: u32, demand_length: u32) -> u32 {
    if demand_length == 0 {
        0
    } else {
        stock_length / demand_length
    }
}

/// Size of the unpruned search grid, saturating at `u128::MAX`.
pub fn grid_size(stock_length: u32, demand_lengths: &[u32]) -> u128 {
    demand_lengths.iter().fold(1u128, |acc, &len| {
        acc.saturating_mul(max_count(stock_length, len) as u128 + 1)
    })
}

pub fn generate_patterns(stock_length: u32, demand_lengths: &[u32], kerf_width: u32) -> Vec<Pattern> {
    let never = CancelToken::new();
    generate_patterns_until(stock_length, demand_lengths, kerf_width, &never).unwrap_or_default()
}

/// Like [`generate_patterns`], but gives up with `None` once `cancel` is set.
pub fn generate_patterns_until(
    stock_length: u32,
    demand_lengths: &[u32],
    kerf_width: u32,
    cancel: &CancelToken,
) -> Option<Vec<Pattern>> {
    if cancel.is_cancelled() {
        return None;
    }
    if demand_lengths.is_empty() {
        return Some(Vec::new());
    }

    let mut walker = Walker {
        stock_length,
        kerf_width,
        lengths: demand_lengths,
        max_counts: demand_lengths
            .iter()
            .map(|&len| max_count(stock_length, len))
            .collect(),
        combo: vec![0; demand_lengths.len()],
        patterns: Vec::new(),
        visited: 0,
        cancel,
    };

    match walker.descend(0, 0, 0) {
        ControlFlow::Continue(()) => Some(walker.patterns),
        ControlFlow::Break(()) => None,
    }
}

struct Walker<'a> {
    stock_length: u32,
    kerf_width: u32,
    lengths: &'a [u32],
    max_counts: Vec<u32>,
    combo: Vec<u32>,
    patterns: Vec<Pattern>,
    visited: u64,
    cancel: &'a CancelToken,
}

impl Walker<'_> {
    fn descend(&mut self, slot: usize, used: u64, pieces: u64) -> ControlFlow<()> {
        self.visited += 1;
        if self.visited % CANCEL_CHECK_INTERVAL == 0 && self.cancel.is_cancelled() {
            return ControlFlow::Break(());
        }

        if slot == self.lengths.len() {
            self.emit(used, pieces);
            return ControlFlow::Continue(());
        }

        let length = self.lengths[slot] as u64;
        let stock = self.stock_length as u64;
        for count in 0..=self.max_counts[slot] {
            let used = used + length * count as u64;
            let pieces = pieces + count as u64;
            if used + kerf_loss(pieces, self.kerf_width) > stock {
                break;
            }
            self.combo[slot] = count;
            self.descend(slot + 1, used, pieces)?;
        }
        self.combo[slot] = 0;
        ControlFlow::Continue(())
    }

    fn emit(&mut self, used: u64, pieces: u64) {
        if pieces == 0 {
            return;
        }
        let kerf = kerf_loss(pieces, self.kerf_width);
        let consumption = used + kerf;
        let stock = self.stock_length as u64;
        if consumption > stock {
            return;
        }
        self.patterns.push(Pattern {
            stock_length: self.stock_length,
            combo: self.combo.clone(),
            pieces_length: used,
            kerf_loss: kerf,
            waste: stock - consumption,
            utilization: round2(consumption as f64 / stock as f64 * 100.0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Unpruned grid scan, used as the reference enumeration.
    fn brute_force(stock_length: u32, lengths: &[u32], kerf: u32) -> Vec<Vec<u32>> {
        let maxes: Vec<u32> = lengths.iter().map(|&l| max_count(stock_length, l)).collect();
        let mut out = Vec::new();
        let mut combo = vec![0u32; lengths.len()];
        loop {
            let pieces: u64 = combo.iter().map(|&c| c as u64).sum();
            let used: u64 = combo
                .iter()
                .zip(lengths)
                .map(|(&c, &l)| c as u64 * l as u64)
                .sum();
            if pieces > 0 && used + kerf_loss(pieces, kerf) <= stock_length as u64 {
                out.push(combo.clone());
            }
            // odometer, last slot fastest
            let mut i = lengths.len();
            loop {
                if i == 0 {
                    return out;
                }
                i -= 1;
                if combo[i] < maxes[i] {
                    combo[i] += 1;
                    break;
                }
                combo[i] = 0;
            }
        }
    }

    fn assert_patterns_valid(stock_length: u32, lengths: &[u32], kerf: u32, patterns: &[Pattern]) {
        for p in patterns {
            let pieces: u64 = p.combo.iter().map(|&c| c as u64).sum();
            let used: u64 = p
                .combo
                .iter()
                .zip(lengths)
                .map(|(&c, &l)| c as u64 * l as u64)
                .sum();
            assert!(pieces > 0, "empty combo {:?} emitted", p.combo);
            assert_eq!(p.pieces_length, used, "pieces length of {:?}", p.combo);
            assert_eq!(
                p.kerf_loss,
                kerf as u64 * pieces.saturating_sub(1),
                "kerf of {:?}",
                p.combo
            );
            assert!(
                used + p.kerf_loss <= stock_length as u64,
                "combo {:?} overflows stock {}",
                p.combo,
                stock_length
            );
            assert_eq!(p.waste, stock_length as u64 - used - p.kerf_loss);
            assert!(p.utilization >= 0.0 && p.utilization <= 100.0);
        }
    }

    #[test]
    fn test_reference_scenario() {
        let patterns = generate_patterns(6000, &[2465, 2015], 5);
        let combos: Vec<Vec<u32>> = patterns.iter().map(|p| p.combo.clone()).collect();
        assert_eq!(
            combos,
            vec![vec![0, 1], vec![0, 2], vec![1, 0], vec![1, 1], vec![2, 0]]
        );

        let two_long = patterns.iter().find(|p| p.combo == vec![2, 0]).unwrap();
        assert_eq!(two_long.pieces_length, 4930);
        assert_eq!(two_long.kerf_loss, 5);
        assert_eq!(two_long.waste, 1065);
        assert_eq!(two_long.utilization, 82.25);
    }

    #[test]
    fn test_single_piece_has_no_kerf() {
        let patterns = generate_patterns(1000, &[400], 50);
        let single = patterns.iter().find(|p| p.combo == vec![1]).unwrap();
        assert_eq!(single.kerf_loss, 0);
        assert_eq!(single.waste, 600);
        // 400 + 50 + 400 = 850 fits, a third piece would need 1300
        assert_eq!(patterns.len(), 2);
    }

    #[test]
    fn test_kerf_can_exclude_exact_fit() {
        assert_eq!(generate_patterns(100, &[50], 0).len(), 2);
        let with_kerf = generate_patterns(100, &[50], 1);
        assert_eq!(with_kerf.len(), 1);
        assert_eq!(with_kerf[0].combo, vec![1]);
    }

    #[test]
    fn test_empty_demand_list() {
        assert!(generate_patterns(6000, &[], 5).is_empty());
    }

    #[test]
    fn test_piece_longer_than_stock_contributes_nothing() {
        let patterns = generate_patterns(1000, &[1200, 300], 0);
        assert!(!patterns.is_empty());
        assert!(patterns.iter().all(|p| p.combo[0] == 0));
        assert!(generate_patterns(1000, &[1200], 0).is_empty());
    }

    #[test]
    fn test_duplicate_lengths_are_distinct_slots() {
        let patterns = generate_patterns(100, &[50, 50], 0);
        let combos: Vec<Vec<u32>> = patterns.iter().map(|p| p.combo.clone()).collect();
        assert_eq!(
            combos,
            vec![vec![0, 1], vec![0, 2], vec![1, 0], vec![1, 1], vec![2, 0]]
        );
    }

    #[test]
    fn test_matches_full_grid_scan() {
        let cases: &[(u32, &[u32], u32)] = &[
            (6000, &[2465, 2215, 2135, 2015, 1885], 5),
            (5400, &[1745, 986, 785, 656], 5),
            (5000, &[986, 785, 656], 0),
            (1000, &[333, 250, 100], 10),
            (300, &[7, 11], 3),
        ];
        for &(stock, lengths, kerf) in cases {
            let patterns = generate_patterns(stock, lengths, kerf);
            assert_patterns_valid(stock, lengths, kerf, &patterns);
            let combos: Vec<Vec<u32>> = patterns.iter().map(|p| p.combo.clone()).collect();
            assert_eq!(
                combos,
                brute_force(stock, lengths, kerf),
                "stock {stock}, lengths {lengths:?}, kerf {kerf}"
            );
        }
    }

    #[test]
    fn test_generation_is_idempotent() {
        let lengths = [2465, 2215, 2015, 1745, 986];
        let a = generate_patterns(6000, &lengths, 5);
        let b = generate_patterns(6000, &lengths, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        assert!(generate_patterns_until(6000, &[100], 0, &token).is_none());
    }

    #[test]
    fn test_cancelled_mid_generation() {
        // Seven short slots in a long bar take far longer to enumerate than
        // the test waits, so the cancel lands inside the walk.
        let lengths: Vec<u32> = (100..=106).collect();
        let token = CancelToken::new();
        let flag = token.clone();
        let handle =
            std::thread::spawn(move || generate_patterns_until(6000, &lengths, 0, &flag));

        std::thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished(), "enumeration ended before the cancel");
        let cancelled_at = Instant::now();
        token.cancel();
        let result = handle.join().unwrap();
        let elapsed = cancelled_at.elapsed();

        assert!(result.is_none());
        assert!(elapsed < Duration::from_millis(500), "took {elapsed:?} to stop");
    }

    #[test]
    fn test_utilization_ties_round_to_even() {
        // 601 / 800 is 75.125%
        let patterns = generate_patterns(800, &[601], 0);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].utilization, 75.12);
    }

    #[test]
    fn test_grid_size() {
        assert_eq!(grid_size(6000, &[2465, 2015]), 9);
        assert_eq!(grid_size(6000, &[]), 1);
        assert_eq!(grid_size(10, &[0, 20]), 1);
    }
}
