//! Candidate laundering paths
//!
//! A fraud batch routes money along ordered sequences of distinct shells.
//! The candidate set for a path length `k` is every k-permutation of the
//! shell set, which grows as `n! / (n-k)!`. [`PathSpace`] represents that set
//! without materializing it: it can count it, stream it in lexicographic
//! order, and sample distinct members directly.

use crate::rng::RngManager;
use std::collections::HashSet;
use thiserror::Error;

/// Spaces at most this large are enumerated before sampling
const ENUMERATION_LIMIT: u128 = 256;

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("Only {available} candidate paths of length {len}, {requested} requested")]
    NotEnoughPaths {
        available: u128,
        requested: usize,
        len: usize,
    },
}

/// All ordered paths of `len` distinct shells
#[derive(Debug, Clone, Copy)]
pub struct PathSpace<'a> {
    shells: &'a [String],
    len: usize,
}

impl<'a> PathSpace<'a> {
    pub fn new(shells: &'a [String], len: usize) -> Self {
        Self { shells, len }
    }

    /// Number of paths, saturating at `u128::MAX`
    ///
    /// # Example
    /// ```
    /// use kleptosyn_core::simulation::paths::PathSpace;
    ///
    /// let shells: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    /// assert_eq!(PathSpace::new(&shells, 3).count(), 24);
    /// assert_eq!(PathSpace::new(&shells, 5).count(), 0);
    /// ```
    pub fn count(&self) -> u128 {
        let n = self.shells.len();
        if self.len > n {
            return 0;
        }
        ((n - self.len + 1)..=n).fold(1u128, |acc, f| acc.saturating_mul(f as u128))
    }

    /// Stream every path in lexicographic order of shell positions
    pub fn iter(&self) -> KPermutations<'a> {
        KPermutations::new(self.shells, self.len)
    }

    /// One uniformly random path
    pub fn sample(&self, rng: &mut RngManager) -> Option<Vec<&'a str>> {
        let picked = rng.sample_distinct(self.shells.len(), self.len).ok()?;
        Some(picked.into_iter().map(|i| self.shells[i].as_str()).collect())
    }

    /// `amount` distinct paths, sampled without replacement
    ///
    /// Small spaces are enumerated and sampled by index; large ones are
    /// sampled directly, rejecting repeats.
    pub fn sample_distinct(&self, rng: &mut RngManager, amount: usize) -> Result<Vec<Vec<&'a str>>, PathError> {
        let available = self.count();
        if available < amount as u128 {
            return Err(PathError::NotEnoughPaths {
                available,
                requested: amount,
                len: self.len,
            });
        }

        if available <= ENUMERATION_LIMIT {
            let all: Vec<Vec<&'a str>> = self.iter().collect();
            let picked = rng
                .sample_distinct(all.len(), amount)
                .map_err(|_| PathError::NotEnoughPaths {
                    available,
                    requested: amount,
                    len: self.len,
                })?;
            return Ok(picked.into_iter().map(|i| all[i].clone()).collect());
        }

        let mut seen: HashSet<Vec<&'a str>> = HashSet::with_capacity(amount);
        let mut paths = Vec::with_capacity(amount);
        while paths.len() < amount {
            if let Some(path) = self.sample(rng) {
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        }
        Ok(paths)
    }
}

/// Lazy k-permutations of a slice, in lexicographic order of positions
///
/// # Example
/// ```
/// use kleptosyn_core::simulation::paths::KPermutations;
///
/// let items: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
/// let perms: Vec<String> = KPermutations::new(&items, 2).map(|p| p.concat()).collect();
/// assert_eq!(perms, ["ab", "ac", "ba", "bc", "ca", "cb"]);
/// ```
#[derive(Debug, Clone)]
pub struct KPermutations<'a> {
    items: &'a [String],
    k: usize,
    indices: Vec<usize>,
    cycles: Vec<usize>,
    started: bool,
    done: bool,
}

impl<'a> KPermutations<'a> {
    pub fn new(items: &'a [String], k: usize) -> Self {
        let n = items.len();
        let done = k > n;
        let cycles = if done { Vec::new() } else { (n - k + 1..=n).rev().collect() };
        Self {
            items,
            k,
            indices: (0..n).collect(),
            cycles,
            started: false,
            done,
        }
    }

    fn current(&self) -> Vec<&'a str> {
        self.indices[..self.k]
            .iter()
            .map(|&i| self.items[i].as_str())
            .collect()
    }
}

impl<'a> Iterator for KPermutations<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current());
        }

        let n = self.items.len();
        for i in (0..self.k).rev() {
            self.cycles[i] -= 1;
            if self.cycles[i] == 0 {
                // Rotate position i to the end
                let moved = self.indices.remove(i);
                self.indices.push(moved);
                self.cycles[i] = n - i;
            } else {
                let j = self.cycles[i];
                self.indices.swap(i, n - j);
                return Some(self.current());
            }
        }

        self.done = true;
        None
    }
}
