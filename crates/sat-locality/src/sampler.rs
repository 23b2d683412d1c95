//! Clause sampling by rejection over random window centers.
//!
//! Model
//! - Draw a center, query the index, and retry with a fresh center until the
//!   window holds at least `k` variables. Retries are unbounded unless a cap
//!   is configured, in which case exhaustion surfaces as
//!   [`GeneratorError::Starved`].
//! - Pick `k` distinct window positions with Floyd's algorithm (every
//!   `k`-subset equally likely), then one sign draw per literal.
//! - Literals come out in the order Floyd's algorithm picks them; no sorting.

use crate::error::GeneratorError;
use crate::index::{check_width, CircleIndex, VarId};
use crate::stream::RandomStream;

/// Signed DIMACS literal: `+id` or `-id`.
pub type Literal = i32;

#[inline]
fn literal(id: VarId, negated: bool) -> Literal {
    // Ids are bounded by `MAX_VARIABLES` at index construction.
    let v = id as Literal;
    if negated {
        -v
    } else {
        v
    }
}

pub struct ClauseSampler<'a> {
    index: &'a CircleIndex,
    arity: usize,
    width: f64,
    max_attempts: Option<u64>,
    attempts: u64,
    picks: Vec<usize>,
}

impl<'a> ClauseSampler<'a> {
    pub fn new(index: &'a CircleIndex, arity: usize, width: f64) -> Result<Self, GeneratorError> {
        if arity == 0 {
            return Err(GeneratorError::invalid("clause arity must be > 0"));
        }
        check_width(width)?;
        Ok(Self {
            index,
            arity,
            width,
            max_attempts: None,
            attempts: 0,
            picks: Vec::with_capacity(arity),
        })
    }

    /// Give up after `cap` consecutive rejected centers for one clause.
    /// `None` restores unbounded retries.
    pub fn with_max_attempts(mut self, cap: Option<u64>) -> Self {
        self.max_attempts = cap;
        self
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Centers drawn so far across all clauses, accepted or not.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Sample one clause into `out` (cleared first).
    pub fn sample_into(
        &mut self,
        stream: &mut RandomStream,
        out: &mut Vec<Literal>,
    ) -> Result<(), GeneratorError> {
        out.clear();
        let k = self.arity;
        let index = self.index;
        let mut rejected: u64 = 0;
        let window = loop {
            if let Some(cap) = self.max_attempts {
                if rejected >= cap {
                    return Err(GeneratorError::Starved { attempts: rejected });
                }
            }
            self.attempts += 1;
            let center = stream.next_f64();
            let window = index.window_unchecked(center, self.width);
            if window.len() >= k {
                break window;
            }
            rejected += 1;
        };

        floyd_sample(window.len(), k, stream, &mut self.picks);
        for &pos in &self.picks {
            let id = window.get(pos);
            out.push(literal(id, stream.next_negated()));
        }
        Ok(())
    }

    pub fn sample(&mut self, stream: &mut RandomStream) -> Result<Vec<Literal>, GeneratorError> {
        let mut out = Vec::with_capacity(self.arity);
        self.sample_into(stream, &mut out)?;
        Ok(out)
    }
}

/// Floyd's combination sampler: `k` distinct values from `0..n`, uniform over
/// `k`-subsets, in O(k²) time with no allocation beyond `out`. Requires `k <= n`.
fn floyd_sample(n: usize, k: usize, stream: &mut RandomStream, out: &mut Vec<usize>) {
    debug_assert!(k <= n);
    out.clear();
    for j in (n - k)..n {
        let t = stream.next_below(j + 1);
        if out.contains(&t) {
            out.push(j);
        } else {
            out.push(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    fn distinct_vars(clause: &[Literal]) -> bool {
        let vars: BTreeSet<u32> = clause.iter().map(|l| l.unsigned_abs()).collect();
        vars.len() == clause.len()
    }

    #[test]
    fn clauses_have_k_distinct_in_range_literals() {
        let mut s = RandomStream::with_batch(Some(11), 256);
        let idx = CircleIndex::random(200, &mut s).unwrap();
        let mut sampler = ClauseSampler::new(&idx, 5, 0.05).unwrap();
        for _ in 0..500 {
            let c = sampler.sample(&mut s).unwrap();
            assert_eq!(c.len(), 5);
            assert!(c.iter().all(|&l| l != 0 && l.unsigned_abs() <= 200));
            assert!(distinct_vars(&c));
        }
    }

    #[test]
    fn clause_variables_lie_in_one_window() {
        let mut s = RandomStream::with_batch(Some(12), 256);
        let idx = CircleIndex::random(300, &mut s).unwrap();
        let bearing: HashMap<u32, f64> = idx.iter().map(|(b, id)| (id, b)).collect();
        let w = 0.1;
        let mut sampler = ClauseSampler::new(&idx, 3, w).unwrap();
        for _ in 0..200 {
            let c = sampler.sample(&mut s).unwrap();
            // Any two members of a window are at most 2w apart on the circle.
            for a in &c {
                for b in &c {
                    let d = (bearing[&a.unsigned_abs()] - bearing[&b.unsigned_abs()]).abs();
                    assert!(d.min(1.0 - d) <= 2.0 * w + 1e-12);
                }
            }
        }
    }

    #[test]
    fn full_arity_uses_every_variable() {
        let mut s = RandomStream::with_batch(Some(13), 64);
        let idx = CircleIndex::random(6, &mut s).unwrap();
        let mut sampler = ClauseSampler::new(&idx, 6, 0.5).unwrap();
        let mut saw_neg = false;
        let mut saw_pos = false;
        for _ in 0..50 {
            let c = sampler.sample(&mut s).unwrap();
            let vars: BTreeSet<u32> = c.iter().map(|l| l.unsigned_abs()).collect();
            assert_eq!(vars, (1..=6).collect::<BTreeSet<u32>>());
            saw_neg |= c.iter().any(|&l| l < 0);
            saw_pos |= c.iter().any(|&l| l > 0);
        }
        assert!(saw_neg && saw_pos);
        assert_eq!(sampler.attempts(), 50);
    }

    #[test]
    fn sparse_windows_retry_until_k_eligible() {
        let mut s = RandomStream::with_batch(Some(14), 1024);
        let idx = CircleIndex::random(40, &mut s).unwrap();
        let mut sampler = ClauseSampler::new(&idx, 2, 0.01).unwrap();
        for _ in 0..20 {
            let c = sampler.sample(&mut s).unwrap();
            assert_eq!(c.len(), 2);
            assert!(c.iter().all(|&l| (1..=40).contains(&l.unsigned_abs())));
            assert!(distinct_vars(&c));
        }
        assert!(sampler.attempts() > 20);
    }

    #[test]
    fn retry_cap_reports_starvation() {
        let mut s = RandomStream::with_batch(Some(15), 64);
        let idx = CircleIndex::from_bearings(vec![0.1, 0.6]).unwrap();
        let mut sampler = ClauseSampler::new(&idx, 2, 0.01)
            .unwrap()
            .with_max_attempts(Some(25));
        match sampler.sample(&mut s) {
            Err(GeneratorError::Starved { attempts }) => assert_eq!(attempts, 25),
            other => panic!("expected starvation, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_arity_and_width() {
        let idx = CircleIndex::from_bearings(vec![0.1, 0.6]).unwrap();
        assert!(ClauseSampler::new(&idx, 0, 0.1).is_err());
        assert!(ClauseSampler::new(&idx, 1, -0.1).is_err());
    }

    #[test]
    fn floyd_subsets_are_roughly_uniform() {
        let mut s = RandomStream::with_batch(Some(16), 4096);
        let mut picks = Vec::new();
        let mut counts: HashMap<BTreeSet<usize>, u32> = HashMap::new();
        let trials = 20_000;
        for _ in 0..trials {
            floyd_sample(5, 2, &mut s, &mut picks);
            assert_eq!(picks.len(), 2);
            *counts.entry(picks.iter().copied().collect()).or_default() += 1;
        }
        // C(5, 2) = 10 subsets, 2000 expected each.
        assert_eq!(counts.len(), 10);
        for &c in counts.values() {
            assert!((1700..=2300).contains(&c), "count {c}");
        }
    }
}
