//! Physical device ranking
//!
//! Scores every discovered candidate and keeps the best few, highest score
//! first. Candidates with equal scores stay in discovery order.

use tracing::debug;

use crate::bounded::{FillReport, FixedVec};
use crate::query::CandidateSource;

/// Scratch limit for one candidate enumeration.
pub const MAX_CANDIDATES: usize = 16;

/// Candidate priority. Negative excludes the candidate entirely.
pub type Score = i32;

/// A kept candidate together with the score it was ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked<C> {
    pub candidate: C,
    pub score: Score,
}

/// Assigns a priority to a candidate.
pub trait CandidateScorer<C> {
    fn score(&mut self, candidate: C) -> Score;
}

impl<C, F> CandidateScorer<C> for F
where
    F: FnMut(C) -> Score,
{
    fn score(&mut self, candidate: C) -> Score {
        self(candidate)
    }
}

/// Scores every candidate 0, i.e. keeps the first ones discovered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<C> CandidateScorer<C> for AcceptAll {
    fn score(&mut self, _candidate: C) -> Score {
        0
    }
}

/// Rank the candidates reported by `source` into `out`.
///
/// `out` is cleared first and holds at most `N` entries afterwards, sorted by
/// descending score. A candidate that would land past the last slot is
/// dropped; one that ranks higher pushes the current lowest entry out. A
/// failed or empty query leaves `out` empty.
///
/// # Panics
///
/// If `N` is zero. Callers must offer at least one slot.
pub fn rank_candidates<S, R, const N: usize>(
    source: &S,
    out: &mut FixedVec<Ranked<S::Candidate>, N>,
    mut scorer: R,
) -> FillReport
where
    S: CandidateSource + ?Sized,
    R: CandidateScorer<S::Candidate>,
{
    assert!(N > 0, "rank_candidates needs at least one output slot");
    out.clear();

    let mut discovered = FixedVec::<S::Candidate, MAX_CANDIDATES>::new();
    let status = source.enumerate_candidates(&mut discovered);
    if !status.accepts(discovered.len()) {
        debug!(?status, "candidate query rejected, treating as none available");
        return FillReport::empty(N);
    }

    let mut excluded = 0usize;
    let mut dropped = 0usize;
    for &candidate in &discovered {
        let score = scorer.score(candidate);
        if score < 0 {
            excluded += 1;
            continue;
        }
        match insert_ranked(out, Ranked { candidate, score }) {
            Placement::Kept => {}
            Placement::Evicted | Placement::Dropped => dropped += 1,
        }
    }

    debug!(
        discovered = discovered.len(),
        kept = out.len(),
        excluded,
        dropped,
        "ranked candidates"
    );

    FillReport {
        capacity: N,
        written: out.len(),
        dropped,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Kept,
    /// Kept, but the previous lowest entry fell off the end.
    Evicted,
    Dropped,
}

fn insert_ranked<C, const N: usize>(out: &mut FixedVec<Ranked<C>, N>, entry: Ranked<C>) -> Placement {
    // Walk back past every strictly lower score; equal scores stay ahead.
    let mut pos = out.len();
    while pos > 0 && out[pos - 1].score < entry.score {
        pos -= 1;
    }

    match out.insert_evicting(pos, entry) {
        Ok(None) => Placement::Kept,
        Ok(Some(_)) => Placement::Evicted,
        Err(_) => Placement::Dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryStatus;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Device(u32);

    struct MockDevices {
        status: QueryStatus,
        devices: Vec<Device>,
    }

    impl MockDevices {
        fn complete(count: u32) -> Self {
            Self {
                status: QueryStatus::Complete,
                devices: (0..count).map(Device).collect(),
            }
        }
    }

    impl CandidateSource for MockDevices {
        type Candidate = Device;

        fn enumerate_candidates(&self, out: &mut FixedVec<Device, MAX_CANDIDATES>) -> QueryStatus {
            for &device in &self.devices {
                if out.push(device).is_err() {
                    return QueryStatus::Truncated;
                }
            }
            self.status
        }
    }

    fn by_table(scores: &'static [Score]) -> impl FnMut(Device) -> Score {
        move |device: Device| scores[device.0 as usize]
    }

    fn ids<const N: usize>(out: &FixedVec<Ranked<Device>, N>) -> Vec<u32> {
        out.iter().map(|r| r.candidate.0).collect()
    }

    fn scores<const N: usize>(out: &FixedVec<Ranked<Device>, N>) -> Vec<Score> {
        out.iter().map(|r| r.score).collect()
    }

    #[test]
    fn sorts_by_descending_score() {
        let source = MockDevices::complete(4);
        let mut out = FixedVec::<Ranked<Device>, 4>::new();

        let report = rank_candidates(&source, &mut out, by_table(&[1, 30, 20, 40]));

        assert_eq!(ids(&out), vec![3, 1, 2, 0]);
        assert_eq!(scores(&out), vec![40, 30, 20, 1]);
        assert_eq!(report.written, 4);
        assert!(!report.is_truncated());
    }

    #[test]
    fn negative_scores_are_excluded() {
        let source = MockDevices::complete(3);
        let mut out = FixedVec::<Ranked<Device>, 3>::new();

        let report = rank_candidates(&source, &mut out, by_table(&[-1, 5, -20]));

        assert_eq!(ids(&out), vec![1]);
        assert_eq!(report.written, 1);
        assert_eq!(report.dropped, 0);
    }

    #[test]
    fn equal_scores_keep_discovery_order() {
        let source = MockDevices::complete(4);
        let mut out = FixedVec::<Ranked<Device>, 4>::new();

        rank_candidates(&source, &mut out, by_table(&[5, 7, 5, 7]));

        assert_eq!(ids(&out), vec![1, 3, 0, 2]);
    }

    #[test]
    fn lower_candidate_is_dropped_when_full() {
        let source = MockDevices::complete(3);
        let mut out = FixedVec::<Ranked<Device>, 2>::new();

        let report = rank_candidates(&source, &mut out, by_table(&[10, 20, 5]));

        assert_eq!(scores(&out), vec![20, 10]);
        assert_eq!(ids(&out), vec![1, 0]);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn equal_candidate_is_dropped_when_full() {
        let source = MockDevices::complete(3);
        let mut out = FixedVec::<Ranked<Device>, 2>::new();

        rank_candidates(&source, &mut out, by_table(&[9, 9, 9]));

        assert_eq!(ids(&out), vec![0, 1]);
    }

    #[test]
    fn higher_candidate_evicts_lowest_when_full() {
        let source = MockDevices::complete(3);
        let mut out = FixedVec::<Ranked<Device>, 2>::new();

        let report = rank_candidates(&source, &mut out, by_table(&[10, 5, 50]));

        assert_eq!(scores(&out), vec![50, 10]);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn discrete_then_integrated() {
        let source = MockDevices::complete(3);
        let mut out = FixedVec::<Ranked<Device>, 2>::new();

        rank_candidates(&source, &mut out, by_table(&[400, 200, -1]));

        assert_eq!(ids(&out), vec![0, 1]);
        assert_eq!(scores(&out), vec![400, 200]);
    }

    #[test]
    fn accept_all_keeps_discovery_order() {
        let source = MockDevices::complete(5);
        let mut out = FixedVec::<Ranked<Device>, 3>::new();

        let report = rank_candidates(&source, &mut out, AcceptAll);

        assert_eq!(ids(&out), vec![0, 1, 2]);
        assert_eq!(scores(&out), vec![0, 0, 0]);
        assert_eq!(report.dropped, 2);
    }

    #[test]
    fn failed_query_yields_nothing() {
        let source = MockDevices {
            status: QueryStatus::Failed,
            devices: vec![Device(0), Device(1)],
        };
        let mut out = FixedVec::<Ranked<Device>, 2>::new();
        out.push(Ranked { candidate: Device(7), score: 1 }).unwrap();

        let report = rank_candidates(&source, &mut out, AcceptAll);

        assert!(out.is_empty());
        assert_eq!(report, FillReport::empty(2));
    }

    #[test]
    fn empty_query_yields_nothing() {
        let source = MockDevices::complete(0);
        let mut out = FixedVec::<Ranked<Device>, 1>::new();

        assert!(rank_candidates(&source, &mut out, AcceptAll).is_empty());
    }

    #[test]
    fn truncated_discovery_is_still_ranked() {
        let source = MockDevices::complete(MAX_CANDIDATES as u32 + 4);
        let mut out = FixedVec::<Ranked<Device>, 4>::new();

        let report = rank_candidates(&source, &mut out, |device: Device| device.0 as Score);

        // Only the first MAX_CANDIDATES devices were ever seen.
        assert_eq!(ids(&out), vec![15, 14, 13, 12]);
        assert_eq!(report.written, 4);
    }

    #[test]
    fn scorer_sees_every_candidate_once() {
        let source = MockDevices::complete(6);
        let mut out = FixedVec::<Ranked<Device>, 2>::new();
        let mut seen = Vec::new();

        rank_candidates(&source, &mut out, |device: Device| {
            seen.push(device.0);
            -1
        });

        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        assert!(out.is_empty());
    }

    #[test]
    fn output_never_exceeds_capacity() {
        let table: &'static [Score] = &[3, 9, 1, 9, 4, 0, 12, 7, 7, 2, 11, 5];
        let source = MockDevices::complete(table.len() as u32);
        let mut out = FixedVec::<Ranked<Device>, 5>::new();

        rank_candidates(&source, &mut out, by_table(table));

        assert_eq!(out.len(), 5);
        assert!(scores(&out).windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(scores(&out), vec![12, 11, 9, 9, 7]);
        assert_eq!(ids(&out), vec![6, 10, 1, 3, 7]);
    }

    #[test]
    #[should_panic(expected = "at least one output slot")]
    fn zero_capacity_is_a_precondition_violation() {
        let source = MockDevices::complete(1);
        let mut out = FixedVec::<Ranked<Device>, 0>::new();
        rank_candidates(&source, &mut out, AcceptAll);
    }
}
