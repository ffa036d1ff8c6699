// src/traffic/distribution.rs
use crate::error::{Result, ScenarioError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Observed label counts of a passing verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionReport {
    pub samples: usize,
    pub counts: BTreeMap<String, usize>,
}

/// Number of hits each backend must get: `samples / backends`, which has to
/// divide exactly.
pub fn expected_share(samples: usize, backends: usize) -> Result<usize> {
    if backends == 0 || samples == 0 || samples % backends != 0 {
        return Err(ScenarioError::InvalidDistribution { samples, backends });
    }
    Ok(samples / backends)
}

pub fn tally<S: AsRef<str>>(responses: &[S]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in responses {
        *counts.entry(label.as_ref().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Accept only an exact even split of `responses` over `expected_labels`.
///
/// Both an unexpected or missing label and any skew in the counts fail.
pub fn check_distribution<S, L>(responses: &[S], expected_labels: &[L]) -> Result<DistributionReport>
where
    S: AsRef<str>,
    L: AsRef<str>,
{
    let labels: BTreeSet<&str> = expected_labels.iter().map(AsRef::as_ref).collect();
    let share = expected_share(responses.len(), labels.len())?;

    let expected: BTreeMap<String, usize> = labels
        .iter()
        .map(|label| (label.to_string(), share))
        .collect();
    let actual = tally(responses);

    if actual != expected {
        return Err(ScenarioError::Distribution {
            samples: responses.len(),
            expected,
            actual,
        });
    }

    Ok(DistributionReport {
        samples: responses.len(),
        counts: actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 2] = ["server1", "server2"];

    fn responses(server1: usize, server2: usize) -> Vec<String> {
        let mut out = vec!["server1".to_string(); server1];
        out.extend(vec!["server2".to_string(); server2]);
        out
    }

    #[test]
    fn test_even_split_accepted() {
        let report = check_distribution(&responses(5, 5), &LABELS).unwrap();
        assert_eq!(report.samples, 10);
        assert_eq!(report.counts["server1"], 5);
        assert_eq!(report.counts["server2"], 5);
    }

    #[test]
    fn test_skew_rejected() {
        let err = check_distribution(&responses(6, 4), &LABELS).unwrap_err();
        match err {
            ScenarioError::Distribution { samples, expected, actual } => {
                assert_eq!(samples, 10);
                assert_eq!(expected["server1"], 5);
                assert_eq!(actual["server1"], 6);
                assert_eq!(actual["server2"], 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_backend_rejected() {
        assert!(check_distribution(&responses(10, 0), &LABELS).is_err());
    }

    #[test]
    fn test_unexpected_backend_rejected() {
        let mut resp = responses(5, 4);
        resp.push("server3".to_string());
        let err = check_distribution(&resp, &LABELS).unwrap_err();
        assert!(err.to_string().contains("server3"));
    }

    #[test]
    fn test_generalizes_to_k_backends() {
        let resp: Vec<&str> = ["a", "b", "c"].iter().cycle().take(12).copied().collect();
        let report = check_distribution(&resp, &["a", "b", "c"]).unwrap();
        assert!(report.counts.values().all(|&n| n == 4));
    }

    #[test]
    fn test_uneven_sample_count_rejected() {
        let err = expected_share(9, 2).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidDistribution { samples: 9, backends: 2 }));
        assert!(expected_share(10, 0).is_err());
        assert_eq!(expected_share(10, 2).unwrap(), 5);
    }

    #[test]
    fn test_duplicate_expected_labels_collapse() {
        let report = check_distribution(&responses(5, 5), &["server1", "server2", "server1"]).unwrap();
        assert_eq!(report.counts.len(), 2);
    }
}
