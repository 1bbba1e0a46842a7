//! Derives chart-ready series and a repository health score from a snapshot.
//!
//! Everything here is pure: the same snapshot always yields the same `DerivedMetrics`, and
//! empty or degenerate inputs produce zeros rather than errors.

use crate::snapshot::{ItemState, RepositorySnapshot};
use serde::Serialize;

/// Number of contributors shown in the contributor chart.
pub const TOP_CONTRIBUTORS: usize = 5;

const ISSUE_RESOLUTION_WEIGHT: f64 = 30.0;
const PR_MERGE_WEIGHT: f64 = 30.0;
const CONTRIBUTOR_ACTIVITY_WEIGHT: f64 = 20.0;
const STAR_WEIGHT: f64 = 20.0;

/// Average contributions per contributor at which the activity factor saturates.
const CONTRIBUTOR_ACTIVITY_SATURATION: f64 = 100.0;
/// Star count at which the star factor saturates.
const STAR_SATURATION: f64 = 1000.0;

/// A single named value in a chart series.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChartPoint {
    pub name: &'static str,
    pub value: usize,
}

/// Issue counts by state. Serializes as `[{name: "Open", ..}, {name: "Closed", ..}]`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(into = "Vec<ChartPoint>")]
pub struct IssueSeries {
    pub open: usize,
    pub closed: usize,
}

impl From<IssueSeries> for Vec<ChartPoint> {
    fn from(series: IssueSeries) -> Self {
        vec![
            ChartPoint {
                name: "Open",
                value: series.open,
            },
            ChartPoint {
                name: "Closed",
                value: series.closed,
            },
        ]
    }
}

/// Pull request counts. `closed` only counts pull requests that were closed without merging.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(into = "Vec<ChartPoint>")]
pub struct PrSeries {
    pub open: usize,
    pub merged: usize,
    pub closed: usize,
}

impl From<PrSeries> for Vec<ChartPoint> {
    fn from(series: PrSeries) -> Self {
        vec![
            ChartPoint {
                name: "Open",
                value: series.open,
            },
            ChartPoint {
                name: "Merged",
                value: series.merged,
            },
            ChartPoint {
                name: "Closed",
                value: series.closed,
            },
        ]
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ContributorPoint {
    pub name: String,
    pub contributions: u64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct RepoStats {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub size: u64,
}

/// The health score and the sub-metrics shown next to it.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    /// Weighted score in 0..=100.
    pub score: u8,
    /// Share of closed issues, in percent.
    pub issue_resolution_rate: u8,
    /// Share of merged pull requests, in percent.
    pub pr_merge_rate: u8,
    /// Average contributions per contributor, rounded. Not scaled like the score input.
    pub contributor_activity: u64,
    pub stars: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub issue_series: IssueSeries,
    pub pr_series: PrSeries,
    pub top_contributors: Vec<ContributorPoint>,
    pub repo_stats: RepoStats,
    pub health: HealthReport,
}

/// Computes every derived metric for a snapshot.
pub fn derive_metrics(snapshot: &RepositorySnapshot) -> DerivedMetrics {
    let issue_series = issue_series(snapshot);
    let pr_series = pr_series(snapshot);

    DerivedMetrics {
        issue_series,
        pr_series,
        top_contributors: top_contributors(snapshot, TOP_CONTRIBUTORS),
        repo_stats: RepoStats {
            stars: snapshot.repository.stargazers_count,
            forks: snapshot.repository.forks_count,
            watchers: snapshot.repository.watchers_count,
            size: snapshot.repository.size,
        },
        health: health_report(snapshot, issue_series, pr_series),
    }
}

fn issue_series(snapshot: &RepositorySnapshot) -> IssueSeries {
    let open = snapshot
        .issues
        .iter()
        .filter(|issue| issue.state == ItemState::Open)
        .count();

    IssueSeries {
        open,
        closed: snapshot.issues.len() - open,
    }
}

fn pr_series(snapshot: &RepositorySnapshot) -> PrSeries {
    let mut series = PrSeries {
        open: 0,
        merged: 0,
        closed: 0,
    };

    for pr in &snapshot.pulls {
        // Merged wins over the state flag.
        if pr.is_merged() {
            series.merged += 1;
        } else {
            match pr.state {
                ItemState::Open => series.open += 1,
                ItemState::Closed => series.closed += 1,
            }
        }
    }

    series
}

/// The `limit` contributors with the most contributions, descending. Ties keep input order.
fn top_contributors(snapshot: &RepositorySnapshot, limit: usize) -> Vec<ContributorPoint> {
    let mut ranked: Vec<_> = snapshot.contributors.iter().collect();
    ranked.sort_by(|a, b| b.contributions.cmp(&a.contributions));

    ranked
        .into_iter()
        .take(limit)
        .map(|c| ContributorPoint {
            name: c.login.clone(),
            contributions: c.contributions,
        })
        .collect()
}

fn health_report(
    snapshot: &RepositorySnapshot,
    issues: IssueSeries,
    pulls: PrSeries,
) -> HealthReport {
    let issue_resolution_rate = ratio(issues.closed as f64, snapshot.issues.len() as f64);
    let pr_merge_rate = ratio(pulls.merged as f64, snapshot.pulls.len() as f64);

    // Summed as f64 so huge counts cannot overflow.
    let total_contributions: f64 = snapshot
        .contributors
        .iter()
        .map(|c| c.contributions as f64)
        .sum();
    let average_contributions = ratio(total_contributions, snapshot.contributors.len() as f64);

    let stars = snapshot.repository.stargazers_count;

    let weighted = ISSUE_RESOLUTION_WEIGHT * unit_clamp(issue_resolution_rate)
        + PR_MERGE_WEIGHT * unit_clamp(pr_merge_rate)
        + CONTRIBUTOR_ACTIVITY_WEIGHT
            * unit_clamp(average_contributions / CONTRIBUTOR_ACTIVITY_SATURATION)
        + STAR_WEIGHT * unit_clamp(stars as f64 / STAR_SATURATION);

    HealthReport {
        score: weighted.round().clamp(0.0, 100.0) as u8,
        issue_resolution_rate: percent(issue_resolution_rate),
        pr_merge_rate: percent(pr_merge_rate),
        contributor_activity: average_contributions.round() as u64,
        stars,
    }
}

/// `part / whole`, or 0 when there is nothing to divide by.
pub fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

/// Clamps to [0, 1]. NaN becomes 0.
pub fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A rate in [0, 1] as a rounded percentage.
pub fn percent(rate: f64) -> u8 {
    (unit_clamp(rate) * 100.0).round() as u8
}
