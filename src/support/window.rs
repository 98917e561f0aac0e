//! Support window computation for one library's release history
//!
//! A library maintains the newest `maintained_minor_versions` minor lines of
//! each major version that is still inside its support window. A major's
//! window closes `maintained_major_months` after the next major is published;
//! the current major has no end. The latest release is always supported.

use std::collections::BTreeMap;
use std::iter;

use chrono::{Months, NaiveDate};
use semver::Version;
use tracing::debug;

use crate::release::semver::is_major_start;
use crate::release::types::Release;
use crate::support::track::Track;

/// Maintenance policy of a library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportPolicy {
    /// Number of most recent minor lines maintained per supported major
    pub maintained_minor_versions: u32,
    /// Months a major keeps receiving backports after its successor is published
    pub maintained_major_months: u32,
}

/// Support status computed for a single release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupportMark {
    pub supported: bool,
    pub support_end: Option<NaiveDate>,
}

/// Outcome of [`mark_supported`] for one track of one library
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportDecision {
    /// Older history must be fetched before the marks can be trusted
    pub need_more_data: bool,
    /// Mark for every release relevant to the track
    pub marks: BTreeMap<Version, SupportMark>,
}

impl SupportDecision {
    /// Versions marked supported, lowest first
    pub fn supported_versions(&self) -> impl Iterator<Item = &Version> {
        self.marks
            .iter()
            .filter(|(_, mark)| mark.supported)
            .map(|(version, _)| version)
    }
}

/// Add calendar months, clamping to the last day of the resulting month
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Decide which releases of `track` are supported as of `today`.
///
/// `complete` tells whether `releases` is the library's entire history.
/// When it is not, and the known history may end inside a major line whose
/// support window is still open, the decision asks for more data and
/// carries no marks.
pub fn mark_supported(
    releases: &[Release],
    policy: &SupportPolicy,
    track: &Track,
    complete: bool,
    today: NaiveDate,
) -> SupportDecision {
    let mut by_published: Vec<usize> = (0..releases.len())
        .filter(|&i| track.is_relevant(&releases[i].version))
        .collect();
    if by_published.is_empty() {
        return SupportDecision::default();
    }
    by_published.sort_by(|&a, &b| Release::by_published_date(&releases[a], &releases[b]));

    let months = policy.maintained_major_months;
    let oldest = by_published[0];
    let oldest_still_in_window = add_months(releases[oldest].published, months) >= today;

    let majors: Vec<usize> = by_published
        .iter()
        .copied()
        .filter(|&i| is_major_start(&releases[i].version))
        .collect();

    if majors.is_empty() && !complete && oldest_still_in_window {
        debug!(
            "No major start known for track {} and oldest release {} is within its window",
            track, releases[oldest].tag
        );
        return SupportDecision {
            need_more_data: true,
            marks: BTreeMap::new(),
        };
    }

    // The oldest release stands in for a major start that was never seen.
    let gates: Vec<usize> = iter::once(oldest).chain(majors).collect();
    let mut marks = vec![SupportMark::default(); releases.len()];

    for &gate in &gates {
        let next_major = releases[gate].version.major + 1;
        let successor = gates
            .iter()
            .copied()
            .find(|&n| n != gate && releases[n].version.major == next_major);
        if let Some(successor) = successor {
            let end = add_months(releases[successor].published, months);
            marks[gate] = SupportMark {
                supported: end >= today,
                support_end: Some(end),
            };
        }
    }

    let mut by_version = by_published;
    by_version.sort_by(|&a, &b| Release::by_version(&releases[a], &releases[b]));
    let latest = by_version[by_version.len() - 1];
    marks[latest].supported = true;

    for &gate in gates.iter().chain(iter::once(&latest)) {
        if !marks[gate].supported {
            continue;
        }
        // A gate only opens its major line; it stays supported only if it
        // heads one of the selected minor lines.
        marks[gate].supported = false;
        let support_end = marks[gate].support_end;
        let heads = minor_line_heads(
            releases,
            &by_version,
            releases[gate].version.major,
            policy.maintained_minor_versions,
        );
        for head in heads {
            marks[head] = SupportMark {
                supported: true,
                support_end,
            };
        }
    }
    marks[latest].supported = true;

    let decision = SupportDecision {
        need_more_data: false,
        marks: by_version
            .iter()
            .map(|&i| (releases[i].version.clone(), marks[i]))
            .collect(),
    };
    debug!(
        "Track {}: {} of {} relevant releases supported",
        track,
        decision.supported_versions().count(),
        decision.marks.len()
    );
    decision
}

/// Greatest release of each of the `limit` newest minor lines of `major`.
///
/// `by_version` must be sorted ascending by version.
fn minor_line_heads(
    releases: &[Release],
    by_version: &[usize],
    major: u64,
    limit: u32,
) -> Vec<usize> {
    let mut heads = Vec::new();
    let mut last_minor = None;
    for &i in by_version.iter().rev() {
        let version = &releases[i].version;
        if version.major != major || last_minor == Some(version.minor) {
            continue;
        }
        if heads.len() == limit as usize {
            break;
        }
        last_minor = Some(version.minor);
        heads.push(i);
    }
    heads
}

/// Write a decision's marks into every release relevant to `track`.
///
/// Relevant releases without a mark are reset, so stale flags from an
/// earlier decision never survive.
pub fn apply_decision(releases: &mut [Release], track: &Track, decision: &SupportDecision) {
    for release in releases
        .iter_mut()
        .filter(|r| track.is_relevant(&r.version))
    {
        let mark = decision
            .marks
            .get(&release.version)
            .copied()
            .unwrap_or_default();
        release.supported = mark.supported;
        release.support_end = mark.support_end;
    }
}
