//! Rendering of extraction results

use std::fmt::Write;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::release::registry::ReleaseRegistry;
use crate::release::types::Release;

/// A release as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSummary {
    pub tag: String,
    pub version: String,
    pub commit: String,
    pub published: NaiveDate,
    pub supported: bool,
    pub support_end: Option<NaiveDate>,
}

impl From<&Release> for ReleaseSummary {
    fn from(release: &Release) -> Self {
        Self {
            tag: release.tag.clone(),
            version: release.version.to_string(),
            commit: release.commit.clone(),
            published: release.published,
            supported: release.supported,
            support_end: release.support_end,
        }
    }
}

/// Supported releases grouped by organization and library, newest first
pub type SupportReport = IndexMap<String, IndexMap<String, Vec<ReleaseSummary>>>;

/// Collect the supported releases of every library in the registry
pub fn support_report(registry: &ReleaseRegistry) -> SupportReport {
    let mut report = SupportReport::new();
    for (org, library, releases) in registry.iter() {
        let mut supported: Vec<&Release> = releases.iter().filter(|r| r.supported).collect();
        if supported.is_empty() {
            continue;
        }
        supported.sort_by(|a, b| Release::by_version(b, a));
        report
            .entry(org.to_string())
            .or_default()
            .insert(library.to_string(), supported.into_iter().map(Into::into).collect());
    }
    report
}

/// Render a report as indented text
pub fn render_report(report: &SupportReport) -> String {
    let mut out = String::new();
    for (org, libraries) in report {
        for (library, releases) in libraries {
            let _ = writeln!(out, "{}/{}", org, library);
            for release in releases {
                let _ = writeln!(out, "  {}", render_release(release));
            }
        }
    }
    out
}

/// Render a single release on one line
pub fn render_release(release: &ReleaseSummary) -> String {
    let commit: String = release.commit.chars().take(7).collect();
    let status = match (release.supported, release.support_end) {
        (true, Some(end)) => format!("supported until {}", end),
        (true, None) => "supported".to_string(),
        (false, _) => "unsupported".to_string(),
    };
    format!(
        "{:<16} {}  published {}  {}",
        release.tag, commit, release.published, status
    )
}
