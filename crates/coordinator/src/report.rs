//! Report file naming and persistence.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;
use starter_common::{Result, Target};
use tracing::info;

use crate::critique::CritiqueStatus;

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

const FALLBACK_SLUG: &str = "report";

/// Appended to reports produced without critic approval.
pub const EXHAUSTED_NOTE: &str = "> Note: the critique loop ran out of iterations before approving \
the research. This report is based on the last filtered research and may be thin or partly unverified.";

/// Lowercased name, or the URL tail, with every run of non-alphanumerics
/// collapsed to `_`. Edge underscores are trimmed so the timestamp
/// separator never doubles up.
pub fn report_slug(target: &Target) -> String {
    let source = target
        .name
        .as_deref()
        .or_else(|| target.url_tail())
        .unwrap_or(FALLBACK_SLUG)
        .to_lowercase();

    let slug = NON_ALNUM_RE.replace_all(&source, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

pub fn report_filename(target: &Target, at: DateTime<Local>) -> String {
    format!("{}_{}.md", report_slug(target), at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Report text as it should be saved for the given loop status.
pub fn finalize_report(report: &str, status: CritiqueStatus) -> String {
    let body = report.trim_end();
    match status {
        CritiqueStatus::Approved => format!("{body}\n"),
        CritiqueStatus::Exhausted => format!("{body}\n\n---\n\n{EXHAUSTED_NOTE}\n"),
    }
}

/// Write the report under `dir`, creating it if needed. Returns the path.
pub fn save_report(dir: &Path, target: &Target, content: &str, at: DateTime<Local>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_filename(target, at));
    std::fs::write(&path, content)?;
    info!(path = %path.display(), bytes = content.len(), "Report saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn slug_from_name() {
        let target = Target::new("https://example.com/in/jdoe").with_name(Some("Jane  O'Doe-Smith"));
        assert_eq!(report_slug(&target), "jane_o_doe_smith");
    }

    #[test]
    fn slug_from_url_tail() {
        let target = Target::new("https://example.com/in/jdoe/");
        assert_eq!(report_slug(&target), "jdoe");
    }

    #[test]
    fn slug_has_no_edge_underscores() {
        let target = Target::new("x").with_name(Some("Jane Doe."));
        assert_eq!(report_slug(&target), "jane_doe");
        assert_eq!(
            report_filename(&target, fixed_time()),
            "jane_doe_2024-03-09_14-05-07.md"
        );
    }

    #[test]
    fn slug_fallback() {
        let target = Target::new("https://");
        assert_eq!(report_slug(&target), "report");
        let target = Target::new("x").with_name(Some("!!!"));
        assert_eq!(report_slug(&target), "report");
    }

    #[test]
    fn filename_has_timestamp() {
        let target = Target::new("https://example.com/in/jdoe");
        assert_eq!(
            report_filename(&target, fixed_time()),
            "jdoe_2024-03-09_14-05-07.md"
        );
    }

    #[test]
    fn exhausted_report_gets_note() {
        let text = finalize_report("## Report\n", CritiqueStatus::Exhausted);
        assert!(text.starts_with("## Report\n\n---"));
        assert!(text.contains(EXHAUSTED_NOTE));
        assert_eq!(finalize_report("## Report", CritiqueStatus::Approved), "## Report\n");
    }

    #[test]
    fn save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let reports = dir.path().join("nested").join("reports");
        let target = Target::new("https://example.com/in/jdoe").with_name(Some("Jane Doe"));

        let path = save_report(&reports, &target, "# hi\n", fixed_time()).unwrap();

        assert_eq!(path, reports.join("jane_doe_2024-03-09_14-05-07.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# hi\n");
    }
}
