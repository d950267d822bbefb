use crate::store::ChatHistoryEntry;
use crate::utils::truncate_chars;
use chrono::NaiveDate;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;

const SUMMARY_QUERY_LIMIT: usize = 5;
const QUERY_PREVIEW_CHARS: usize = 60;

const GENERAL_ADVICE: &[&str] = &[
    "Maintain a balanced diet rich in vegetables, whole grains and lean protein.",
    "Aim for at least 150 minutes of moderate exercise each week.",
    "Get 7-9 hours of sleep per night.",
    "Stay hydrated and limit sugary drinks.",
    "Schedule regular check-ups with your healthcare provider.",
];

/// Summary built from this device's chat history, used when the server has
/// no records to build a report from.
pub fn local_summary(history: &[ChatHistoryEntry], today: NaiveDate) -> String {
    let mut out = String::from("Health Summary Report\n");
    let _ = writeln!(out, "Generated: {}", today.format("%Y-%m-%d"));

    if history.is_empty() {
        out.push_str("\nNo conversations recorded yet.\n");
    } else {
        let _ = writeln!(out, "\nRecent topics ({} total conversations):", history.len());
        for entry in history.iter().rev().take(SUMMARY_QUERY_LIMIT) {
            let _ = writeln!(out, "- {}", truncate_chars(&entry.query, QUERY_PREVIEW_CHARS));
        }
    }

    out.push_str("\nGeneral health advice:\n");
    for advice in GENERAL_ADVICE {
        let _ = writeln!(out, "- {}", advice);
    }

    out.push_str("\nThis summary is informational and is not a medical diagnosis.");
    out
}

pub fn report_filename(date: NaiveDate) -> String {
    format!("health_report_{}.pdf", date.format("%Y-%m-%d"))
}

fn deduplicate_filename(dir: &Path, filename: &str) -> String {
    if !dir.join(filename).exists() {
        return filename.to_string();
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(i) => (&filename[..i], &filename[i..]),
        None => (filename, ""),
    };

    (1..)
        .map(|n| format!("{}_{}{}", stem, n, ext))
        .find(|candidate| !dir.join(candidate).exists())
        .unwrap_or_else(|| filename.to_string())
}

/// Writes a generated report into `dir` without overwriting earlier ones.
pub async fn save_document(dir: &Path, bytes: &[u8], date: NaiveDate) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(deduplicate_filename(dir, &report_filename(date)));
    fs::write(&path, bytes).await?;
    Ok(path)
}
