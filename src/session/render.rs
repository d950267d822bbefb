use crate::api::{ChatRecord, PredictionRecord, PredictionResult, ReportAnalysis, ReportRecord};
use crate::utils::truncate_chars;
use serde_json::Value;
use std::fmt::Write;

/// Reply object fields checked in order for the assistant's answer.
pub const REPLY_FIELDS: &[&str] = &["answer", "response", "message"];

pub const EMPTY_REPLY: &str = "I received your message but couldn't generate a response.";
pub const CHAT_APOLOGY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";
pub const FINDINGS_FALLBACK: &str = "No specific findings identified.";
pub const ADVICE_FALLBACK: &str =
    "Please consult with a healthcare provider for detailed interpretation.";
pub const REPORT_GENERATED: &str = "Report generated successfully";

/// Acknowledgment fields that may carry a status line for the user.
const ACK_FIELDS: &[&str] = &["message", "detail", "status"];

const PREVIEW_CHARS: usize = 80;

pub fn reply_text(reply: &Value) -> String {
    if let Value::String(s) = reply
        && !s.trim().is_empty()
    {
        return s.clone();
    }

    REPLY_FIELDS
        .iter()
        .filter_map(|field| reply.get(field)?.as_str())
        .find(|text| !text.trim().is_empty())
        .unwrap_or(EMPTY_REPLY)
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn prediction(result: &PredictionResult) -> String {
    format!(
        "Risk assessment: {}\nRisk level: {:.1}%\n\nExplanation:\n{}\n\nRecommendations:\n{}",
        result.disease,
        result.risk * 100.0,
        non_blank(Some(result.explanation.as_str())).unwrap_or("No explanation provided."),
        non_blank(Some(result.recommendations.as_str()))
            .unwrap_or("Consult with a healthcare provider."),
    )
}

pub fn analysis(file_name: &str, analysis: &ReportAnalysis) -> String {
    format!(
        "Report analysis: {}\n\nFindings:\n{}\n\nAdvice:\n{}",
        file_name,
        non_blank(analysis.findings.as_deref()).unwrap_or(FINDINGS_FALLBACK),
        non_blank(analysis.advice.as_deref()).unwrap_or(ADVICE_FALLBACK),
    )
}

/// Success notice for a report the server acknowledged instead of returning.
pub fn acknowledgment(ack: &Value) -> String {
    ACK_FIELDS
        .iter()
        .find_map(|field| non_blank(ack.get(field)?.as_str()))
        .map_or_else(
            || REPORT_GENERATED.to_string(),
            |note| format!("{}: {}", REPORT_GENERATED, note),
        )
}

/// One section per history kind. `None` means the lookup failed.
pub fn history_overview(
    predictions: Option<&[PredictionRecord]>,
    chats: Option<&[ChatRecord]>,
    reports: Option<&[ReportRecord]>,
) -> String {
    let mut out = String::from("Your health history\n");

    section(&mut out, "Risk assessments", predictions, |p| {
        format!("{} ({:.1}% risk)", p.disease, p.risk * 100.0)
    });
    section(&mut out, "Conversations", chats, |c| {
        format!(
            "{}\n  Reply: {}",
            truncate_chars(&c.query, PREVIEW_CHARS),
            truncate_chars(&c.response, PREVIEW_CHARS)
        )
    });
    section(&mut out, "Report analyses", reports, |r| {
        format!(
            "{}\n  Advice: {}",
            truncate_chars(&r.findings, PREVIEW_CHARS),
            truncate_chars(
                non_blank(Some(r.advice.as_str())).unwrap_or(ADVICE_FALLBACK),
                PREVIEW_CHARS
            )
        )
    });

    out
}

fn section<T>(out: &mut String, title: &str, records: Option<&[T]>, newest: impl Fn(&T) -> String) {
    let _ = write!(out, "\n{}: ", title);
    match records {
        None => out.push_str("unavailable right now\n"),
        Some([]) => out.push_str("none yet\n"),
        Some(records) => {
            let _ = writeln!(out, "{}", records.len());
            let _ = writeln!(out, "  Latest: {}", newest(&records[0]));
        }
    }
}
