use crate::api::{PDF_CONTENT_TYPE, ReportFile};
use crate::utils::format_file_size;
use std::io::{Error as IoError, ErrorKind};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

pub const MAX_REPORT_SIZE: u64 = 10 * 1024 * 1024;

/// Reasons a report is refused before anything is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileRejection {
    #[error("Please select a PDF file to analyze")]
    Missing,
    #[error("Only PDF files are supported ({0} was selected)")]
    NotPdf(String),
    #[error("File is too large ({}). Maximum size is 10 MB", format_file_size(.0.to_owned()))]
    TooLarge(u64),
}

pub fn validate(file: Option<&ReportFile>) -> Result<&ReportFile, FileRejection> {
    let file = file.ok_or(FileRejection::Missing)?;

    if file.content_type != PDF_CONTENT_TYPE {
        return Err(FileRejection::NotPdf(file.content_type.clone()));
    }
    if file.size > MAX_REPORT_SIZE {
        return Err(FileRejection::TooLarge(file.size));
    }

    Ok(file)
}

/// Opens a report from disk. Contents are only read when [`validate`] would
/// accept the file; otherwise `bytes` stays empty.
pub async fn read_report(path: &Path) -> std::io::Result<ReportFile> {
    let metadata = fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(IoError::new(ErrorKind::InvalidInput, "not a regular file"));
    }

    let mut file = ReportFile {
        name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("report")
            .to_string(),
        content_type: ReportFile::content_type_for(path),
        size: metadata.len(),
        bytes: Vec::new(),
    };

    if file.content_type == PDF_CONTENT_TYPE && file.size <= MAX_REPORT_SIZE {
        file.bytes = fs::read(path).await?;
        file.size = file.bytes.len() as u64;
    }

    Ok(file)
}
