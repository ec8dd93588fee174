//! Bulk upload of parsed items

use crate::service::{Segment, UsrService};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use tracing::{info, warn};
use usr_codec::{IngestError, UploadItem};

/// One item that did not make it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestFailure {
    /// Block id or `line N`
    pub label: String,
    pub reason: String,
}

/// Outcome of an upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    fn fail(&mut self, label: impl Into<String>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(IngestFailure {
            label: label.into(),
            reason: reason.into(),
        });
    }

    /// Did everything upload?
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

impl Display for IngestReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully uploaded {} USRs. {} failed.",
            self.succeeded, self.failed
        )
    }
}

/// Sends parsed upload items to the service one at a time
pub struct BulkUploader {
    service: Arc<dyn UsrService>,
    segment_id: Option<String>,
    chapter_id: Option<String>,
}

impl BulkUploader {
    /// Create new uploader
    #[must_use]
    pub fn new(service: Arc<dyn UsrService>) -> Self {
        Self {
            service,
            segment_id: None,
            chapter_id: None,
        }
    }

    /// Send every item to one segment, overriding `<segment_id=...>` routing
    #[must_use]
    pub fn with_segment(mut self, segment_id: impl Into<String>) -> Self {
        self.segment_id = Some(segment_id.into());
        self
    }

    /// Resolve `<segment_id=...>` tags against a chapter's segments
    ///
    /// Each item is sent to the database id of the chapter segment whose
    /// tag id matches; items naming a segment outside the chapter fail.
    /// An explicit [`with_segment`](Self::with_segment) still wins.
    #[must_use]
    pub fn with_chapter(mut self, chapter_id: impl Into<String>) -> Self {
        self.chapter_id = Some(chapter_id.into());
        self
    }

    /// Upload every item; parse failures count as failed items
    pub async fn upload(&self, items: Vec<Result<UploadItem, IngestError>>) -> IngestReport {
        let mut report = IngestReport::default();

        let chapter = match (&self.segment_id, &self.chapter_id) {
            (None, Some(chapter_id)) => match self.service.list_segments(chapter_id).await {
                Ok(segments) => Some((chapter_id.as_str(), segments)),
                Err(e) => {
                    warn!(chapter = %chapter_id, error = %e, "cannot list chapter segments");
                    for item in items {
                        let label = match item {
                            Ok(item) => item.label,
                            Err(parse) => format!("line {}", ingest_line(&parse)),
                        };
                        report.fail(label, e.to_string());
                    }
                    return report;
                }
            },
            _ => None,
        };

        for item in items {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    warn!(error = %e, "skipping unparseable item");
                    report.fail(format!("line {}", ingest_line(&e)), e.to_string());
                    continue;
                }
            };

            let Some(tag) = self.segment_id.as_deref().or(item.segment_id.as_deref()) else {
                report.fail(item.label, "no target segment");
                continue;
            };

            let target = match &chapter {
                Some((chapter_id, segments)) => match chapter_target(segments, tag) {
                    Some(id) => id,
                    None => {
                        let reason = format!("segment {tag} not in chapter {chapter_id}");
                        report.fail(item.label, reason);
                        continue;
                    }
                },
                None => tag,
            };

            match self.service.create_usr(target, &item.upload).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    warn!(label = %item.label, segment = target, error = %e, "upload failed");
                    report.fail(item.label, e.to_string());
                }
            }
        }

        info!(succeeded = report.succeeded, failed = report.failed, "bulk upload finished");
        report
    }
}

fn chapter_target<'a>(segments: &'a [Segment], tag: &str) -> Option<&'a str> {
    segments
        .iter()
        .find(|segment| segment.has_tag(tag))
        .and_then(|segment| segment.id.as_deref())
}

fn ingest_line(error: &IngestError) -> usize {
    match error {
        IngestError::Decode(e) => e.line(),
        IngestError::Json { line, .. } => *line,
    }
}
