//! Subcommand implementations

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};
use usr_codec::{decode_full, parse_upload, BlockTag, DecodeMode, Decoded, Decoder, Encoder};
use usr_engine::{
    BulkUploader, ConsistencyEngine, HttpUsrService, SectionPermissions, UsrService,
    WorkbenchConfig,
};
use usr_model::{UsrRecord, Vocabulary};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format: '{other}'"),
        }
    }
}

/// What a subcommand produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// For stdout
    pub stdout: String,
    /// For stderr, one per line
    pub diagnostics: Vec<String>,
    /// Blocks or items that failed
    pub failed: usize,
}

impl CommandOutput {
    fn fail(&mut self, message: impl Into<String>) {
        self.failed += 1;
        self.diagnostics.push(message.into());
    }

    /// Zero only when nothing failed
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.failed > 0)
    }
}

/// Read a file, or stdin for `-`
///
/// # Errors
/// When the input cannot be read
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {path}"))
}

/// Config from a TOML file, or defaults
///
/// # Errors
/// When the file cannot be read or parsed
pub fn load_config(path: Option<&Path>) -> Result<WorkbenchConfig> {
    match path {
        Some(path) => WorkbenchConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(WorkbenchConfig::default()),
    }
}

/// Decode every block to JSON
///
/// A malformed block is reported and skipped; the others still decode.
///
/// # Errors
/// Only when JSON serialization fails
pub fn decode_command(input: &str, mode: DecodeMode) -> Result<CommandOutput> {
    let mut output = CommandOutput::default();
    let mut blocks = Vec::new();

    for decoded in Decoder::new(mode).decode(input) {
        match decoded {
            Ok(Decoded::Full(block)) => blocks.push(serde_json::to_value(&block)?),
            Ok(Decoded::Raw(raw)) => blocks.push(serde_json::to_value(&raw)?),
            Err(e) => output.fail(e.to_string()),
        }
    }

    info!(blocks = blocks.len(), failed = output.failed, ?mode, "decoded input");
    output.stdout = serde_json::to_string_pretty(&blocks)?;
    Ok(output)
}

/// Encode JSON back to block text
///
/// Accepts a record, a decoded block (`{segment_id, comment, record}`) or an
/// array of either, so `decode` output feeds straight back in. Explicit
/// `segment_id` and `text` override what the input carries.
///
/// # Errors
/// Invalid JSON, or a record with no segment id from either source
pub fn encode_command(
    json: &str,
    segment_id: Option<&str>,
    text: Option<&str>,
    tag: BlockTag,
) -> Result<CommandOutput> {
    let value: Value = serde_json::from_str(json).context("parsing JSON input")?;
    let items = match value {
        Value::Array(items) => items,
        single => vec![single],
    };

    let encoder = Encoder::new().with_tag(tag);
    let mut blocks = Vec::with_capacity(items.len());

    for (position, mut item) in items.into_iter().enumerate() {
        let embedded = item.as_object_mut().and_then(|map| map.remove("record"));
        let (record, block_id, comment) = match embedded {
            Some(record) => (
                record,
                item.get("segment_id").and_then(Value::as_str).map(str::to_string),
                item.get("comment").and_then(Value::as_str).map(str::to_string),
            ),
            None => (item, None, None),
        };

        let record: UsrRecord = serde_json::from_value(record)
            .with_context(|| format!("item {position}: invalid record"))?;
        let id = segment_id
            .map(str::to_string)
            .or(block_id)
            .with_context(|| format!("item {position}: no segment id, pass --segment-id"))?;
        let comment = text.map(str::to_string).or(comment).unwrap_or_default();

        debug!(segment_id = %id, tokens = record.lexical_info.len(), "encoding record");
        blocks.push(encoder.encode(&record, &id, &comment));
    }

    Ok(CommandOutput {
        stdout: blocks.join("\n"),
        ..CommandOutput::default()
    })
}

/// Decode and validate every block with all sections enabled
///
/// Blocks that fail to decode, and blocks with blocking issues, count as
/// failed. Non-blocking issues are listed as warnings.
#[must_use]
pub fn check_command(input: &str, config: &WorkbenchConfig) -> CommandOutput {
    let mut output = CommandOutput::default();
    let mut lines = Vec::new();

    for block in decode_full(input) {
        let block = match block {
            Ok(block) => block,
            Err(e) => {
                output.fail(e.to_string());
                continue;
            }
        };

        let report = ConsistencyEngine::new(block.record, SectionPermissions::all())
            .with_dangling_policy(config.dangling_policy)
            .validate();

        if report.is_clean() {
            lines.push(format!("{}: ok", block.segment_id));
            continue;
        }

        lines.push(format!(
            "{}: {} issue(s), {} blocking",
            block.segment_id,
            report.issues.len(),
            report.blocking_count()
        ));
        for issue in &report.issues {
            let severity = if issue.blocking { "error" } else { "warning" };
            lines.push(format!("  {severity}: {issue}"));
        }
        if report.has_blocking() {
            output.failed += 1;
        }
    }

    output.stdout = lines.join("\n");
    output
}

/// List the vocabularies, or the values of one
///
/// # Errors
/// Unknown vocabulary name
pub fn vocab_command(table: Option<&str>) -> Result<CommandOutput> {
    let stdout = match table {
        Some(name) => Vocabulary::from_str(name)?.values().join("\n"),
        None => Vocabulary::ALL
            .iter()
            .map(|v| format!("{v}\t{}", v.values().len()))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(CommandOutput {
        stdout,
        ..CommandOutput::default()
    })
}

/// Show where each item would go without sending anything
#[must_use]
pub fn plan_upload(input: &str, segment_id: Option<&str>) -> CommandOutput {
    let mut output = CommandOutput::default();
    let mut lines = Vec::new();

    for item in parse_upload(input) {
        match item {
            Ok(item) => {
                let target = segment_id.or(item.segment_id.as_deref()).unwrap_or("-");
                let kind = if item.upload.is_raw() { "raw" } else { "structured" };
                lines.push(format!("{}\t{target}\t{kind}", item.label));
            }
            Err(e) => output.fail(e.to_string()),
        }
    }

    output.stdout = lines.join("\n");
    output
}

/// Upload through any service
///
/// `chapter_id` resolves block tags to the chapter's segment ids.
pub async fn upload_with(
    service: Arc<dyn UsrService>,
    input: &str,
    segment_id: Option<&str>,
    chapter_id: Option<&str>,
) -> CommandOutput {
    let mut uploader = BulkUploader::new(service);
    if let Some(segment_id) = segment_id {
        uploader = uploader.with_segment(segment_id);
    }
    if let Some(chapter_id) = chapter_id {
        uploader = uploader.with_chapter(chapter_id);
    }

    let report = uploader.upload(parse_upload(input)).await;
    CommandOutput {
        stdout: report.to_string(),
        diagnostics: report
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.label, f.reason))
            .collect(),
        failed: report.failed,
    }
}

/// Upload to the configured HTTP service
///
/// # Errors
/// No `[service]` in the config, or the HTTP client cannot be built
pub async fn upload_command(
    input: &str,
    segment_id: Option<&str>,
    chapter_id: Option<&str>,
    config: &WorkbenchConfig,
) -> Result<CommandOutput> {
    let Some(service_config) = config.service.as_ref() else {
        bail!("no service configured: add a [service] table to the config file");
    };
    let service = HttpUsrService::new(service_config)?;
    Ok(upload_with(Arc::new(service), input, segment_id, chapter_id).await)
}
