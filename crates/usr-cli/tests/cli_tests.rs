use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use usr_cli::{
    check_command, decode_command, encode_command, load_config, plan_upload, read_input,
    upload_with, vocab_command,
};
use usr_codec::{BlockTag, DecodeMode};
use usr_engine::{DanglingPolicy, InMemoryUsrService, Segment, WorkbenchConfig};
use usr_test_utils::TWO_TOKEN_BLOCK;

const BROKEN_BLOCK: &str = "<segment_id=S2>\n#bad\nbad\tx\t-\t-\t-\t-\t-\t-\t-\n</segment_id>";

#[test]
fn test_decode_reports_broken_block_and_keeps_good_one() {
    let input = format!("{TWO_TOKEN_BLOCK}\n{BROKEN_BLOCK}");
    let output = decode_command(&input, DecodeMode::Full).unwrap();

    assert_eq!(output.failed, 1);
    assert_eq!(output.exit_code(), 1);
    assert!(output.diagnostics[0].starts_with("line 8:"));

    let blocks: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(blocks.as_array().map(Vec::len), Some(1));
    assert_eq!(blocks[0]["segment_id"], "S1");
    assert_eq!(blocks[0]["comment"], "hello world");
}

#[test]
fn test_raw_decode_keeps_text() {
    let output = decode_command(TWO_TOKEN_BLOCK, DecodeMode::Raw).unwrap();
    assert_eq!(output.exit_code(), 0);

    let blocks: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(blocks[0]["raw_text"], format!("{TWO_TOKEN_BLOCK}\n"));
}

#[test]
fn test_decode_output_encodes_back() {
    let decoded = decode_command(TWO_TOKEN_BLOCK, DecodeMode::Full).unwrap();
    let encoded = encode_command(&decoded.stdout, None, None, BlockTag::SegmentId).unwrap();
    assert_eq!(encoded.stdout, TWO_TOKEN_BLOCK);
}

#[test]
fn test_encode_plain_record_needs_segment_id() {
    let json = r#"{"lexical_info":[{"id":"a","concept":"hello","index":1}]}"#;
    assert!(encode_command(json, None, None, BlockTag::SegmentId).is_err());

    let output = encode_command(json, Some("7"), Some("hello"), BlockTag::SentId).unwrap();
    assert_eq!(
        output.stdout,
        "<sent_id=7>\n#hello\nhello\t1\t-\t-\t-\t-\t-\t-\t-\n</sent_id>"
    );
}

#[test]
fn test_check_flags_blocking_issues() {
    let bad_category = "<segment_id=S3>\n#x\nx_1\t1\tanimal\t-\t-\t-\t-\t-\t-\n</segment_id>";
    let input = format!("{TWO_TOKEN_BLOCK}\n{bad_category}");
    let output = check_command(&input, &WorkbenchConfig::default());

    assert_eq!(output.failed, 1);
    let lines: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(lines[0], "S1: ok");
    assert_eq!(lines[1], "S3: 1 issue(s), 1 blocking");
    assert!(lines[2].starts_with("  error: lexical entry at index 1"));
}

#[test]
fn test_check_counts_undecodable_blocks() {
    let input = format!("{TWO_TOKEN_BLOCK}\n<segment_id=S5>\n#x\n");
    let output = check_command(&input, &WorkbenchConfig::default());

    assert_eq!(output.stdout, "S1: ok");
    assert_eq!(output.failed, 1);
    assert!(output.diagnostics[0].contains("<segment_id=S5> is not closed"));
}

#[test]
fn test_vocab_listing() {
    let all = vocab_command(None).unwrap();
    assert_eq!(all.stdout.lines().count(), 7);
    assert!(all.stdout.starts_with("semantic_category\t"));

    let relations = vocab_command(Some("dependency_relation")).unwrap();
    assert!(relations.stdout.lines().any(|v| v == "k1"));

    assert!(vocab_command(Some("colours")).is_err());
}

#[test]
fn test_plan_upload_routes_items() {
    let input = format!("{TWO_TOKEN_BLOCK}\n<sent_id=9>\nx\n</sent_id>");
    let plan = plan_upload(&input, None);
    assert_eq!(plan.stdout, "S1\tS1\traw\n9\t-\traw");

    let plan = plan_upload(&input, Some("Geo_1"));
    assert_eq!(plan.stdout, "S1\tGeo_1\traw\n9\tGeo_1\traw");
}

#[tokio::test]
async fn test_upload_summary() {
    let service = Arc::new(InMemoryUsrService::new().with_rejected_segment("S1"));
    let input = format!("{TWO_TOKEN_BLOCK}\n<segment_id=S2>\ny\n</segment_id>");

    let output = upload_with(service, &input, None, None).await;
    assert_eq!(output.stdout, "Successfully uploaded 1 USRs. 1 failed.");
    assert_eq!(output.diagnostics, vec!["S1: rejected: segment S1".to_string()]);
    assert_eq!(output.exit_code(), 1);
}

#[tokio::test]
async fn test_upload_through_chapter() {
    let service = Arc::new(InMemoryUsrService::new().with_chapter(
        "7",
        vec![Segment {
            id: Some("700".to_string()),
            segment_id: Some("S1".to_string()),
            ..Segment::default()
        }],
    ));
    let input = format!("{TWO_TOKEN_BLOCK}\n<segment_id=S2>\ny\n</segment_id>");

    let output = upload_with(service.clone(), &input, None, Some("7")).await;
    assert_eq!(output.stdout, "Successfully uploaded 1 USRs. 1 failed.");
    assert_eq!(output.diagnostics, vec!["S2: segment S2 not in chapter 7".to_string()]);
    assert_eq!(service.created().await[0].0, "700");
}

#[test]
fn test_inputs_and_config_from_files() {
    let mut block = tempfile::NamedTempFile::new().unwrap();
    write!(block, "{TWO_TOKEN_BLOCK}").unwrap();
    let path = block.path().to_string_lossy().into_owned();
    assert_eq!(read_input(&path).unwrap(), TWO_TOKEN_BLOCK);
    assert!(read_input("/nonexistent/usr.txt").is_err());

    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "dangling_policy = \"drop\"\nlanguage = \"english\"").unwrap();
    let loaded = load_config(Some(config.path())).unwrap();
    assert_eq!(loaded.dangling_policy, DanglingPolicy::Drop);
    assert_eq!(loaded.language, "english");
    assert_eq!(load_config(None).unwrap(), WorkbenchConfig::default());
}
