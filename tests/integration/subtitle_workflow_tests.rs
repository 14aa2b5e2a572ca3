/*!
 * Integration tests for the parse, check, fix and convert workflow
 */

use anyhow::Result;

use subcheck::app_config::Config;
use subcheck::errors::{FormatError, SubtitleError};
use subcheck::formats::netflix_text::PLACEHOLDER_TIMECODE;
use subcheck::models::{AnalyzeRequest, Rule, SubtitleItem};
use subcheck::Controller;
use crate::common::{self, SAMPLE_SRT, SAMPLE_TXT};

fn style_rules() -> Vec<Rule> {
    vec![
        Rule::new("bad", "bad").with_suggestion("good"),
        Rule::new("double-space", "  ").with_suggestion(" "),
    ]
}

/// Test that a file can be parsed, checked, fixed and re-read
#[test]
fn test_subtitle_workflow_withSrtFile_shouldFixMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::default_controller()?;

    // 1. Parse
    let items = controller.parse_file(&input)?;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].start.as_deref(), Some("00:00:01.000"));

    // 2. Analyze
    let report = controller.analyze_file(&input, &style_rules())?;
    let flagged: Vec<usize> = report.results.iter().map(|r| r.item_index).collect();
    assert_eq!(flagged, vec![1, 2]);
    assert_eq!(report.item_count, 3);
    assert_eq!(report.match_count(), 2);
    assert!(report.invalid_rules.is_empty());

    // 3. Fix
    let (fixed_path, outcome) = controller
        .fix_file(&input, &style_rules(), temp_dir.path(), false)?
        .expect("fixed file should be written");
    assert_eq!(fixed_path, temp_dir.path().join("fixed_movie.srt"));
    assert_eq!(outcome.applied, 2);

    // 4. Re-read the fixed file
    let fixed = controller.parse_file(&fixed_path)?;
    assert_eq!(fixed[0].text, "This is a good subtitle.");
    assert_eq!(fixed[1].text, "It contains multiple entries.\nOver two lines.");
    assert_eq!(fixed[1].start, items[1].start);
    assert_eq!(fixed[2], items[2]);
    assert!(controller.analyze_file(&fixed_path, &style_rules())?.results.is_empty());

    Ok(())
}

/// Test that fix does not overwrite without force
#[test]
fn test_fix_file_withExistingOutput_shouldRespectForceFlag() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    common::create_test_file(temp_dir.path(), "fixed_movie.srt", "keep me")?;
    let controller = common::default_controller()?;

    assert!(controller.fix_file(&input, &style_rules(), temp_dir.path(), false)?.is_none());
    assert_eq!(std::fs::read_to_string(temp_dir.path().join("fixed_movie.srt"))?, "keep me");

    assert!(controller.fix_file(&input, &style_rules(), temp_dir.path(), true)?.is_some());
    assert_ne!(std::fs::read_to_string(temp_dir.path().join("fixed_movie.srt"))?, "keep me");

    Ok(())
}

/// Test that a plain text file is fixed in its own format
#[test]
fn test_fix_file_withTextFile_shouldKeepTextFormat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "episode.txt", SAMPLE_TXT)?;
    let controller = common::default_controller()?;

    let (fixed_path, _) = controller
        .fix_file(&input, &style_rules(), temp_dir.path(), false)?
        .expect("fixed file should be written");

    assert_eq!(
        std::fs::read_to_string(fixed_path)?,
        "1\n안녕하세요 여러분\n\n2\nThis is good.\n\n3\nGoodbye\n"
    );

    Ok(())
}

/// Test that blocks sharing an index are fixed independently
#[test]
fn test_fix_file_withDuplicateIndices_shouldNotMixItems() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "repeat.txt", "1\nbad\n\n1\nxxxxbad\n")?;
    let controller = common::default_controller()?;

    let (fixed_path, outcome) = controller
        .fix_file(&input, &style_rules(), temp_dir.path(), false)?
        .expect("fixed file should be written");

    assert_eq!(outcome.applied, 2);
    assert_eq!(std::fs::read_to_string(fixed_path)?, "1\ngood\n\n1\nxxxxgood\n");

    Ok(())
}

/// Test converting SRT to plain text and back
#[test]
fn test_convert_file_withSrtToTxt_shouldDropTiming() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let out_dir = temp_dir.path().join("out");
    let controller = common::default_controller()?;

    let output = controller
        .convert_file(&input, Some("TXT"), &out_dir, false)?
        .expect("converted file should be written");

    assert_eq!(output, out_dir.join("movie.txt"));
    let converted = controller.parse_file(&output)?;
    assert_eq!(converted.len(), 3);
    assert_eq!(converted[1].text, "It contains  multiple entries.\nOver two lines.");
    assert!(converted.iter().all(|item| item.start.as_deref() == Some(PLACEHOLDER_TIMECODE)));

    Ok(())
}

/// Test converting plain text to SRT with the default export format
#[test]
fn test_convert_file_withTxtToDefaultFormat_shouldWritePlaceholderTiming() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "episode.txt", SAMPLE_TXT)?;
    let controller = common::default_controller()?;

    let output = controller
        .convert_file(&input, None, temp_dir.path(), false)?
        .expect("converted file should be written");

    assert_eq!(output, temp_dir.path().join("episode.srt"));
    let content = std::fs::read_to_string(&output)?;
    assert!(content.starts_with("1\n00:00:00,000 --> 00:00:00,000\n안녕하세요  여러분\n\n2\n"));

    Ok(())
}

/// Test that unknown target formats are rejected
#[test]
fn test_convert_file_withUnknownFormat_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::default_controller()?;

    let error = controller.convert_file(&input, Some("ass"), temp_dir.path(), false).unwrap_err();

    assert_eq!(
        error.downcast_ref::<FormatError>(),
        Some(&FormatError::UnsupportedFormat("ass".to_string()))
    );
    assert!(!temp_dir.path().join("movie.ass").exists());

    Ok(())
}

/// Test that a malformed SRT file reports its location
#[test]
fn test_parse_file_withMalformedSrt_shouldReturnSubtitleError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "broken.srt", "1\nnot a timing\nHi\n")?;
    let controller = common::default_controller()?;

    let error = controller.parse_file(&input).unwrap_err();

    assert!(matches!(
        error.downcast_ref::<SubtitleError>(),
        Some(SubtitleError::MalformedDocument { block: 1, line: 2, .. })
    ));

    Ok(())
}

/// Test that files with unsupported extensions are rejected
#[test]
fn test_parse_file_withUnsupportedExtension_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "notes.doc", SAMPLE_SRT)?;
    let controller = common::default_controller()?;

    assert!(controller.parse_file(&input).unwrap_err().downcast_ref::<FormatError>().is_some());

    Ok(())
}

/// Test that the input size ceiling applies
#[test]
fn test_parse_file_withInputOverLimit_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let mut config = Config::default();
    config.analysis.max_input_bytes = 16;
    let controller = Controller::with_config(config)?;

    let error = controller.parse_file(&input).unwrap_err();
    assert!(error.chain().any(|cause| cause.to_string().contains("Input too large")));

    assert!(controller.parse_bytes(SAMPLE_SRT.as_bytes(), "movie.srt").is_err());
    assert!(controller.parse_bytes(b"1\nHi\n", "movie.txt").is_ok());

    Ok(())
}

/// Test that invalid rules appear in the file report
#[test]
fn test_analyze_file_withInvalidRule_shouldListIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::default_controller()?;
    let rules = vec![Rule::new("broken", "[unclosed"), Rule::new("bad", "bad")];

    let report = controller.analyze_file(&input, &rules)?;

    assert_eq!(report.invalid_rules, vec!["broken".to_string()]);
    assert_eq!(report.match_count(), 1);

    Ok(())
}

/// Test running an in-memory analyze request
#[test]
fn test_analyze_request_withItemsAndRules_shouldReturnResults() -> Result<()> {
    let controller = common::default_controller()?;
    let request = AnalyzeRequest {
        subtitles: vec![
            SubtitleItem::untimed(1, "fine"),
            SubtitleItem::untimed(2, "Bad BAD bad"),
        ],
        rules: vec![Rule::new("bad", "bad").case_sensitive(true)],
    };

    let response = controller.analyze_request(&request);

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].item_index, 2);
    assert_eq!(response.results[0].matches[0].start_index, 8);

    Ok(())
}

/// Test exporting items with an explicit and the default format
#[test]
fn test_export_items_withFormats_shouldSerialize() -> Result<()> {
    let controller = common::default_controller()?;
    let items = vec![SubtitleItem::new(1, "00:00:01.000", "00:00:02.000", "Hi")];

    assert_eq!(controller.export_items(&items, None)?, "1\n00:00:01,000 --> 00:00:02,000\nHi\n");
    assert_eq!(controller.export_items(&items, Some("txt"))?, "1\nHi\n");
    assert!(controller.export_items(&[SubtitleItem::untimed(1, "Hi")], Some("srt")).is_err());

    Ok(())
}
