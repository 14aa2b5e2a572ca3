/*!
 * Tests for SubRip parsing and export
 */

use subcheck::errors::SubtitleError;
use subcheck::formats::{SrtFormat, SubtitleFormat};
use subcheck::models::SubtitleItem;
use crate::common::SAMPLE_SRT;

/// Test parsing a well-formed document
#[test]
fn test_parse_str_withValidDocument_shouldReturnItems() {
    let items = SrtFormat::new().parse_str(SAMPLE_SRT).unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0], SubtitleItem::new(1, "00:00:01.000", "00:00:04.000", "This is a bad subtitle."));
    assert_eq!(items[1].index, 2);
    assert_eq!(items[1].text, "It contains  multiple entries.\nOver two lines.");
    assert_eq!(items[2].start.as_deref(), Some("00:00:10.000"));
    assert_eq!(items[2].end.as_deref(), Some("00:00:14.000"));
}

/// Test that CRLF line endings give the same items
#[test]
fn test_parse_str_withCrlfLineEndings_shouldMatchLf() {
    let format = SrtFormat::new();
    let crlf = SAMPLE_SRT.replace('\n', "\r\n");

    assert_eq!(format.parse_str(&crlf).unwrap(), format.parse_str(SAMPLE_SRT).unwrap());
}

/// Test that period separators are accepted on input
#[test]
fn test_parse_str_withPeriodSeparators_shouldNormalize() {
    let items = SrtFormat::new()
        .parse_str("7\n00:01:02.500 --> 00:01:03.250\nHi\n")
        .unwrap();

    assert_eq!(items, vec![SubtitleItem::new(7, "00:01:02.500", "00:01:03.250", "Hi")]);
}

/// Test that position data after the end timecode is ignored
#[test]
fn test_parse_str_withPositionSuffix_shouldIgnoreIt() {
    let items = SrtFormat::new()
        .parse_str("1\n00:00:01,000 --> 00:00:02,000 X1:100 X2:200\nHi\n")
        .unwrap();

    assert_eq!(items[0].end.as_deref(), Some("00:00:02.000"));
}

/// Test that runs of blank and whitespace-only lines separate blocks
#[test]
fn test_parse_str_withExtraBlankLines_shouldSplitBlocks() {
    let content = "\n\n1\n00:00:01,000 --> 00:00:02,000\nA\n   \n\n2\n00:00:03,000 --> 00:00:04,000\nB\n\n\n";

    let items = SrtFormat::new().parse_str(content).unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].text, "B");
}

/// Test that an empty document yields no items
#[test]
fn test_parse_str_withEmptyDocument_shouldReturnEmpty() {
    assert!(SrtFormat::new().parse_str("").unwrap().is_empty());
    assert!(SrtFormat::new().parse_str("\n\n  \n").unwrap().is_empty());
}

/// Test that a non-numeric index fails with its location
#[test]
fn test_parse_str_withInvalidIndex_shouldReturnMalformedDocument() {
    let result = SrtFormat::new().parse_str("x\n00:00:01,000 --> 00:00:02,000\nHi\n");

    assert!(matches!(
        result,
        Err(SubtitleError::MalformedDocument { block: 1, line: 1, .. })
    ));
}

/// Test that a signed index is rejected
#[test]
fn test_parse_str_withSignedIndex_shouldReturnMalformedDocument() {
    let result = SrtFormat::new().parse_str("+1\n00:00:01,000 --> 00:00:02,000\nHi\n");

    assert!(matches!(
        result,
        Err(SubtitleError::MalformedDocument { block: 1, line: 1, .. })
    ));
}

/// Test that timecodes need colons and a single millisecond separator
#[test]
fn test_parse_str_withDottedTimecode_shouldFail() {
    let format = SrtFormat::new();

    assert!(format.parse_str("1\n00.00.01.000 --> 00:00:02,000\nA\n").is_err());
    assert!(format.parse_str("1\n00:00:01,000 --> 00,00,02,000\nA\n").is_err());
}

/// Test that export rejects timecodes without colons
#[test]
fn test_export_withDottedTimecode_shouldReturnInvalidTimecode() {
    let result = SrtFormat::new().export(&[SubtitleItem::new(3, "00.00.01.000", "00:00:02.000", "Hi")]);

    assert_eq!(
        result,
        Err(SubtitleError::InvalidTimecode {
            index: 3,
            value: "00.00.01.000".to_string(),
        })
    );
}

/// Test that a bad timing line in a later block reports that block
#[test]
fn test_parse_str_withInvalidTiming_shouldReportBlockAndLine() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nA\n\n2\nnot a timing\nB\n";

    let result = SrtFormat::new().parse_str(content);

    assert!(matches!(
        result,
        Err(SubtitleError::MalformedDocument { block: 2, line: 6, .. })
    ));
}

/// Test that out-of-range timecode components are rejected
#[test]
fn test_parse_str_withOutOfRangeTimecode_shouldFail() {
    let result = SrtFormat::new().parse_str("1\n00:00:75,000 --> 00:00:76,000\nA\n");

    assert!(matches!(result, Err(SubtitleError::MalformedDocument { block: 1, line: 2, .. })));
}

/// Test that a block without a timing line fails
#[test]
fn test_parse_str_withMissingTiming_shouldFail() {
    let result = SrtFormat::new().parse_str("1\n");

    assert!(matches!(result, Err(SubtitleError::MalformedDocument { block: 1, .. })));
}

/// Test that a block with timing but no text has empty text
#[test]
fn test_parse_str_withNoText_shouldKeepEmptyItem() {
    let items = SrtFormat::new()
        .parse_str("1\n00:00:01,000 --> 00:00:02,000\n")
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "");
}

/// Test parsing raw bytes with a byte-order mark
#[test]
fn test_parse_withBomBytes_shouldParse() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(SAMPLE_SRT.as_bytes());

    let items = SrtFormat::new().parse(&bytes, "movie.srt").unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].index, 1);
}

/// Test the export layout
#[test]
fn test_export_withTimedItems_shouldWriteCommaTimecodes() {
    let items = vec![
        SubtitleItem::new(1, "00:00:01.000", "00:00:02.500", "Hello"),
        SubtitleItem::new(2, "00:00:03,000", "00:00:04.000", "World\nAgain"),
    ];

    let output = SrtFormat::new().export(&items).unwrap();

    assert_eq!(
        output,
        "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\nAgain\n"
    );
}

/// Test that exporting nothing gives an empty document
#[test]
fn test_export_withNoItems_shouldReturnEmptyString() {
    assert_eq!(SrtFormat::new().export(&[]).unwrap(), "");
}

/// Test that an item without timing cannot be exported
#[test]
fn test_export_withMissingTiming_shouldReturnInvalidTimecode() {
    let result = SrtFormat::new().export(&[SubtitleItem::untimed(4, "No timing")]);

    assert_eq!(
        result,
        Err(SubtitleError::InvalidTimecode {
            index: 4,
            value: String::new(),
        })
    );
}

/// Test that an unparsable timecode cannot be exported
#[test]
fn test_export_withGarbageTiming_shouldReturnInvalidTimecode() {
    let result = SrtFormat::new().export(&[SubtitleItem::new(2, "00:00:01.000", "soon", "Hi")]);

    assert_eq!(
        result,
        Err(SubtitleError::InvalidTimecode {
            index: 2,
            value: "soon".to_string(),
        })
    );
}

/// Test that parse and export round-trip
#[test]
fn test_export_withParsedItems_shouldRoundTrip() {
    let format = SrtFormat::new();
    let items = format.parse_str(SAMPLE_SRT).unwrap();

    let exported = format.export(&items).unwrap();

    assert_eq!(exported, SAMPLE_SRT);
    assert_eq!(format.parse_str(&exported).unwrap(), items);
}
