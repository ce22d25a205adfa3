use encoding_rs::{EUC_JP, SHIFT_JIS, UTF_8, UTF_16LE, WINDOWS_1252};
use pretty_assertions::assert_eq;
use textedit_core::incompatible::incompatible_characters;
use textedit_core::{CancellationToken, Cancelled, IncompatibleCharacter, TextRange};

fn incompatible(text: &str, encoding: &'static encoding_rs::Encoding) -> Vec<IncompatibleCharacter> {
    incompatible_characters(text, encoding, &CancellationToken::new()).unwrap()
}

#[test]
fn test_compatible_text() {
    assert!(incompatible("", SHIFT_JIS).is_empty());
    assert!(incompatible("abc\ndef", SHIFT_JIS).is_empty());
    assert!(incompatible("日本語", EUC_JP).is_empty());
    assert!(incompatible("🐶 dog", UTF_8).is_empty());
}

#[test]
fn test_incompatible_emoji() {
    assert_eq!(
        incompatible("🐶dog", SHIFT_JIS),
        vec![IncompatibleCharacter {
            range: TextRange::new(0, 2),
            character: "🐶".to_string(),
            converted: "?".to_string(),
        }]
    );
}

#[test]
fn test_grapheme_clusters_are_reported_whole() {
    let found = incompatible("family 👨\u{200d}👨\u{200d}👦 with 🐕", EUC_JP);

    let ranges: Vec<TextRange> = found.iter().map(|item| item.range).collect();
    assert_eq!(ranges, vec![TextRange::new(7, 8), TextRange::new(21, 2)]);
    assert_eq!(found[0].character, "👨\u{200d}👨\u{200d}👦");
    assert_eq!(found[1].converted, "?");
}

#[test]
fn test_partially_convertible_cluster() {
    assert_eq!(
        incompatible("e\u{301}", WINDOWS_1252),
        vec![IncompatibleCharacter {
            range: TextRange::new(0, 2),
            character: "e\u{301}".to_string(),
            converted: "e?".to_string(),
        }]
    );
    assert_eq!(incompatible("\u{e000}", WINDOWS_1252)[0].converted, "?");
}

#[test]
fn test_lossy_round_trip_without_encoder_error() {
    // the yen sign is encoded to 0x5C, which decodes as a backslash
    assert_eq!(
        incompatible("¥100", SHIFT_JIS),
        vec![IncompatibleCharacter {
            range: TextRange::new(0, 1),
            character: "¥".to_string(),
            converted: "\\".to_string(),
        }]
    );
}

#[test]
fn test_locations_across_lines() {
    let found = incompatible("ab\r\n🐶\n\n🐱", SHIFT_JIS);
    let ranges: Vec<TextRange> = found.iter().map(|item| item.range).collect();

    assert_eq!(ranges, vec![TextRange::new(4, 2), TextRange::new(8, 2)]);
}

#[test]
fn test_encodings_without_own_encoder() {
    assert!(incompatible("🐶\u{e000}", UTF_16LE).is_empty());
}

#[test]
fn test_cancelled_scan() {
    let _ = env_logger::builder().is_test(true).try_init();

    let token = CancellationToken::new();
    token.cancel();

    assert_eq!(
        incompatible_characters("🐶\n🐱", SHIFT_JIS, &token),
        Err(Cancelled)
    );
}
