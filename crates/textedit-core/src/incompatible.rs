//! Characters that a text encoding cannot represent.
//!
//! The scan is meant to run off the main thread on large documents, so it checks a
//! [`CancellationToken`] between lines and returns [`Cancelled`] instead of a partial result.

use encoding_rs::Encoding;
use unicode_segmentation::UnicodeSegmentation;

use crate::cancel::{CancellationToken, Cancelled};
use crate::range::TextRange;
use crate::text::{split_lines_inclusive, utf16_len};

/// Replacement used for a character the encoder cannot map.
const LOSSY_REPLACEMENT: char = '?';

/// A grapheme cluster that does not survive conversion to an encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompatibleCharacter {
    /// Range of the cluster (UTF-16).
    pub range: TextRange,
    /// The cluster itself.
    pub character: String,
    /// What the cluster becomes after a lossy conversion.
    pub converted: String,
}

/// Find every grapheme cluster of `text` that `encoding` cannot round-trip.
///
/// A cluster is incompatible if the encoder has to substitute any of its characters, or if
/// decoding the encoded bytes gives back something else.
pub fn incompatible_characters(
    text: &str,
    encoding: &'static Encoding,
    token: &CancellationToken,
) -> Result<Vec<IncompatibleCharacter>, Cancelled> {
    // UTF-16 and the replacement encoding encode through UTF-8
    if encoding.output_encoding() != encoding {
        return Ok(Vec::new());
    }

    let mut incompatibles = Vec::new();
    let mut line_location = 0;

    for line in split_lines_inclusive(text) {
        if let Err(cancelled) = token.check() {
            log::debug!(
                "incompatible character scan for {} cancelled at offset {line_location}",
                encoding.name()
            );
            return Err(cancelled);
        }

        if converted(encoding, line).is_some() {
            let mut location = line_location;
            for grapheme in line.graphemes(true) {
                let length = utf16_len(grapheme);
                if let Some(converted) = converted(encoding, grapheme) {
                    incompatibles.push(IncompatibleCharacter {
                        range: TextRange::new(location, length),
                        character: grapheme.to_string(),
                        converted,
                    });
                }
                location += length;
            }
        }

        line_location += utf16_len(line);
    }

    Ok(incompatibles)
}

/// The lossy conversion of `s`, or `None` if it round-trips unchanged.
fn converted(encoding: &'static Encoding, s: &str) -> Option<String> {
    let (bytes, _, had_errors) = encoding.encode(s);
    if !had_errors {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes);
        return (decoded != s).then(|| decoded.into_owned());
    }

    let mut buf = [0u8; 4];
    Some(
        s.chars()
            .map(|ch| {
                let single = ch.encode_utf8(&mut buf);
                let (bytes, _, had_errors) = encoding.encode(single);
                if had_errors {
                    LOSSY_REPLACEMENT.to_string()
                } else {
                    encoding.decode_without_bom_handling(&bytes).0.into_owned()
                }
            })
            .collect(),
    )
}
