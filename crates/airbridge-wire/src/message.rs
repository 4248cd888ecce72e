//! Top-level message parsers and builders.
//!
//! Both message kinds share the fixed-width field discipline: every length
//! is a two-digit zero-padded ASCII decimal, validated against the
//! remaining input before any slice is taken.

use crate::error::{Result, WireError};
use crate::payload::{encode_payload, Payload};
use crate::tag::TypeTag;

/// Width of the entry-count and name-length fields.
pub const LEN_WIDTH: usize = 2;

/// Width of the type-tag field.
pub const TAG_WIDTH: usize = 1;

/// Longest topic name the two-digit length prefix can carry.
pub const MAX_NAME_LEN: usize = 99;

/// Most entries one subscribe request can carry.
pub const MAX_ENTRIES: usize = 99;

/// One entry of a subscribe request.
///
/// The tag code is kept raw: validating it is the registry's job, so that
/// a single bad entry can be skipped without aborting its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest<'a> {
    /// Topic name, exactly as carried on the wire.
    pub name: &'a str,
    /// Unvalidated wire tag code.
    pub code: u8,
}

/// A parsed publish-data message. Exactly one topic per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFrame<'a> {
    /// Topic name, exactly as carried on the wire.
    pub name: &'a str,
    /// Unvalidated wire tag code.
    pub code: u8,
    /// Encoded payload — the rest of the message, never length-prefixed.
    pub data: &'a str,
}

/// Parse a subscribe request: `count(2) { nameLen(2) name(nameLen) tag(1) }`.
///
/// The declared count is authoritative: the parser consumes exactly that
/// many entries and fails structurally if the message runs out first.
pub fn parse_subscribe_request(raw: &str) -> Result<Vec<TopicRequest<'_>>> {
    let mut cursor = Cursor::new(raw);
    let count = cursor.take_len("count")?;

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let name_len = cursor.take_len("name length")?;
        let name = cursor.take_name(name_len)?;
        let code = cursor.take_tag_code()?;
        entries.push(TopicRequest { name, code });
    }

    tracing::trace!(count, "parsed subscribe request");
    Ok(entries)
}

/// Parse a publish-data message: `nameLen(2) name(nameLen) tag(1) payload(rest)`.
pub fn parse_publish(raw: &str) -> Result<PublishFrame<'_>> {
    let mut cursor = Cursor::new(raw);
    let name_len = cursor.take_len("name length")?;
    let name = cursor.take_name(name_len)?;
    let code = cursor.take_tag_code()?;
    let data = cursor.rest();

    tracing::trace!(name, code, data_len = data.len(), "parsed publish message");
    Ok(PublishFrame { name, code, data })
}

/// Build a subscribe request for the given (name, tag) pairs.
pub fn encode_subscribe_request(topics: &[(&str, TypeTag)]) -> Result<String> {
    if topics.len() > MAX_ENTRIES {
        return Err(WireError::TooManyEntries {
            count: topics.len(),
            max: MAX_ENTRIES,
        });
    }

    let mut out = format!("{:02}", topics.len());
    for (name, tag) in topics {
        push_len_prefixed(&mut out, name)?;
        out.push((b'0' + tag.code()) as char);
    }
    Ok(out)
}

/// Build a publish-data message carrying the given value.
pub fn encode_publish(name: &str, value: &Payload) -> Result<String> {
    encode_publish_frame(name, value.tag(), &encode_payload(value))
}

/// Build a publish-data message around an already-encoded payload. Used
/// when forwarding subscribed data, which arrives wire-encoded.
pub fn encode_publish_frame(name: &str, tag: TypeTag, data: &str) -> Result<String> {
    let mut out = String::new();
    push_len_prefixed(&mut out, name)?;
    out.push((b'0' + tag.code()) as char);
    out.push_str(data);
    Ok(out)
}

fn push_len_prefixed(out: &mut String, name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(WireError::NameTooLong {
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    out.push_str(&format!("{:02}", name.len()));
    out.push_str(name);
    Ok(())
}

/// Byte-offset cursor over a message. Every take validates the declared
/// width against the remaining input first; nothing here can read out of
/// bounds or panic on a short message.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Consume a two-digit zero-padded decimal field.
    fn take_len(&mut self, field: &'static str) -> Result<usize> {
        let digits = self.take_digits(LEN_WIDTH, field)?;
        Ok(digits.iter().fold(0, |n, b| n * 10 + usize::from(b - b'0')))
    }

    /// Consume a single-digit type-tag code.
    fn take_tag_code(&mut self) -> Result<u8> {
        let digits = self.take_digits(TAG_WIDTH, "type tag")?;
        Ok(digits[0] - b'0')
    }

    /// Consume a fixed-width run of ASCII digits. Byte-indexed, so a
    /// multi-byte character in a length field reads as invalid digits
    /// rather than a slicing hazard.
    fn take_digits(&mut self, len: usize, field: &'static str) -> Result<&'a [u8]> {
        let start = self.pos;
        let available = self.input.len() - start;
        if len > available {
            return Err(WireError::Truncated {
                expected: len,
                available,
            });
        }
        let bytes = &self.input.as_bytes()[start..start + len];
        if !bytes.iter().all(|b| b.is_ascii_digit()) {
            return Err(WireError::InvalidDigits {
                field,
                found: String::from_utf8_lossy(bytes).into_owned(),
            });
        }
        self.pos = start + len;
        Ok(bytes)
    }

    /// Consume a name of the declared byte length.
    fn take_name(&mut self, len: usize) -> Result<&'a str> {
        let start = self.pos;
        let available = self.input.len() - start;
        if len > available {
            return Err(WireError::Truncated {
                expected: len,
                available,
            });
        }
        let name = self
            .input
            .get(start..start + len)
            .ok_or(WireError::NameBoundary { len })?;
        self.pos = start + len;
        Ok(name)
    }

    /// Everything after the cursor, as the final field.
    fn rest(self) -> &'a str {
        // pos always lands on a char boundary: digit fields are ASCII and
        // names are boundary-checked before the cursor advances.
        &self.input[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_entry_subscribe_request() {
        let entries = parse_subscribe_request("0105alpha1").unwrap();
        assert_eq!(
            entries,
            vec![TopicRequest {
                name: "alpha",
                code: 1
            }]
        );
    }

    #[test]
    fn parses_multi_entry_subscribe_request() {
        // Two entries: "motors" tag 0, "armed" tag 1.
        let entries = parse_subscribe_request("0206motors005armed1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], TopicRequest { name: "motors", code: 0 });
        assert_eq!(entries[1], TopicRequest { name: "armed", code: 1 });
    }

    #[test]
    fn parses_empty_subscribe_request() {
        assert!(parse_subscribe_request("00").unwrap().is_empty());
    }

    #[test]
    fn subscribe_name_may_contain_delimiters() {
        // Length-prefixing means names can carry commas and digits.
        let entries = parse_subscribe_request("0107a,b/c 93").unwrap();
        assert_eq!(
            entries,
            vec![TopicRequest {
                name: "a,b/c 9",
                code: 3
            }]
        );
    }

    #[test]
    fn unknown_tag_codes_survive_parsing() {
        // Tag validation is deferred to the registry so siblings of a bad
        // entry still get created.
        let entries = parse_subscribe_request("0101x9").unwrap();
        assert_eq!(entries, vec![TopicRequest { name: "x", code: 9 }]);
    }

    #[test]
    fn count_beyond_available_entries_is_structural() {
        // Declares three entries but carries one.
        let err = parse_subscribe_request("0305alpha1").unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn truncated_name_is_structural() {
        let err = parse_subscribe_request("0109alp").unwrap_err();
        assert!(matches!(
            err,
            WireError::Truncated {
                expected: 9,
                available: 3
            }
        ));
    }

    #[test]
    fn non_digit_count_is_structural() {
        let err = parse_subscribe_request("x105alpha1").unwrap_err();
        assert!(matches!(err, WireError::InvalidDigits { field: "count", .. }));
    }

    #[test]
    fn non_digit_tag_is_structural() {
        let err = parse_subscribe_request("0105alphaZ").unwrap_err();
        assert!(matches!(
            err,
            WireError::InvalidDigits {
                field: "type tag",
                ..
            }
        ));
    }

    #[test]
    fn empty_input_is_structural() {
        assert!(matches!(
            parse_subscribe_request("").unwrap_err(),
            WireError::Truncated { .. }
        ));
        assert!(matches!(
            parse_publish("").unwrap_err(),
            WireError::Truncated { .. }
        ));
    }

    #[test]
    fn name_length_splitting_multibyte_char_is_structural() {
        // "é" is two bytes; a declared length of 1 lands mid-character.
        let raw = "01é0";
        let err = parse_publish(raw).unwrap_err();
        assert!(matches!(err, WireError::NameBoundary { len: 1 }));
    }

    #[test]
    fn parses_publish_message() {
        let frame = parse_publish("05alpha02,3.5,-1.0,").unwrap();
        assert_eq!(frame.name, "alpha");
        assert_eq!(frame.code, 0);
        assert_eq!(frame.data, "2,3.5,-1.0,");
    }

    #[test]
    fn publish_payload_is_the_rest_of_the_message() {
        // Text payloads may contain anything, including digits that would
        // otherwise look like protocol fields.
        let frame = parse_publish("04chat20112abc").unwrap();
        assert_eq!(frame.name, "chat");
        assert_eq!(frame.code, 2);
        assert_eq!(frame.data, "0112abc");
    }

    #[test]
    fn publish_with_empty_payload() {
        let frame = parse_publish("05alpha1").unwrap();
        assert_eq!(frame.data, "");
    }

    #[test]
    fn builders_mirror_parsers() {
        let raw = encode_subscribe_request(&[
            ("motors", TypeTag::NumericArray),
            ("armed", TypeTag::Boolean),
        ])
        .unwrap();
        assert_eq!(raw, "0206motors005armed1");

        let raw = encode_publish("alpha", &Payload::NumericArray(vec![3.5, -1.0])).unwrap();
        let frame = parse_publish(&raw).unwrap();
        assert_eq!(frame.name, "alpha");
        assert_eq!(frame.code, TypeTag::NumericArray.code());
        assert_eq!(frame.data, "2,3.5,-1,");
    }

    #[test]
    fn builder_zero_pads_lengths() {
        let raw = encode_subscribe_request(&[("a", TypeTag::Scalar)]).unwrap();
        assert_eq!(raw, "0101a3");
    }

    #[test]
    fn builder_rejects_oversized_names() {
        let long = "n".repeat(100);
        let err = encode_publish(&long, &Payload::Boolean(true)).unwrap_err();
        assert!(matches!(err, WireError::NameTooLong { len: 100, max: 99 }));
    }

    #[test]
    fn builder_rejects_oversized_requests() {
        let topics: Vec<(&str, TypeTag)> = (0..100).map(|_| ("t", TypeTag::Text)).collect();
        let err = encode_subscribe_request(&topics).unwrap_err();
        assert!(matches!(err, WireError::TooManyEntries { count: 100, .. }));
    }
}
