//! The four payload shapes and their wire representations.

use crate::error::{Result, WireError};
use crate::tag::TypeTag;

/// A decoded topic value. Constructed per message and immediately consumed;
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Ordered sequence of 64-bit floats.
    NumericArray(Vec<f64>),
    /// Single boolean.
    Boolean(bool),
    /// UTF-8 text, carried verbatim.
    Text(String),
    /// Single 64-bit float.
    Scalar(f64),
}

impl Payload {
    /// The tag this value travels under.
    pub fn tag(&self) -> TypeTag {
        match self {
            Payload::NumericArray(_) => TypeTag::NumericArray,
            Payload::Boolean(_) => TypeTag::Boolean,
            Payload::Text(_) => TypeTag::Text,
            Payload::Scalar(_) => TypeTag::Scalar,
        }
    }
}

/// Encode a value into its wire payload form.
///
/// Wire forms:
/// ```text
/// numeric-array:  <count>,<v1>,<v2>,...,<vN>,   (trailing comma included)
/// boolean:        1 | 0
/// text:           the text verbatim
/// scalar:         default float formatting
/// ```
pub fn encode_payload(value: &Payload) -> String {
    match value {
        Payload::NumericArray(values) => {
            let mut out = values.len().to_string();
            out.push(',');
            for v in values {
                out.push_str(&v.to_string());
                out.push(',');
            }
            out
        }
        Payload::Boolean(value) => if *value { "1" } else { "0" }.to_string(),
        Payload::Text(text) => text.clone(),
        Payload::Scalar(value) => value.to_string(),
    }
}

/// Decode a wire payload under the given tag.
///
/// The numeric-array grammar carries a leading element count that is
/// informational only: the decoder splits on `,`, discards the first token,
/// and tolerates one trailing empty token left by the trailing comma.
pub fn decode_payload(tag: TypeTag, data: &str) -> Result<Payload> {
    match tag {
        TypeTag::NumericArray => {
            let mut tokens: Vec<&str> = data.split(',').collect();
            // First token is the declared count; not used for bounds.
            tokens.remove(0);
            if tokens.last().is_some_and(|last| last.is_empty()) {
                tokens.pop();
            }
            let mut values = Vec::with_capacity(tokens.len());
            for token in tokens {
                let value = parse_float(tag, token)?;
                values.push(value);
            }
            Ok(Payload::NumericArray(values))
        }
        // Permissive by contract: only an exact "1" is true. The peer's own
        // decoder behaves the same way.
        TypeTag::Boolean => Ok(Payload::Boolean(data == "1")),
        TypeTag::Text => Ok(Payload::Text(data.to_string())),
        TypeTag::Scalar => Ok(Payload::Scalar(parse_float(tag, data)?)),
    }
}

fn parse_float(tag: TypeTag, token: &str) -> Result<f64> {
    token
        .trim()
        .parse()
        .map_err(|_| WireError::MalformedPayload {
            tag,
            token: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roundtrip(value: Payload) {
        let wire = encode_payload(&value);
        let decoded = decode_payload(value.tag(), &wire).unwrap();
        match (&value, &decoded) {
            (Payload::NumericArray(a), Payload::NumericArray(b)) => {
                assert_eq!(a.len(), b.len());
                for (x, y) in a.iter().zip(b) {
                    assert!((x - y).abs() < 1e-9, "{x} != {y}");
                }
            }
            _ => assert_eq!(value, decoded),
        }
    }

    #[test]
    fn roundtrip_all_shapes() {
        assert_roundtrip(Payload::NumericArray(vec![3.5, -1.0, 0.25]));
        assert_roundtrip(Payload::NumericArray(vec![]));
        assert_roundtrip(Payload::Boolean(true));
        assert_roundtrip(Payload::Boolean(false));
        assert_roundtrip(Payload::Text("hello, bridge".to_string()));
        assert_roundtrip(Payload::Text(String::new()));
        assert_roundtrip(Payload::Scalar(1234.5678));
    }

    #[test]
    fn numeric_array_encoding_shape() {
        let wire = encode_payload(&Payload::NumericArray(vec![3.5, -1.0]));
        assert_eq!(wire, "2,3.5,-1,");

        let wire = encode_payload(&Payload::NumericArray(vec![]));
        assert_eq!(wire, "0,");
    }

    #[test]
    fn numeric_array_decodes_with_and_without_trailing_comma() {
        let with = decode_payload(TypeTag::NumericArray, "2,3.5,-1.0,").unwrap();
        let without = decode_payload(TypeTag::NumericArray, "2,3.5,-1.0").unwrap();
        assert_eq!(with, Payload::NumericArray(vec![3.5, -1.0]));
        assert_eq!(with, without);
    }

    #[test]
    fn numeric_array_count_is_informational() {
        // Declared count disagrees with the actual element count; the
        // decoder only trusts the tokens.
        let decoded = decode_payload(TypeTag::NumericArray, "9,1.0,2.0,").unwrap();
        assert_eq!(decoded, Payload::NumericArray(vec![1.0, 2.0]));
    }

    #[test]
    fn numeric_array_empty_payload_is_empty_array() {
        let decoded = decode_payload(TypeTag::NumericArray, "0,").unwrap();
        assert_eq!(decoded, Payload::NumericArray(vec![]));
    }

    #[test]
    fn numeric_array_rejects_bad_token() {
        let err = decode_payload(TypeTag::NumericArray, "2,abc,-1.0,").unwrap_err();
        assert!(matches!(
            err,
            WireError::MalformedPayload {
                tag: TypeTag::NumericArray,
                ..
            }
        ));
    }

    #[test]
    fn numeric_array_rejects_embedded_empty_token() {
        // "1,," splits to ["1", "", ""]; only the final empty token is
        // forgiven, so the embedded one fails the float parse.
        let err = decode_payload(TypeTag::NumericArray, "1,,").unwrap_err();
        assert!(matches!(err, WireError::MalformedPayload { .. }));
    }

    #[test]
    fn boolean_is_permissive() {
        assert_eq!(
            decode_payload(TypeTag::Boolean, "1").unwrap(),
            Payload::Boolean(true)
        );
        assert_eq!(
            decode_payload(TypeTag::Boolean, "0").unwrap(),
            Payload::Boolean(false)
        );
        assert_eq!(
            decode_payload(TypeTag::Boolean, "yes").unwrap(),
            Payload::Boolean(false)
        );
        assert_eq!(
            decode_payload(TypeTag::Boolean, "").unwrap(),
            Payload::Boolean(false)
        );
    }

    #[test]
    fn text_is_verbatim() {
        let decoded = decode_payload(TypeTag::Text, "1,2,3,").unwrap();
        assert_eq!(decoded, Payload::Text("1,2,3,".to_string()));
    }

    #[test]
    fn scalar_rejects_garbage() {
        let err = decode_payload(TypeTag::Scalar, "not-a-float").unwrap_err();
        assert!(matches!(
            err,
            WireError::MalformedPayload {
                tag: TypeTag::Scalar,
                ..
            }
        ));
    }
}
