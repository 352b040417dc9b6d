//! Wire envelopes for the AgriChain ledger protocol
//!
//! The node speaks MessagePack-framed request/response envelopes. A request
//! wraps an inner contract call:
//!
//! ```text
//! { id: u64, type: "request", data: <inner bytes> }
//! inner: { type: "contract_call" | "contract_submit",
//!          value: { contract, method, args: <MessagePack tuple> } }
//! ```
//!
//! Responses carry the call result in `data`, or an error envelope
//! `{ type: "error", value: { type, value: <message> } }`.

use rmpv::Value;
use std::io::Cursor;

use crate::types::{AgriChainError, Result};

/// Whether a contract call mutates ledger state.
///
/// Submissions are acknowledged only after the node reports the write as
/// finalized; plain calls are read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Call,
    Submit,
}

impl CallKind {
    /// Wire tag of the inner request
    pub fn wire_tag(&self) -> &'static str {
        match self {
            CallKind::Call => "contract_call",
            CallKind::Submit => "contract_submit",
        }
    }
}

/// Build an inner contract request (MessagePack)
pub fn build_contract_request(
    kind: CallKind,
    contract: &str,
    method: &str,
    args: Vec<u8>,
) -> Vec<u8> {
    let data = Value::Map(vec![
        (
            Value::String("contract".into()),
            Value::String(contract.into()),
        ),
        (Value::String("method".into()), Value::String(method.into())),
        (Value::String("args".into()), Value::Binary(args)),
    ]);

    let inner = Value::Map(vec![
        (
            Value::String("type".into()),
            Value::String(kind.wire_tag().into()),
        ),
        (Value::String("value".into()), data),
    ]);

    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &inner).expect("Failed to encode contract request");
    buf
}

/// Build the request envelope around an inner request
pub fn build_request_envelope(id: u64, inner_data: &[u8]) -> Vec<u8> {
    let envelope = Value::Map(vec![
        (Value::String("id".into()), Value::Integer(id.into())),
        (
            Value::String("type".into()),
            Value::String("request".into()),
        ),
        (
            Value::String("data".into()),
            Value::Binary(inner_data.to_vec()),
        ),
    ]);

    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &envelope).expect("Failed to encode envelope");
    buf
}

/// Parse a node response, extracting the inner result bytes.
///
/// Node-reported failures become [`AgriChainError::Ledger`] with the message
/// passed through unmodified; undecodable frames are [`AgriChainError::Codec`].
pub fn parse_response(data: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(data);
    let value = rmpv::decode::read_value(&mut cursor)
        .map_err(|e| AgriChainError::Codec(format!("Failed to decode response: {e}")))?;

    if let Value::Map(ref map) = value {
        // Error envelopes use "value": { type: "error", value: { type: "...", value: "..." } }
        if let Some(response_type) = get_string_field(map, "type") {
            if response_type == "error" {
                if let Some(Value::Map(ref err_data)) = get_field(map, "value") {
                    if let Some(msg) = get_string_field(err_data, "value") {
                        return Err(AgriChainError::Ledger(msg));
                    }
                    if let Some(msg) = get_string_field(err_data, "message") {
                        return Err(AgriChainError::Ledger(msg));
                    }
                }
                return Err(AgriChainError::Ledger("unknown ledger error".to_string()));
            }
        }

        // Success: { id, type: "response", data: <bytes> }
        if let Some(Value::Binary(inner_bytes)) = get_field(map, "data") {
            // Inner response is also MessagePack: { type: "...", value: <result bytes> }
            let mut inner_cursor = Cursor::new(inner_bytes.as_slice());
            let inner = rmpv::decode::read_value(&mut inner_cursor)
                .map_err(|e| AgriChainError::Codec(format!("Failed to decode inner response: {e}")))?;

            if let Value::Map(ref inner_map) = inner {
                if let Some(Value::Binary(result_bytes)) = get_field(inner_map, "value") {
                    return Ok(result_bytes.clone());
                }
                // Some responses carry the value directly as a map
                if let Some(Value::Map(ref result_map)) = get_field(inner_map, "value") {
                    let mut buf = Vec::new();
                    rmpv::encode::write_value(&mut buf, &Value::Map(result_map.clone()))
                        .map_err(|e| {
                            AgriChainError::Codec(format!("Failed to re-encode result: {e}"))
                        })?;
                    return Ok(buf);
                }
            }

            // The inner bytes may directly be the result
            return Ok(inner_bytes.clone());
        }
    }

    Err(AgriChainError::Codec(
        "unexpected ledger response format".to_string(),
    ))
}

/// Get a string field from a MessagePack map
pub(crate) fn get_string_field(map: &[(Value, Value)], key: &str) -> Option<String> {
    for (k, v) in map {
        if let Value::String(k_str) = k {
            if k_str.as_str() == Some(key) {
                if let Value::String(v_str) = v {
                    return v_str.as_str().map(|s| s.to_string());
                }
            }
        }
    }
    None
}

/// Get a field from a MessagePack map
pub(crate) fn get_field<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    for (k, v) in map {
        if let Value::String(k_str) = k {
            if k_str.as_str() == Some(key) {
                return Some(v);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_contract_request() {
        let args = rmp_serde::to_vec(&("PROD123",)).unwrap();
        let request = build_contract_request(CallKind::Call, "0x123", "get_product", args);
        assert!(!request.is_empty());

        let mut cursor = Cursor::new(&request);
        let decoded = rmpv::decode::read_value(&mut cursor).unwrap();
        assert!(matches!(decoded, Value::Map(_)));
    }

    #[test]
    fn test_build_request_envelope() {
        let inner = build_contract_request(
            CallKind::Submit,
            "0x123",
            "add_product",
            vec![0xc0], // msgpack nil
        );
        let envelope = build_request_envelope(42, &inner);

        let mut cursor = Cursor::new(&envelope);
        let decoded = rmpv::decode::read_value(&mut cursor).unwrap();

        if let Value::Map(map) = decoded {
            let id = get_field(&map, "id");
            assert!(matches!(id, Some(Value::Integer(_))));

            let msg_type = get_string_field(&map, "type");
            assert_eq!(msg_type.as_deref(), Some("request"));
        } else {
            panic!("Expected map");
        }
    }

    #[test]
    fn test_parse_response_success() {
        let result = rmp_serde::to_vec(&("Organic Tomatoes", "Green Valley", 1707984000u64)).unwrap();
        let inner = Value::Map(vec![
            (Value::String("type".into()), Value::String("ok".into())),
            (Value::String("value".into()), Value::Binary(result.clone())),
        ]);
        let mut inner_buf = Vec::new();
        rmpv::encode::write_value(&mut inner_buf, &inner).unwrap();

        let envelope = Value::Map(vec![
            (Value::String("id".into()), Value::Integer(1.into())),
            (
                Value::String("type".into()),
                Value::String("response".into()),
            ),
            (Value::String("data".into()), Value::Binary(inner_buf)),
        ]);
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &envelope).unwrap();

        let parsed = parse_response(&buf).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_parse_response_error_passes_message_through() {
        let err_data = Value::Map(vec![
            (
                Value::String("type".into()),
                Value::String("contract_reverted".into()),
            ),
            (
                Value::String("value".into()),
                Value::String("submission rejected".into()),
            ),
        ]);
        let envelope = Value::Map(vec![
            (Value::String("type".into()), Value::String("error".into())),
            (Value::String("value".into()), err_data),
        ]);
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &envelope).unwrap();

        match parse_response(&buf) {
            Err(AgriChainError::Ledger(msg)) => assert_eq!(msg, "submission rejected"),
            other => panic!("expected ledger error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_garbage_is_codec_error() {
        let garbage = vec![0xff, 0x00, 0x12];
        assert!(matches!(
            parse_response(&garbage),
            Err(AgriChainError::Codec(_))
        ));
    }
}
