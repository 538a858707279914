//! # Payload Classifier
//!
//! Call and deployment payloads share one shape: an RLP list of two UTF-8
//! strings, the second being a JSON array of arguments.
//!
//! ```text
//! call:       [function_name, function_args_json]
//! deployment: [contract_code, constructor_args_json]
//! ```
//!
//! Which decoder runs is the assembler's decision; these functions only check
//! the shape.

use super::entities::{ContractCallPayload, ContractDeploymentPayload};
use super::errors::PayloadError;
use rlp::{Rlp, RlpStream};
use serde_json::Value;

pub fn decode_call(payload: &[u8]) -> Result<ContractCallPayload, PayloadError> {
    let (function_name, function_args) = decode_pair(payload, "call", "function_name", "function_args")?;
    if function_name.is_empty() {
        return Err(PayloadError::EmptyFunctionName);
    }
    Ok(ContractCallPayload {
        function_name,
        function_args,
    })
}

pub fn decode_deployment(payload: &[u8]) -> Result<ContractDeploymentPayload, PayloadError> {
    let (contract_code, constructor_args) =
        decode_pair(payload, "deployment", "contract_code", "constructor_args")?;
    Ok(ContractDeploymentPayload {
        contract_code,
        constructor_args,
    })
}

pub fn encode_call(call: &ContractCallPayload) -> Vec<u8> {
    encode_pair(&call.function_name, &call.function_args)
}

pub fn encode_deployment(deployment: &ContractDeploymentPayload) -> Vec<u8> {
    encode_pair(&deployment.contract_code, &deployment.constructor_args)
}

fn decode_pair(
    payload: &[u8],
    kind: &'static str,
    text_field: &'static str,
    args_field: &'static str,
) -> Result<(String, Vec<Value>), PayloadError> {
    let list = Rlp::new(payload);
    let shape_ok = !payload.is_empty()
        && list.is_list()
        && list.payload_info().map(|info| info.total() == payload.len()).unwrap_or(false)
        && list.item_count().map(|count| count == 2).unwrap_or(false);
    if !shape_ok {
        return Err(PayloadError::Shape { kind });
    }

    let text = read_utf8(&list, 0, kind, text_field)?;
    let args_text = read_utf8(&list, 1, kind, args_field)?;
    let args = parse_args(&args_text, args_field)?;
    Ok((text, args))
}

fn read_utf8(
    list: &Rlp<'_>,
    index: usize,
    kind: &'static str,
    field: &'static str,
) -> Result<String, PayloadError> {
    let bytes = list
        .at(index)
        .and_then(|item| item.as_val::<Vec<u8>>())
        .map_err(|_| PayloadError::Shape { kind })?;
    String::from_utf8(bytes).map_err(|_| PayloadError::Utf8 { field })
}

/// An empty argument string means no arguments.
fn parse_args(text: &str, field: &'static str) -> Result<Vec<Value>, PayloadError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(args)) => Ok(args),
        Ok(other) => Err(PayloadError::Arguments {
            field,
            reason: format!("expected array, got {}", json_kind(&other)),
        }),
        Err(e) => Err(PayloadError::Arguments {
            field,
            reason: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn encode_pair(text: &str, args: &[Value]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(2);
    stream.append(&text.as_bytes().to_vec());
    stream.append(&Value::Array(args.to_vec()).to_string().into_bytes());
    stream.out().to_vec()
}
