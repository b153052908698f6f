use serde_json::{json, Value};

use crate::error::CodecError;
use crate::types::{ParameterSlot, SchemaType};

/// Flat name -> value inputs supplied by a caller, in caller order.
pub type Inputs = serde_json::Map<String, Value>;

/// Write `inputs` into a copy of `existing`.
///
/// Returns the complete parameter sequence: slots named by an input are rewritten,
/// every other slot is returned unchanged. Input names without a slot are ignored.
/// List and Dictionary slots are written in place inside the containers the server
/// allocated; their size never changes.
pub fn encode_parameters(
    existing: &[ParameterSlot],
    inputs: &Inputs,
) -> Result<Vec<ParameterSlot>, CodecError> {
    let mut updated = existing.to_vec();

    for (name, input) in inputs {
        let Some(slot) = updated.iter_mut().find(|s| &s.name == name) else {
            continue;
        };
        match slot.schema_type()? {
            SchemaType::Scalar => write_scalar(slot, input),
            SchemaType::List => write_list(slot, input)?,
            SchemaType::Dictionary => write_dictionary(slot, input)?,
        }
    }

    Ok(updated)
}

fn write_scalar(slot: &mut ParameterSlot, input: &Value) {
    set_field(&mut slot.value, "value", input.clone());
}

fn write_list(slot: &mut ParameterSlot, input: &Value) -> Result<(), CodecError> {
    let ParameterSlot { name, value, .. } = slot;
    let items = container_mut(name, value)?;
    let inputs = input.as_array().ok_or_else(|| CodecError::InputShape {
        slot: name.clone(),
        expected: SchemaType::List,
    })?;
    check_size(name, items.len(), inputs.len())?;

    for (item, v) in items.iter_mut().zip(inputs) {
        set_field(item, "value", v.clone());
    }
    Ok(())
}

fn write_dictionary(slot: &mut ParameterSlot, input: &Value) -> Result<(), CodecError> {
    let ParameterSlot { name, value, .. } = slot;
    let entries = container_mut(name, value)?;
    let inputs = input.as_object().ok_or_else(|| CodecError::InputShape {
        slot: name.clone(),
        expected: SchemaType::Dictionary,
    })?;
    check_size(name, entries.len(), inputs.len())?;

    for (entry, (key, v)) in entries.iter_mut().zip(inputs) {
        set_field(entry, "key", Value::String(key.clone()));
        match entry.get_mut("value") {
            Some(wrapper) if wrapper.is_object() => set_field(wrapper, "value", v.clone()),
            _ => set_field(entry, "value", json!({ "value": v })),
        }
    }
    Ok(())
}

/// The server-allocated element array at `value.value`.
fn container_mut<'a>(slot: &str, value: &'a mut Value) -> Result<&'a mut Vec<Value>, CodecError> {
    match value.get_mut("value").and_then(Value::as_array_mut) {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(CodecError::UnconfiguredSlot {
            slot: slot.to_string(),
        }),
    }
}

fn check_size(slot: &str, expected: usize, actual: usize) -> Result<(), CodecError> {
    if expected != actual {
        return Err(CodecError::SizeMismatch {
            slot: slot.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn set_field(target: &mut Value, key: &str, v: Value) {
    match target.as_object_mut() {
        Some(obj) => {
            obj.insert(key.to_string(), v);
        }
        None => *target = json!({ key: v }),
    }
}
