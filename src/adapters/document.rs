//! Edits to persisted suite documents shared by the store adapters

use serde_json::{Value, json};
use uuid::Uuid;

use crate::core::models::{ExpectationConfiguration, canonical_id};

/// A bare suite document for a suite that has no persisted form yet
pub fn empty(name: &str) -> Value {
    json!({ "name": name, "expectations": [] })
}

fn expectations_mut(document: &mut Value) -> anyhow::Result<&mut Vec<Value>> {
    let Some(object) = document.as_object_mut() else {
        anyhow::bail!("suite document is not an object");
    };
    match object.entry("expectations").or_insert_with(|| json!([])) {
        Value::Array(expectations) => Ok(expectations),
        _ => anyhow::bail!("suite document has a non-list `expectations`"),
    }
}

fn position_by_id(expectations: &[Value], id: &str) -> Option<usize> {
    expectations.iter().position(|e| {
        e.get("id")
            .and_then(Value::as_str)
            .is_some_and(|stored| canonical_id(stored) == id)
    })
}

/// Append an expectation under a freshly assigned id
pub fn append(document: &mut Value, expectation: &ExpectationConfiguration) -> anyhow::Result<ExpectationConfiguration> {
    let persisted = expectation.clone().with_id(Uuid::new_v4().to_string());
    expectations_mut(document)?.push(persisted.to_json_value());
    Ok(persisted)
}

/// Replace the stored expectation that carries the same id
pub fn replace(document: &mut Value, expectation: &ExpectationConfiguration) -> anyhow::Result<ExpectationConfiguration> {
    let Some(id) = expectation.id() else {
        anyhow::bail!("cannot update an expectation that has no id");
    };
    let expectations = expectations_mut(document)?;
    let Some(index) = position_by_id(expectations, id) else {
        anyhow::bail!("no stored expectation with id {id}");
    };
    expectations[index] = expectation.to_json_value();
    Ok(expectation.clone())
}

/// Remove a stored expectation, by id when it has one, by content otherwise
pub fn remove(document: &mut Value, expectation: &ExpectationConfiguration) -> anyhow::Result<()> {
    let expectations = expectations_mut(document)?;
    let index = match expectation.id() {
        Some(id) => position_by_id(expectations, id),
        None => expectations.iter().position(|stored| {
            ExpectationConfiguration::try_from(stored.clone()).is_ok_and(|c| c == *expectation)
        }),
    };
    match index {
        Some(index) => {
            expectations.remove(index);
            Ok(())
        },
        None => anyhow::bail!("expectation {} is not stored", expectation.expectation_type()),
    }
}
