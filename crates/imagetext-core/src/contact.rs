use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub email: String,
}

/// Accept a JSON string, number or boolean as text. Clients commonly send
/// phone numbers as bare numbers.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::invalid_type(
            unexpected(&other),
            &"a string or number",
        )),
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Array(_) => de::Unexpected::Seq,
        _ => de::Unexpected::Map,
    }
}

impl CreateContact {
    /// All three fields are required and must not be blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("phoneNumber", &self.phone_number),
            ("email", &self.email),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidInput(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }
}
