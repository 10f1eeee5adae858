//! Descriptor tables.
//!
//! A [`DescriptorTable`] maps operation ids to their descriptors. It is
//! loaded once (from a JSON or YAML file, or built in code) and then handed
//! to the client; nothing looks it up from ambient process state.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::descriptor::EndpointDescriptor;
use crate::error::DefinitionError;

/// Top-level key some generators use to name the API a table came from.
const SOURCE_TAG: &str = "source";

/// Operation id → descriptor, in table order.
///
/// ## Examples
///
/// ```
/// use courier_define::DescriptorTable;
///
/// let table = DescriptorTable::from_json_str(r#"{
///     "source": "webAPI",
///     "getUsersByUserId": {
///         "path": "/users/{user-id}",
///         "method": "get",
///         "parameters": [
///             { "in": "path", "name": "user-id", "required": true, "type": "string" }
///         ]
///     }
/// }"#).unwrap();
///
/// assert_eq!(table.len(), 1);
/// assert!(table.get("getUsersByUserId").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorTable {
    operations: IndexMap<String, EndpointDescriptor>,
}

impl DescriptorTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a table from a `.json`, `.yaml` or `.yml` file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension,
    /// does not parse, or violates a descriptor invariant.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Err(DefinitionError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parses and validates a JSON table.
    ///
    /// ## Errors
    ///
    /// Returns an error on malformed JSON or an invariant violation.
    pub fn from_json_str(content: &str) -> Result<Self, DefinitionError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Parses and validates a YAML table.
    ///
    /// ## Errors
    ///
    /// Returns an error on malformed YAML or an invariant violation.
    pub fn from_yaml_str(content: &str) -> Result<Self, DefinitionError> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(value)
    }

    /// Builds a table from an already-parsed document.
    ///
    /// A scalar `source` entry (the generator tag) is skipped; every other
    /// entry must be a descriptor object.
    ///
    /// ## Errors
    ///
    /// Returns an error if the root is not a map, an entry is not an object,
    /// or an operation does not match the descriptor model or violates a
    /// descriptor invariant.
    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(DefinitionError::InvalidRoot {
                    found: kind_of(&other),
                });
            }
        };

        let mut table = Self::new();
        for (operation, entry) in entries {
            if !entry.is_object() {
                if operation == SOURCE_TAG {
                    continue;
                }
                return Err(DefinitionError::InvalidOperation {
                    operation,
                    found: kind_of(&entry),
                });
            }
            let descriptor: EndpointDescriptor = serde_json::from_value(entry)?;
            table.operations.insert(operation, descriptor);
        }

        table.validate()?;
        Ok(table)
    }

    /// Validates every descriptor.
    ///
    /// ## Errors
    ///
    /// Returns the first violation, tagged with its operation id.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (operation, descriptor) in &self.operations {
            descriptor
                .validate()
                .map_err(|err| DefinitionError::in_operation(operation, err))?;
        }
        Ok(())
    }

    /// Adds or replaces an operation.
    pub fn insert(&mut self, operation: impl Into<String>, descriptor: EndpointDescriptor) {
        self.operations.insert(operation.into(), descriptor);
    }

    /// Looks up an operation.
    pub fn get(&self, operation: &str) -> Option<&EndpointDescriptor> {
        self.operations.get(operation)
    }

    /// Operation ids in table order.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Iterates over `(operation id, descriptor)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EndpointDescriptor)> {
        self.operations.iter().map(|(id, d)| (id.as_str(), d))
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the table has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<K: Into<String>> FromIterator<(K, EndpointDescriptor)> for DescriptorTable {
    fn from_iter<I: IntoIterator<Item = (K, EndpointDescriptor)>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().map(|(k, d)| (k.into(), d)).collect(),
        }
    }
}
