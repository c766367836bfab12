use crate::utils::error::{KitError, Result};
use std::collections::HashMap;

pub const WILDCARD: &str = "*";

/// Which field identifies an existing record, per collection. The `*` entry
/// applies to collections without their own mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertMap {
    fields: HashMap<String, String>,
}

impl UpsertMap {
    /// Parses `collection=field` / `*=field` items; later items win.
    pub fn parse<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = HashMap::new();
        for item in items {
            let item = item.as_ref();
            let (collection, field) = item
                .split_once('=')
                .map(|(c, f)| (c.trim(), f.trim()))
                .filter(|(c, f)| !c.is_empty() && !f.is_empty())
                .ok_or_else(|| KitError::ValidationError {
                    message: format!(
                        "Invalid upsert mapping '{}'. Use collection=field or *=field",
                        item
                    ),
                })?;
            fields.insert(collection.to_string(), field.to_string());
        }
        Ok(Self { fields })
    }

    pub fn field_for(&self, collection: &str) -> Option<&str> {
        self.fields
            .get(collection)
            .or_else(|| self.fields.get(WILDCARD))
            .map(String::as_str)
    }

    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
