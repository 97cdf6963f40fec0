//! Asset records
//!
//! An [`Asset`] is one serialized object yielded by the bundle reader.
//! The header basics (path id, kind, a name hint, component back
//! references) are always readable. The full reflected field tree may
//! not be: when the type tree is absent or a script class cannot be
//! resolved, [`Asset::read_fields`] fails and the fallback chain takes
//! over.

use crate::error::{ExtractError, Result};
use crate::field_value::{FieldTree, FieldValue};
use crate::kind::AssetKind;

/// One serialized object within a bundle
#[derive(Debug, Clone)]
pub struct Asset {
    /// Unique identifier within the bundle
    pub path_id: i64,
    /// Asset class
    pub kind: AssetKind,
    /// Path inside the bundle's virtual filesystem, when the container
    /// maps this object
    pub container_path: Option<String>,
    name_hint: Option<String>,
    owner: Option<i64>,
    script_ref: Option<i64>,
    enabled: Option<bool>,
    fields: Option<FieldTree>,
    field_error: Option<String>,
    raw: Option<Vec<u8>>,
}

impl Asset {
    /// Create a new asset record with only the header basics
    pub fn new(path_id: i64, kind: AssetKind) -> Self {
        Self {
            path_id,
            kind,
            container_path: None,
            name_hint: None,
            owner: None,
            script_ref: None,
            enabled: None,
            fields: None,
            field_error: None,
            raw: None,
        }
    }

    /// Attach a readable field tree
    pub fn with_fields(mut self, fields: FieldTree) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Mark the field tree unreadable with the reader's error message
    pub fn with_field_error<S: Into<String>>(mut self, message: S) -> Self {
        self.field_error = Some(message.into());
        self
    }

    /// Attach the raw serialized byte buffer
    pub fn with_raw(mut self, raw: Vec<u8>) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Set the container path
    pub fn with_container_path<S: Into<String>>(mut self, path: S) -> Self {
        self.container_path = Some(path.into());
        self
    }

    /// Set the header name hint
    pub fn with_name_hint<S: Into<String>>(mut self, name: S) -> Self {
        self.name_hint = Some(name.into());
        self
    }

    /// Set the owning GameObject's path id
    pub fn with_owner(mut self, path_id: i64) -> Self {
        self.owner = Some(path_id);
        self
    }

    /// Set the referenced script's path id
    pub fn with_script_ref(mut self, path_id: i64) -> Self {
        self.script_ref = Some(path_id);
        self
    }

    /// Set the enabled flag (behaviour components)
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Read the full field tree
    ///
    /// Fails when the reader could not reflect this object's layout;
    /// the header basics remain available through the other accessors.
    pub fn read_fields(&self) -> Result<&FieldTree> {
        match &self.fields {
            Some(fields) => Ok(fields),
            None => Err(ExtractError::field_read(
                self.field_error
                    .clone()
                    .unwrap_or_else(|| "type tree absent".to_string()),
            )),
        }
    }

    /// Whether the field tree is readable
    pub fn has_fields(&self) -> bool {
        self.fields.is_some()
    }

    /// Look up a single field, or None when the tree is unreadable
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.as_ref().and_then(|f| f.get(name))
    }

    /// Raw serialized bytes, when the reader exposes them
    pub fn raw_data(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// Header name hint, readable even when the field tree is not
    pub fn name_hint(&self) -> Option<&str> {
        self.name_hint.as_deref()
    }

    /// Owning GameObject path id, for component-like assets
    pub fn owner(&self) -> Option<i64> {
        self.owner
    }

    /// Referenced script path id, for MonoBehaviour assets
    pub fn script_ref(&self) -> Option<i64> {
        self.script_ref
    }

    /// Enabled flag, for behaviour components
    pub fn enabled(&self) -> Option<bool> {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fields_ok() {
        let mut tree = FieldTree::new();
        tree.insert("m_Name".to_string(), "hello".into());
        let asset = Asset::new(7, AssetKind::TextAsset).with_fields(tree);

        assert!(asset.has_fields());
        assert_eq!(
            asset.field("m_Name").and_then(FieldValue::as_str),
            Some("hello")
        );
    }

    #[test]
    fn test_read_fields_err_keeps_basics() {
        let asset = Asset::new(9, AssetKind::MonoBehaviour)
            .with_name_hint("Spawner")
            .with_owner(3)
            .with_field_error("script class unresolved");

        let err = asset.read_fields().unwrap_err();
        assert!(format!("{}", err).contains("script class unresolved"));
        assert_eq!(asset.name_hint(), Some("Spawner"));
        assert_eq!(asset.owner(), Some(3));
    }
}
