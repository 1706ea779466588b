//! Named collections of saved icons.
//!
//! Icons are stored inline as SVG text. Only SVG artifacts with a solid
//! icon color can be saved; see [`crate::Playground::save_to_collection`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One icon inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct SavedIcon {
    #[serde(default)]
    pub name: String,
    pub svg: String,
    pub created_at: DateTime<Utc>,
}

impl SavedIcon {
    /// Creates an icon stamped with the current time.
    pub fn new(name: impl Into<String>, svg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            svg: svg.into(),
            created_at: Utc::now(),
        }
    }
}

/// A named set of icons as stored by the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Collection {
    /// Assigned by the service. `None` creates a new collection on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub icons: Vec<SavedIcon>,
}

impl Collection {
    /// Starts a new collection holding `first`.
    ///
    /// The name is trimmed and must not be blank.
    pub fn new(name: &str, first: SavedIcon) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            id: None,
            name: name.to_string(),
            icons: vec![first],
        })
    }

    /// Number of icons.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Returns true when the collection holds no icons.
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Appends an icon.
    pub fn push_icon(&mut self, icon: SavedIcon) {
        self.icons.push(icon);
    }

    /// Removes and returns the icon at `index`.
    pub fn remove_icon(&mut self, index: usize) -> Result<SavedIcon, ValidationError> {
        if index >= self.icons.len() {
            return Err(ValidationError::IconIndexOutOfRange {
                index,
                len: self.icons.len(),
            });
        }
        Ok(self.icons.remove(index))
    }

    /// Returns the icon at `index` together with its download file name.
    pub fn icon_download(&self, index: usize) -> Result<(&SavedIcon, String), ValidationError> {
        let icon = self
            .icons
            .get(index)
            .ok_or(ValidationError::IconIndexOutOfRange {
                index,
                len: self.icons.len(),
            })?;
        Ok((icon, icon_file_name(&icon.name, index)))
    }
}

/// File name for a saved icon: `<name>-<position>.svg`, `icon` when unnamed.
///
/// Path separators in the name are replaced so the result is always a
/// single file name.
pub fn icon_file_name(name: &str, index: usize) -> String {
    let name = name.trim();
    let name = if name.is_empty() { "icon" } else { name };
    let name: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}-{}.svg", name, index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon(name: &str) -> SavedIcon {
        SavedIcon::new(name, "<svg/>")
    }

    #[test]
    fn new_collection_requires_name() {
        assert_eq!(
            Collection::new("   ", icon("a")),
            Err(ValidationError::EmptyName)
        );
        let collection = Collection::new("  Brands ", icon("a")).unwrap();
        assert_eq!(collection.name, "Brands");
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn remove_by_index() {
        let mut collection = Collection::new("Set", icon("a")).unwrap();
        collection.push_icon(icon("b"));
        collection.push_icon(icon("c"));

        assert_eq!(collection.remove_icon(1).unwrap().name, "b");
        let names: Vec<_> = collection.icons.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);

        assert_eq!(
            collection.remove_icon(5),
            Err(ValidationError::IconIndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn download_names() {
        assert_eq!(icon_file_name("mdi:home", 0), "mdi:home-1.svg");
        assert_eq!(icon_file_name("", 2), "icon-3.svg");
        assert_eq!(icon_file_name("a/b", 0), "a_b-1.svg");

        let collection = Collection::new("Set", icon("logo")).unwrap();
        let (saved, file) = collection.icon_download(0).unwrap();
        assert_eq!(saved.svg, "<svg/>");
        assert_eq!(file, "logo-1.svg");
        assert!(collection.icon_download(1).is_err());
    }

    #[test]
    fn json_shape() {
        let collection = Collection::new("Set", icon("a")).unwrap();
        let value = serde_json::to_value(&collection).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["icons"][0]["name"], "a");
        assert!(value["icons"][0].get("createdAt").is_some());

        let parsed: Collection =
            serde_json::from_str(r#"{"id": "c1", "name": "Empty"}"#).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.id.as_deref(), Some("c1"));
    }
}
