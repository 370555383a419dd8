//! Submission document domain model
//!
//! A submission is one filled form instance, delivered by KoboToolbox as an XML tree
//! whose root tag is the asset uid. This module wraps that tree with the handful of
//! operations a transfer needs: reading the instance identifier, replacing the root
//! identity and setting (possibly grouped) metadata fields.

use super::errors::DocumentError;
use super::ids::InstanceId;
use std::collections::BTreeMap;
use std::fmt;
use xmltree::{Element, EmitterConfig, XMLNode};

/// A path to a field inside a submission
///
/// Only two shapes exist in practice: a field directly under the root
/// (`__version__`) and a field inside a single group (`formhub/uuid`,
/// `meta/instanceID`). Deeper paths are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// Field directly under the root element
    Leaf(String),
    /// Field nested inside one group element
    Grouped {
        /// Name of the group element
        group: String,
        /// Name of the field inside the group
        leaf: String,
    },
}

impl FieldPath {
    /// Field directly under the root element
    pub fn leaf(name: impl Into<String>) -> Self {
        FieldPath::Leaf(name.into())
    }

    /// Field inside a group element
    pub fn grouped(group: impl Into<String>, leaf: impl Into<String>) -> Self {
        FieldPath::Grouped {
            group: group.into(),
            leaf: leaf.into(),
        }
    }

    /// Parses a slash-separated path
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedPath`] for empty segments or paths with
    /// more than one separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use kobo_transfer::domain::submission::FieldPath;
    ///
    /// assert_eq!(FieldPath::parse("formhub/uuid").unwrap(), FieldPath::grouped("formhub", "uuid"));
    /// assert!(FieldPath::parse("a/b/c").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self, DocumentError> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(DocumentError::UnsupportedPath(path.to_string()));
        }
        match segments.as_slice() {
            [leaf] => Ok(Self::leaf(*leaf)),
            [group, leaf] => Ok(Self::grouped(*group, *leaf)),
            _ => Err(DocumentError::UnsupportedPath(path.to_string())),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Leaf(name) => write!(f, "{name}"),
            FieldPath::Grouped { group, leaf } => write!(f, "{group}/{leaf}"),
        }
    }
}

/// Path of the instance identifier field
pub fn instance_id_path() -> FieldPath {
    FieldPath::grouped("meta", "instanceID")
}

/// One submission document
///
/// Values are treated as immutable: every `with_*` method consumes the document and
/// returns the updated one, so a rewritten copy never aliases the fetched original.
///
/// # Examples
///
/// ```
/// use kobo_transfer::domain::submission::{FieldPath, SubmissionDocument};
///
/// let doc = SubmissionDocument::parse(
///     r#"<aSrc id="aSrc"><q1>yes</q1><meta><instanceID>uuid:a1</instanceID></meta></aSrc>"#,
/// ).unwrap();
/// assert_eq!(doc.instance_id().unwrap().as_str(), "a1");
///
/// let doc = doc.with_field(&FieldPath::leaf("__version__"), "3 (2024-02-01 10:00:00)");
/// assert_eq!(doc.field(&FieldPath::leaf("__version__")).as_deref(), Some("3 (2024-02-01 10:00:00)"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionDocument {
    root: Element,
}

impl SubmissionDocument {
    /// Wraps an already parsed element
    pub fn from_element(root: Element) -> Self {
        Self { root }
    }

    /// Parses a standalone submission XML document
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let root =
            Element::parse(xml.as_bytes()).map_err(|e| DocumentError::Parse(e.to_string()))?;
        Ok(Self { root })
    }

    /// Returns the root tag (the asset uid the submission belongs to)
    pub fn root_tag(&self) -> &str {
        &self.root.name
    }

    /// Returns a root attribute value
    pub fn root_attribute(&self, name: &str) -> Option<&str> {
        self.root.attributes.get(name).map(String::as_str)
    }

    /// Returns all root attributes in name order
    pub fn root_attributes(&self) -> BTreeMap<String, String> {
        self.root
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns the text of a field, if the field exists
    pub fn field(&self, path: &FieldPath) -> Option<String> {
        let element = match path {
            FieldPath::Leaf(name) => self.root.get_child(name.as_str())?,
            FieldPath::Grouped { group, leaf } => self
                .root
                .get_child(group.as_str())?
                .get_child(leaf.as_str())?,
        };
        Some(
            element
                .get_text()
                .map(|text| text.into_owned())
                .unwrap_or_default(),
        )
    }

    /// Returns true if the root has a direct child element with this name
    pub fn has_group(&self, name: &str) -> bool {
        self.root.get_child(name).is_some()
    }

    /// Extracts the deduplication key from `meta/instanceID`
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::MissingField`] if the field is absent or empty.
    pub fn instance_id(&self) -> Result<InstanceId, DocumentError> {
        let path = instance_id_path();
        let value = self
            .field(&path)
            .ok_or_else(|| DocumentError::MissingField(path.to_string()))?;
        InstanceId::from_instance_field(&value)
            .map_err(|_| DocumentError::MissingField(path.to_string()))
    }

    /// Replaces the root tag and the complete root attribute set
    pub fn with_root<I, K, V>(mut self, tag: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.root.name = tag.to_string();
        self.root.prefix = None;
        self.root.attributes.clear();
        for (key, value) in attributes {
            self.root.attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Sets a field's text, creating the field (and its group) if absent
    pub fn with_field(mut self, path: &FieldPath, value: &str) -> Self {
        let parent = match path {
            FieldPath::Leaf(_) => &mut self.root,
            FieldPath::Grouped { group, .. } => child_or_insert(&mut self.root, group),
        };
        let leaf = match path {
            FieldPath::Leaf(name) => name,
            FieldPath::Grouped { leaf, .. } => leaf,
        };
        let element = child_or_insert(parent, leaf);
        element.children = vec![XMLNode::Text(value.to_string())];
        self
    }

    /// Serializes the document without an XML declaration
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut buffer = Vec::new();
        let config = EmitterConfig::new()
            .write_document_declaration(false)
            .perform_indent(false);
        self.root
            .write_with_config(&mut buffer, config)
            .map_err(|e| DocumentError::Serialize(e.to_string()))?;
        Ok(buffer)
    }

    /// Borrows the underlying element
    pub fn as_element(&self) -> &Element {
        &self.root
    }
}

fn child_or_insert<'a>(parent: &'a mut Element, name: &str) -> &'a mut Element {
    let position = parent
        .children
        .iter()
        .position(|node| matches!(node, XMLNode::Element(element) if element.name == name));
    let index = match position {
        Some(index) => index,
        None => {
            parent.children.push(XMLNode::Element(Element::new(name)));
            parent.children.len() - 1
        }
    };
    match &mut parent.children[index] {
        XMLNode::Element(element) => element,
        _ => unreachable!("node at {index} is an element"),
    }
}
