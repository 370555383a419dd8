//! Destination rewriting of submission documents
//!
//! The fetched document is never modified; every step returns a new value.

use crate::domain::submission::instance_id_path;
use crate::domain::{
    DocumentError, FieldPath, InstanceId, SubmissionDocument, TransferMetadata,
};

/// Field holding the human readable form version
pub const VERSION_FIELD: &str = "__version__";

/// Group holding the form hub identifier
pub const FORMHUB_GROUP: &str = "formhub";

/// Field holding the previous instance id after regeneration
pub const DEPRECATED_ID_FIELD: &str = "deprecatedID";

/// A submission ready to be sent
#[derive(Debug, Clone)]
pub struct PreparedSubmission {
    /// Instance id in the source document; staged attachments are keyed by it
    pub source_id: InstanceId,

    /// Instance id the destination will see
    pub submitted_id: InstanceId,

    /// Rewritten document
    pub document: SubmissionDocument,
}

/// Rewrites a document for the destination
///
/// 1. Root tag becomes the destination asset id.
/// 2. Root attributes become exactly `{id, version}`.
/// 3. `__version__` is set to the version label.
/// 4. `formhub/uuid` is set to the hub id.
///
/// Missing fields and groups are created. Applying the rewrite twice yields the same
/// document as applying it once.
///
/// # Examples
///
/// ```
/// use kobo_transfer::core::transfer::rewrite::rewrite;
/// use kobo_transfer::domain::{AssetUid, SubmissionDocument, TransferMetadata};
///
/// let meta = TransferMetadata {
///     destination_asset_id: AssetUid::new("aDest").unwrap(),
///     destination_version: "vNew".to_string(),
///     destination_version_label: "2 (2024-02-01 10:00:00)".to_string(),
///     destination_hub_id: "hub-1".to_string(),
/// };
/// let doc = SubmissionDocument::parse(r#"<aSrc id="aSrc" version="vOld"/>"#).unwrap();
/// let rewritten = rewrite(&doc, &meta);
/// assert_eq!(rewritten.root_tag(), "aDest");
/// assert_eq!(rewritten.root_attribute("version"), Some("vNew"));
/// ```
pub fn rewrite(document: &SubmissionDocument, metadata: &TransferMetadata) -> SubmissionDocument {
    let asset_id = metadata.destination_asset_id.as_str();
    document
        .clone()
        .with_root(
            asset_id,
            [
                ("id", asset_id),
                ("version", metadata.destination_version.as_str()),
            ],
        )
        .with_field(
            &FieldPath::leaf(VERSION_FIELD),
            &metadata.destination_version_label,
        )
        .with_field(
            &FieldPath::grouped(FORMHUB_GROUP, "uuid"),
            &metadata.destination_hub_id,
        )
}

/// Gives a document a fresh instance id
///
/// The old value of `meta/instanceID` moves to `meta/deprecatedID`.
pub fn regenerate_instance_id(
    document: SubmissionDocument,
    current: &InstanceId,
) -> (SubmissionDocument, InstanceId) {
    let fresh = InstanceId::generate();
    let document = document
        .with_field(
            &FieldPath::grouped("meta", DEPRECATED_ID_FIELD),
            &current.to_instance_field(),
        )
        .with_field(&instance_id_path(), &fresh.to_instance_field());
    (document, fresh)
}

/// Extracts the deduplication key and rewrites the document
///
/// # Errors
///
/// Returns [`DocumentError::MissingField`] if the document has no usable
/// `meta/instanceID`.
pub fn prepare(
    document: &SubmissionDocument,
    metadata: &TransferMetadata,
    regenerate_ids: bool,
) -> Result<PreparedSubmission, DocumentError> {
    let source_id = document.instance_id()?;
    let rewritten = rewrite(document, metadata);

    let (document, submitted_id) = if regenerate_ids {
        regenerate_instance_id(rewritten, &source_id)
    } else {
        (rewritten, source_id.clone())
    };

    Ok(PreparedSubmission {
        source_id,
        submitted_id,
        document,
    })
}
