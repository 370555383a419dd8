//! KoboToolbox API response models
//!
//! Typed views of the few endpoints a transfer touches: the XML submission listing,
//! the JSON submission listing (for attachment metadata), the asset detail and the
//! form listing.

use crate::domain::ids::{AssetUid, InstanceId};
use crate::domain::{DocumentError, SubmissionDocument};
use serde::Deserialize;
use serde_json::json;
use xmltree::{Element, XMLNode};

/// Asset detail (`/api/v2/assets/{uid}/`), reduced to the fields we read
#[derive(Debug, Clone, Deserialize)]
pub struct AssetDetail {
    /// Deployment history of the asset
    pub deployed_versions: DeployedVersions,
}

/// Paginated list of deployed versions, most recent first
#[derive(Debug, Clone, Deserialize)]
pub struct DeployedVersions {
    /// Total number of deployed versions
    pub count: u64,

    /// Deployed versions, newest first
    #[serde(default)]
    pub results: Vec<DeployedVersion>,
}

/// One deployed version of an asset
#[derive(Debug, Clone, Deserialize)]
pub struct DeployedVersion {
    /// Version uid
    pub uid: String,

    /// ISO-8601 deployment timestamp
    pub date_deployed: String,
}

/// Entry of the KoboCAT form listing (`/api/v1/forms`)
#[derive(Debug, Clone, Deserialize)]
pub struct FormSummary {
    /// Form id string; equals the asset uid for KPI-deployed forms
    pub id_string: String,

    /// Form hub uuid
    pub uuid: String,
}

/// Page of the JSON submission listing
#[derive(Debug, Clone, Deserialize)]
pub struct DataPage {
    /// URL of the next page
    #[serde(default)]
    pub next: Option<String>,

    /// Submissions on this page
    #[serde(default)]
    pub results: Vec<DataRecord>,
}

/// One submission in the JSON listing
#[derive(Debug, Clone, Deserialize)]
pub struct DataRecord {
    /// Instance uuid without the `uuid:` prefix
    #[serde(rename = "_uuid", default)]
    pub uuid: Option<String>,

    /// Value of `meta/instanceID`, used when `_uuid` is missing
    #[serde(rename = "meta/instanceID", default)]
    pub instance_id: Option<String>,

    /// Attachments uploaded with the submission
    #[serde(rename = "_attachments", default)]
    pub attachments: Vec<AttachmentRecord>,
}

impl DataRecord {
    /// Instance id of the record, if it carries one
    pub fn instance_id(&self) -> Option<InstanceId> {
        self.instance_id
            .as_deref()
            .or(self.uuid.as_deref())
            .and_then(|value| InstanceId::from_instance_field(value).ok())
    }
}

/// Attachment metadata in the JSON listing
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentRecord {
    /// Absolute URL the original file can be downloaded from
    pub download_url: String,

    /// Storage path of the file; the last segment is the original file name
    #[serde(default)]
    pub filename: String,

    /// Original file name, on servers that report it
    #[serde(default)]
    pub media_file_basename: Option<String>,
}

impl AttachmentRecord {
    /// File name the attachment was uploaded under
    ///
    /// Only the last path segment is kept, so the result is always a plain file name.
    pub fn file_name(&self) -> Option<&str> {
        let name = match self.media_file_basename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.filename.as_str(),
        };
        let name = name.rsplit(['/', '\\']).next().unwrap_or_default();
        if name.is_empty() || name == "." || name == ".." {
            None
        } else {
            Some(name)
        }
    }
}

/// Restriction of the source listing to a set of instance ids
///
/// Rendered as the `query` parameter of the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionQuery {
    instance_ids: Vec<InstanceId>,
}

impl SubmissionQuery {
    /// Creates a query matching exactly the given instance ids
    pub fn for_instances(instance_ids: Vec<InstanceId>) -> Self {
        Self { instance_ids }
    }

    /// Instance ids the query matches
    pub fn instance_ids(&self) -> &[InstanceId] {
        &self.instance_ids
    }

    /// Renders the query as JSON
    ///
    /// # Examples
    ///
    /// ```
    /// use kobo_transfer::adapters::kobo::SubmissionQuery;
    /// use kobo_transfer::domain::InstanceId;
    ///
    /// let query = SubmissionQuery::for_instances(vec![InstanceId::new("a1").unwrap()]);
    /// assert_eq!(query.to_json(), r#"{"_uuid":{"$in":["a1"]}}"#);
    /// ```
    pub fn to_json(&self) -> String {
        let ids: Vec<&str> = self.instance_ids.iter().map(InstanceId::as_str).collect();
        json!({ "_uuid": { "$in": ids } }).to_string()
    }
}

/// Returns true if a continuation token means "no more pages"
///
/// Servers emit the end of data as a missing or empty `next` element, or as the
/// literal text `None` or `null`.
pub fn is_terminal_token(token: Option<&str>) -> bool {
    match token.map(str::trim) {
        None => true,
        Some(token) => token.is_empty() || token == "None" || token == "null",
    }
}

/// One page of the XML submission listing
#[derive(Debug, Clone)]
pub struct SubmissionPage {
    /// Submissions on this page, in server order
    pub submissions: Vec<SubmissionDocument>,

    /// URL of the next page; `None` when this is the last page
    pub next: Option<String>,
}

impl SubmissionPage {
    /// Parses a listing page
    ///
    /// Submissions are the children of `results` whose tag is the asset uid; the
    /// continuation token is the text of `next`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kobo_transfer::adapters::kobo::SubmissionPage;
    /// use kobo_transfer::domain::AssetUid;
    ///
    /// let xml = r#"<root><count>1</count><next>None</next><previous/>
    ///   <results><aSrc id="aSrc"><meta><instanceID>uuid:a1</instanceID></meta></aSrc></results>
    /// </root>"#;
    /// let page = SubmissionPage::parse(xml, &AssetUid::new("aSrc").unwrap()).unwrap();
    /// assert_eq!(page.submissions.len(), 1);
    /// assert!(page.next.is_none());
    /// ```
    pub fn parse(xml: &str, asset_uid: &AssetUid) -> Result<Self, DocumentError> {
        let root =
            Element::parse(xml.as_bytes()).map_err(|e| DocumentError::Parse(e.to_string()))?;

        let submissions = match root.get_child("results") {
            Some(results) => results
                .children
                .iter()
                .filter_map(|node| match node {
                    XMLNode::Element(element) if element.name == asset_uid.as_str() => {
                        Some(SubmissionDocument::from_element(element.clone()))
                    }
                    _ => None,
                })
                .collect(),
            None => Vec::new(),
        };

        let token = root
            .get_child("next")
            .and_then(|next| next.get_text())
            .map(|text| text.trim().to_string());
        let next = if is_terminal_token(token.as_deref()) {
            None
        } else {
            token
        };

        Ok(Self { submissions, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> AssetUid {
        AssetUid::new("aSrc").unwrap()
    }

    #[test]
    fn test_terminal_tokens() {
        assert!(is_terminal_token(None));
        assert!(is_terminal_token(Some("")));
        assert!(is_terminal_token(Some("  ")));
        assert!(is_terminal_token(Some("None")));
        assert!(is_terminal_token(Some("null")));
        assert!(!is_terminal_token(Some(
            "https://kf.example.org/api/v2/assets/aSrc/data.xml?limit=2&start=2"
        )));
    }

    #[test]
    fn test_parse_page_with_next() {
        let xml = r#"<root>
            <count>3</count>
            <next>https://kf.example.org/api/v2/assets/aSrc/data.xml?limit=2&amp;start=2</next>
            <previous/>
            <results>
                <aSrc id="aSrc"><meta><instanceID>uuid:a1</instanceID></meta></aSrc>
                <aSrc id="aSrc"><meta><instanceID>uuid:a2</instanceID></meta></aSrc>
            </results>
        </root>"#;
        let page = SubmissionPage::parse(xml, &asset()).unwrap();
        assert_eq!(page.submissions.len(), 2);
        assert_eq!(page.submissions[1].instance_id().unwrap().as_str(), "a2");
        assert_eq!(
            page.next.as_deref(),
            Some("https://kf.example.org/api/v2/assets/aSrc/data.xml?limit=2&start=2")
        );
    }

    #[test]
    fn test_parse_page_empty_next_element() {
        let xml = r#"<root><next/><results/></root>"#;
        let page = SubmissionPage::parse(xml, &asset()).unwrap();
        assert!(page.submissions.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_parse_page_missing_next_element() {
        let xml = r#"<root><results><aSrc/></results></root>"#;
        let page = SubmissionPage::parse(xml, &asset()).unwrap();
        assert_eq!(page.submissions.len(), 1);
        assert!(page.next.is_none());
    }

    #[test]
    fn test_parse_page_ignores_other_tags() {
        let xml = r#"<root><next>None</next><results><aOther/><aSrc/></results></root>"#;
        let page = SubmissionPage::parse(xml, &asset()).unwrap();
        assert_eq!(page.submissions.len(), 1);
        assert_eq!(page.submissions[0].root_tag(), "aSrc");
    }

    #[test]
    fn test_parse_page_invalid_xml() {
        assert!(SubmissionPage::parse("<root><results>", &asset()).is_err());
    }

    #[test]
    fn test_submission_query_json() {
        let query = SubmissionQuery::for_instances(vec![
            InstanceId::new("a1").unwrap(),
            InstanceId::new("a2").unwrap(),
        ]);
        let value: serde_json::Value = serde_json::from_str(&query.to_json()).unwrap();
        assert_eq!(value, json!({"_uuid": {"$in": ["a1", "a2"]}}));
    }

    #[test]
    fn test_asset_detail_deserialize() {
        let detail: AssetDetail = serde_json::from_value(json!({
            "uid": "aDest",
            "deployed_versions": {
                "count": 2,
                "next": null,
                "results": [
                    {"uid": "vNew", "date_deployed": "2024-02-01T10:00:00.5Z", "url": "x"},
                    {"uid": "vOld", "date_deployed": "2023-01-01T00:00:00Z"}
                ]
            }
        }))
        .unwrap();
        assert_eq!(detail.deployed_versions.count, 2);
        assert_eq!(detail.deployed_versions.results[0].uid, "vNew");
    }

    #[test]
    fn test_data_record_instance_id() {
        let record: DataRecord = serde_json::from_value(json!({
            "_uuid": "a1",
            "meta/instanceID": "uuid:a1",
            "_attachments": []
        }))
        .unwrap();
        assert_eq!(record.instance_id().unwrap().as_str(), "a1");

        let record: DataRecord = serde_json::from_value(json!({"_uuid": "a2"})).unwrap();
        assert_eq!(record.instance_id().unwrap().as_str(), "a2");
    }

    #[test]
    fn test_attachment_file_name() {
        let attachment: AttachmentRecord = serde_json::from_value(json!({
            "download_url": "https://kc.example.org/media/original?media_file=x",
            "filename": "someuser/attachments/abc/a1/photo-12_3_4.jpg"
        }))
        .unwrap();
        assert_eq!(attachment.file_name(), Some("photo-12_3_4.jpg"));

        let attachment: AttachmentRecord = serde_json::from_value(json!({
            "download_url": "https://kc.example.org/x",
            "filename": "someuser/attachments/abc/a1/ignored.jpg",
            "media_file_basename": "signature.png"
        }))
        .unwrap();
        assert_eq!(attachment.file_name(), Some("signature.png"));

        let attachment: AttachmentRecord = serde_json::from_value(json!({
            "download_url": "https://kc.example.org/x",
            "filename": "someuser/attachments/"
        }))
        .unwrap();
        assert_eq!(attachment.file_name(), None);
    }

    #[test]
    fn test_attachment_file_name_drops_directories() {
        let attachment: AttachmentRecord = serde_json::from_value(json!({
            "download_url": "https://kc.example.org/x",
            "filename": "someuser/attachments/abc/a1/photo.jpg",
            "media_file_basename": "../../../escape.jpg"
        }))
        .unwrap();
        assert_eq!(attachment.file_name(), Some("escape.jpg"));

        let attachment: AttachmentRecord = serde_json::from_value(json!({
            "download_url": "https://kc.example.org/x",
            "filename": "someuser\\attachments\\a1\\audio.m4a"
        }))
        .unwrap();
        assert_eq!(attachment.file_name(), Some("audio.m4a"));

        let attachment: AttachmentRecord = serde_json::from_value(json!({
            "download_url": "https://kc.example.org/x",
            "filename": "someuser/attachments/a1/..",
            "media_file_basename": "nested/.."
        }))
        .unwrap();
        assert_eq!(attachment.file_name(), None);
    }
}
