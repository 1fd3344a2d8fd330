//! Google Drive API type definitions

use serde::{Deserialize, Serialize};

/// A Drive file or folder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub mime_type: String,

    /// Size in bytes as a decimal string; absent for Workspace files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<Owner>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,

    #[serde(default)]
    pub shared: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        crate::drive::utils::is_folder_type(&self.mime_type)
    }

    /// Size in bytes when Drive reported a numeric size
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn modified_date(&self) -> &str {
        self.modified_time
            .as_deref()
            .map(crate::format::date_part)
            .unwrap_or("Unknown")
    }

    pub fn owner_name(&self) -> &str {
        self.owners
            .first()
            .and_then(|o| o.display_name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// File owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// Response of `files.list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Metadata for a file being created
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl NewFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn in_folder(mut self, folder_id: Option<&str>) -> Self {
        if let Some(id) = folder_id.filter(|id| !id.is_empty()) {
            self.parents = vec![id.to_string()];
        }
        self
    }
}

/// Who a permission applies to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(rename = "type")]
    pub grantee_type: String,

    pub role: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

impl Permission {
    pub fn user(email: &str, role: &str) -> Self {
        Self {
            grantee_type: "user".to_string(),
            role: role.to_string(),
            email_address: Some(email.to_string()),
        }
    }

    pub fn anyone_reader() -> Self {
        Self {
            grantee_type: "anyone".to_string(),
            role: "reader".to_string(),
            email_address: None,
        }
    }
}

/// Parameters for `files.list`
#[derive(Debug, Clone)]
pub struct ListFilesRequest<'a> {
    pub query: &'a str,
    pub page_size: u32,
    pub fields: &'a str,
    pub order_by: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_deserialize() {
        let json = r#"{
            "id": "f1",
            "name": "Budget",
            "mimeType": "application/vnd.google-apps.spreadsheet",
            "modifiedTime": "2024-03-02T10:11:12.000Z",
            "owners": [{"displayName": "Ada"}],
            "shared": true
        }"#;
        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id, "f1");
        assert_eq!(file.modified_date(), "2024-03-02");
        assert_eq!(file.owner_name(), "Ada");
        assert!(file.shared);
        assert!(!file.is_folder());
        assert_eq!(file.size_bytes(), None);
    }

    #[test]
    fn test_new_file_serialize() {
        let meta = NewFile::new("notes.txt")
            .with_mime_type("text/plain")
            .in_folder(Some("folder1"));
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["name"], "notes.txt");
        assert_eq!(json["mimeType"], "text/plain");
        assert_eq!(json["parents"][0], "folder1");

        let root = serde_json::to_value(NewFile::new("x").in_folder(None)).unwrap();
        assert!(root.get("parents").is_none());
        assert!(root.get("mimeType").is_none());
    }

    #[test]
    fn test_permission_serialize() {
        let json = serde_json::to_value(Permission::user("a@example.com", "writer")).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["role"], "writer");
        assert_eq!(json["emailAddress"], "a@example.com");

        let anyone = serde_json::to_value(Permission::anyone_reader()).unwrap();
        assert_eq!(anyone["type"], "anyone");
        assert!(anyone.get("emailAddress").is_none());
    }
}
