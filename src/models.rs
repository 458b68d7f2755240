// Wire types for the drive folders endpoint and the parameter structs the
// UI hands to the client. All JSON field naming lives here.

use crate::http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value shown for a folder id or name the server left out.
pub const MISSING_FIELD: &str = "N/A";

/// Value shown for a folder without a parent.
pub const ROOT_PARENT: &str = "Root";

/// Action discriminator carried in rename and delete bodies.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FolderAction {
    Update,
    Delete,
}

/// Body of a create request. Create has no `action` field.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateFolderBody {
    pub title: String,
    pub user_id: String,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Body of a rename request. The API models rename as a POST with
/// `action: "update"`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RenameFolderBody {
    action: FolderAction,
    #[serde(rename = "folderId")]
    pub folder_id: String,
    pub title: String,
    pub user_id: String,
}

impl RenameFolderBody {
    pub fn new(folder_id: String, title: String, user_id: String) -> Self {
        RenameFolderBody {
            action: FolderAction::Update,
            folder_id,
            title,
            user_id,
        }
    }
}

/// Body of a delete request, a POST with `action: "delete"`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DeleteFolderBody {
    action: FolderAction,
    #[serde(rename = "folderId")]
    pub folder_id: String,
    pub user_id: String,
}

impl DeleteFolderBody {
    pub fn new(folder_id: String, user_id: String) -> Self {
        DeleteFolderBody {
            action: FolderAction::Delete,
            folder_id,
            user_id,
        }
    }
}

/// One request against the folders endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderRequest {
    List,
    Create(CreateFolderBody),
    Rename(RenameFolderBody),
    Delete(DeleteFolderBody),
}

impl FolderRequest {
    pub fn method(&self) -> Method {
        match self {
            FolderRequest::List => Method::Get,
            _ => Method::Post,
        }
    }

    /// Encode the JSON body. List sends none.
    pub fn encode(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        match self {
            FolderRequest::List => Ok(None),
            FolderRequest::Create(body) => serde_json::to_vec(body).map(Some),
            FolderRequest::Rename(body) => serde_json::to_vec(body).map(Some),
            FolderRequest::Delete(body) => serde_json::to_vec(body).map(Some),
        }
    }
}

/// Top-level `{"data": ...}` wrapper used by every response.
#[derive(Deserialize, Debug)]
pub struct Envelope<T> {
    pub data: T,
}

// Ids come back as strings or numbers depending on the endpoint version.
#[derive(Deserialize, Debug, Default)]
pub struct FolderDto {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default, rename = "parentId")]
    pub parent_id: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CreatedFolderDto {
    #[serde(default)]
    pub media_folder_id: Option<Value>,
}

/// A folder as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    /// `None` means the folder sits at root level.
    pub parent_id: Option<String>,
}

impl FolderRecord {
    pub fn parent_display(&self) -> &str {
        self.parent_id.as_deref().unwrap_or(ROOT_PARENT)
    }
}

impl From<FolderDto> for FolderRecord {
    fn from(dto: FolderDto) -> Self {
        FolderRecord {
            id: value_text(dto.id).unwrap_or_else(|| MISSING_FIELD.to_string()),
            name: value_text(dto.name).unwrap_or_else(|| MISSING_FIELD.to_string()),
            parent_id: value_text(dto.parent_id),
        }
    }
}

/// Render a scalar JSON value as text. Null and empty strings count as absent.
pub(crate) fn value_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Parameters for creating a folder, as collected by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFolderParams {
    pub title: String,
    pub user_id: String,
    pub parent_id: Option<String>,
}

/// Parameters for renaming a folder. `folder_id: None` targets the last
/// created folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameFolderParams {
    pub folder_id: Option<String>,
    pub title: String,
    pub user_id: String,
}

/// Parameters for deleting a folder. Nothing is sent unless `confirmed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteFolderParams {
    pub folder_id: Option<String>,
    pub user_id: String,
    pub confirmed: bool,
}
