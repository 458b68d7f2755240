// Session state: the API token given at startup and the id of the folder
// most recently created in this run.

use crate::error::{FolderError, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Session {
    api_token: String,
    last_created_folder_id: Option<String>,
}

impl Session {
    /// Start a session. The token is trimmed and must not be empty.
    pub fn new(api_token: &str) -> Result<Self> {
        let api_token = api_token.trim();
        if api_token.is_empty() {
            return Err(FolderError::Validation { field: "API token" });
        }
        Ok(Session {
            api_token: api_token.to_string(),
            last_created_folder_id: None,
        })
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn last_created_folder_id(&self) -> Option<&str> {
        self.last_created_folder_id.as_deref()
    }

    /// Token with everything past the first four characters hidden.
    pub fn masked_token(&self) -> String {
        let visible: String = self.api_token.chars().take(4).collect();
        format!("{visible}****")
    }

    pub(crate) fn remember_created(&mut self, folder_id: &str) {
        if folder_id.is_empty() {
            return;
        }
        info!(folder_id, "remembering last created folder");
        self.last_created_folder_id = Some(folder_id.to_string());
    }

    pub(crate) fn clear_last_created(&mut self) {
        if let Some(folder_id) = self.last_created_folder_id.take() {
            info!(folder_id = %folder_id, "cleared last created folder");
        }
    }

    /// Clear the remembered id if it names `folder_id`. Returns whether it did.
    pub(crate) fn forget_if(&mut self, folder_id: &str) -> bool {
        if self.last_created_folder_id.as_deref() == Some(folder_id) {
            info!(folder_id, "cleared last created folder");
            self.last_created_folder_id = None;
            true
        } else {
            false
        }
    }

    /// Pick the explicit id when one is given, else the last created one.
    /// The flag is true when the fallback was used.
    pub(crate) fn resolve_folder_id(&self, explicit: Option<&str>) -> Result<(String, bool)> {
        match explicit.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Ok((id.to_string(), false)),
            None => self
                .last_created_folder_id
                .clone()
                .map(|id| (id, true))
                .ok_or(FolderError::NoDefaultFolder),
        }
    }
}
