// API client module: the four drive folder operations. Each one composes
// a request, hands it to the HTTP executor and interprets the result. The
// client owns the session so the "last created folder" convenience stays
// consistent with what actually succeeded.

use crate::error::{ApiFailure, FolderError, Result};
use crate::http::{ApiResult, HttpExecutor, HttpRequest, RequestSummary};
use crate::models::{
    value_text, CreateFolderBody, CreateFolderParams, CreatedFolderDto, DeleteFolderBody,
    DeleteFolderParams, Envelope, FolderDto, FolderRecord, FolderRequest, RenameFolderBody,
    RenameFolderParams,
};
use crate::session::Session;
use serde_json::Value;
use tracing::{debug, info};

/// Endpoint used for every operation.
pub const DEFAULT_BASE_URL: &str = "https://apihub.document360.io/v2/Drive/Folders";

/// A successful exchange: what was sent and what came back.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub request: RequestSummary,
    pub response: ApiResult,
}

/// Folder list content. `Raw` means the body was not the expected
/// `{"data": [...]}` shape, which is different from an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderListing {
    Parsed(Vec<FolderRecord>),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListOutcome {
    pub exchange: Exchange,
    pub listing: FolderListing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub exchange: Exchange,
    pub title: String,
    /// `data.media_folder_id` from the response, when present.
    pub folder_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameOutcome {
    pub exchange: Exchange,
    pub folder_id: String,
    pub title: String,
    pub used_last_created: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Not confirmed; nothing was sent.
    Cancelled { folder_id: String },
    Deleted {
        exchange: Exchange,
        folder_id: String,
        used_last_created: bool,
        /// True when the deleted folder was the remembered one.
        cleared_last_created: bool,
    },
}

/// Client for the drive folders endpoint.
pub struct FolderClient<E> {
    executor: E,
    base_url: String,
    session: Session,
}

impl<E: HttpExecutor> FolderClient<E> {
    pub fn new(executor: E, base_url: impl Into<String>, session: Session) -> Self {
        FolderClient {
            executor,
            base_url: base_url.into(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch every folder. Succeeds on 200 only.
    pub fn list_folders(&self) -> Result<ListOutcome> {
        let exchange = self.send(&FolderRequest::List, &[200])?;
        let listing = parse_listing(&exchange.response);
        Ok(ListOutcome { exchange, listing })
    }

    /// Create a folder and remember its id. Succeeds on 200 or 201. A
    /// success without an id forgets the previously remembered folder.
    pub fn create_folder(&mut self, params: &CreateFolderParams) -> Result<CreateOutcome> {
        let title = required(&params.title, "folder name")?;
        let user_id = required(&params.user_id, "user id")?;
        let parent_id = params
            .parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let request = FolderRequest::Create(CreateFolderBody {
            title: title.clone(),
            user_id,
            parent_id,
        });
        let exchange = self.send(&request, &[200, 201])?;

        let folder_id = created_folder_id(&exchange.response);
        match &folder_id {
            Some(id) => self.session.remember_created(id),
            None => {
                debug!("create response carried no media_folder_id");
                self.session.clear_last_created();
            }
        }
        Ok(CreateOutcome {
            exchange,
            title,
            folder_id,
        })
    }

    /// Rename a folder, defaulting to the last created one. Succeeds on 200.
    pub fn rename_folder(&self, params: &RenameFolderParams) -> Result<RenameOutcome> {
        let (folder_id, used_last_created) =
            self.session.resolve_folder_id(params.folder_id.as_deref())?;
        let title = required(&params.title, "folder name")?;
        let user_id = required(&params.user_id, "user id")?;

        let request = FolderRequest::Rename(RenameFolderBody::new(
            folder_id.clone(),
            title.clone(),
            user_id,
        ));
        let exchange = self.send(&request, &[200])?;
        Ok(RenameOutcome {
            exchange,
            folder_id,
            title,
            used_last_created,
        })
    }

    /// Delete a folder, defaulting to the last created one. Nothing is sent
    /// unless `params.confirmed`. Succeeds on 200 or 204.
    pub fn delete_folder(&mut self, params: &DeleteFolderParams) -> Result<DeleteOutcome> {
        let (folder_id, used_last_created) =
            self.session.resolve_folder_id(params.folder_id.as_deref())?;
        let user_id = required(&params.user_id, "user id")?;

        if !params.confirmed {
            info!(folder_id = %folder_id, "deletion cancelled");
            return Ok(DeleteOutcome::Cancelled { folder_id });
        }

        let request = FolderRequest::Delete(DeleteFolderBody::new(folder_id.clone(), user_id));
        let exchange = self.send(&request, &[200, 204])?;
        let cleared_last_created = self.session.forget_if(&folder_id);
        Ok(DeleteOutcome::Deleted {
            exchange,
            folder_id,
            used_last_created,
            cleared_last_created,
        })
    }

    fn compose(&self, request: &FolderRequest) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: request.method(),
            url: self.base_url.clone(),
            headers: vec![
                ("api_token".to_string(), self.session.api_token().to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: request.encode()?,
        })
    }

    fn summarize(&self, request: &HttpRequest) -> RequestSummary {
        let headers = request
            .headers
            .iter()
            .map(|(name, value)| {
                if name == "api_token" {
                    (name.clone(), self.session.masked_token())
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect();
        RequestSummary {
            method: request.method.to_string(),
            url: request.url.clone(),
            headers,
            body: request.body_text(),
        }
    }

    fn send(&self, request: &FolderRequest, accepted: &[u16]) -> Result<Exchange> {
        let http_request = self.compose(request)?;
        debug!(
            method = %http_request.method,
            body = http_request.body_text().as_deref().unwrap_or(""),
            "folder request"
        );
        let response = self.executor.execute(&http_request)?;
        if !response.status_in(accepted) {
            let failure =
                ApiFailure::from_result(&response).with_request(self.summarize(&http_request));
            return Err(FolderError::Api(failure));
        }
        Ok(Exchange {
            request: self.summarize(&http_request),
            response,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FolderError::Validation { field });
    }
    Ok(value.to_string())
}

fn parse_listing(response: &ApiResult) -> FolderListing {
    let parsed = response
        .parsed
        .clone()
        .and_then(|v| serde_json::from_value::<Envelope<Vec<FolderDto>>>(v).ok());
    match parsed {
        Some(envelope) => {
            FolderListing::Parsed(envelope.data.into_iter().map(FolderRecord::from).collect())
        }
        None => {
            debug!("folder list body did not match the data array shape");
            FolderListing::Raw(response.raw_body.clone())
        }
    }
}

fn created_folder_id(response: &ApiResult) -> Option<String> {
    let value: Value = response.parsed.clone()?;
    let envelope: Envelope<CreatedFolderDto> = serde_json::from_value(value).ok()?;
    value_text(envelope.data.media_folder_id)
}
