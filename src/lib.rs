// Library root
// -----------
// The binary (`main.rs`) only wires configuration, the HTTP executor and
// the interactive shell together; everything else lives here.
//
// Module responsibilities:
// - `http`: executes one HTTP request and returns status + body.
// - `classify`: maps error statuses to categories and extracts messages.
// - `models`: typed request/response bodies for the folders endpoint.
// - `session`: API token and the last created folder id.
// - `api`: the list/create/rename/delete folder operations.
// - `prompt`, `ui`: the interactive menu and its input sources.
// - `config`, `error`: command line configuration and error types.
pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod prompt;
pub mod session;
pub mod ui;

#[cfg(test)]
mod test_helpers;

pub use api::{FolderClient, FolderListing};
pub use error::{FolderError, TransportError};
pub use session::Session;
