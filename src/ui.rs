// UI layer: the interactive menu. Collects parameters through a
// `Prompter`, calls the folder client and prints what happened. Normal
// output and failure reports go to two injected writers (stdout and
// stderr in the binary, buffers in tests).

use crate::api::{DeleteOutcome, Exchange, FolderClient, FolderListing, ListOutcome};
use crate::error::{ApiFailure, FolderError};
use crate::http::{HttpExecutor, RequestSummary};
use crate::models::{CreateFolderParams, DeleteFolderParams, RenameFolderParams};
use crate::prompt::{InputClosed, Prompter};
use crate::session::Session;
use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

const MENU_ITEMS: [&str; 5] = [
    "GET - Fetch all drive folders",
    "POST - Create a new folder",
    "PUT - Update folder name",
    "DELETE - Remove folder",
    "Exit",
];

/// Print the banner and establish the session. A preset token (from the
/// command line or environment) skips the prompt.
pub fn start_session<P: Prompter, W: Write>(
    prompter: &mut P,
    out: &mut W,
    preset_token: Option<&str>,
) -> Result<Session> {
    writeln!(out, "Document360 Drive Folder Manager")?;
    let token = match preset_token {
        Some(token) => token.to_string(),
        None => prompter.secret("Enter your API token")?,
    };
    match Session::new(&token) {
        Ok(session) => Ok(session),
        Err(_) => bail!("API token is required!"),
    }
}

/// Trim and drop surrounding double quotes, as pasted ids often carry them.
pub fn clean_input(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.to_string()
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub struct Shell<E, P, W, X> {
    client: FolderClient<E>,
    prompter: P,
    out: W,
    err: X,
    show_spinner: bool,
}

impl<E: HttpExecutor, P: Prompter, W: Write, X: Write> Shell<E, P, W, X> {
    /// `out` receives the menu results, `err` the network and API failures.
    pub fn new(client: FolderClient<E>, prompter: P, out: W, err: X) -> Self {
        Shell {
            client,
            prompter,
            out,
            err,
            show_spinner: false,
        }
    }

    /// Show an indicatif spinner on stderr while a request is in flight.
    pub fn with_spinner(mut self, enabled: bool) -> Self {
        self.show_spinner = enabled;
        self
    }

    pub fn client(&self) -> &FolderClient<E> {
        &self.client
    }

    pub fn into_outputs(self) -> (W, X) {
        (self.out, self.err)
    }

    /// Main interactive menu. Runs until the user picks "Exit" or the
    /// input source closes.
    pub fn main_menu(&mut self) -> Result<()> {
        loop {
            let selection = match self.prompter.select("Menu", &MENU_ITEMS) {
                Ok(selection) => selection,
                Err(e) if e.downcast_ref::<InputClosed>().is_some() => break,
                Err(e) => return Err(e),
            };
            match selection {
                Some(0) => self.handle_list()?,
                Some(1) => self.handle_create()?,
                Some(2) => self.handle_rename()?,
                Some(3) => self.handle_delete()?,
                Some(4) => {
                    writeln!(self.out, "Exiting application...")?;
                    break;
                }
                _ => writeln!(self.out, "Invalid choice. Please try again.")?,
            }
        }
        Ok(())
    }

    fn handle_list(&mut self) -> Result<()> {
        writeln!(self.out, "\n=== GET All Drive Folders ===")?;
        let result = self.call("Fetching folders...", |client| client.list_folders());
        match result {
            Ok(ListOutcome { exchange, listing }) => {
                self.print_exchange(&exchange)?;
                writeln!(self.out, "Successfully retrieved all folders")?;
                match listing {
                    FolderListing::Parsed(records) => {
                        writeln!(self.out, "\nFound {} folders:", records.len())?;
                        for record in &records {
                            writeln!(
                                self.out,
                                "  - ID: {}, Name: {}, Parent ID: {}",
                                record.id,
                                record.name,
                                record.parent_display()
                            )?;
                        }
                    }
                    FolderListing::Raw(_) => {
                        writeln!(self.out, "Note: Could not parse JSON response structure")?;
                    }
                }
            }
            Err(e) => self.report_error("retrieve folders", &e)?,
        }
        Ok(())
    }

    fn handle_create(&mut self) -> Result<()> {
        writeln!(self.out, "\n=== POST Create New Folder ===")?;
        let title = clean_input(&self.prompter.input("Enter folder name")?);
        if title.is_empty() {
            return self.report_error("create folder", &FolderError::Validation { field: "folder name" });
        }
        let parent_id = clean_input(
            &self
                .prompter
                .input("Enter parent folder ID (leave empty for root level)")?,
        );
        let user_id = clean_input(&self.prompter.input("Enter user ID")?);

        let params = CreateFolderParams {
            title,
            user_id,
            parent_id: optional(parent_id),
        };
        let result = self.call("Creating folder...", |client| client.create_folder(&params));
        match result {
            Ok(outcome) => {
                self.print_exchange(&outcome.exchange)?;
                writeln!(self.out, "Successfully created folder: {}", outcome.title)?;
                match outcome.folder_id {
                    Some(id) => writeln!(self.out, "New folder ID: {id}")?,
                    None => writeln!(self.out, "Note: Could not extract folder ID from response")?,
                }
            }
            Err(e) => self.report_error("create folder", &e)?,
        }
        Ok(())
    }

    fn handle_rename(&mut self) -> Result<()> {
        writeln!(self.out, "\n=== PUT Update Folder Name ===")?;
        let Some(folder_id) =
            self.ask_folder_id("Enter folder ID to update (or press Enter to use last created folder)")?
        else {
            return Ok(());
        };
        let title = clean_input(&self.prompter.input("Enter new folder name")?);
        if title.is_empty() {
            return self.report_error("update folder", &FolderError::Validation { field: "folder name" });
        }
        let user_id = clean_input(&self.prompter.input("Enter user ID")?);

        let params = RenameFolderParams {
            folder_id,
            title,
            user_id,
        };
        let result = self.call("Updating folder...", |client| client.rename_folder(&params));
        match result {
            Ok(outcome) => {
                self.print_exchange(&outcome.exchange)?;
                writeln!(self.out, "Successfully updated folder name to: {}", outcome.title)?;
                writeln!(self.out, "Folder ID: {}", outcome.folder_id)?;
            }
            Err(e) => self.report_error("update folder", &e)?,
        }
        Ok(())
    }

    fn handle_delete(&mut self) -> Result<()> {
        writeln!(self.out, "\n=== DELETE Remove Folder ===")?;
        let Some(folder_id) =
            self.ask_folder_id("Enter folder ID to delete (or press Enter to use last created folder)")?
        else {
            return Ok(());
        };
        let user_id = clean_input(&self.prompter.input("Enter user ID")?);
        if user_id.is_empty() {
            return self.report_error("delete folder", &FolderError::Validation { field: "user id" });
        }

        let target = folder_id
            .clone()
            .or_else(|| self.client.session().last_created_folder_id().map(str::to_string))
            .unwrap_or_default();
        let confirmed = self
            .prompter
            .confirm(&format!("Are you sure you want to delete folder {target}?"))?;

        let params = DeleteFolderParams {
            folder_id,
            user_id,
            confirmed,
        };
        let result = self.call("Deleting folder...", |client| client.delete_folder(&params));
        match result {
            Ok(DeleteOutcome::Cancelled { .. }) => writeln!(self.out, "Deletion cancelled.")?,
            Ok(DeleteOutcome::Deleted {
                exchange,
                folder_id,
                cleared_last_created,
                ..
            }) => {
                self.print_exchange(&exchange)?;
                writeln!(self.out, "Successfully deleted folder")?;
                writeln!(self.out, "Deleted folder ID: {folder_id}")?;
                if cleared_last_created {
                    writeln!(self.out, "Cleared last created folder ID")?;
                }
            }
            Err(e) => self.report_error("delete folder", &e)?,
        }
        Ok(())
    }

    /// Ask for a folder id. Blank input falls back to the last created
    /// folder; `Ok(None)` means neither is available and the operation is over.
    fn ask_folder_id(&mut self, prompt: &str) -> Result<Option<Option<String>>> {
        let folder_id = clean_input(&self.prompter.input(prompt)?);
        if !folder_id.is_empty() {
            return Ok(Some(Some(folder_id)));
        }
        match self.client.session().last_created_folder_id() {
            Some(last) => {
                writeln!(self.out, "Using last created folder ID: {last}")?;
                Ok(Some(None))
            }
            None => {
                self.report_error("select folder", &FolderError::NoDefaultFolder)?;
                Ok(None)
            }
        }
    }

    fn call<T>(&mut self, message: &str, op: impl FnOnce(&mut FolderClient<E>) -> T) -> T {
        let spinner = self.show_spinner.then(|| start_spinner(message));
        let result = op(&mut self.client);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        result
    }

    fn print_exchange(&mut self, exchange: &Exchange) -> Result<()> {
        self.print_request(&exchange.request)?;
        self.print_response(exchange.response.status_code, &exchange.response.raw_body)
    }

    fn print_request(&mut self, request: &RequestSummary) -> Result<()> {
        writeln!(self.out, "Request URL: {}", request.url)?;
        writeln!(self.out, "Request Method: {}", request.method)?;
        writeln!(self.out, "Request Headers:")?;
        for (name, value) in &request.headers {
            writeln!(self.out, "  {name}: {value}")?;
        }
        if let Some(body) = &request.body {
            writeln!(self.out, "Request Body: {body}")?;
        }
        Ok(())
    }

    fn print_response(&mut self, status_code: u16, raw_body: &str) -> Result<()> {
        writeln!(self.out, "Response Code: {status_code}")?;
        writeln!(self.out, "Response Body: {raw_body}")?;
        Ok(())
    }

    fn report_error(&mut self, action: &str, error: &FolderError) -> Result<()> {
        match error {
            FolderError::Validation { field: "user id" } => writeln!(self.out, "User ID is required!")?,
            FolderError::Validation { field } => {
                writeln!(self.out, "{} cannot be empty!", capitalize(field))?
            }
            FolderError::NoDefaultFolder => writeln!(
                self.out,
                "No folder ID available. Please create a folder first or enter a folder ID."
            )?,
            FolderError::Transport(e) => writeln!(self.err, "Network error: {e}")?,
            FolderError::Api(failure) => {
                if let Some(request) = &failure.request {
                    self.print_request(request)?;
                }
                self.print_response(failure.status_code, &failure.raw_body)?;
                writeln!(self.err, "Failed to {action}")?;
                self.print_failure(failure)?;
            }
            FolderError::Encode(e) => writeln!(self.err, "Failed to {action}: {e}")?,
        }
        Ok(())
    }

    fn print_failure(&mut self, failure: &ApiFailure) -> Result<()> {
        writeln!(self.err, "Error Details:")?;
        writeln!(self.err, "  Status Code: {}", failure.status_code)?;
        writeln!(self.err, "  Status Message: {}", failure.category)?;
        if let Some(message) = &failure.message {
            writeln!(self.err, "  Error Message: {message}")?;
        }
        if let Some(details) = &failure.details {
            writeln!(self.err, "  Error Details: {details}")?;
        }
        if failure.needs_raw_body() {
            writeln!(self.err, "  Raw Response: {}", failure.raw_body)?;
        }
        Ok(())
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn start_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::prompt::LinePrompter;
    use crate::test_helpers::RecordingExecutor;
    use serde_json::json;
    use std::io::Cursor;

    type TestShell<'a> =
        Shell<&'a RecordingExecutor, LinePrompter<Cursor<Vec<u8>>, Vec<u8>>, Vec<u8>, Vec<u8>>;

    fn shell<'a>(executor: &'a RecordingExecutor, input: &str) -> TestShell<'a> {
        let client = FolderClient::new(executor, "https://api.test/folders", Session::new("tok-123").unwrap());
        let prompter = LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        Shell::new(client, prompter, Vec::new(), Vec::new())
    }

    /// Run the menu to completion and return (stdout, stderr).
    fn run_split(executor: &RecordingExecutor, input: &str) -> (String, String) {
        let mut shell = shell(executor, input);
        shell.main_menu().unwrap();
        let (out, err) = shell.into_outputs();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    fn run(executor: &RecordingExecutor, input: &str) -> String {
        run_split(executor, input).0
    }

    #[test]
    fn test_clean_input_strips_quotes() {
        assert_eq!(clean_input("  \"abc123\" \n"), "abc123");
        assert_eq!(clean_input("\"half"), "half");
        assert_eq!(clean_input("plain"), "plain");
        assert_eq!(clean_input("   "), "");
    }

    #[test]
    fn test_start_session_requires_token() {
        let mut prompter = LinePrompter::new(Cursor::new(b"\n".to_vec()), Vec::new());
        let mut out = Vec::new();
        let err = start_session(&mut prompter, &mut out, None).unwrap_err();
        assert_eq!(err.to_string(), "API token is required!");

        let session = start_session(&mut prompter, &mut out, Some("preset")).unwrap();
        assert_eq!(session.api_token(), "preset");
        assert!(String::from_utf8(out).unwrap().starts_with("Document360 Drive Folder Manager"));
    }

    #[test]
    fn test_exit_and_invalid_choice() {
        let executor = RecordingExecutor::new();
        let output = run(&executor, "7\n5\n");
        assert!(output.contains("Invalid choice. Please try again."));
        assert!(output.contains("Exiting application..."));
        assert_eq!(executor.request_count(), 0);
    }

    #[test]
    fn test_input_closed_ends_loop() {
        let executor = RecordingExecutor::new();
        assert_eq!(run(&executor, ""), "");
    }

    #[test]
    fn test_list_prints_folders() {
        let executor = RecordingExecutor::new()
            .respond(200, r#"{"data":[{"id":"1","name":"X"},{"id":"2","name":"Y","parentId":"1"}]}"#);
        let output = run(&executor, "1\n5\n");
        assert!(output.contains("Request Method: GET"));
        assert!(output.contains("  api_token: tok-****"));
        assert!(!output.contains("tok-123"));
        assert!(output.contains("Found 2 folders:"));
        assert!(output.contains("  - ID: 1, Name: X, Parent ID: Root"));
        assert!(output.contains("  - ID: 2, Name: Y, Parent ID: 1"));
    }

    #[test]
    fn test_create_then_rename_and_delete_last_created() {
        let executor = RecordingExecutor::new()
            .respond(201, r#"{"data":{"media_folder_id":"abc123"}}"#)
            .respond(200, r#"{"success":true}"#)
            .respond(200, r#"{"success":true}"#);
        let input = "2\n\"Reports\"\n\nu1\n3\n\nNewName\nu1\n4\n\nu1\nyes\n5\n";
        let mut shell = shell(&executor, input);
        shell.main_menu().unwrap();
        assert_eq!(shell.client().session().last_created_folder_id(), None);
        let output = String::from_utf8(shell.into_outputs().0).unwrap();

        assert!(output.contains("Successfully created folder: Reports"));
        assert!(output.contains("New folder ID: abc123"));
        assert!(output.contains("Using last created folder ID: abc123"));
        assert!(output.contains("Successfully updated folder name to: NewName"));
        assert!(output.contains("Deleted folder ID: abc123"));
        assert!(output.contains("Cleared last created folder ID"));
        assert_eq!(executor.body_json(0), json!({"title": "Reports", "user_id": "u1"}));
        assert_eq!(
            executor.body_json(1),
            json!({"action": "update", "folderId": "abc123", "title": "NewName", "user_id": "u1"})
        );
        assert_eq!(
            executor.body_json(2),
            json!({"action": "delete", "folderId": "abc123", "user_id": "u1"})
        );
    }

    #[test]
    fn test_delete_declined_sends_nothing() {
        let executor = RecordingExecutor::new();
        let output = run(&executor, "4\nF9\nu1\nn\n5\n");
        assert!(output.contains("Deletion cancelled."));
        assert_eq!(executor.request_count(), 0);
    }

    #[test]
    fn test_rename_without_default_explains() {
        let executor = RecordingExecutor::new();
        let output = run(&executor, "3\n\n5\n");
        assert!(output.contains("No folder ID available. Please create a folder first or enter a folder ID."));
        assert_eq!(executor.request_count(), 0);
    }

    #[test]
    fn test_create_empty_fields_rejected() {
        let executor = RecordingExecutor::new();
        let output = run(&executor, "2\n\n2\nDocs\n\n\n5\n");
        assert!(output.contains("Folder name cannot be empty!"));
        assert!(output.contains("User ID is required!"));
        assert_eq!(executor.request_count(), 0);
    }

    #[test]
    fn test_api_error_block() {
        let executor = RecordingExecutor::new()
            .respond(401, r#"{"message":"Invalid token","error":"UNAUTHORIZED"}"#)
            .respond(502, "<html>bad gateway</html>");
        let (output, errors) = run_split(&executor, "1\n1\n5\n");
        assert!(errors.contains("Failed to retrieve folders"));
        assert!(errors.contains("  Status Code: 401"));
        assert!(errors.contains("  Status Message: invalid credential"));
        assert!(errors.contains("  Error Message: Invalid token"));
        assert!(errors.contains("  Error Details: UNAUTHORIZED"));
        assert!(!errors.contains("Raw Response: {"));
        assert!(errors.contains("  Status Message: server-side failure"));
        assert!(errors.contains("  Raw Response: <html>bad gateway</html>"));
        assert!(!output.contains("Failed to retrieve folders"));
        assert!(output.contains("Response Code: 401"));
        assert!(output.contains("Response Code: 502"));
    }

    #[test]
    fn test_rejected_create_echoes_request_and_body() {
        let body = r#"{"errors":[{"field":"title","reason":"too long"}]}"#;
        let executor = RecordingExecutor::new().respond(400, body);
        let (output, errors) = run_split(&executor, "2\nReports\n\nu1\n5\n");

        assert!(output.contains("Request URL: https://api.test/folders"));
        assert!(output.contains("Request Method: POST"));
        assert!(output.contains("  api_token: tok-****"));
        assert!(!output.contains("tok-123"));
        assert!(output.contains(r#"Request Body: {"title":"Reports","user_id":"u1"}"#));
        assert!(output.contains("Response Code: 400"));
        assert!(output.contains(&format!("Response Body: {body}")));

        assert!(errors.contains("Failed to create folder"));
        assert!(errors.contains("  Status Message: invalid parameters"));
        assert!(!errors.contains("Error Message:"));
        assert!(errors.contains(&format!("  Raw Response: {body}")));
        assert!(!output.contains("Successfully created folder"));
    }

    #[test]
    fn test_network_error_keeps_loop_running() {
        let executor = RecordingExecutor::new()
            .fail(TransportError::Connect("connection refused".into()))
            .respond(200, r#"{"data":[]}"#);
        let (output, errors) = run_split(&executor, "1\n1\n5\n");
        assert_eq!(errors, "Network error: connection failed: connection refused\n");
        assert!(!output.contains("Network error"));
        assert!(output.contains("Found 0 folders:"));
    }

    #[test]
    fn test_input_problems_stay_on_stdout() {
        let executor = RecordingExecutor::new();
        let (output, errors) = run_split(&executor, "3\n\n2\n\n5\n");
        assert!(output.contains("No folder ID available."));
        assert!(output.contains("Folder name cannot be empty!"));
        assert_eq!(errors, "");
    }
}
