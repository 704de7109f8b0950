//! Complaint submission, listing and status updates.

use std::sync::Arc;

use crate::api::Backend;
use crate::error::{ClientError, ClientResult};
use crate::models::{Complaint, ComplaintStatus, NewComplaint, Role};
use crate::page::Page;
use crate::session::logout;
use crate::ui::{Capabilities, Notice};

/// Outcome of a status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The service accepted the new status.
    Applied,
    /// The operator declined the confirmation; nothing was sent.
    Declined,
}

pub struct ComplaintClient {
    backend: Arc<dyn Backend>,
    caps: Capabilities,
}

impl ComplaintClient {
    pub fn new(backend: Arc<dyn Backend>, caps: Capabilities) -> Self {
        Self { backend, caps }
    }

    /// Submit a new complaint, then show the citizen's status page.
    pub async fn submit(&self, complaint: &NewComplaint) -> ClientResult<()> {
        let token = self.caps.store.token()?.unwrap_or_default();

        match self.backend.create_complaint(&token, complaint).await {
            Ok(_) => {
                tracing::info!(title = %complaint.title, "Complaint submitted");
                self.caps
                    .notifier
                    .notify(Notice::info("Complaint submitted successfully!"));
                self.caps.navigator.navigate(Page::CitizenStatus);
                Ok(())
            }
            Err(e) if e.is_transport() => {
                Err(self.fail(e, "An error occurred during submission.".to_string()))
            }
            Err(e) => {
                let message = format!("Submission Failed: {}", e);
                Err(self.fail(e, message))
            }
        }
    }

    /// Complaints filed by `user_id`. Logs out without a request when the
    /// user id or token is missing.
    pub async fn fetch_for_citizen(&self, user_id: &str) -> ClientResult<Vec<Complaint>> {
        let token = match self.caps.store.token()? {
            Some(token) if !user_id.is_empty() => token,
            _ => return Err(self.end_session()),
        };

        match self.backend.complaints_for_user(&token, user_id).await {
            Ok(complaints) => {
                tracing::debug!(user_id, count = complaints.len(), "Fetched citizen complaints");
                Ok(complaints)
            }
            Err(e) => {
                let message = format!("Error: {}. Please try logging in again.", e);
                Err(self.fail(e, message))
            }
        }
    }

    /// Every complaint in the system. Admin sessions only.
    pub async fn fetch_all(&self) -> ClientResult<Vec<Complaint>> {
        let token = self.admin_token()?;

        match self.backend.all_complaints(&token).await {
            Ok(complaints) => {
                tracing::debug!(count = complaints.len(), "Fetched all complaints");
                Ok(complaints)
            }
            Err(e) => {
                let message = format!(
                    "Error: {}. Please ensure you are logged in as an Admin.",
                    e
                );
                Err(self.fail(e, message))
            }
        }
    }

    /// Change a complaint's status after operator confirmation.
    pub async fn update_status(
        &self,
        complaint_id: &str,
        status: ComplaintStatus,
    ) -> ClientResult<StatusChange> {
        let token = self.admin_token()?;

        let prompt = format!("Are you sure you want to change status to \"{}\"?", status);
        if !self.caps.notifier.confirm(&prompt).await {
            tracing::debug!(complaint_id, %status, "Status change declined");
            return Ok(StatusChange::Declined);
        }

        match self.backend.update_status(&token, complaint_id, status).await {
            Ok(_) => {
                tracing::info!(complaint_id, %status, "Status updated");
                self.caps
                    .notifier
                    .notify(Notice::info("Status updated successfully!"));
                Ok(StatusChange::Applied)
            }
            Err(e) => {
                let message = format!("Status Update Failed: {}", e);
                Err(self.fail(e, message))
            }
        }
    }

    fn admin_token(&self) -> ClientResult<String> {
        match (self.caps.store.role()?, self.caps.store.token()?) {
            (Some(Role::Admin), Some(token)) => Ok(token),
            _ => Err(self.end_session()),
        }
    }

    /// Surface `message`, and end the session if the service rejected it.
    fn fail(&self, error: ClientError, message: String) -> ClientError {
        tracing::error!(error = %error, "Complaint request failed");
        self.caps.notifier.notify(Notice::error(message));
        if error.is_auth_failure() {
            if let Err(e) = logout(&self.caps) {
                tracing::error!(error = %e, "Failed to clear session");
            }
        }
        error
    }

    fn end_session(&self) -> ClientError {
        tracing::warn!("No usable session, logging out");
        if let Err(e) = logout(&self.caps) {
            return e;
        }
        ClientError::MissingSession
    }
}
