//! Registration and login flows.

use std::sync::Arc;

use crate::api::Backend;
use crate::error::ClientResult;
use crate::models::{Credentials, Registration, Role, Session};
use crate::page::Page;
use crate::ui::{Capabilities, Notice};

/// Which login form the credentials came from.
///
/// Both forms hit the same endpoint; the service decides the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginForm {
    Citizen,
    Admin,
}

pub struct AuthClient {
    backend: Arc<dyn Backend>,
    caps: Capabilities,
}

impl AuthClient {
    pub fn new(backend: Arc<dyn Backend>, caps: Capabilities) -> Self {
        Self { backend, caps }
    }

    /// Register a new citizen account, then return to the login view.
    pub async fn register(&self, registration: &Registration) -> ClientResult<()> {
        match self.backend.register(registration).await {
            Ok(_) => {
                tracing::info!(email = %registration.email, "Registration accepted");
                self.caps
                    .notifier
                    .notify(Notice::info("Registration successful! Please log in."));
                self.caps.navigator.navigate(Page::Landing);
                Ok(())
            }
            Err(e) if e.is_transport() => {
                tracing::error!(error = %e, "Registration error");
                self.caps
                    .notifier
                    .notify(Notice::error("An error occurred during registration."));
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registration rejected");
                self.caps
                    .notifier
                    .notify(Notice::error(format!("Registration Failed: {}", e)));
                Err(e)
            }
        }
    }

    /// Log in, persist the returned session and navigate to the role's
    /// home page.
    ///
    /// Returns the session as the store now reads it: `None` when the
    /// service sent a role the client does not know, in which case the
    /// role-scoped pages will send the user back to the landing page.
    pub async fn login(
        &self,
        credentials: &Credentials,
        form: LoginForm,
    ) -> ClientResult<Option<Session>> {
        let response = match self.backend.login(credentials).await {
            Ok(response) => response,
            Err(e) if e.is_transport() => {
                tracing::error!(error = %e, "Login error");
                self.caps
                    .notifier
                    .notify(Notice::error("An error occurred during login."));
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(error = %e, ?form, "Login rejected");
                self.caps
                    .notifier
                    .notify(Notice::error(format!("Login Failed: {}", e)));
                return Err(e);
            }
        };

        self.caps
            .store
            .save(&response.token, &response.role, &response.user_id)?;

        // Anything other than "admin" lands on the citizen pages.
        let role = if response.role == Role::Admin.as_str() {
            Role::Admin
        } else {
            Role::Citizen
        };
        tracing::info!(user_id = %response.user_id, %role, ?form, "Logged in");
        self.caps.navigator.navigate(Page::home_for(role));

        let session = self.caps.store.session()?;
        if session.is_none() {
            tracing::warn!(role = %response.role, "Unrecognised role stored");
        }
        Ok(session)
    }
}
