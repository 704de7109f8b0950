//! Page lifecycle: guard, page-load fetch and event dispatch.

use std::sync::Arc;

use crate::api::Backend;
use crate::auth::{AuthClient, LoginForm};
use crate::complaints::ComplaintClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{Complaint, ComplaintStatus, Credentials, NewComplaint, Registration, Role};
use crate::page::{Control, Page};
use crate::render::{AdminCounts, ViewRenderer};
use crate::session::{logout, SessionStore};
use crate::ui::{Capabilities, Document};

/// A user action raised by one of the page's controls.
#[derive(Debug, Clone)]
pub enum PageEvent {
    Register(Registration),
    Login {
        credentials: Credentials,
        form: LoginForm,
    },
    SubmitComplaint(NewComplaint),
    Logout,
    ChangeStatus {
        complaint_id: String,
        status: ComplaintStatus,
    },
}

impl PageEvent {
    /// The control that raises this event.
    pub fn control(&self) -> Control {
        match self {
            PageEvent::Register(_) => Control::RegisterForm,
            PageEvent::Login {
                form: LoginForm::Citizen,
                ..
            } => Control::LoginForm,
            PageEvent::Login {
                form: LoginForm::Admin,
                ..
            } => Control::AdminLoginForm,
            PageEvent::SubmitComplaint(_) => Control::ComplaintForm,
            PageEvent::Logout => Control::LogoutButton,
            PageEvent::ChangeStatus { .. } => Control::StatusSelect,
        }
    }
}

/// What a page load produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    /// The guard sent the user elsewhere.
    Redirected(Page),
    /// Nothing to fetch for this page and session.
    Static,
    Citizen(Vec<Complaint>),
    Dashboard {
        complaints: Vec<Complaint>,
        counts: AdminCounts,
    },
}

/// Decide whether the session may view `page`.
///
/// Returns the page to redirect to, or `None` when access is allowed.
pub fn guard(store: &dyn SessionStore, page: Page) -> ClientResult<Option<Page>> {
    let Some(required) = page.required_role() else {
        return Ok(None);
    };
    if store.token()?.is_none() {
        return Ok(Some(Page::Landing));
    }
    match store.role()? {
        Some(role) if role == required => Ok(None),
        Some(role) => Ok(Some(Page::home_for(role))),
        None => Ok(Some(Page::Landing)),
    }
}

pub struct PageController {
    current: Page,
    caps: Capabilities,
    auth: AuthClient,
    complaints: ComplaintClient,
    renderer: ViewRenderer,
    document: Arc<dyn Document>,
}

impl PageController {
    pub fn new(
        backend: Arc<dyn Backend>,
        caps: Capabilities,
        document: Arc<dyn Document>,
        renderer: ViewRenderer,
    ) -> Self {
        Self {
            current: Page::Landing,
            auth: AuthClient::new(backend.clone(), caps.clone()),
            complaints: ComplaintClient::new(backend, caps.clone()),
            caps,
            renderer,
            document,
        }
    }

    pub fn current(&self) -> Page {
        self.current
    }

    /// Open `page`: guard it, then run at most one fetch and render it.
    pub async fn load(&mut self, page: Page) -> ClientResult<PageView> {
        self.current = page;
        self.document.open(page);

        if let Some(target) = guard(self.caps.store.as_ref(), page)? {
            tracing::info!(%page, %target, "Page not available to session, redirecting");
            self.caps.navigator.navigate(target);
            return Ok(PageView::Redirected(target));
        }

        match (page, self.caps.store.role()?) {
            (Page::CitizenStatus, Some(Role::Citizen)) => {
                let user_id = self.caps.store.user_id()?.unwrap_or_default();
                let complaints = self.complaints.fetch_for_citizen(&user_id).await?;
                self.renderer
                    .render_citizen_table(self.document.as_ref(), &complaints)?;
                Ok(PageView::Citizen(complaints))
            }
            (Page::AdminDashboard, Some(Role::Admin)) => self.refresh_dashboard().await,
            _ => Ok(PageView::Static),
        }
    }

    /// Load the page a navigation path points at.
    pub async fn load_path(&mut self, path: &str) -> ClientResult<PageView> {
        self.load(Page::from_path(path)).await
    }

    /// Handle an event from one of the current page's controls.
    pub async fn dispatch(&mut self, event: PageEvent) -> ClientResult<()> {
        let control = event.control();
        if !self.current.has_control(control) {
            return Err(ClientError::ControlNotPresent(
                control.element_id().to_string(),
            ));
        }

        match event {
            PageEvent::Register(registration) => self.auth.register(&registration).await,
            PageEvent::Login { credentials, form } => {
                self.auth.login(&credentials, form).await.map(|_| ())
            }
            PageEvent::SubmitComplaint(complaint) => self.complaints.submit(&complaint).await,
            PageEvent::Logout => logout(&self.caps),
            PageEvent::ChangeStatus {
                complaint_id,
                status,
            } => {
                // Declined and applied changes both re-render the dashboard.
                self.complaints.update_status(&complaint_id, status).await?;
                self.refresh_dashboard().await.map(|_| ())
            }
        }
    }

    async fn refresh_dashboard(&self) -> ClientResult<PageView> {
        let complaints = self.complaints.fetch_all().await?;
        let counts = self
            .renderer
            .render_admin_counts(self.document.as_ref(), &complaints);
        self.renderer
            .render_admin_table(self.document.as_ref(), &complaints)?;
        Ok(PageView::Dashboard { complaints, counts })
    }
}

impl std::fmt::Debug for PageController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("current", &self.current)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}
