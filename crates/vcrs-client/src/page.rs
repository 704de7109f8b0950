//! Page identities and the capabilities each page declares.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Role;

/// A control a page may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    RegisterForm,
    LoginForm,
    AdminLoginForm,
    ComplaintForm,
    LogoutButton,
    StatusSelect,
}

impl Control {
    /// Element id of the control in the page markup.
    pub fn element_id(&self) -> &'static str {
        match self {
            Control::RegisterForm => "registerForm",
            Control::LoginForm => "loginForm",
            Control::AdminLoginForm => "adminLoginForm",
            Control::ComplaintForm => "complaintForm",
            Control::LogoutButton => "logout-button",
            Control::StatusSelect => "adminComplaintList",
        }
    }
}

/// Element ids written by the view renderer.
pub mod elements {
    pub const CITIZEN_COMPLAINT_LIST: &str = "citizenComplaintList";
    pub const ADMIN_COMPLAINT_LIST: &str = "adminComplaintList";
    pub const PENDING_COUNT: &str = "pendingCount";
    pub const IN_PROGRESS_COUNT: &str = "inProgressCount";
    pub const RESOLVED_COUNT: &str = "resolvedCount";
    pub const TOTAL_COUNT: &str = "totalCount";
}

/// The five navigable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Landing,
    Register,
    CitizenSubmit,
    CitizenStatus,
    AdminDashboard,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Landing,
        Page::Register,
        Page::CitizenSubmit,
        Page::CitizenStatus,
        Page::AdminDashboard,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Page::Landing => "index.html",
            Page::Register => "register.html",
            Page::CitizenSubmit => "citizen_submit_complaint.html",
            Page::CitizenStatus => "citizen_status.html",
            Page::AdminDashboard => "admin_dashboard.html",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Landing => "landing",
            Page::Register => "register",
            Page::CitizenSubmit => "citizen-submit",
            Page::CitizenStatus => "citizen-status",
            Page::AdminDashboard => "admin-dashboard",
        }
    }

    /// Role a session must hold to view the page. `None` means public.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Page::Landing | Page::Register => None,
            Page::CitizenSubmit | Page::CitizenStatus => Some(Role::Citizen),
            Page::AdminDashboard => Some(Role::Admin),
        }
    }

    pub fn controls(&self) -> &'static [Control] {
        match self {
            Page::Landing => &[Control::LoginForm, Control::AdminLoginForm, Control::RegisterForm],
            Page::Register => &[Control::RegisterForm],
            Page::CitizenSubmit => &[Control::ComplaintForm, Control::LogoutButton],
            Page::CitizenStatus => &[Control::LogoutButton],
            Page::AdminDashboard => &[Control::StatusSelect, Control::LogoutButton],
        }
    }

    pub fn has_control(&self, control: Control) -> bool {
        self.controls().contains(&control)
    }

    /// Elements the page renders into besides its controls.
    pub fn regions(&self) -> &'static [&'static str] {
        match self {
            Page::CitizenStatus => &[elements::CITIZEN_COMPLAINT_LIST],
            Page::AdminDashboard => &[
                elements::PENDING_COUNT,
                elements::IN_PROGRESS_COUNT,
                elements::RESOLVED_COUNT,
                elements::TOTAL_COUNT,
                elements::ADMIN_COMPLAINT_LIST,
            ],
            _ => &[],
        }
    }

    /// Landing page for a freshly authenticated role.
    pub fn home_for(role: Role) -> Page {
        match role {
            Role::Admin => Page::AdminDashboard,
            Role::Citizen => Page::CitizenSubmit,
        }
    }

    /// Resolve a navigation path such as `/admin_dashboard.html`.
    /// Unknown paths and the site root resolve to the landing page.
    pub fn from_path(path: &str) -> Page {
        let file = path
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .rsplit('/')
            .next()
            .unwrap_or("");
        Page::ALL
            .into_iter()
            .find(|page| page.file_name() == file)
            .unwrap_or(Page::Landing)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.slug() == s || page.file_name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Page::ALL.iter().map(|p| p.slug()).collect();
                format!("unknown page '{}'. Use: {}", s, names.join(", "))
            })
    }
}
