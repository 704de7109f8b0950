//! User-facing capabilities: notices, confirmation, navigation and the
//! document the views render into.

use async_trait::async_trait;
use minijinja::HtmlEscape;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::page::{elements, Page};
use crate::session::SessionStore;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Non-blocking feedback channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a notice. Must not wait for acknowledgement.
    fn notify(&self, notice: Notice);

    /// Ask the user to confirm an action.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Full-page navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, page: Page);
}

/// Element-addressed document the views render into.
pub trait Document: Send + Sync {
    /// Replace the document with the empty markup of `page`.
    fn open(&self, page: Page);

    fn has_element(&self, id: &str) -> bool;

    /// Replace the element's markup. Ignored if the element is absent.
    fn set_inner_html(&self, id: &str, html: &str);

    /// Replace the element's text. Ignored if the element is absent.
    fn set_text(&self, id: &str, text: &str);

    fn inner_html(&self, id: &str) -> Option<String>;
}

/// In-memory document holding one entry per element of the current page.
#[derive(Debug, Default)]
pub struct HtmlDocument {
    page: RwLock<Option<Page>>,
    elements: RwLock<HashMap<String, String>>,
}

impl HtmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Option<Page> {
        *self.page.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Serialize the rendered regions of the current page.
    pub fn to_html(&self) -> String {
        let Some(page) = self.page() else {
            return String::new();
        };
        let slots = self.elements.read().unwrap_or_else(|e| e.into_inner());
        let mut out = format!("<!-- {} -->\n", page.file_name());
        for region in page.regions() {
            let content = slots.get(*region).map(String::as_str).unwrap_or("");
            if *region == elements::ADMIN_COMPLAINT_LIST || *region == elements::CITIZEN_COMPLAINT_LIST
            {
                out.push_str(&format!("<tbody id=\"{}\">\n{}</tbody>\n", region, content));
            } else {
                out.push_str(&format!("<span id=\"{}\">{}</span>\n", region, content));
            }
        }
        out
    }
}

impl Document for HtmlDocument {
    fn open(&self, page: Page) {
        let mut slots = HashMap::new();
        for control in page.controls() {
            slots.insert(control.element_id().to_string(), String::new());
        }
        for region in page.regions() {
            slots.insert(region.to_string(), String::new());
        }
        *self.elements.write().unwrap_or_else(|e| e.into_inner()) = slots;
        *self.page.write().unwrap_or_else(|e| e.into_inner()) = Some(page);
    }

    fn has_element(&self, id: &str) -> bool {
        self.elements
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    fn set_inner_html(&self, id: &str, html: &str) {
        let mut slots = self.elements.write().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = slots.get_mut(id) {
            *slot = html.to_string();
        } else {
            tracing::debug!(element = id, "Element not on page, skipping render");
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        self.set_inner_html(id, &HtmlEscape(text).to_string());
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.elements
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }
}

/// The shared capabilities every flow runs against.
#[derive(Clone)]
pub struct Capabilities {
    pub store: Arc<dyn SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl Capabilities {
    pub fn new(
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            notifier,
            navigator,
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_load_declares_page_elements() {
        let doc = HtmlDocument::new();
        doc.open(Page::AdminDashboard);

        assert!(doc.has_element(elements::TOTAL_COUNT));
        assert!(doc.has_element("logout-button"));
        assert!(!doc.has_element(elements::CITIZEN_COMPLAINT_LIST));
    }

    #[test]
    fn test_writes_to_absent_elements_are_ignored() {
        let doc = HtmlDocument::new();
        doc.open(Page::Landing);
        doc.set_inner_html(elements::CITIZEN_COMPLAINT_LIST, "<tr></tr>");
        assert!(doc.inner_html(elements::CITIZEN_COMPLAINT_LIST).is_none());
    }

    #[test]
    fn test_set_text_escapes_markup() {
        let doc = HtmlDocument::new();
        doc.open(Page::AdminDashboard);
        doc.set_text(elements::TOTAL_COUNT, "<b>3</b>");
        assert_eq!(doc.inner_html(elements::TOTAL_COUNT).unwrap(), "&lt;b&gt;3&lt;&#x2f;b&gt;");
    }

    #[test]
    fn test_to_html_lists_regions() {
        let doc = HtmlDocument::new();
        doc.open(Page::CitizenStatus);
        doc.set_inner_html(elements::CITIZEN_COMPLAINT_LIST, "<tr><td>x</td></tr>\n");
        let html = doc.to_html();
        assert!(html.starts_with("<!-- citizen_status.html -->"));
        assert!(html.contains("<tbody id=\"citizenComplaintList\">\n<tr><td>x</td></tr>\n</tbody>"));
    }
}
