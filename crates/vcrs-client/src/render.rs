//! Table and summary rendering for the status and dashboard pages.
//!
//! Every render replaces the target element's contents wholesale.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::error::ClientResult;
use crate::models::{Complaint, ComplaintStatus};
use crate::page::elements;
use crate::ui::Document;

const CITIZEN_ROWS: &str = r#"{% for c in complaints %}
<tr>
  <td>{{ c.short_id }}</td>
  <td>{{ c.title }}</td>
  <td>{{ c.category }}</td>
  <td>{{ c.created|safe }}</td>
  <td><span class="status-tag {{ c.status_class }}">{{ c.status }}</span></td>
</tr>
{% endfor %}"#;

const ADMIN_ROWS: &str = r#"{% for c in complaints %}
<tr>
  <td>{{ c.title }}</td>
  <td>{% if c.citizen %}{{ c.citizen }}{% else %}N/A{% endif %}</td>
  <td>{{ c.category }}</td>
  <td>{{ c.location }}</td>
  <td>{% if c.image_url %}<a href="{{ c.image_url }}" target="_blank">View Image</a>{% else %}N/A{% endif %}</td>
  <td>
    <select name="status" data-complaint-id="{{ c.id }}" class="{{ c.status_class }}">
{% for s in statuses %}
      <option value="{{ s }}"{% if s == c.status %} selected{% endif %}>{{ s }}</option>
{% endfor %}
    </select>
  </td>
  <td>{{ c.created|safe }}</td>
</tr>
{% endfor %}"#;

/// Per-status totals shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub total: usize,
}

impl AdminCounts {
    pub fn from_complaints(complaints: &[Complaint]) -> Self {
        let count = |status: ComplaintStatus| complaints.iter().filter(|c| c.status == status).count();
        Self {
            pending: count(ComplaintStatus::Pending),
            in_progress: count(ComplaintStatus::InProgress),
            resolved: count(ComplaintStatus::Resolved),
            total: complaints.len(),
        }
    }
}

#[derive(Serialize)]
struct CitizenRow {
    short_id: String,
    title: String,
    category: String,
    created: String,
    status: &'static str,
    status_class: String,
}

#[derive(Serialize)]
struct AdminRow {
    id: String,
    title: String,
    citizen: Option<String>,
    category: String,
    location: String,
    image_url: Option<String>,
    status: &'static str,
    status_class: String,
    created: String,
}

/// Renders complaint collections into table rows.
///
/// Templates carry an `.html` name so every field is auto-escaped.
pub struct ViewRenderer {
    env: Environment<'static>,
    api_base_url: String,
}

impl ViewRenderer {
    /// `api_base_url` prefixes image links in the admin table.
    pub fn new(api_base_url: &str) -> ClientResult<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template("citizen_rows.html", CITIZEN_ROWS)?;
        env.add_template("admin_rows.html", ADMIN_ROWS)?;

        Ok(Self {
            env,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn citizen_rows(&self, complaints: &[Complaint]) -> ClientResult<String> {
        let rows: Vec<CitizenRow> = complaints
            .iter()
            .map(|c| CitizenRow {
                short_id: c.short_id(),
                title: c.title.clone(),
                category: c.category.clone(),
                created: format_date(c),
                status: c.status.as_str(),
                status_class: c.status.css_class(),
            })
            .collect();

        let tmpl = self.env.get_template("citizen_rows.html")?;
        Ok(tmpl.render(context! { complaints => rows })?)
    }

    pub fn admin_rows(&self, complaints: &[Complaint]) -> ClientResult<String> {
        let rows: Vec<AdminRow> = complaints
            .iter()
            .map(|c| AdminRow {
                id: c.id.clone(),
                title: c.title.clone(),
                citizen: c.citizen().map(|p| format!("{} ({})", p.name, p.email)),
                category: c.category.clone(),
                location: c.location.clone(),
                image_url: c
                    .image_path
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .map(|p| format!("{}/{}", self.api_base_url, p)),
                status: c.status.as_str(),
                status_class: c.status.css_class(),
                created: format_date(c),
            })
            .collect();
        let statuses: Vec<&str> = ComplaintStatus::ALL.iter().map(|s| s.as_str()).collect();

        let tmpl = self.env.get_template("admin_rows.html")?;
        Ok(tmpl.render(context! { complaints => rows, statuses => statuses })?)
    }

    /// Replace the citizen table body. No-op when the page has no table.
    pub fn render_citizen_table(&self, doc: &dyn Document, complaints: &[Complaint]) -> ClientResult<()> {
        if !doc.has_element(elements::CITIZEN_COMPLAINT_LIST) {
            return Ok(());
        }
        let html = self.citizen_rows(complaints)?;
        doc.set_inner_html(elements::CITIZEN_COMPLAINT_LIST, &html);
        Ok(())
    }

    /// Replace the admin table body. No-op when the page has no table.
    pub fn render_admin_table(&self, doc: &dyn Document, complaints: &[Complaint]) -> ClientResult<()> {
        if !doc.has_element(elements::ADMIN_COMPLAINT_LIST) {
            return Ok(());
        }
        let html = self.admin_rows(complaints)?;
        doc.set_inner_html(elements::ADMIN_COMPLAINT_LIST, &html);
        Ok(())
    }

    pub fn render_admin_counts(&self, doc: &dyn Document, complaints: &[Complaint]) -> AdminCounts {
        let counts = AdminCounts::from_complaints(complaints);
        doc.set_text(elements::PENDING_COUNT, &counts.pending.to_string());
        doc.set_text(elements::IN_PROGRESS_COUNT, &counts.in_progress.to_string());
        doc.set_text(elements::RESOLVED_COUNT, &counts.resolved.to_string());
        doc.set_text(elements::TOTAL_COUNT, &counts.total.to_string());
        counts
    }
}

impl std::fmt::Debug for ViewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewRenderer")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// `M/D/YYYY`, UTC.
fn format_date(complaint: &Complaint) -> String {
    complaint.created_at.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::testing::complaint_json;
    use crate::ui::HtmlDocument;

    fn complaints(statuses: &[(&str, &str)]) -> Vec<Complaint> {
        statuses
            .iter()
            .map(|(id, status)| serde_json::from_value(complaint_json(id, status)).unwrap())
            .collect()
    }

    fn renderer() -> ViewRenderer {
        ViewRenderer::new("https://vcrs-api.onrender.com/api").unwrap()
    }

    #[test]
    fn test_citizen_row_fields() {
        let html = renderer()
            .citizen_rows(&complaints(&[("abcd1234", "In-Progress")]))
            .unwrap();

        assert!(html.contains("<td>1234</td>"));
        assert!(!html.contains("<td>abcd1234</td>"));
        assert!(html.contains("<td>Complaint abcd1234</td>"));
        assert!(html.contains("<td>3/12/2024</td>"));
        assert!(!html.contains("&#x2f;"));
        assert!(html.contains(r#"<span class="status-tag status-in-progress">In-Progress</span>"#));
        assert_eq!(html.matches("<tr>").count(), 1);
    }

    #[test]
    fn test_admin_row_placeholders() {
        let html = renderer()
            .admin_rows(&complaints(&[("c1", "Pending")]))
            .unwrap();

        assert_eq!(html.matches("<td>N/A</td>").count(), 2);
        assert!(html.contains(r#"data-complaint-id="c1""#));
        assert!(html.contains(r#"class="status-pending""#));
        assert!(html.contains(r#"<option value="Pending" selected>Pending</option>"#));
        assert!(html.contains(r#"<option value="Resolved">Resolved</option>"#));
    }

    #[test]
    fn test_admin_row_citizen_and_image() {
        let mut json = complaint_json("c2", "Resolved");
        json["imagePath"] = serde_json::json!("uploads/pump.jpg");
        json["citizenId"] = serde_json::json!({"name": "Asha", "email": "asha@example.com"});
        let complaint: Complaint = serde_json::from_value(json).unwrap();

        let html = renderer().admin_rows(&[complaint]).unwrap();

        assert!(html.contains("<td>Asha (asha@example.com)</td>"));
        assert!(html.contains(
            r#"<a href="https:&#x2f;&#x2f;vcrs-api.onrender.com&#x2f;api&#x2f;uploads&#x2f;pump.jpg" target="_blank">View Image</a>"#
        ));
        assert!(html.contains(r#"<option value="Resolved" selected>Resolved</option>"#));
    }

    #[test]
    fn test_markup_in_fields_is_escaped() {
        let mut json = complaint_json("c3", "Pending");
        json["title"] = serde_json::json!("<script>alert(1)</script>");
        let complaint: Complaint = serde_json::from_value(json).unwrap();

        let html = renderer().citizen_rows(std::slice::from_ref(&complaint)).unwrap();
        assert!(html.contains("<td>&lt;script&gt;alert(1)&lt;&#x2f;script&gt;</td>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_admin_counts() {
        let list = complaints(&[
            ("a", "Pending"),
            ("b", "Pending"),
            ("c", "In-Progress"),
            ("d", "Resolved"),
            ("e", "Resolved"),
            ("f", "Resolved"),
        ]);

        let counts = AdminCounts::from_complaints(&list);
        assert_eq!(
            counts,
            AdminCounts {
                pending: 2,
                in_progress: 1,
                resolved: 3,
                total: 6,
            }
        );

        let doc = HtmlDocument::new();
        doc.open(Page::AdminDashboard);
        renderer().render_admin_counts(&doc, &list);
        assert_eq!(doc.inner_html(elements::PENDING_COUNT).unwrap(), "2");
        assert_eq!(doc.inner_html(elements::IN_PROGRESS_COUNT).unwrap(), "1");
        assert_eq!(doc.inner_html(elements::RESOLVED_COUNT).unwrap(), "3");
        assert_eq!(doc.inner_html(elements::TOTAL_COUNT).unwrap(), "6");
    }

    #[test]
    fn test_render_is_full_replace() {
        let list = complaints(&[("abcd1234", "Pending"), ("efgh5678", "Resolved")]);
        let doc = HtmlDocument::new();
        doc.open(Page::CitizenStatus);
        let renderer = renderer();

        renderer.render_citizen_table(&doc, &list).unwrap();
        let first = doc.inner_html(elements::CITIZEN_COMPLAINT_LIST).unwrap();
        renderer.render_citizen_table(&doc, &list).unwrap();
        let second = doc.inner_html(elements::CITIZEN_COMPLAINT_LIST).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches("<tr>").count(), 2);
    }

    #[test]
    fn test_empty_collection_clears_table() {
        let doc = HtmlDocument::new();
        doc.open(Page::AdminDashboard);
        let renderer = renderer();

        renderer
            .render_admin_table(&doc, &complaints(&[("c1", "Pending")]))
            .unwrap();
        renderer.render_admin_table(&doc, &[]).unwrap();

        assert_eq!(doc.inner_html(elements::ADMIN_COMPLAINT_LIST).unwrap(), "");
    }

    #[test]
    fn test_table_missing_from_page_is_skipped() {
        let doc = HtmlDocument::new();
        doc.open(Page::CitizenSubmit);
        renderer()
            .render_citizen_table(&doc, &complaints(&[("c1", "Pending")]))
            .unwrap();
        assert!(doc.inner_html(elements::CITIZEN_COMPLAINT_LIST).is_none());
    }
}
