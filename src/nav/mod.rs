//! Navigation bar with current-page highlighting.

use crate::utils::html;

/// Page file name used when the request path has no final segment.
pub const DEFAULT_PAGE: &str = "index.html";

/// Links of the console navigation bar as `(href, label)`.
pub const CONSOLE_LINKS: &[(&str, &str)] = &[
    ("index.html", "Users & Keys"),
    ("holds.html", "Legal Holds & Backups"),
    ("reports.html", "Reports"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub label: String,
    pub active: bool,
}

/// Last path segment of `href`, ignoring any query string or fragment.
pub fn file_name(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.rsplit('/').next().unwrap_or(path)
}

/// File name of the page being viewed. An empty final segment (`/`,
/// `/console/`) means the index page.
pub fn current_page(path: &str) -> &str {
    match file_name(path) {
        "" => DEFAULT_PAGE,
        name => name,
    }
}

/// Mark every link whose file name matches the current page as active.
pub fn highlight(path: &str, links: &[(&str, &str)]) -> Vec<NavLink> {
    let here = current_page(path);
    links
        .iter()
        .map(|(href, label)| NavLink {
            href: href.to_string(),
            label: label.to_string(),
            active: file_name(href) == here,
        })
        .collect()
}

/// Render links as the console `<nav>` element.
pub fn render(links: &[NavLink]) -> String {
    let mut out = String::from(r#"<nav class="nav">"#);
    for link in links {
        let class = if link.active { r#" class="active""# } else { "" };
        out.push_str(&format!(
            r#"<a href="{}"{}>{}</a>"#,
            html::escape(&link.href),
            class,
            html::escape(&link.label)
        ));
    }
    out.push_str("</nav>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(links: &[NavLink]) -> Vec<&str> {
        links
            .iter()
            .filter(|l| l.active)
            .map(|l| l.href.as_str())
            .collect()
    }

    #[test]
    fn highlights_only_matching_page() {
        let links = highlight(
            "/console/reports.html",
            &[("index.html", "Home"), ("reports.html", "Reports")],
        );
        assert_eq!(active(&links), vec!["reports.html"]);
    }

    #[test]
    fn root_path_is_index() {
        assert_eq!(current_page("/"), "index.html");
        assert_eq!(current_page(""), "index.html");
        assert_eq!(active(&highlight("/", CONSOLE_LINKS)), vec!["index.html"]);
    }

    #[test]
    fn href_directories_and_queries_are_ignored() {
        assert_eq!(file_name("/static/holds.html?user=3"), "holds.html");
        assert_eq!(current_page("/reports.html#metrics"), "reports.html");
        let links = highlight("/holds.html", &[("/pages/holds.html", "Holds")]);
        assert_eq!(active(&links), vec!["/pages/holds.html"]);
    }

    #[test]
    fn unknown_page_highlights_nothing() {
        assert!(active(&highlight("/missing.html", CONSOLE_LINKS)).is_empty());
    }

    #[test]
    fn render_marks_active_link() {
        let html = render(&highlight("/holds.html", CONSOLE_LINKS));
        assert!(html.contains(r#"<a href="holds.html" class="active">"#));
        assert!(html.contains(r#"<a href="index.html">Users &amp; Keys</a>"#));
    }
}
