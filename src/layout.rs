//! Static page structure. Nothing here depends on the data.

use serde::Serialize;

use crate::dashboard::{ChartSlot, FILTER_DEFAULT, FILTER_OPTIONS, KPIS, ROWS};

pub const PAGE_TITLE: &str = "Stroke patients at a glance";
pub const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
pub const DASHBOARD_SCRIPT: &str = "/assets/dashboard.js";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element {
        tag: &'static str,
        id: Option<String>,
        class: Option<String>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    Graph {
        id: String,
    },
    Dropdown {
        id: String,
        options: Vec<String>,
        value: String,
    },
}

impl Node {
    pub fn element(tag: &'static str, class: Option<&str>, children: Vec<Node>) -> Self {
        Node::Element {
            tag,
            id: None,
            class: class.map(str::to_string),
            children,
        }
    }

    pub fn text(text: &str) -> Self {
        Node::Text {
            text: text.to_string(),
        }
    }

    fn with_id(self, new_id: &str) -> Self {
        match self {
            Node::Element {
                tag,
                class,
                children,
                ..
            } => Node::Element {
                tag,
                id: Some(new_id.to_string()),
                class,
                children,
            },
            other => other,
        }
    }

    /// Ids of every graph and dropdown in the subtree, in document order.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Element { id, children, .. } => {
                if let Some(id) = id {
                    out.push(id);
                }
                for child in children {
                    child.collect_ids(out);
                }
            }
            Node::Graph { id } | Node::Dropdown { id, .. } => out.push(id),
            Node::Text { .. } => {}
        }
    }

    pub fn render(&self, out: &mut String) {
        match self {
            Node::Element {
                tag,
                id,
                class,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                if let Some(id) = id {
                    push_attr(out, "id", id);
                }
                if let Some(class) = class {
                    push_attr(out, "class", class);
                }
                out.push('>');
                for child in children {
                    child.render(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Node::Text { text } => out.push_str(&escape(text)),
            Node::Graph { id } => {
                out.push_str("<div");
                push_attr(out, "id", id);
                out.push_str(" class=\"graph\" data-output></div>");
            }
            Node::Dropdown { id, options, value } => {
                out.push_str("<select");
                push_attr(out, "id", id);
                out.push_str(" class=\"dropdown\" data-control>");
                for option in options {
                    out.push_str("<option");
                    push_attr(out, "value", option);
                    if option == value {
                        out.push_str(" selected");
                    }
                    out.push('>');
                    out.push_str(&escape(option));
                    out.push_str("</option>");
                }
                out.push_str("</select>");
            }
        }
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn kpi_card(title: &str, id: &str, variant: &str) -> Node {
    Node::element(
        "div",
        Some(format!("kpi-card {}", variant).as_str()),
        vec![
            Node::element("div", Some("kpi-title"), vec![Node::text(title)]),
            Node::element("div", Some("kpi-value"), vec![]).with_id(id),
        ],
    )
}

fn chart_cell(slot: &ChartSlot) -> Node {
    let mut children = vec![Node::Graph {
        id: slot.output.to_string(),
    }];
    if let Some(filter) = slot.filter {
        children.push(Node::element(
            "div",
            Some("filter"),
            vec![
                Node::element("label", Some("filter-label"), vec![Node::text("Stroke:")]),
                Node::Dropdown {
                    id: filter.to_string(),
                    options: FILTER_OPTIONS.iter().map(|o| o.to_string()).collect(),
                    value: FILTER_DEFAULT.to_string(),
                },
            ],
        ));
    }
    children.push(Node::element("div", Some("chart-error"), vec![]));
    Node::element("div", Some("chart-cell"), children)
}

/// Title, KPI cards and the chart grid.
pub fn dashboard_layout() -> Node {
    let mut children = vec![
        Node::element("h1", Some("page-title"), vec![Node::text(PAGE_TITLE)]),
        Node::element(
            "div",
            Some("kpi-container"),
            KPIS.iter()
                .map(|(title, id, variant)| kpi_card(title, id, variant))
                .collect(),
        ),
    ];
    for (i, row) in ROWS.iter().enumerate() {
        children.push(Node::element(
            "div",
            Some(format!("chart-row row-{}", i + 1).as_str()),
            row.iter().map(chart_cell).collect(),
        ));
    }
    Node::element("div", Some("dashboard"), children)
}

fn document(body: &Node, scripts: &[&str]) -> String {
    let mut html = String::from("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>");
    html.push_str(&escape(PAGE_TITLE));
    html.push_str("</title><link rel=\"stylesheet\" href=\"/assets/style.css\">");
    html.push_str("<script src=\"");
    html.push_str(PLOTLY_SRC);
    html.push_str("\"></script></head><body>");
    body.render(&mut html);
    for src in scripts {
        html.push_str("<script src=\"");
        html.push_str(src);
        html.push_str("\"></script>");
    }
    html.push_str("</body></html>");
    html
}

pub fn dashboard_page() -> String {
    document(&dashboard_layout(), &[DASHBOARD_SCRIPT])
}

/// Page shown instead of the dashboard when the dataset failed to load.
pub fn error_page(message: &str) -> String {
    let body = Node::element(
        "div",
        Some("dashboard"),
        vec![
            Node::element("h1", Some("page-title"), vec![Node::text(PAGE_TITLE)]),
            Node::element(
                "div",
                Some("error-banner"),
                vec![
                    Node::element("strong", None, vec![Node::text("Data unavailable")]),
                    Node::element("p", None, vec![Node::text(message)]),
                ],
            ),
        ],
    );
    // No outputs to update, so no page script.
    document(&body, &[])
}
