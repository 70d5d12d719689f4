//! Breadcrumb trail for browse pages.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub title: String,
    #[serde(default)]
    pub to: Option<String>,
}

impl Crumb {
    pub fn new(title: impl Into<String>, to: Option<&str>) -> Self {
        Self {
            title: title.into(),
            to: to.map(String::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrailItem {
    Link { title: String, to: String },
    Separator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Trail {
    pub items: Vec<TrailItem>,
}

/// Renders `crumbs` into a trail. `None` entries and crumbs without a
/// target contribute nothing; separators only sit between two links.
pub fn render(crumbs: &[Option<Crumb>]) -> Trail {
    let mut items = Vec::new();

    for crumb in crumbs.iter().flatten() {
        let Some(to) = crumb.to.as_deref().filter(|to| !to.is_empty()) else {
            continue;
        };
        if !items.is_empty() {
            items.push(TrailItem::Separator);
        }
        items.push(TrailItem::Link {
            title: crumb.title.clone(),
            to: to.to_string(),
        });
    }

    Trail { items }
}

impl Trail {
    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().filter_map(|item| match item {
            TrailItem::Link { title, to } => Some((title.as_str(), to.as_str())),
            TrailItem::Separator => None,
        })
    }

    pub fn separators(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, TrailItem::Separator))
            .count()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<nav class=\"crumbs\">");
        for item in &self.items {
            match item {
                TrailItem::Link { title, to } => {
                    html.push_str(&format!(
                        "<a href=\"{}\"><h5>{}</h5></a>",
                        escape(to),
                        escape(title)
                    ));
                }
                TrailItem::Separator => {
                    html.push_str("<span class=\"separator\">&rsaquo;</span>");
                }
            }
        }
        html.push_str("</nav>");
        html
    }
}

impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            match item {
                TrailItem::Link { title, .. } => write!(f, "{}", title.to_uppercase())?,
                TrailItem::Separator => write!(f, " > ")?,
            }
        }
        Ok(())
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
