//! RSS 2.0 feed of recently created public projects.

use crate::project::domain::Project;
use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;
use thiserror::Error;

const FEED_TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0">
  <channel>
    <title>{{ channel.title }}</title>
    <link>{{ channel.link }}</link>
    <description>{{ channel.description }}</description>
{%- for item in items %}
    <item>
      <title>{{ item.title }}</title>
      <link>{{ item.link }}</link>
      <guid isPermaLink="false">{{ item.guid }}</guid>
      <description>{{ item.description }}</description>
      <pubDate>{{ item.published }}</pubDate>
    </item>
{%- endfor %}
  </channel>
</rss>
"#;

/// Channel metadata for the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedChannel {
    /// Channel title.
    pub title: String,
    /// Site root URL, without a trailing slash.
    pub link: String,
    /// Channel description.
    pub description: String,
}

impl FeedChannel {
    /// Creates channel metadata.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into().trim_end_matches('/').to_owned(),
            description: description.into(),
        }
    }
}

/// Error raised while rendering the feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feed rendering failed: {0}")]
pub struct FeedError(pub String);

#[derive(Debug, Serialize)]
struct FeedItem {
    title: String,
    link: String,
    guid: String,
    description: String,
    published: String,
}

/// Renders `projects` as an RSS 2.0 document.
///
/// Private projects are skipped. Every value is entity-escaped, so `/` in
/// links renders as `&#x2f;`.
///
/// # Errors
///
/// Returns [`FeedError`] when the template fails to render.
pub fn render_project_feed(
    channel: &FeedChannel,
    projects: &[Project],
) -> Result<String, FeedError> {
    let items: Vec<FeedItem> = projects
        .iter()
        .filter(|project| project.is_public())
        .map(|project| FeedItem {
            title: project.name().as_str().to_owned(),
            link: format!("{}/projects/{}/", channel.link, project.id()),
            guid: project.id().to_string(),
            description: project.description().to_owned(),
            published: project.created_at().to_rfc2822(),
        })
        .collect();

    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.render_str(FEED_TEMPLATE, context! { channel => channel, items => items })
        .map_err(|err| FeedError(err.to_string()))
}
