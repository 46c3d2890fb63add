//! Embed surface for dropping a widget into an operator's site.
//!
//! Generates the iframe snippet pointing at
//! `{base_url}/embed?widget={type}&key={embed_key}` and defines the
//! `postMessage` payload the embedded page sends so the host can resize the
//! iframe to fit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which widget skin an embed shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    /// Calendar skin
    Calendar,
    /// List skin
    List,
    /// Quick-book skin
    QuickBook,
}

impl WidgetKind {
    /// The `widget` query parameter value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::List => "list",
            Self::QuickBook => "quick-book",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Publishable key identifying the organization's embed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedKey(String);

impl EmbedKey {
    /// Creates a new `EmbedKey`
    #[must_use]
    pub const fn new(key: String) -> Self {
        Self(key)
    }

    /// Returns the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmbedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The URL an embed iframe loads
#[must_use]
pub fn embed_url(base_url: &str, kind: WidgetKind, key: &EmbedKey) -> String {
    format!(
        "{}/embed?widget={}&key={}",
        base_url.trim_end_matches('/'),
        kind.as_str(),
        key
    )
}

/// The HTML snippet an operator pastes into their site
///
/// The iframe starts at a sensible height and then follows the embedded
/// page's [`ResizeMessage`]s.
#[must_use]
pub fn embed_snippet(base_url: &str, kind: WidgetKind, key: &EmbedKey) -> String {
    let url = embed_url(base_url, kind, key);
    format!(
        r#"<iframe src="{url}" style="width:100%;border:none;" height="700" title="Book now"></iframe>
<script>
  window.addEventListener("message", function (event) {{
    if (event.data && event.data.type === "resize-iframe") {{
      var frame = document.querySelector('iframe[src="{url}"]');
      if (frame) frame.height = event.data.height;
    }}
  }});
</script>"#
    )
}

/// `postMessage` payload the embedded page sends to resize its iframe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeMessage {
    /// Message discriminator; always `resize-iframe`
    #[serde(rename = "type")]
    pub message_type: ResizeMessageType,
    /// Desired iframe height in pixels
    pub height: u32,
}

/// The single admissible `type` value of a [`ResizeMessage`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeMessageType {
    /// `resize-iframe`
    #[default]
    #[serde(rename = "resize-iframe")]
    ResizeIframe,
}

impl ResizeMessage {
    /// Creates a resize message for the given height
    #[must_use]
    pub const fn new(height: u32) -> Self {
        Self {
            message_type: ResizeMessageType::ResizeIframe,
            height,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn embed_url_has_widget_and_key_params() {
        let key = EmbedKey::new("pk_live_abc123".to_string());
        let url = embed_url("https://widgets.bookflow.app/", WidgetKind::QuickBook, &key);
        assert_eq!(
            url,
            "https://widgets.bookflow.app/embed?widget=quick-book&key=pk_live_abc123"
        );
    }

    #[test]
    fn snippet_contains_iframe_and_listener() {
        let key = EmbedKey::new("pk_live_abc123".to_string());
        let snippet = embed_snippet("https://widgets.bookflow.app", WidgetKind::Calendar, &key);
        assert!(snippet.contains("<iframe"));
        assert!(snippet.contains("widget=calendar"));
        assert!(snippet.contains("resize-iframe"));
    }

    #[test]
    fn resize_message_wire_shape() {
        let message = ResizeMessage::new(860);
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"type":"resize-iframe","height":860}"#);

        let parsed: ResizeMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }
}
