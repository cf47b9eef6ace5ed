//! Content blocks carried by tool results, prompts and sampling messages.

use serde::{Deserialize, Serialize};

use super::resource::ResourceContents;

/// The role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User/human participant.
    User,
    /// AI assistant participant.
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A polymorphic content block, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Base64-encoded image.
    Image {
        /// Base64 payload.
        data: String,
        /// MIME type such as "image/png".
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    /// An embedded resource.
    Resource {
        /// The embedded contents.
        resource: ResourceContents,
    },
}

impl Content {
    /// Create text content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create image content from base64 data.
    #[must_use]
    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Image {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Embed resource contents.
    #[must_use]
    pub const fn resource(resource: ResourceContents) -> Self {
        Self::Resource { resource }
    }

    /// Get the text if this is text content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_wire_tags() {
        let json = serde_json::to_value(Content::text("Test")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "text": "Test"}));

        let json = serde_json::to_value(Content::image("AAAA", "image/png")).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["mimeType"], "image/png");

        let embedded = Content::resource(ResourceContents::text("config://settings", "{}"));
        let json = serde_json::to_value(&embedded).unwrap();
        assert_eq!(json["resource"]["uri"], "config://settings");
        assert_eq!(embedded.as_text(), None);
    }
}
