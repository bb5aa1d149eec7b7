use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Post entity - a single blog post.
///
/// Serialized with camelCase keys, which is also the layout of every entry in
/// the published collection document. Older documents may carry posts without
/// `id` or `tags`: those read with an empty tag list and a content-derived id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PostRecord")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Namespace for ids derived from legacy entries.
const LEGACY_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_3c52_9d4e_4b7a_8e21_07c4_d5b9_f013);

/// Id for a stored entry that was written without one.
///
/// Derived from the entry's content so every read of the same document yields
/// the same id. The entry keeps it once the collection is published again.
fn legacy_id(title: &str, content: &str, created_at: &DateTime<Utc>) -> Uuid {
    let name = format!("{}\n{}\n{}", created_at.to_rfc3339(), title, content);
    Uuid::new_v5(&LEGACY_NAMESPACE, name.as_bytes())
}

/// Stored layout of a post, tolerant of legacy entries.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord {
    #[serde(default)]
    id: Option<Uuid>,
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        let id = record
            .id
            .unwrap_or_else(|| legacy_id(&record.title, &record.content, &record.created_at));

        Self {
            id,
            title: record.title,
            content: record.content,
            tags: record.tags,
            created_at: record.created_at,
        }
    }
}

impl Post {
    /// Create a new post with a generated id and the current timestamp.
    ///
    /// Title and content must both be non-empty.
    pub fn create(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let content = content.into();

        if title.is_empty() || content.is_empty() {
            return Err(DomainError::Validation(
                "title & content required".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            content,
            tags,
            created_at: Utc::now(),
        })
    }

    /// Whether this post carries the given tag (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Overwrite the mutable fields present in `changes`.
    ///
    /// `id` and `created_at` are never touched. Unlike [`Post::create`], the
    /// new values are not checked for emptiness.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
    }
}

/// Partial update for a post. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_unique_ids() {
        let a = Post::create("A", "B", vec![]).unwrap();
        let b = Post::create("A", "B", vec![]).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        assert!(matches!(
            Post::create("", "C", vec![]),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Post::create("T", "", vec![]),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_create_accepts_whitespace_text() {
        let post = Post::create("   ", " ", vec![]).unwrap();
        assert_eq!(post.title, "   ");
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut post = Post::create("A", "B", vec!["x".to_string()]).unwrap();
        let (id, created_at) = (post.id, post.created_at);

        post.apply(PostChanges {
            title: Some("A2".to_string()),
            content: None,
            tags: Some(vec![]),
        });

        assert_eq!(post.id, id);
        assert_eq!(post.created_at, created_at);
        assert_eq!(post.title, "A2");
        assert_eq!(post.content, "B");
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_apply_does_not_validate() {
        let mut post = Post::create("A", "B", vec![]).unwrap();
        post.apply(PostChanges {
            title: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(post.title, "");
    }

    #[test]
    fn test_has_tag_is_exact() {
        let post = Post::create("A", "B", vec!["rust".to_string()]).unwrap();
        assert!(post.has_tag("rust"));
        assert!(!post.has_tag("Rust"));
        assert!(!post.has_tag("rus"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let post = Post::create("A", "B", vec!["x".to_string()]).unwrap();
        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
        assert_eq!(value["tags"], serde_json::json!(["x"]));
    }

    #[test]
    fn test_reads_legacy_entry_without_id_or_tags() {
        let raw = r#"{"title":"Old","content":"Body","createdAt":"2024-05-01T10:00:00.000Z"}"#;
        let post: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(post.title, "Old");
        assert!(post.tags.is_empty());
        assert!(!post.id.is_nil());
    }

    #[test]
    fn test_legacy_id_is_stable_across_reads() {
        let raw = r#"{"title":"Old","content":"Body","createdAt":"2024-05-01T10:00:00.000Z"}"#;
        let first: Post = serde_json::from_str(raw).unwrap();
        let second: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(first.id, second.id);

        let other: Post = serde_json::from_str(
            r#"{"title":"Other","content":"Body","createdAt":"2024-05-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_ne!(first.id, other.id);
    }

    #[test]
    fn test_stored_id_wins_over_legacy_id() {
        let post = Post::create("A", "B", vec![]).unwrap();
        let raw = serde_json::to_string(&post).unwrap();
        let read: Post = serde_json::from_str(&raw).unwrap();
        assert_eq!(read, post);
    }
}
