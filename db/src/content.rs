//! Material attached to a single resource: notes and references on ideas, topics and
//! bookmarks on projects. Each kind lives in its own [Collection], keyed by the resource it
//! belongs to, and goes away with that resource.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    object_id::{BookmarkId, NoteId, ReferenceId, ResourceId, TopicId, UserId},
    Error, ReferenceKind, Result,
};

const DEFAULT_TOPIC_COLOR: &str = "#3B82F6";

/// Rows attached to resources, kept in insertion order per resource.
#[derive(Debug)]
pub struct Collection<T> {
    by_resource: HashMap<ResourceId, Vec<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            by_resource: HashMap::new(),
        }
    }
}

impl<T: Clone> Collection<T> {
    fn push(&mut self, resource_id: ResourceId, row: T) -> T {
        self.by_resource
            .entry(resource_id)
            .or_default()
            .push(row.clone());
        row
    }

    pub fn iter(&self, resource_id: ResourceId) -> impl Iterator<Item = &T> + '_ {
        self.by_resource
            .get(&resource_id)
            .into_iter()
            .flat_map(|rows| rows.iter())
    }

    /// Rows for a resource, newest first.
    pub fn list(&self, resource_id: ResourceId) -> Vec<T> {
        let mut rows = self.iter(resource_id).cloned().collect::<Vec<_>>();
        rows.reverse();
        rows
    }

    pub(crate) fn remove_all(&mut self, resource_id: ResourceId) -> usize {
        self.by_resource
            .remove(&resource_id)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }
}

fn required(value: String, field: &'static str) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(value)
    }
}

fn check_url(url: String) -> Result<String> {
    let url = url.trim().to_string();
    let valid = matches!(
        url.strip_prefix("https://").or_else(|| url.strip_prefix("http://")),
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace)
    );

    if valid {
        Ok(url)
    } else {
        Err(Error::InvalidUrl(url))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Note {
    #[serde(rename = "id")]
    pub note_id: NoteId,
    pub resource_id: ResourceId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

impl Note {
    pub(crate) fn build(resource_id: ResourceId, author_id: UserId, input: NewNote) -> Result<Self> {
        Ok(Note {
            note_id: NoteId::new(),
            resource_id,
            title: required(input.title, "title")?,
            content: required(input.content, "content")?,
            author_id,
            created_at: Utc::now(),
        })
    }
}

/// A link to outside material about an idea.
#[derive(Clone, Debug, Serialize)]
pub struct Reference {
    #[serde(rename = "id")]
    pub reference_id: ReferenceId,
    pub resource_id: ResourceId,
    pub title: String,
    pub url: String,
    pub description: String,
    pub kind: ReferenceKind,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReference {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: ReferenceKind,
}

impl Reference {
    pub(crate) fn build(
        resource_id: ResourceId,
        added_by: UserId,
        input: NewReference,
    ) -> Result<Self> {
        Ok(Reference {
            reference_id: ReferenceId::new(),
            resource_id,
            title: required(input.title, "title")?,
            url: check_url(input.url)?,
            description: input.description,
            kind: input.kind,
            added_by,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Topic {
    #[serde(rename = "id")]
    pub topic_id: TopicId,
    pub resource_id: ResourceId,
    pub title: String,
    pub description: String,
    pub color: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTopic {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub color: Option<String>,
}

impl Topic {
    pub(crate) fn build(
        resource_id: ResourceId,
        created_by: UserId,
        input: NewTopic,
    ) -> Result<Self> {
        Ok(Topic {
            topic_id: TopicId::new(),
            resource_id,
            title: required(input.title, "title")?,
            description: input.description,
            color: input
                .color
                .unwrap_or_else(|| DEFAULT_TOPIC_COLOR.to_string()),
            created_by,
            created_at: Utc::now(),
        })
    }
}

/// A link saved on a project.
#[derive(Clone, Debug, Serialize)]
pub struct Bookmark {
    #[serde(rename = "id")]
    pub bookmark_id: BookmarkId,
    pub resource_id: ResourceId,
    pub title: String,
    pub url: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl Bookmark {
    pub(crate) fn build(
        resource_id: ResourceId,
        created_by: UserId,
        input: NewBookmark,
    ) -> Result<Self> {
        Ok(Bookmark {
            bookmark_id: BookmarkId::new(),
            resource_id,
            title: required(input.title, "title")?,
            url: check_url(input.url)?,
            description: input.description,
            created_by,
            created_at: Utc::now(),
        })
    }
}

impl Collection<Topic> {
    /// Add a topic, keeping titles unique within a project.
    pub(crate) fn add_topic(&mut self, topic: Topic) -> Result<Topic> {
        if self
            .iter(topic.resource_id)
            .any(|existing| existing.title == topic.title)
        {
            return Err(Error::DuplicateTopic(topic.title));
        }

        Ok(self.push(topic.resource_id, topic))
    }
}

impl Collection<Note> {
    pub(crate) fn add(&mut self, note: Note) -> Note {
        self.push(note.resource_id, note)
    }
}

impl Collection<Reference> {
    pub(crate) fn add(&mut self, reference: Reference) -> Reference {
        self.push(reference.resource_id, reference)
    }
}

impl Collection<Bookmark> {
    pub(crate) fn add(&mut self, bookmark: Bookmark) -> Bookmark {
        self.push(bookmark.resource_id, bookmark)
    }
}
