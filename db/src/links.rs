use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::{object_id::ResourceId, resources::Resource, Error, ResourceKind, Result};

/// An edge recording that a project realizes an idea.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceLink {
    pub idea_id: ResourceId,
    pub project_id: ResourceId,
}

/// The idea/project link graph, indexed from both ends.
#[derive(Debug, Default)]
pub struct ResourceGraph {
    by_idea: HashMap<ResourceId, BTreeSet<ResourceId>>,
    by_project: HashMap<ResourceId, BTreeSet<ResourceId>>,
}

impl ResourceGraph {
    pub fn link(&mut self, idea: &Resource, project: &Resource) -> Result<ResourceLink> {
        idea.expect_kind(ResourceKind::Idea)?;
        project.expect_kind(ResourceKind::Project)?;

        let link = ResourceLink {
            idea_id: idea.resource_id,
            project_id: project.resource_id,
        };

        if self.contains(link) {
            return Err(Error::DuplicateLink);
        }

        self.by_idea
            .entry(link.idea_id)
            .or_default()
            .insert(link.project_id);
        self.by_project
            .entry(link.project_id)
            .or_default()
            .insert(link.idea_id);

        Ok(link)
    }

    pub fn unlink(&mut self, idea_id: ResourceId, project_id: ResourceId) -> Result<ResourceLink> {
        let link = ResourceLink {
            idea_id,
            project_id,
        };

        if !self.contains(link) {
            return Err(Error::NotFound("link"));
        }

        remove_edge(&mut self.by_idea, idea_id, project_id);
        remove_edge(&mut self.by_project, project_id, idea_id);
        Ok(link)
    }

    pub fn contains(&self, link: ResourceLink) -> bool {
        self.by_idea
            .get(&link.idea_id)
            .map(|projects| projects.contains(&link.project_id))
            .unwrap_or(false)
    }

    pub fn projects_of(&self, idea_id: ResourceId) -> impl Iterator<Item = ResourceId> + '_ {
        self.by_idea.get(&idea_id).into_iter().flatten().copied()
    }

    pub fn ideas_of(&self, project_id: ResourceId) -> impl Iterator<Item = ResourceId> + '_ {
        self.by_project.get(&project_id).into_iter().flatten().copied()
    }

    /// The resources on the other end of every edge touching `resource`.
    pub fn neighbors(&self, resource: &Resource) -> Vec<ResourceId> {
        match resource.kind {
            ResourceKind::Idea => self.projects_of(resource.resource_id).collect(),
            ResourceKind::Project => self.ideas_of(resource.resource_id).collect(),
        }
    }

    /// Drop every edge touching `resource`, returning the removed edges.
    pub(crate) fn remove_all(&mut self, resource: &Resource) -> Vec<ResourceLink> {
        let id = resource.resource_id;
        match resource.kind {
            ResourceKind::Idea => {
                let projects = self.by_idea.remove(&id).unwrap_or_default();
                projects
                    .into_iter()
                    .map(|project_id| {
                        remove_edge(&mut self.by_project, project_id, id);
                        ResourceLink {
                            idea_id: id,
                            project_id,
                        }
                    })
                    .collect()
            }
            ResourceKind::Project => {
                let ideas = self.by_project.remove(&id).unwrap_or_default();
                ideas
                    .into_iter()
                    .map(|idea_id| {
                        remove_edge(&mut self.by_idea, idea_id, id);
                        ResourceLink {
                            idea_id,
                            project_id: id,
                        }
                    })
                    .collect()
            }
        }
    }
}

fn remove_edge(
    index: &mut HashMap<ResourceId, BTreeSet<ResourceId>>,
    from: ResourceId,
    to: ResourceId,
) {
    if let Some(targets) = index.get_mut(&from) {
        targets.remove(&to);
        if targets.is_empty() {
            index.remove(&from);
        }
    }
}
