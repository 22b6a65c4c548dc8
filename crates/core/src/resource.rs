//! EPP resources addressable from deferred tasks.

use serde::{Deserialize, Serialize};

use crate::id::RepoId;
use crate::key::EntityKey;

/// A persisted EPP resource (contact, host, ...).
///
/// Only the identity needed to address the resource from a task is modelled
/// here; everything else about the resource lives with its owning module.
pub trait EppResource {
    /// Stable kind tag embedded in stringified keys.
    const KIND: &'static str;

    /// Repository id of this resource.
    fn repo_id(&self) -> RepoId;

    /// Build the typed key referring to this resource.
    fn create_key(&self) -> EntityKey<Self>
    where
        Self: Sized,
    {
        EntityKey::new(self.repo_id())
    }
}

/// A name server host. Hosts can be renamed, which triggers a DNS refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    repo_id: RepoId,
    host_name: String,
}

impl Host {
    pub fn new(repo_id: RepoId, host_name: impl Into<String>) -> Self {
        Self {
            repo_id,
            host_name: host_name.into(),
        }
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }
}

impl EppResource for Host {
    const KIND: &'static str = "Host";

    fn repo_id(&self) -> RepoId {
        self.repo_id
    }
}

/// A registrant/admin/tech contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    repo_id: RepoId,
    contact_id: String,
}

impl Contact {
    pub fn new(repo_id: RepoId, contact_id: impl Into<String>) -> Self {
        Self {
            repo_id,
            contact_id: contact_id.into(),
        }
    }

    pub fn contact_id(&self) -> &str {
        &self.contact_id
    }
}

impl EppResource for Contact {
    const KIND: &'static str = "Contact";

    fn repo_id(&self) -> RepoId {
        self.repo_id
    }
}
