//! Typed, serializable references to persisted resources.
//!
//! An [`EntityKey`] is what a deferred task carries instead of the resource
//! itself. It stringifies to `<Kind>:<repo id>`, e.g.
//! `Host:01890a5d-ac96-774b-bcce-b302099a8057`. The handler that later
//! receives the task is the only party that parses it back.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use crate::error::DomainError;
use crate::id::RepoId;
use crate::resource::EppResource;

/// Key of a resource of type `T`.
///
/// Two keys for the same resource always stringify identically.
pub struct EntityKey<T> {
    repo_id: RepoId,
    _kind: PhantomData<fn() -> T>,
}

impl<T: EppResource> EntityKey<T> {
    pub fn new(repo_id: RepoId) -> Self {
        Self {
            repo_id,
            _kind: PhantomData,
        }
    }

    pub fn repo_id(&self) -> RepoId {
        self.repo_id
    }

    pub fn kind(&self) -> &'static str {
        T::KIND
    }

    /// Opaque string form used as a task parameter.
    pub fn stringify(&self) -> String {
        format!("{}:{}", T::KIND, self.repo_id)
    }

    /// Parse a stringified key, rejecting keys of another kind.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| DomainError::invalid_id(format!("malformed entity key: {s}")))?;
        if kind != T::KIND {
            return Err(DomainError::invalid_id(format!(
                "expected {} key, got {kind}",
                T::KIND
            )));
        }
        Ok(Self::new(id.parse()?))
    }
}

impl<T> Clone for EntityKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EntityKey<T> {}

impl<T> PartialEq for EntityKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.repo_id == other.repo_id
    }
}

impl<T> Eq for EntityKey<T> {}

impl<T> Hash for EntityKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.repo_id.hash(state);
    }
}

impl<T: EppResource> fmt::Debug for EntityKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey<{}>({})", T::KIND, self.repo_id)
    }
}

impl<T: EppResource> fmt::Display for EntityKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}
