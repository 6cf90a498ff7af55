//! Temporary public sharing of an external resource.
//!
//! [`AccessGrantWorkflow`] grants "anyone may read" access to one resource, returns its
//! shareable link and can revert the grant exactly once per interaction. The remote side
//! is abstracted behind [`PermissionStore`] so the workflow can be exercised without Drive.

use crate::core::paginator::ViewAccess;
use crate::core::retry::{RetryPolicy, retry_with_backoff};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Permission scope that makes a resource public.
pub const ANYONE: &str = "anyone";

/// One permission entry on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    /// Identifier used to delete the entry
    pub id: String,
    /// Scope: `user`, `group`, `domain` or `anyone`
    pub kind: String,
    /// Granted role, e.g. `reader`
    pub role: String,
}

/// Remote store of resources and their permissions.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// First resource whose name equals `name` exactly, if any.
    async fn find_resource_by_name(&self, name: &str) -> Result<Option<String>>;

    /// Adds an "anyone may read" permission.
    async fn create_public_permission(&self, resource_id: &str) -> Result<()>;

    /// Shareable link of the resource.
    async fn get_share_link(&self, resource_id: &str) -> Result<String>;

    /// All permission entries on the resource.
    async fn list_permissions(&self, resource_id: &str) -> Result<Vec<Permission>>;

    /// Deletes one permission entry.
    async fn delete_permission(&self, resource_id: &str, permission_id: &str) -> Result<()>;
}

/// Looks up a resource id by exact name.
///
/// Duplicate names are not disambiguated: whatever the store lists first wins.
pub async fn resolve_resource_id<S>(store: &S, name: &str) -> Result<Option<String>>
where
    S: PermissionStore + ?Sized,
{
    store.find_resource_by_name(name.trim()).await
}

/// Creates the public permission and fetches the link, retrying transient failures
/// of each call separately according to `policy`.
///
/// The permission is created at most once per successful attempt, so a failing link
/// lookup never adds a second `anyone` entry. If the link cannot be fetched the new
/// permission is removed again before the error is returned.
#[instrument(skip(store, policy))]
pub async fn grant_public_read<S>(
    store: &S,
    resource_id: &str,
    policy: RetryPolicy,
) -> Result<String>
where
    S: PermissionStore + ?Sized,
{
    retry_with_backoff(policy, "create public permission", || async move {
        store.create_public_permission(resource_id).await
    })
    .await?;

    let link = retry_with_backoff(policy, "fetch share link", || async move {
        store.get_share_link(resource_id).await
    })
    .await;
    if link.is_err() {
        if let Err(e) = revert_public_read(store, resource_id).await {
            warn!(resource_id, error = %e, "could not remove public permission after link failure");
        }
    }
    link
}

/// Deletes every `anyone` permission on the resource and returns how many were removed.
///
/// Calling it when nothing is public is a no-op.
#[instrument(skip(store))]
pub async fn revert_public_read<S>(store: &S, resource_id: &str) -> Result<usize>
where
    S: PermissionStore + ?Sized,
{
    let permissions = store.list_permissions(resource_id).await?;
    let mut removed = 0;
    for permission in permissions.iter().filter(|p| p.kind == ANYONE) {
        store.delete_permission(resource_id, &permission.id).await?;
        removed += 1;
    }
    info!(removed, "reverted public access");
    Ok(removed)
}

/// Lifecycle of one grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantState {
    /// Resource is not (or no longer) public
    NotGranted,
    /// Grant request in flight
    Granting,
    /// Resource is public at `link`
    Granted {
        /// Shareable link
        link: String,
    },
    /// Revert request in flight
    Reverting,
}

/// Outcome of pressing the revert control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertOutcome {
    /// Public permissions were removed (count may be zero)
    Reverted(usize),
    /// The control was already used; nothing was done
    AlreadyReverted,
    /// The actor may not operate the control
    Unauthorized,
}

/// Grant/revert state machine for one resource and one interaction.
#[derive(Debug)]
pub struct AccessGrantWorkflow<'a, S: PermissionStore + ?Sized> {
    store: &'a S,
    resource_id: String,
    access: ViewAccess,
    policy: RetryPolicy,
    state: GrantState,
    revert_used: bool,
}

impl<'a, S: PermissionStore + ?Sized> AccessGrantWorkflow<'a, S> {
    /// New workflow in the `NotGranted` state.
    #[must_use]
    pub fn new(store: &'a S, resource_id: impl Into<String>, access: ViewAccess) -> Self {
        Self {
            store,
            resource_id: resource_id.into(),
            access,
            policy: RetryPolicy::default(),
            state: GrantState::NotGranted,
            revert_used: false,
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resource being shared.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &GrantState {
        &self.state
    }

    /// Link while granted.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        match &self.state {
            GrantState::Granted { link } => Some(link),
            _ => None,
        }
    }

    /// Whether the revert control can still do something.
    #[must_use]
    pub const fn revert_available(&self) -> bool {
        !self.revert_used
    }

    /// `NotGranted -> Granting -> Granted`, or back to `NotGranted` on failure.
    ///
    /// Granting an already granted resource returns the existing link.
    pub async fn grant(&mut self) -> Result<String> {
        if let GrantState::Granted { link } = &self.state {
            return Ok(link.clone());
        }

        self.state = GrantState::Granting;
        match grant_public_read(self.store, &self.resource_id, self.policy).await {
            Ok(link) => {
                self.state = GrantState::Granted { link: link.clone() };
                self.revert_used = false;
                Ok(link)
            }
            Err(e) => {
                self.state = GrantState::NotGranted;
                Err(e)
            }
        }
    }

    /// `Granted -> Reverting -> NotGranted` for an authorized actor.
    ///
    /// The control is single-use: once a revert succeeded further presses are no-ops.
    /// A failed revert leaves the workflow `Granted` and returns the error.
    pub async fn revert(&mut self, actor_id: u64) -> Result<RevertOutcome> {
        if !self.access.permits(actor_id) {
            return Ok(RevertOutcome::Unauthorized);
        }
        if self.revert_used {
            return Ok(RevertOutcome::AlreadyReverted);
        }

        let previous = std::mem::replace(&mut self.state, GrantState::Reverting);
        match revert_public_read(self.store, &self.resource_id).await {
            Ok(removed) => {
                self.state = GrantState::NotGranted;
                self.revert_used = true;
                Ok(RevertOutcome::Reverted(removed))
            }
            Err(e) => {
                warn!(resource_id = %self.resource_id, "revert failed: {e}");
                self.state = previous;
                Err(e)
            }
        }
    }
}

/// Resolves `name` and grants public read access in one step.
///
/// Returns [`Error::NotFound`] when no resource has that name.
pub async fn share_by_name<'a, S>(
    store: &'a S,
    name: &str,
    access: ViewAccess,
    policy: RetryPolicy,
) -> Result<AccessGrantWorkflow<'a, S>>
where
    S: PermissionStore + ?Sized,
{
    let resource_id = resolve_resource_id(store, name)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("File '{}'", name.trim()),
        })?;

    let mut workflow = AccessGrantWorkflow::new(store, resource_id, access).with_policy(policy);
    workflow.grant().await?;
    Ok(workflow)
}
