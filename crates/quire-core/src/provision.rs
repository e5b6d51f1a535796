//! Out-of-band provisioning.
//!
//! Creating a user over the request pipeline needs an admin of the same
//! organization, so a fresh organization cannot get its first member that
//! way. [`bootstrap_user`] is the operator path for that first member and is
//! never reachable from request handling.

use tracing::{info, warn};

use crate::{
  Error, ObjectId, Result,
  organization::Organization,
  store::{TenantScope, TenantStore},
  user::{NewUser, User},
};

/// Create `input` as a member of organization `organization_id`.
///
/// Refuses with [`Error::AlreadyProvisioned`] if the organization already has
/// members, unless `force` is set.
pub async fn bootstrap_user<S>(
  store: &S,
  organization_id: ObjectId,
  input: NewUser,
  force: bool,
) -> Result<(Organization, User)>
where
  S: TenantStore,
{
  let org = store
    .get_organization(organization_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(Error::OrganizationNotFound(organization_id))?;

  let scope = TenantScope::new(org.id);
  let users = store.count_users(scope).await.map_err(Error::from_store)?;
  if users > 0 {
    if !force {
      return Err(Error::AlreadyProvisioned { organization_id, users });
    }
    warn!(%organization_id, users, "provisioning into an organization that already has members");
  }

  let user = store
    .create_user(scope, input)
    .await
    .map_err(Error::from_store)?;
  info!(
    organization_id = %org.id,
    user_id = %user.id,
    role = %user.role,
    "provisioned user"
  );
  Ok((org, user))
}
