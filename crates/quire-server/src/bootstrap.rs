//! `quire-server bootstrap-admin`: provision a member directly through the
//! store, for organizations that have nobody who could do it over HTTP.

use anyhow::Context as _;
use clap::Args;
use quire_api::validate;
use quire_core::{
  ObjectId,
  extract::{ORG_ID_HEADER, USER_ID_HEADER},
  provision::bootstrap_user,
  store::TenantStore,
  user::{NewUser, Role},
};

#[derive(Debug, Args)]
pub struct BootstrapArgs {
  /// Id of the organization to provision into.
  #[arg(long = "org", value_parser = ObjectId::parse)]
  pub organization_id: ObjectId,

  #[arg(long)]
  pub email: String,

  #[arg(long)]
  pub name: String,

  #[arg(long, default_value = "admin")]
  pub role: Role,

  /// Provision even if the organization already has members.
  #[arg(long)]
  pub force: bool,
}

pub async fn run<S: TenantStore>(store: &S, args: BootstrapArgs) -> anyhow::Result<()> {
  let input = NewUser { email: args.email, name: args.name, role: args.role };
  validate::new_user(&input).context("invalid user")?;

  let (org, user) = bootstrap_user(store, args.organization_id, input, args.force)
    .await
    .context("failed to provision user")?;

  println!("Provisioned {} ({}) in {}", user.email, user.role, org.name);
  println!("{ORG_ID_HEADER}: {}", org.id);
  println!("{USER_ID_HEADER}: {}", user.id);
  Ok(())
}
