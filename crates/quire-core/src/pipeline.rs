//! The request pipeline.
//!
//! Every operation passes through the same stages:
//!
//! ```text
//! Extracting ─► Resolving ─► Authorizing ─► Executing ─► Completed
//!     │  │           │             │
//!     │  └───────────┼─────────────┼──────► Executing   (public operations)
//!     └──────────────┴─────────────┴──────► Rejected
//! ```
//!
//! Rejections are terminal and never retried. Errors raised while executing
//! are returned to the caller as-is; the request still counts as completed.

use std::{future::Future, sync::Arc};

use strum::{Display, EnumIter};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  extract::{Anonymous, HeaderAsserted, IdentityAssertion, MalformedIdentity, RequestMetadata},
  gateway::{Directory, Gateway},
  permission::{Action, Permission, ResourceType, authorize},
  resolve::{ResolvedIdentity, resolve},
  store::TenantStore,
};

// ─── Stages ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
  Extracting,
  Resolving,
  Authorizing,
  Executing,
  Completed,
  Rejected,
}

impl Stage {
  pub fn can_advance_to(self, next: Stage) -> bool {
    use Stage::*;
    matches!(
      (self, next),
      (Extracting, Resolving | Executing | Rejected)
        | (Resolving, Authorizing | Rejected)
        | (Authorizing, Executing | Rejected)
        | (Executing, Completed)
    )
  }

  pub fn is_terminal(self) -> bool { matches!(self, Stage::Completed | Stage::Rejected) }
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// Every operation the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
  ServiceInfo,
  Health,
  Readiness,
  CreateOrganization,
  GetOrganization,
  ListUsers,
  CreateUser,
  GetUser,
  UpdateUser,
  ListNotes,
  GetNote,
  CreateNote,
  UpdateNote,
  DeleteNote,
}

/// What an operation requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  /// No identity; extraction is skipped entirely.
  Public,
  Protected(Permission),
}

impl Operation {
  pub fn access(self) -> Access {
    use Operation::*;
    let (resource, action) = match self {
      ServiceInfo | Health | Readiness | CreateOrganization | GetOrganization => {
        return Access::Public;
      }
      ListUsers => (ResourceType::User, Action::List),
      CreateUser => (ResourceType::User, Action::Create),
      GetUser => (ResourceType::User, Action::Read),
      UpdateUser => (ResourceType::User, Action::Update),
      ListNotes | GetNote => (ResourceType::Note, Action::Read),
      CreateNote => (ResourceType::Note, Action::Create),
      UpdateNote => (ResourceType::Note, Action::Update),
      DeleteNote => (ResourceType::Note, Action::Delete),
    };
    Access::Protected(Permission::new(resource, action))
  }

  pub fn is_public(self) -> bool { self.access() == Access::Public }
}

// ─── Execution context ───────────────────────────────────────────────────────

/// Handed to the executing stage.
pub struct Context<S> {
  store:    Arc<S>,
  identity: Option<ResolvedIdentity>,
}

impl<S: TenantStore> Context<S> {
  pub fn identity(&self) -> Option<&ResolvedIdentity> { self.identity.as_ref() }

  pub fn directory(&self) -> Directory<S> { Directory::new(self.store.clone()) }

  /// Tenant-scoped data access. Public operations carry no identity, so this
  /// fails for them.
  pub fn tenant(&self) -> Result<Gateway<S>> {
    let identity = self
      .identity
      .clone()
      .ok_or(Error::MalformedIdentity(MalformedIdentity::Missing))?;
    Ok(Gateway::new(self.store.clone(), identity))
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Shared per-process configuration; each call to [`Pipeline::run`] is an
/// independent pipeline instance.
pub struct Pipeline<S, A = HeaderAsserted> {
  store:     Arc<S>,
  assertion: A,
}

impl<S, A: Clone> Clone for Pipeline<S, A> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), assertion: self.assertion.clone() }
  }
}

impl<S> Pipeline<S, HeaderAsserted> {
  pub fn with_headers(store: Arc<S>) -> Self { Self::new(store, HeaderAsserted) }
}

impl<S, A> Pipeline<S, A> {
  pub fn new(store: Arc<S>, assertion: A) -> Self { Self { store, assertion } }

  pub fn store(&self) -> &Arc<S> { &self.store }
}

impl<S, A> Pipeline<S, A>
where
  S: TenantStore,
  A: IdentityAssertion,
{
  /// Run `op` for a request carrying `metadata`, calling `exec` once the
  /// request has been admitted.
  pub async fn run<T, E, M, F, Fut>(&self, op: Operation, metadata: &M, exec: F) -> Result<T, E>
  where
    M: RequestMetadata + Sync + ?Sized,
    F: FnOnce(Context<S>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<Error>,
  {
    let mut run = Run::new(op);
    let identity = self.enter(&mut run, metadata).await?;

    let outcome = exec(Context { store: self.store.clone(), identity }).await;
    run.advance(Stage::Completed);
    outcome
  }

  /// [`Pipeline::run`] with no request metadata.
  pub async fn run_public<T, E, F, Fut>(&self, op: Operation, exec: F) -> Result<T, E>
  where
    F: FnOnce(Context<S>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<Error>,
  {
    self.run(op, &Anonymous, exec).await
  }

  /// Drive the first three stages only; `None` means the operation is
  /// public.
  pub async fn admit<M>(&self, op: Operation, metadata: &M) -> Result<Option<ResolvedIdentity>>
  where
    M: RequestMetadata + Sync + ?Sized,
  {
    let mut run = Run::new(op);
    self.enter(&mut run, metadata).await
  }

  async fn enter<M>(&self, run: &mut Run, metadata: &M) -> Result<Option<ResolvedIdentity>>
  where
    M: RequestMetadata + Sync + ?Sized,
  {
    let permission = match run.operation.access() {
      Access::Public => {
        run.advance(Stage::Executing);
        return Ok(None);
      }
      Access::Protected(permission) => permission,
    };

    let candidate = match self.assertion.assert_identity(metadata) {
      Ok(candidate) => candidate,
      Err(e) => return Err(run.reject(e.into())),
    };
    run.advance(Stage::Resolving);

    let identity = match resolve(&*self.store, candidate).await {
      Ok(identity) => identity,
      Err(e) => return Err(run.reject(e)),
    };
    run.advance(Stage::Authorizing);

    if let Err(e) = authorize(&identity, permission) {
      return Err(run.reject(e));
    }
    run.advance(Stage::Executing);

    Ok(Some(identity))
  }
}

/// Progress of a single request.
struct Run {
  operation: Operation,
  stage:     Stage,
}

impl Run {
  fn new(operation: Operation) -> Self {
    debug!(%operation, stage = %Stage::Extracting, "pipeline started");
    Self { operation, stage: Stage::Extracting }
  }

  fn advance(&mut self, next: Stage) {
    debug_assert!(
      self.stage.can_advance_to(next),
      "illegal pipeline transition {} -> {next}",
      self.stage
    );
    debug!(operation = %self.operation, from = %self.stage, to = %next, "pipeline transition");
    self.stage = next;
  }

  fn reject(&mut self, err: Error) -> Error {
    // The resolver kinds are logged distinctly even though callers see one
    // shape for all of them.
    warn!(
      operation = %self.operation,
      stage = %self.stage,
      kind = %err.kind(),
      error = %err,
      "request rejected"
    );
    self.advance(Stage::Rejected);
    err
  }
}
