// ── Reconciler ──
//
// Drives one resource kind against a `RemoteStore`: create, read, update,
// delete, always converting through the kind's mapper. The reconciler
// holds no per-resource state between calls; the device is the source of
// truth and every mutation ends with a fresh read-back.
//
// Cancellation is cooperative: the token is checked before each remote
// call, never mid-flight, so a cancelled reconcile leaves no torn writes
// beyond the stage boundary it had already reached.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ReconcileError, StoreError};
use crate::mapper::{ResourceKind, WriteStage};
use crate::model::{DeclaredRecord, Identity, RemoteObject};

/// Minimal CRUD contract a transport must satisfy. Paths arrive fully
/// rendered; bodies are envelope-wrapped payloads.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create(&self, path: &str, body: &RemoteObject) -> Result<(), StoreError>;
    async fn read(&self, path: &str) -> Result<RemoteObject, StoreError>;
    async fn update(&self, path: &str, body: &RemoteObject) -> Result<(), StoreError>;
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// Lifecycle position of a resource, for logging and caller bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceState {
    Unmanaged,
    Creating,
    Managed,
    Updating,
    Deleting,
}

/// Per-kind reconciliation engine.
pub struct Reconciler {
    kind: Arc<ResourceKind>,
    store: Arc<dyn RemoteStore>,
    cancel: CancellationToken,
}

impl Reconciler {
    pub fn new(kind: Arc<ResourceKind>, store: Arc<dyn RemoteStore>) -> Self {
        Self {
            kind,
            store,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token so the caller can cancel a batch of
    /// reconcilers at once.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    // ── Create ───────────────────────────────────────────────────────

    /// Create the resource on the device, stage by stage, then read it
    /// back. All payloads are expanded before the first remote call, so a
    /// conversion failure can never leave a half-written object.
    pub async fn create(
        &self,
        declared: &DeclaredRecord,
    ) -> Result<(Identity, DeclaredRecord), ReconcileError> {
        let identity = self.kind.derive_identity(declared)?;
        let payloads = self.kind.expand_all(declared)?;
        debug!(identity = %identity, state = %ResourceState::Creating, stages = payloads.len(), "creating resource");

        self.apply(&identity, &payloads, WriteVerb::Create).await?;

        let observed = self.read(&identity).await?;
        Ok((identity, observed))
    }

    // ── Read ─────────────────────────────────────────────────────────

    /// Read every stage and flatten into one declared record.
    ///
    /// A missing parent stage means the resource is gone; a missing child
    /// stage flattens as empty config.
    pub async fn read(&self, identity: &Identity) -> Result<DeclaredRecord, ReconcileError> {
        let mut readings = Vec::with_capacity(self.kind.stages().len());
        for (index, stage) in self.kind.stages().iter().enumerate() {
            self.checkpoint(identity)?;
            let path = stage.path().render(identity)?;
            debug!(identity = %identity, stage = stage.name(), %path, "reading stage");
            match self.store.read(&path).await {
                Ok(body) => readings.push(Some(body)),
                Err(StoreError::NotFound) if index == 0 => {
                    return Err(ReconcileError::NotFound {
                        identity: identity.clone(),
                    });
                }
                Err(StoreError::NotFound) => readings.push(None),
                Err(err) => return Err(store_failure(identity, err)),
            }
        }
        self.kind.flatten_all(&readings)
    }

    // ── Update ───────────────────────────────────────────────────────

    /// Full-replace every stage with the new declared state, then read
    /// back. Identity fields are immutable: a record whose keys disagree
    /// with `identity` is rejected before any remote call.
    pub async fn update(
        &self,
        identity: &Identity,
        declared: &DeclaredRecord,
    ) -> Result<DeclaredRecord, ReconcileError> {
        let derived = self.kind.derive_identity(declared)?;
        for (field, value) in derived.keys() {
            if identity.get(field) != Some(value) {
                return Err(ReconcileError::ImmutableFieldChanged {
                    identity: identity.clone(),
                    field: field.to_owned(),
                });
            }
        }

        let payloads = self.kind.expand_all(declared)?;
        debug!(identity = %identity, state = %ResourceState::Updating, "updating resource");

        self.apply(identity, &payloads, WriteVerb::Update).await?;
        self.read(identity).await
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// Remove the resource. Only the parent stage's subtree is deleted;
    /// child stage config lives under paths the parent removal covers.
    /// Deleting an already-absent resource succeeds.
    pub async fn delete(&self, identity: &Identity) -> Result<(), ReconcileError> {
        self.checkpoint(identity)?;
        let stage = self.kind.parent_stage();
        let path = stage.path().render(identity)?;
        debug!(identity = %identity, state = %ResourceState::Deleting, %path, "deleting resource");
        match self.store.delete(&path).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(err) => Err(store_failure(identity, err)),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn apply(
        &self,
        identity: &Identity,
        payloads: &[RemoteObject],
        verb: WriteVerb,
    ) -> Result<(), ReconcileError> {
        let mut completed: Vec<String> = Vec::new();
        for (stage, payload) in self.kind.stages().iter().zip(payloads) {
            self.checkpoint(identity)?;
            let path = stage.path().render(identity)?;
            debug!(identity = %identity, stage = stage.name(), %path, "writing stage");
            let outcome = match verb {
                WriteVerb::Create => self.store.create(&path, payload).await,
                WriteVerb::Update => self.store.update(&path, payload).await,
            };
            if let Err(err) = outcome {
                return Err(self.write_failure(identity, stage, completed, err));
            }
            completed.push(stage.name().to_owned());
        }
        Ok(())
    }

    /// A parent-stage failure is an ordinary rejection; any later stage
    /// leaves a partially applied object the caller must resume or tear
    /// down, so the error names what was already written.
    fn write_failure(
        &self,
        identity: &Identity,
        stage: &WriteStage,
        completed: Vec<String>,
        err: StoreError,
    ) -> ReconcileError {
        if completed.is_empty() {
            store_failure(identity, err)
        } else {
            ReconcileError::PartialApply {
                identity: identity.clone(),
                completed,
                failed: stage.name().to_owned(),
                detail: err.to_string(),
            }
        }
    }

    fn checkpoint(&self, identity: &Identity) -> Result<(), ReconcileError> {
        if self.cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled {
                identity: identity.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum WriteVerb {
    Create,
    Update,
}

fn store_failure(identity: &Identity, err: StoreError) -> ReconcileError {
    match err {
        StoreError::NotFound | StoreError::Rejected { .. } => ReconcileError::RemoteRejected {
            identity: identity.clone(),
            detail: err.to_string(),
        },
        StoreError::Transport { message } => ReconcileError::Transport {
            identity: identity.clone(),
            detail: message,
        },
    }
}
