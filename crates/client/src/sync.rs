//! Optimistic synchronisation between the local collection and the store.
//!
//! Every mutation is applied to the [`OverlayStore`] before the request is
//! sent, so the view never waits on the network. Requests run as spawned
//! tasks and report back over a channel; the owner of the controller applies
//! those outcomes on its own task ([`SyncController::next_outcome`],
//! [`SyncController::drain_ready`], [`SyncController::settle`]), which keeps
//! the store single-writer.
//!
//! Responses are matched to overlays by id, never by position. Two responses
//! for the same overlay are applied in arrival order, so the last one to
//! resolve wins.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use overlaycast_core::error::CoreError;
use overlaycast_core::gesture::GeometryCommit;
use overlaycast_core::overlay::{NewOverlay, Overlay, OverlayPatch};
use overlaycast_core::store::OverlayStore;
use overlaycast_core::types::OverlayId;

use crate::config::ClientConfig;
use crate::events::{SyncEvent, SyncEventBus, SyncOperation};
use crate::remote::{RemoteError, RemoteOverlay, RemoteStore};

/// Handle for a create request that has not resolved yet.
pub type CreateRequestId = u64;

/// Result of a finished request, applied by the controller's owner.
#[derive(Debug)]
enum Outcome {
    Created {
        request: CreateRequestId,
        result: Result<Overlay, RemoteError>,
    },
    Updated {
        id: OverlayId,
        result: Result<RemoteOverlay, RemoteError>,
    },
    Deleted {
        id: OverlayId,
        result: Result<(), RemoteError>,
    },
}

/// Last confirmed state of an overlay with updates in flight.
#[derive(Debug)]
struct PendingOverlay {
    confirmed: Overlay,
    in_flight: usize,
}

/// An overlay removed locally whose delete has not been confirmed.
#[derive(Debug)]
struct RemovedOverlay {
    index: usize,
    overlay: Overlay,
}

/// Owns the local overlay collection and keeps it in step with a
/// [`RemoteStore`].
///
/// Mutating methods spawn onto the current tokio runtime and must be called
/// from within one.
pub struct SyncController<R> {
    store: OverlayStore,
    remote: Arc<R>,
    rollback_on_failure: bool,
    pending: HashMap<OverlayId, PendingOverlay>,
    removed: HashMap<OverlayId, RemovedOverlay>,
    creates: BTreeMap<CreateRequestId, NewOverlay>,
    next_request: CreateRequestId,
    in_flight: usize,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
    events: SyncEventBus,
    status: Option<String>,
}

impl<R: RemoteStore + 'static> SyncController<R> {
    pub fn new(remote: Arc<R>, rollback_on_failure: bool) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            store: OverlayStore::new(),
            remote,
            rollback_on_failure,
            pending: HashMap::new(),
            removed: HashMap::new(),
            creates: BTreeMap::new(),
            next_request: 0,
            in_flight: 0,
            outcome_tx,
            outcome_rx,
            events: SyncEventBus::default(),
            status: None,
        }
    }

    pub fn from_config(remote: Arc<R>, config: &ClientConfig) -> Self {
        Self::new(remote, config.rollback_on_failure)
    }

    // -- accessors ---------------------------------------------------------

    /// The local collection; the render source for the view.
    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    pub fn overlays(&self) -> &[Overlay] {
        self.store.list()
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    pub fn rollback_on_failure(&self) -> bool {
        self.rollback_on_failure
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Creates sent but not yet confirmed, oldest first.
    pub fn pending_creates(&self) -> impl Iterator<Item = (CreateRequestId, &NewOverlay)> {
        self.creates.iter().map(|(request, overlay)| (*request, overlay))
    }

    /// Number of requests whose outcome has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// `true` when `id` has unconfirmed updates.
    pub fn has_pending_update(&self, id: &OverlayId) -> bool {
        self.pending.contains_key(id)
    }

    /// Latest failure message, for a transient status line.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // -- load --------------------------------------------------------------

    /// Replace the collection with the store's current overlays.
    ///
    /// Any failure leaves the collection empty. Returns the number of
    /// overlays loaded.
    pub async fn load(&mut self) -> usize {
        match self.remote.list().await {
            Ok(overlays) => {
                let overlays: Vec<Overlay> = overlays.into_iter().map(Overlay::clamped).collect();
                for (id, pending) in &mut self.pending {
                    if let Some(fresh) = overlays.iter().find(|o| &o.id == id) {
                        pending.confirmed = fresh.clone();
                    }
                }
                let count = overlays.len();
                self.store.replace_all(overlays);
                tracing::info!(count, "Loaded overlays");
                self.events.publish(SyncEvent::Loaded { count });
                count
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load overlays, starting empty");
                self.store.replace_all(Vec::new());
                self.events.publish(SyncEvent::Failed {
                    operation: SyncOperation::Load,
                    id: None,
                    message: e.to_string(),
                });
                0
            }
        }
    }

    // -- mutations ---------------------------------------------------------

    /// Send a new overlay to the store.
    ///
    /// Nothing is added to the collection until the store assigns an id;
    /// until then the overlay is listed by [`pending_creates`](Self::pending_creates).
    pub fn create(&mut self, overlay: NewOverlay) -> Result<CreateRequestId, CoreError> {
        overlay.validate()?;
        let overlay = overlay.clamped();

        let request = self.next_request;
        self.next_request += 1;
        self.creates.insert(request, overlay.clone());

        tracing::debug!(request, name = %overlay.name, "Sending create");
        let remote = Arc::clone(&self.remote);
        self.spawn_request(async move {
            let result = remote.create(&overlay).await;
            Outcome::Created { request, result }
        });
        Ok(request)
    }

    /// Apply `patch` locally and send it to the store.
    ///
    /// Returns `Ok(false)` when the overlay is unknown or the patch is empty.
    pub fn update(&mut self, id: &OverlayId, patch: OverlayPatch) -> Result<bool, CoreError> {
        let Some(current) = self.store.get(id) else {
            tracing::debug!(overlay_id = %id, "Ignoring update for unknown overlay");
            return Ok(false);
        };
        let patch = patch.clamped();
        let mut candidate = current.clone();
        candidate.apply_patch(&patch);
        candidate.validate()?;

        Ok(self.send_update(id, patch))
    }

    /// Save a full form over an existing overlay.
    pub fn edit(&mut self, id: &OverlayId, form: &NewOverlay) -> Result<bool, CoreError> {
        form.validate()?;
        self.update(id, OverlayPatch::from_form(form))
    }

    /// Persist the result of a drag or resize gesture.
    ///
    /// Commits for overlays no longer in the collection are dropped.
    pub fn commit_geometry(&mut self, commit: GeometryCommit) -> bool {
        if !self.store.contains(&commit.id) {
            tracing::debug!(overlay_id = %commit.id, "Dropping geometry commit for removed overlay");
            return false;
        }
        self.send_update(&commit.id, commit.patch.clamped())
    }

    /// Flip `visible` on an overlay.
    pub fn toggle_visibility(&mut self, id: &OverlayId) -> bool {
        let Some(visible) = self.store.get(id).map(|o| o.visible) else {
            return false;
        };
        self.send_update(id, OverlayPatch::visibility(!visible))
    }

    /// Remove an overlay locally and send the delete.
    pub fn delete(&mut self, id: &OverlayId) -> bool {
        let Some(index) = self.store.position(id) else {
            tracing::debug!(overlay_id = %id, "Ignoring delete for unknown overlay");
            return false;
        };
        let Some(overlay) = self.store.remove(id) else {
            return false;
        };
        self.removed
            .insert(id.clone(), RemovedOverlay { index, overlay });

        tracing::debug!(overlay_id = %id, "Sending delete");
        let remote = Arc::clone(&self.remote);
        let id = id.clone();
        self.spawn_request(async move {
            let result = remote.delete(&id).await;
            Outcome::Deleted { id, result }
        });
        true
    }

    // -- outcomes ----------------------------------------------------------

    /// Wait for the next request to finish and apply its outcome.
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn next_outcome(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.outcome_rx.recv().await {
            Some(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            None => false,
        }
    }

    /// Apply every outcome that has already arrived, without waiting.
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
            applied += 1;
        }
        applied
    }

    /// Wait until every in-flight request has been applied.
    pub async fn settle(&mut self) {
        while self.next_outcome().await {}
    }

    // ---- private helpers ----

    fn send_update(&mut self, id: &OverlayId, patch: OverlayPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let Some(previous) = self.store.apply_patch(id, &patch) else {
            return false;
        };
        self.pending
            .entry(id.clone())
            .or_insert(PendingOverlay {
                confirmed: previous,
                in_flight: 0,
            })
            .in_flight += 1;

        tracing::debug!(overlay_id = %id, "Sending update");
        let remote = Arc::clone(&self.remote);
        let id = id.clone();
        self.spawn_request(async move {
            let result = remote.update(&id, &patch).await;
            Outcome::Updated { id, result }
        });
        true
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            // The receiver lives as long as the controller.
            let _ = tx.send(request.await);
        });
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Outcome::Created { request, result } => self.apply_created(request, result),
            Outcome::Updated { id, result } => self.apply_updated(id, result),
            Outcome::Deleted { id, result } => self.apply_deleted(id, result),
        }
    }

    fn apply_created(&mut self, request: CreateRequestId, result: Result<Overlay, RemoteError>) {
        let provisional = self.creates.remove(&request);
        match result {
            Ok(overlay) => {
                let overlay = overlay.clamped();
                tracing::info!(overlay_id = %overlay.id, "Overlay created");
                self.store.upsert(overlay.clone());
                self.events.publish(SyncEvent::Created { overlay });
            }
            Err(e) => {
                let name = provisional.map(|o| o.name).unwrap_or_default();
                self.report_failure(SyncOperation::Create, None, format!("Could not create overlay '{name}': {e}"));
            }
        }
    }

    fn apply_updated(&mut self, id: OverlayId, result: Result<RemoteOverlay, RemoteError>) {
        let mut confirmed = None;
        let mut settled = false;
        if let Some(pending) = self.pending.get_mut(&id) {
            pending.in_flight = pending.in_flight.saturating_sub(1);
            settled = pending.in_flight == 0;
            confirmed = Some(pending.confirmed.clone());
        }
        if settled {
            self.pending.remove(&id);
        }

        match result {
            Ok(response) => {
                if response.id != id {
                    tracing::warn!(overlay_id = %id, response_id = %response.id, "Update response carries a different id");
                }
                let fields = response.fields.clamped();
                if self.store.apply_patch(&id, &fields).is_none() {
                    tracing::debug!(overlay_id = %id, "Update confirmed for overlay no longer present");
                    return;
                }
                let Some(merged) = self.store.get(&id).cloned() else {
                    return;
                };
                if let Some(pending) = self.pending.get_mut(&id) {
                    pending.confirmed = merged.clone();
                }
                tracing::debug!(overlay_id = %id, "Update merged");
                self.events.publish(SyncEvent::Updated { overlay: merged });
            }
            Err(e) => {
                let restore = confirmed.filter(|_| self.rollback_on_failure);
                if let Some(confirmed) = restore {
                    if self.store.contains(&id) {
                        self.store.upsert(confirmed);
                        tracing::info!(overlay_id = %id, "Rolled back failed update");
                        self.events.publish(SyncEvent::RolledBack { id: id.clone() });
                    }
                }
                self.report_failure(SyncOperation::Update, Some(id), format!("Could not save overlay: {e}"));
            }
        }
    }

    fn apply_deleted(&mut self, id: OverlayId, result: Result<(), RemoteError>) {
        let removed = self.removed.remove(&id);
        match result {
            Ok(()) => {
                self.pending.remove(&id);
                tracing::info!(overlay_id = %id, "Overlay deleted");
                self.events.publish(SyncEvent::Deleted { id });
            }
            Err(e) => {
                let restore = removed.filter(|_| self.rollback_on_failure);
                if let Some(RemovedOverlay { index, overlay }) = restore {
                    if !self.store.contains(&id) {
                        self.store.insert_at(index, overlay);
                        tracing::info!(overlay_id = %id, index, "Restored overlay after failed delete");
                        self.events.publish(SyncEvent::RolledBack { id: id.clone() });
                    }
                }
                self.report_failure(SyncOperation::Delete, Some(id), format!("Could not delete overlay: {e}"));
            }
        }
    }

    fn report_failure(&mut self, operation: SyncOperation, id: Option<OverlayId>, message: String) {
        tracing::warn!(operation = operation.as_str(), overlay_id = ?id, %message, "Sync request failed");
        self.status = Some(message.clone());
        self.events.publish(SyncEvent::Failed {
            operation,
            id,
            message,
        });
    }
}

impl<R> std::fmt::Debug for SyncController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("overlays", &self.store.len())
            .field("in_flight", &self.in_flight)
            .field("rollback_on_failure", &self.rollback_on_failure)
            .finish_non_exhaustive()
    }
}
