#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, Semaphore};

use overlaycast_client::events::SyncEvent;
use overlaycast_client::sync::SyncController;
use overlaycast_client::{RemoteError, RemoteOverlay, RemoteStore};
use overlaycast_core::overlay::{NewOverlay, Overlay, OverlayKind, OverlayPatch};
use overlaycast_core::stream::{PlaybackSurface, StreamError};
use overlaycast_core::types::OverlayId;

// ---------------------------------------------------------------------------
// Fake remote store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FakeState {
    pub overlays: Vec<Overlay>,
    /// Ids handed out to creates, in order. Falls back to `id-N`.
    pub next_ids: VecDeque<String>,
    pub counter: u64,
    pub fail_list: bool,
    pub fail_create: bool,
    pub fail_update: bool,
    pub fail_delete: bool,
    /// Answer updates with only the id and the patched fields.
    pub partial_updates: bool,
    pub update_calls: Vec<(OverlayId, OverlayPatch)>,
    pub delete_calls: Vec<OverlayId>,
}

/// In-process [`RemoteStore`] with failure switches and per-id gates that
/// hold update responses until released.
#[derive(Debug, Default)]
pub struct FakeRemote {
    pub state: Mutex<FakeState>,
    gates: Mutex<HashMap<OverlayId, Arc<Semaphore>>>,
}

impl FakeRemote {
    pub fn with_overlays(overlays: Vec<Overlay>) -> Arc<Self> {
        let remote = Self::default();
        remote.state.lock().unwrap().overlays = overlays;
        Arc::new(remote)
    }

    pub fn set(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn update_calls(&self) -> Vec<(OverlayId, OverlayPatch)> {
        self.state.lock().unwrap().update_calls.clone()
    }

    pub fn stored(&self, id: &str) -> Option<Overlay> {
        let state = self.state.lock().unwrap();
        state.overlays.iter().find(|o| o.id.as_str() == id).cloned()
    }

    /// Hold update responses for `id` until [`release`](Self::release).
    pub fn hold(&self, id: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(OverlayId::new(id), Arc::new(Semaphore::new(0)));
    }

    /// Let one held update for `id` respond. Releases add up, so releasing
    /// before the update arrives still lets it through.
    pub fn release(&self, id: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(&OverlayId::new(id)) {
            gate.add_permits(1);
        }
    }

    fn failure() -> RemoteError {
        RemoteError::Api {
            status: 500,
            body: "store unavailable".to_string(),
        }
    }
}

impl RemoteStore for FakeRemote {
    async fn list(&self) -> Result<Vec<Overlay>, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(Self::failure());
        }
        Ok(state.overlays.clone())
    }

    async fn create(&self, overlay: &NewOverlay) -> Result<Overlay, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(Self::failure());
        }
        state.counter += 1;
        let id = match state.next_ids.pop_front() {
            Some(id) => id,
            None => format!("id-{}", state.counter),
        };
        let created = overlay.clone().into_overlay(OverlayId::new(id));
        state.overlays.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &OverlayId,
        patch: &OverlayPatch,
    ) -> Result<RemoteOverlay, RemoteError> {
        let gate = self.gates.lock().unwrap().get(id).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        let mut state = self.state.lock().unwrap();
        state.update_calls.push((id.clone(), patch.clone()));
        if state.fail_update {
            return Err(Self::failure());
        }
        let partial = state.partial_updates;
        let Some(stored) = state.overlays.iter_mut().find(|o| &o.id == id) else {
            return Err(RemoteError::Api {
                status: 404,
                body: "overlay not found".to_string(),
            });
        };
        stored.apply_patch(patch);
        if partial {
            Ok(RemoteOverlay {
                id: id.clone(),
                fields: patch.clone(),
            })
        } else {
            Ok(RemoteOverlay::from(stored.clone()))
        }
    }

    async fn delete(&self, id: &OverlayId) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls.push(id.clone());
        if state.fail_delete {
            return Err(Self::failure());
        }
        state.overlays.retain(|o| &o.id != id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn overlay(id: &str, x: i32, y: i32, width: i32, height: i32) -> Overlay {
    Overlay {
        id: OverlayId::new(id),
        name: format!("Overlay {id}"),
        kind: OverlayKind::Text,
        content: "Live now".to_string(),
        x,
        y,
        width,
        height,
        visible: true,
    }
}

pub fn logo() -> NewOverlay {
    NewOverlay {
        name: "Logo".to_string(),
        kind: OverlayKind::Image,
        content: "https://x/y.png".to_string(),
        x: 600,
        y: 10,
        width: 120,
        height: 60,
        visible: true,
    }
}

/// Controller over `remote` with its collection already loaded.
pub async fn loaded_controller(
    remote: Arc<FakeRemote>,
    rollback_on_failure: bool,
) -> SyncController<FakeRemote> {
    let mut sync = SyncController::new(remote, rollback_on_failure);
    sync.load().await;
    sync
}

pub fn drain_events(rx: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ---------------------------------------------------------------------------
// Playback surface
// ---------------------------------------------------------------------------

/// Surface that records attach/detach calls.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub log: Vec<String>,
}

impl PlaybackSurface for RecordingSurface {
    type Session = String;

    fn attach(&mut self, url: &str) -> Result<String, StreamError> {
        self.log.push(format!("attach {url}"));
        Ok(url.to_string())
    }

    fn detach(&mut self, session: String) {
        self.log.push(format!("detach {session}"));
    }
}
