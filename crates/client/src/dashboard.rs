//! The overlay editor: stream, overlay collection, gestures and form.
//!
//! [`Dashboard`] is what a view layer holds for the lifetime of a page. It
//! routes pointer events through the [`GestureEngine`], sends the single
//! commit of each gesture to the [`SyncController`], keeps the create/edit
//! form, and owns the [`StreamAttachment`] behind the overlays.

use overlaycast_core::error::CoreError;
use overlaycast_core::gesture::{GeometryPreview, GestureEngine};
use overlaycast_core::overlay::{NewOverlay, Overlay};
use overlaycast_core::stream::{PlaybackSurface, StreamAttachment, StreamError};
use overlaycast_core::types::OverlayId;

use crate::remote::RemoteStore;
use crate::sync::{CreateRequestId, SyncController};

/// What saving the form did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    /// A create was sent.
    Created(CreateRequestId),
    /// The edited overlay was updated locally and the update sent.
    Updated(OverlayId),
    /// The edited overlay no longer exists; nothing was sent.
    Discarded(OverlayId),
}

pub struct Dashboard<R, S: PlaybackSurface> {
    sync: SyncController<R>,
    gestures: GestureEngine,
    stream: StreamAttachment<S>,
    form: NewOverlay,
    editing: Option<OverlayId>,
}

impl<R: RemoteStore + 'static, S: PlaybackSurface> Dashboard<R, S> {
    pub fn new(sync: SyncController<R>, surface: S) -> Self {
        Self {
            sync,
            gestures: GestureEngine::new(),
            stream: StreamAttachment::new(surface),
            form: NewOverlay::default(),
            editing: None,
        }
    }

    /// Load the overlay collection. Returns the number of overlays shown.
    pub async fn start(&mut self) -> usize {
        self.sync.load().await
    }

    pub fn overlays(&self) -> &[Overlay] {
        self.sync.overlays()
    }

    pub fn sync(&self) -> &SyncController<R> {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut SyncController<R> {
        &mut self.sync
    }

    pub fn gestures(&self) -> &GestureEngine {
        &self.gestures
    }

    pub fn stream(&self) -> &StreamAttachment<S> {
        &self.stream
    }

    // -- stream ------------------------------------------------------------

    pub fn set_stream_url(&mut self, url: &str) -> Result<(), StreamError> {
        self.stream.set_url(url)
    }

    // -- gestures ----------------------------------------------------------

    /// Pointer down on an overlay body. Returns `false` for unknown ids.
    pub fn begin_drag(&mut self, id: &OverlayId) -> bool {
        let Some(overlay) = self.sync.store().get(id) else {
            return false;
        };
        self.gestures.begin_drag(overlay);
        true
    }

    /// Pointer down on an overlay's resize handle.
    pub fn begin_resize(&mut self, id: &OverlayId) -> bool {
        let Some(overlay) = self.sync.store().get(id) else {
            return false;
        };
        self.gestures.begin_resize(overlay);
        true
    }

    pub fn pointer_move(&mut self, dx: f64, dy: f64) -> Option<GeometryPreview> {
        self.gestures.drag_move(dx, dy)
    }

    pub fn resize_move(&mut self, rect_width: f64, rect_height: f64) -> Option<GeometryPreview> {
        self.gestures.resize_move(rect_width, rect_height)
    }

    /// Resize tick carrying the edge movement since the previous tick.
    pub fn resize_by(&mut self, dw: f64, dh: f64) -> Option<GeometryPreview> {
        self.gestures.resize_by(dw, dh)
    }

    /// Pointer up: commit the gesture. Returns `true` when an update was sent.
    pub fn pointer_up(&mut self) -> bool {
        match self.gestures.end(self.sync.store()) {
            Some(commit) => self.sync.commit_geometry(commit),
            None => false,
        }
    }

    pub fn pointer_cancel(&mut self) {
        self.gestures.cancel();
    }

    // -- form --------------------------------------------------------------

    pub fn form(&self) -> &NewOverlay {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut NewOverlay {
        &mut self.form
    }

    /// Id of the overlay the form is editing, if any.
    pub fn editing(&self) -> Option<&OverlayId> {
        self.editing.as_ref()
    }

    /// Copy an overlay into the form and switch to editing it.
    pub fn edit_overlay(&mut self, id: &OverlayId) -> bool {
        let Some(overlay) = self.sync.store().get(id) else {
            return false;
        };
        self.form = NewOverlay {
            name: overlay.name.clone(),
            kind: overlay.kind,
            content: overlay.content.clone(),
            x: overlay.x,
            y: overlay.y,
            width: overlay.width,
            height: overlay.height,
            visible: overlay.visible,
        };
        self.editing = Some(id.clone());
        true
    }

    pub fn reset_form(&mut self) {
        self.form = NewOverlay::default();
        self.editing = None;
    }

    pub fn apply_timestamp_preset(&mut self) {
        self.form = NewOverlay::timestamp();
    }

    pub fn apply_logo_preset(&mut self) {
        self.form = NewOverlay::sample_logo();
    }

    /// Create a new overlay from the form, or save it over the one being
    /// edited. The form is reset unless validation fails.
    pub fn save_form(&mut self) -> Result<FormSubmission, CoreError> {
        let submission = match self.editing.clone() {
            Some(id) => {
                if self.sync.edit(&id, &self.form)? {
                    FormSubmission::Updated(id)
                } else {
                    FormSubmission::Discarded(id)
                }
            }
            None => FormSubmission::Created(self.sync.create(self.form.clone())?),
        };
        self.reset_form();
        Ok(submission)
    }

    // -- list actions ------------------------------------------------------

    pub fn toggle_visibility(&mut self, id: &OverlayId) -> bool {
        self.sync.toggle_visibility(id)
    }

    /// Delete an overlay. Clears the form if it was editing that overlay.
    pub fn delete(&mut self, id: &OverlayId) -> bool {
        if self.editing.as_ref() == Some(id) {
            self.reset_form();
        }
        self.sync.delete(id)
    }
}
