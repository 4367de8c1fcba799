//! Pointer gesture to geometry transform.
//!
//! A [`GestureEngine`] tracks at most one in-progress drag or resize as a
//! [`GestureSession`]. Move ticks return a [`GeometryPreview`] for the view
//! layer to draw (nothing is written anywhere); releasing the pointer yields
//! exactly one [`GeometryCommit`], which is what gets persisted.
//!
//! Deltas are accumulated from the gesture's base geometry, never applied
//! to the previous tick's result, so the committed value depends only on
//! the total movement and not on how the pointer stream was sliced.

use crate::geometry::{clamp_size_f64, round_point, round_size};
use crate::overlay::{Overlay, OverlayPatch};
use crate::store::OverlayStore;
use crate::types::OverlayId;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Visual-only geometry for the overlay under the pointer, in float pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPreview {
    pub id: OverlayId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The single terminal event of a gesture.
///
/// Drag commits carry `{x, y}`; resize commits carry
/// `{x, y, width, height}`. All values are already rounded and clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryCommit {
    pub id: OverlayId,
    pub patch: OverlayPatch,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Which interaction a session represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// Transient state of one drag or resize, from press to release.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    overlay_id: OverlayId,
    kind: GestureKind,
    base_x: i32,
    base_y: i32,
    base_width: i32,
    base_height: i32,
    /// Accumulated pointer offset for drags, dimension delta for resizes.
    delta_x: f64,
    delta_y: f64,
}

impl GestureSession {
    fn start(overlay: &Overlay, kind: GestureKind) -> Self {
        Self {
            overlay_id: overlay.id.clone(),
            kind,
            base_x: overlay.x,
            base_y: overlay.y,
            base_width: overlay.width,
            base_height: overlay.height,
            delta_x: 0.0,
            delta_y: 0.0,
        }
    }

    pub fn overlay_id(&self) -> &OverlayId {
        &self.overlay_id
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    /// Accumulated `(dx, dy)` since the gesture started.
    pub fn delta(&self) -> (f64, f64) {
        (self.delta_x, self.delta_y)
    }

    fn preview(&self) -> GeometryPreview {
        let base_x = f64::from(self.base_x);
        let base_y = f64::from(self.base_y);
        let base_w = f64::from(self.base_width);
        let base_h = f64::from(self.base_height);
        match self.kind {
            GestureKind::Drag => GeometryPreview {
                id: self.overlay_id.clone(),
                x: base_x + self.delta_x,
                y: base_y + self.delta_y,
                width: base_w,
                height: base_h,
            },
            GestureKind::Resize => {
                let (width, height) =
                    clamp_size_f64(base_w + self.delta_x, base_h + self.delta_y);
                GeometryPreview {
                    id: self.overlay_id.clone(),
                    x: base_x,
                    y: base_y,
                    width,
                    height,
                }
            }
        }
    }

    fn commit(&self) -> GeometryCommit {
        let patch = match self.kind {
            GestureKind::Drag => {
                let (x, y) = round_point(
                    f64::from(self.base_x) + self.delta_x,
                    f64::from(self.base_y) + self.delta_y,
                );
                OverlayPatch::position(x, y)
            }
            GestureKind::Resize => {
                // Only the right and bottom edges move, so the origin is the
                // one read at gesture start.
                let (width, height) = round_size(
                    f64::from(self.base_width) + self.delta_x,
                    f64::from(self.base_height) + self.delta_y,
                );
                OverlayPatch::geometry(self.base_x, self.base_y, width, height)
            }
        };
        GeometryCommit {
            id: self.overlay_id.clone(),
            patch,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Converts pointer events into previews and commits for one overlay at a
/// time.
#[derive(Debug, Default)]
pub struct GestureEngine {
    session: Option<GestureSession>,
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The in-progress session, if any.
    pub fn active(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Start dragging `overlay`, using its current `(x, y)` as the base.
    pub fn begin_drag(&mut self, overlay: &Overlay) {
        self.begin(overlay, GestureKind::Drag);
    }

    /// Start resizing `overlay` from its right/bottom edges.
    pub fn begin_resize(&mut self, overlay: &Overlay) {
        self.begin(overlay, GestureKind::Resize);
    }

    fn begin(&mut self, overlay: &Overlay, kind: GestureKind) {
        if let Some(stale) = self.session.take() {
            tracing::debug!(
                overlay_id = %stale.overlay_id,
                kind = ?stale.kind,
                "Discarding unfinished gesture",
            );
        }
        self.session = Some(GestureSession::start(overlay, kind));
    }

    /// One drag tick carrying the pointer delta since the previous tick.
    ///
    /// Returns `None` when no drag is in progress or the delta is not
    /// finite.
    pub fn drag_move(&mut self, dx: f64, dy: f64) -> Option<GeometryPreview> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.kind == GestureKind::Drag)?;
        if !dx.is_finite() || !dy.is_finite() {
            return None;
        }
        session.delta_x += dx;
        session.delta_y += dy;
        Some(session.preview())
    }

    /// One resize tick carrying the current size of the resize rectangle.
    pub fn resize_move(&mut self, rect_width: f64, rect_height: f64) -> Option<GeometryPreview> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.kind == GestureKind::Resize)?;
        if !rect_width.is_finite() || !rect_height.is_finite() {
            return None;
        }
        session.delta_x = rect_width - f64::from(session.base_width);
        session.delta_y = rect_height - f64::from(session.base_height);
        Some(session.preview())
    }

    /// One resize tick carrying the edge movement since the previous tick.
    pub fn resize_by(&mut self, dw: f64, dh: f64) -> Option<GeometryPreview> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.kind == GestureKind::Resize)?;
        if !dw.is_finite() || !dh.is_finite() {
            return None;
        }
        session.delta_x += dw;
        session.delta_y += dh;
        Some(session.preview())
    }

    /// Release the pointer and produce the gesture's commit.
    ///
    /// The session is consumed either way. If the overlay left `store`
    /// while the gesture was in progress the commit is dropped and `None`
    /// is returned.
    pub fn end(&mut self, store: &OverlayStore) -> Option<GeometryCommit> {
        let session = self.session.take()?;
        if !store.contains(&session.overlay_id) {
            tracing::debug!(
                overlay_id = %session.overlay_id,
                "Dropping gesture commit for removed overlay",
            );
            return None;
        }
        let commit = session.commit();
        tracing::debug!(overlay_id = %commit.id, patch = ?commit.patch, "Gesture committed");
        Some(commit)
    }

    /// Abandon the current gesture without committing.
    pub fn cancel(&mut self) -> Option<GestureSession> {
        self.session.take()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
