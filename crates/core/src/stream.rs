//! Attachment of a live stream URL to a playback surface.
//!
//! Decoding and playback belong to an external media library; this module
//! only owns the session lifecycle. [`StreamAttachment`] guarantees that the
//! previous session is detached before a new URL is attached, and that the
//! last session is detached when the attachment is dropped.

/// Errors reported by a playback surface.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The surface cannot play this kind of stream.
    #[error("Unsupported stream: {0}")]
    Unsupported(String),

    /// The playback library failed to start the session.
    #[error("Failed to attach stream: {0}")]
    AttachFailed(String),
}

/// A surface an external playback library can render a stream onto.
pub trait PlaybackSurface {
    /// Handle for one attached stream.
    type Session;

    /// Start playing `url` on this surface.
    fn attach(&mut self, url: &str) -> Result<Self::Session, StreamError>;

    /// Stop and release a session previously returned by [`attach`].
    ///
    /// [`attach`]: PlaybackSurface::attach
    fn detach(&mut self, session: Self::Session);
}

/// Owns a playback surface and at most one live session on it.
pub struct StreamAttachment<S: PlaybackSurface> {
    surface: S,
    current: Option<(String, S::Session)>,
}

impl<S: PlaybackSurface> StreamAttachment<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    /// URL of the live session, if any.
    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|(url, _)| url.as_str())
    }

    pub fn is_attached(&self) -> bool {
        self.current.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Point the surface at `url`.
    ///
    /// Re-setting the current URL does nothing. A blank URL just detaches.
    /// On attach failure the surface is left detached.
    pub fn set_url(&mut self, url: &str) -> Result<(), StreamError> {
        let url = url.trim();
        if self.current_url() == Some(url) {
            return Ok(());
        }

        self.detach();

        if url.is_empty() {
            return Ok(());
        }

        let session = self.surface.attach(url)?;
        tracing::info!(url, "Stream attached");
        self.current = Some((url.to_string(), session));
        Ok(())
    }

    /// Tear down the live session, if any.
    pub fn detach(&mut self) {
        if let Some((url, session)) = self.current.take() {
            self.surface.detach(session);
            tracing::info!(url = %url, "Stream detached");
        }
    }
}

impl<S: PlaybackSurface> Drop for StreamAttachment<S> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use assert_matches::assert_matches;

    use super::*;

    /// Surface that records every call in a shared log.
    #[derive(Clone, Default)]
    struct RecordingSurface {
        log: Rc<RefCell<Vec<String>>>,
        live: Rc<RefCell<u32>>,
        next: u32,
    }

    impl PlaybackSurface for RecordingSurface {
        type Session = u32;

        fn attach(&mut self, url: &str) -> Result<u32, StreamError> {
            if url.ends_with(".mp4") {
                return Err(StreamError::Unsupported(url.to_string()));
            }
            self.next += 1;
            *self.live.borrow_mut() += 1;
            self.log.borrow_mut().push(format!("attach {url} #{}", self.next));
            Ok(self.next)
        }

        fn detach(&mut self, session: u32) {
            *self.live.borrow_mut() -= 1;
            self.log.borrow_mut().push(format!("detach #{session}"));
        }
    }

    #[test]
    fn detaches_before_reattaching() {
        let surface = RecordingSurface::default();
        let log = surface.log.clone();
        let mut attachment = StreamAttachment::new(surface);

        attachment.set_url("https://cdn/a.m3u8").unwrap();
        attachment.set_url("https://cdn/b.m3u8").unwrap();

        assert_eq!(
            *log.borrow(),
            [
                "attach https://cdn/a.m3u8 #1",
                "detach #1",
                "attach https://cdn/b.m3u8 #2",
            ]
        );
        assert_eq!(attachment.current_url(), Some("https://cdn/b.m3u8"));
    }

    #[test]
    fn same_url_is_noop() {
        let surface = RecordingSurface::default();
        let log = surface.log.clone();
        let mut attachment = StreamAttachment::new(surface);

        attachment.set_url("https://cdn/a.m3u8").unwrap();
        attachment.set_url(" https://cdn/a.m3u8 ").unwrap();

        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn blank_url_detaches() {
        let surface = RecordingSurface::default();
        let live = surface.live.clone();
        let mut attachment = StreamAttachment::new(surface);

        attachment.set_url("https://cdn/a.m3u8").unwrap();
        attachment.set_url("   ").unwrap();

        assert!(!attachment.is_attached());
        assert_eq!(*live.borrow(), 0);
    }

    #[test]
    fn failed_attach_leaves_surface_detached() {
        let surface = RecordingSurface::default();
        let live = surface.live.clone();
        let mut attachment = StreamAttachment::new(surface);

        attachment.set_url("https://cdn/a.m3u8").unwrap();
        let err = attachment.set_url("https://cdn/movie.mp4").unwrap_err();

        assert_matches!(err, StreamError::Unsupported(_));
        assert!(!attachment.is_attached());
        assert_eq!(*live.borrow(), 0);
    }

    #[test]
    fn drop_releases_session() {
        let surface = RecordingSurface::default();
        let live = surface.live.clone();
        {
            let mut attachment = StreamAttachment::new(surface);
            attachment.set_url("https://cdn/a.m3u8").unwrap();
            assert_eq!(*live.borrow(), 1);
        }
        assert_eq!(*live.borrow(), 0);
    }

    #[test]
    fn no_leak_across_many_url_changes() {
        let surface = RecordingSurface::default();
        let live = surface.live.clone();
        let mut attachment = StreamAttachment::new(surface);

        for i in 0..20 {
            attachment.set_url(&format!("https://cdn/{i}.m3u8")).unwrap();
            assert_eq!(*live.borrow(), 1);
        }
        attachment.detach();
        assert_eq!(*live.borrow(), 0);
    }
}
