/// Handle for a pending frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Handle for a registered resize listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Host-side scheduling the engine relies on.
///
/// The host calls [`crate::HeroEngine::tick`] when a requested frame fires and
/// [`crate::HeroEngine::resize`] when a registered listener observes a viewport change.
pub trait FrameHost {
    /// Ask for one more frame callback.
    fn request_frame(&mut self) -> FrameToken;

    /// Drop a pending request.
    fn cancel_frame(&mut self, token: FrameToken);

    /// Start delivering viewport resizes.
    fn add_resize_listener(&mut self) -> ListenerId;

    /// Stop delivering viewport resizes.
    fn remove_resize_listener(&mut self, id: ListenerId);
}

/// Host that hands out tokens and schedules nothing. For hosts that drive `tick` on their own clock.
#[derive(Clone, Debug, Default)]
pub struct NullHost {
    next: u64,
}

impl NullHost {
    /// Fresh host.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl FrameHost for NullHost {
    fn request_frame(&mut self) -> FrameToken {
        FrameToken(self.next_id())
    }

    fn cancel_frame(&mut self, _token: FrameToken) {}

    fn add_resize_listener(&mut self) -> ListenerId {
        ListenerId(self.next_id())
    }

    fn remove_resize_listener(&mut self, _id: ListenerId) {}
}

/// Where a host should place the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OverlayPlacement {
    /// Cover the whole viewport.
    pub fill_viewport: bool,
    /// Stacking order relative to page content; above the page background.
    pub z_index: i32,
    /// Whether the surface receives pointer input.
    pub pointer_events: bool,
}

impl OverlayPlacement {
    /// Full-viewport overlay above the background that lets pointer input through.
    pub const HERO: Self = Self {
        fill_viewport: true,
        z_index: 0,
        pointer_events: false,
    };
}
