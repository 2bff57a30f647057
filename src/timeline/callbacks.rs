/// Host hooks invoked at most once each: `on_reveal` and `on_complete`.
///
/// The latches live here so every path (live run, skipped replay, teardown) shares one
/// exactly-once guarantee.
#[derive(Default)]
pub struct Callbacks {
    on_reveal: Option<Box<dyn FnMut()>>,
    on_complete: Option<Box<dyn FnMut()>>,
    revealed: bool,
    completed: bool,
}

impl Callbacks {
    /// No hooks installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the reveal hook.
    pub fn on_reveal(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_reveal = Some(Box::new(f));
        self
    }

    /// Install the completion hook.
    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Whether reveal already fired.
    pub fn has_revealed(&self) -> bool {
        self.revealed
    }

    /// Whether completion already fired.
    pub fn has_completed(&self) -> bool {
        self.completed
    }

    /// Fire the reveal hook unless it already fired. Returns `true` on the firing call.
    pub(crate) fn fire_reveal(&mut self) -> bool {
        if self.revealed {
            return false;
        }
        self.revealed = true;
        if let Some(f) = self.on_reveal.as_mut() {
            f();
        }
        true
    }

    /// Fire the completion hook unless it already fired. Returns `true` on the firing call.
    pub(crate) fn fire_complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        if let Some(f) = self.on_complete.as_mut() {
            f();
        }
        true
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_reveal", &self.on_reveal.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("revealed", &self.revealed)
            .field("completed", &self.completed)
            .finish()
    }
}
