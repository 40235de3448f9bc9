use crate::catalog::{Catalog, Frame};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Next,
    Wrapped,
    /// A one-shot animation just showed its last frame.
    Finished,
    Stopped,
}

/// Which animation is showing and where in it we are.
#[derive(Clone, Debug, Default)]
pub(crate) struct Player {
    pub(crate) name: Option<String>,
    pub(crate) frame: usize,
    pub(crate) looping: bool,
    pub(crate) running: bool,
}

impl Player {
    pub(crate) fn start(&mut self, name: &str, looping: bool) {
        self.name = Some(name.to_string());
        self.frame = 0;
        self.looping = looping;
        self.running = true;
    }

    pub(crate) fn is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    pub(crate) fn advance(&mut self, frame_count: usize) -> Step {
        if !self.running || frame_count == 0 {
            return Step::Stopped;
        }
        if self.frame + 1 < frame_count {
            self.frame += 1;
            Step::Next
        } else if self.looping {
            self.frame = 0;
            Step::Wrapped
        } else {
            self.running = false;
            Step::Finished
        }
    }

    /// Parks on the final frame.
    pub(crate) fn hold_last(&mut self, frame_count: usize) {
        self.frame = frame_count.saturating_sub(1);
        self.running = false;
    }

    pub(crate) fn current<'a>(&self, catalog: &'a Catalog) -> Option<&'a Frame> {
        let anim = catalog.get(self.name.as_deref()?)?;
        anim.frames.get(self.frame).or_else(|| anim.frames.last())
    }
}
