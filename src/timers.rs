//! Named, cancellable timers on a millisecond clock.
//!
//! Each `TimerKind` has at most one pending deadline. Starting a timer that
//! is already running replaces it.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum TimerKind {
    AfkNext,
    AnimFrame,
    ActivityStep,
    ActivityEnd,
    IdleReturn,
    MouseCheck,
    MouseIdle,
    Proximity,
    Zzz,
    StartAfk,
    HideSeekDetect,
    ShowdownShoot,
    ShowdownSlide,
    ShowdownDifficulty,
    ShowdownStrong,
    BulletStep,
    StrongStep,
    DyingClose,
}

impl TimerKind {
    /// Timers owned by whatever activity is running; cancelled on every
    /// activity change.
    pub(crate) const ACTIVITY_SCOPED: [TimerKind; 11] = [
        TimerKind::ActivityStep,
        TimerKind::ActivityEnd,
        TimerKind::IdleReturn,
        TimerKind::Zzz,
        TimerKind::HideSeekDetect,
        TimerKind::ShowdownShoot,
        TimerKind::ShowdownSlide,
        TimerKind::ShowdownDifficulty,
        TimerKind::ShowdownStrong,
        TimerKind::BulletStep,
        TimerKind::StrongStep,
    ];
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    kind: TimerKind,
    due: u64,
    every: Option<u64>,
    seq: u64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Timers {
    entries: Vec<Entry>,
    seq: u64,
}

impl Timers {
    pub(crate) fn start_once(&mut self, kind: TimerKind, now: u64, delay_ms: u64) {
        self.insert(kind, now + delay_ms, None);
    }

    pub(crate) fn start_repeating(&mut self, kind: TimerKind, now: u64, every_ms: u64) {
        let every = every_ms.max(1);
        self.insert(kind, now + every, Some(every));
    }

    fn insert(&mut self, kind: TimerKind, due: u64, every: Option<u64>) {
        self.stop(kind);
        self.seq += 1;
        self.entries.push(Entry {
            kind,
            due,
            every,
            seq: self.seq,
        });
    }

    pub(crate) fn stop(&mut self, kind: TimerKind) {
        self.entries.retain(|e| e.kind != kind);
    }

    pub(crate) fn stop_all(&mut self, kinds: &[TimerKind]) {
        self.entries.retain(|e| !kinds.contains(&e.kind));
    }

    pub(crate) fn is_active(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub(crate) fn due_at(&self, kind: TimerKind) -> Option<u64> {
        self.entries.iter().find(|e| e.kind == kind).map(|e| e.due)
    }

    /// Removes and returns the earliest timer due at or before `until`.
    /// Repeating timers are re-armed for their next period before return.
    pub(crate) fn pop_due(&mut self, until: u64) -> Option<(u64, TimerKind)> {
        let i = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;

        let e = self.entries[i];
        match e.every {
            Some(every) => {
                self.seq += 1;
                self.entries[i].due = e.due + every;
                self.entries[i].seq = self.seq;
            }
            None => {
                self.entries.swap_remove(i);
            }
        }
        Some((e.due, e.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_time_order() {
        let mut t = Timers::default();
        t.start_once(TimerKind::AfkNext, 0, 300);
        t.start_once(TimerKind::IdleReturn, 0, 100);
        t.start_once(TimerKind::Zzz, 0, 100);

        assert_eq!(t.pop_due(1000), Some((100, TimerKind::IdleReturn)));
        assert_eq!(t.pop_due(1000), Some((100, TimerKind::Zzz)));
        assert_eq!(t.pop_due(1000), Some((300, TimerKind::AfkNext)));
        assert_eq!(t.pop_due(1000), None);
    }

    #[test]
    fn restart_replaces_deadline() {
        let mut t = Timers::default();
        t.start_once(TimerKind::AfkNext, 0, 100);
        t.start_once(TimerKind::AfkNext, 50, 500);
        assert_eq!(t.pop_due(200), None);
        assert_eq!(t.due_at(TimerKind::AfkNext), Some(550));
    }

    #[test]
    fn repeating_rearms() {
        let mut t = Timers::default();
        t.start_repeating(TimerKind::MouseCheck, 0, 100);
        assert_eq!(t.pop_due(250), Some((100, TimerKind::MouseCheck)));
        assert_eq!(t.pop_due(250), Some((200, TimerKind::MouseCheck)));
        assert_eq!(t.pop_due(250), None);
        assert!(t.is_active(TimerKind::MouseCheck));
        t.stop(TimerKind::MouseCheck);
        assert!(!t.is_active(TimerKind::MouseCheck));
    }

    #[test]
    fn stop_all_leaves_others() {
        let mut t = Timers::default();
        t.start_once(TimerKind::ActivityEnd, 0, 10);
        t.start_once(TimerKind::Zzz, 0, 10);
        t.start_once(TimerKind::AfkNext, 0, 10);
        t.stop_all(&TimerKind::ACTIVITY_SCOPED);
        assert_eq!(t.pop_due(10), Some((10, TimerKind::AfkNext)));
        assert_eq!(t.pop_due(10), None);
    }
}
