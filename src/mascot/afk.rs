//! The AFK loop: weighted random behaviours while the user is away.

use super::{rides::RideKind, walk_animation, Activity, Mascot, SitPose};
use crate::config::AfkBehaviorSettings;
use crate::geometry::{Direction, Point};
use crate::timers::TimerKind;

const WALK_STEP_MS: u64 = 50;
const RUN_AFTER_MS: u64 = 10_000;
/// Walks look this many steps ahead when choosing a direction.
const LOOKAHEAD_STEPS: i32 = 50;
const PICK_MARGIN: i32 = 50;
const STOP_MARGIN: i32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AfkChoice {
    Walk,
    Sit,
    Dance,
    Character,
    Sleep,
    Fall,
    Cart,
    FollowMouse,
    Minigame,
    WhaleMail,
}

impl AfkChoice {
    const WEIGHTS: [(AfkChoice, u32, &'static str); 10] = [
        (AfkChoice::Walk, 35, "enable_walking"),
        (AfkChoice::Sit, 20, "enable_sitting"),
        (AfkChoice::Dance, 10, "enable_dancing"),
        (AfkChoice::Character, 8, "enable_character_interactions"),
        (AfkChoice::Sleep, 5, "enable_sleeping"),
        (AfkChoice::Fall, 3, "enable_falling"),
        (AfkChoice::Cart, 6, "enable_cart_rides"),
        (AfkChoice::FollowMouse, 5, "enable_mouse_following"),
        (AfkChoice::Minigame, 5, "enable_minigames"),
        (AfkChoice::WhaleMail, 3, "enable_whale_mail"),
    ];
}

impl Mascot {
    /// Takes the behaviour toggles from `draft`. The mode flag stays with
    /// `toggle_afk_mode` and any game holding AFK off.
    pub(crate) fn apply_afk_toggles(&mut self, draft: &AfkBehaviorSettings) {
        let mode = self.settings.afk_behavior.afk_mode_enabled;
        self.settings.afk_behavior = draft.clone();
        self.settings.afk_behavior.afk_mode_enabled = mode;
        tracing::info!(toggles = ?self.settings.afk_behavior, "AFK behaviour settings applied");
    }

    pub(crate) fn start_afk_loop(&mut self) {
        self.walking_since = None;
        self.resume_afk(2000, 5000);
    }

    pub(crate) fn stop_afk_loop(&mut self) {
        self.timers.stop(TimerKind::AfkNext);
        if matches!(self.activity, Activity::Walking { .. }) {
            self.timers.stop(TimerKind::ActivityStep);
            self.timers.stop(TimerKind::ActivityEnd);
            self.activity = Activity::Idle;
        }
        self.walking_since = None;
    }

    pub(crate) fn resume_afk(&mut self, lo_ms: u64, hi_ms: u64) {
        let delay = self.rng.range_u64(lo_ms, hi_ms);
        self.timers.start_once(TimerKind::AfkNext, self.now, delay);
    }

    pub(crate) fn pick_afk_behavior(&mut self) -> AfkChoice {
        let afk = &self.settings.afk_behavior;
        let enabled: Vec<(AfkChoice, u32)> = AfkChoice::WEIGHTS
            .iter()
            .filter(|(_, _, key)| afk.get(key).unwrap_or(false))
            .map(|(c, w, _)| (*c, *w))
            .collect();
        self.rng.weighted(&enabled).unwrap_or(AfkChoice::Walk)
    }

    pub(crate) fn afk_tick(&mut self) {
        if !self.settings.afk_behavior.afk_mode_enabled {
            tracing::debug!("AFK tick skipped: mode off");
            return;
        }
        if self.activity.is_special() || self.drag.is_some() {
            tracing::debug!(activity = self.activity.name(), "AFK tick blocked");
            return;
        }

        let choice = self.pick_afk_behavior();
        tracing::info!(?choice, "AFK behaviour");
        match choice {
            AfkChoice::Walk => self.afk_walk(),
            AfkChoice::Sit => {
                let pose = self.rng.choose(&SitPose::ALL).copied().unwrap_or(SitPose::Sitting);
                self.enter_sit(pose.animation());
                let ms = self.rng.range_u64(8000, 15_000);
                self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
            }
            AfkChoice::Dance => {
                self.start_eternal_dance();
                let ms = self.rng.range_u64(10_000, 20_000);
                self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
            }
            AfkChoice::Character => match self.random_anim("characters_interactions") {
                Some(name) => {
                    self.set_activity(Activity::Interaction);
                    self.start_animation(&name, false);
                    self.resume_afk(5000, 10_000);
                }
                None => self.afk_walk(),
            },
            AfkChoice::Sleep => {
                self.enter_sleep();
                let ms = self.rng.range_u64(8000, 20_000);
                self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
            }
            AfkChoice::Fall => {
                self.enter_fall();
                let ms = self.rng.range_u64(5000, 12_000);
                self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
            }
            AfkChoice::Cart => {
                let kind = if self.rng.roll(0.5) {
                    RideKind::Cart
                } else {
                    RideKind::MemeCart
                };
                self.start_ride(kind);
            }
            AfkChoice::FollowMouse => {
                self.apply_follow(true);
                let ms = self.rng.range_u64(15_000, 25_000);
                self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
            }
            AfkChoice::Minigame => {
                if self.rng.roll(0.5) {
                    self.start_hide_and_seek();
                } else {
                    self.start_showdown();
                }
            }
            AfkChoice::WhaleMail => self.start_ride(RideKind::WhaleMail),
        }
    }

    fn afk_walk(&mut self) {
        let since = *self.walking_since.get_or_insert(self.now);
        let running = self.now.saturating_sub(since) > RUN_AFTER_MS;
        let speed = if running { 4 } else { 2 };

        let size = self.size();
        let ahead = speed * LOOKAHEAD_STEPS;
        let fits = |p: Point| {
            p.x >= PICK_MARGIN
                && p.y >= PICK_MARGIN
                && p.x + size.w <= self.screen.w - PICK_MARGIN
                && p.y + size.h <= self.screen.h - PICK_MARGIN
        };
        let candidates: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| {
                let (ux, uy) = d.unit();
                fits(Point::new(self.pos.x + ux * ahead, self.pos.y + uy * ahead))
            })
            .collect();

        let Some(dir) = self.rng.choose(&candidates).copied() else {
            tracing::debug!("no room to walk, recentering");
            self.pos = self.centered_pos();
            self.walking_since = None;
            self.resume_afk(2000, 2000);
            return;
        };

        let exact = walk_animation(dir, running);
        let anim = if self.catalog.exists(&exact) {
            Some(exact)
        } else {
            self.catalog
                .by_category("walking")
                .iter()
                .find(|n| n.contains(dir.name()))
                .cloned()
        };

        let Some(anim) = anim else {
            if let Some(any) = self.random_anim("walking") {
                self.start_animation(&any, true);
            }
            self.resume_afk(3000, 6000);
            return;
        };

        let (ux, uy) = dir.unit();
        self.set_activity(Activity::Walking {
            dx: ux * speed,
            dy: uy * speed,
        });
        self.start_animation(&anim, true);
        let walk_ms = self.rng.range_u64(3000, 7000);
        self.timers
            .start_repeating(TimerKind::ActivityStep, self.now, WALK_STEP_MS);
        self.timers.start_once(TimerKind::ActivityEnd, self.now, walk_ms);
        let gap = self.rng.range_u64(1000, 3000);
        self.timers
            .start_once(TimerKind::AfkNext, self.now, walk_ms + gap);
        tracing::debug!(dir = dir.name(), running, walk_ms, "walking");
    }

    pub(crate) fn walk_step(&mut self) {
        let Activity::Walking { dx, dy } = self.activity else {
            return;
        };
        let next = Point::new(self.pos.x + dx, self.pos.y + dy);
        let size = self.size();
        let inside = next.x >= STOP_MARGIN
            && next.y >= STOP_MARGIN
            && next.x + size.w <= self.screen.w - STOP_MARGIN
            && next.y + size.h <= self.screen.h - STOP_MARGIN;
        if inside {
            self.pos = next;
        } else {
            self.end_walk();
        }
    }

    pub(crate) fn end_walk(&mut self) {
        self.set_activity(Activity::Idle);
        if let Some(name) = self.random_anim(super::SITTING) {
            self.start_animation(&name, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{mascot, only};
    use super::*;

    #[test]
    fn dialog_toggles_leave_a_suspended_mode_alone() {
        let mut m = mascot();
        assert!(m.start_showdown());
        assert!(!m.settings.afk_behavior.afk_mode_enabled);

        let mut draft = m.settings.afk_behavior.clone();
        draft.afk_mode_enabled = true;
        draft.enable_falling = false;
        m.apply_afk_toggles(&draft);
        assert!(!m.settings.afk_behavior.afk_mode_enabled);
        assert!(!m.settings.afk_behavior.enable_falling);
        assert!(m.settings_to_save().afk_behavior.afk_mode_enabled);
    }

    #[test]
    fn nothing_enabled_falls_back_to_walk() {
        let mut m = mascot();
        only(&mut m, "none");
        for _ in 0..20 {
            assert_eq!(m.pick_afk_behavior(), AfkChoice::Walk);
        }
    }

    #[test]
    fn only_enabled_behaviours_are_picked() {
        let mut m = mascot();
        only(&mut m, "enable_whale_mail");
        for _ in 0..20 {
            assert_eq!(m.pick_afk_behavior(), AfkChoice::WhaleMail);
        }
    }

    #[test]
    fn tick_skipped_when_mode_off_or_special() {
        let mut m = mascot();
        only(&mut m, "enable_walking");
        m.settings.afk_behavior.afk_mode_enabled = false;
        m.afk_tick();
        assert!(matches!(m.activity, Activity::Idle));

        m.settings.afk_behavior.afk_mode_enabled = true;
        m.toggle_sleep();
        m.afk_tick();
        assert!(matches!(m.activity, Activity::Sleeping));
    }

    #[test]
    fn walk_moves_then_sits() {
        let mut m = mascot();
        only(&mut m, "enable_walking");
        m.timers.stop(TimerKind::StartAfk);
        m.pos = m.centered_pos();
        let start = m.pos;
        m.afk_tick();
        assert!(matches!(m.activity, Activity::Walking { .. }));
        let anim = m.player.name.clone().unwrap();
        assert!(anim.starts_with("walking_spr_pl_") && !anim.contains("run"));
        m.advance(500);
        assert_ne!(m.pos, start);

        let end = m.timers.due_at(TimerKind::ActivityEnd).unwrap();
        m.advance(end - m.now);
        assert!(matches!(m.activity, Activity::Idle));
        let name = m.player.name.clone().unwrap();
        assert!(name.starts_with("sitting") || name == "spr_clover_casual");
        assert!(m.timers.due_at(TimerKind::AfkNext).unwrap() > m.now);
    }

    #[test]
    fn cramped_screen_recenters_and_retries() {
        let mut m = mascot();
        only(&mut m, "enable_walking");
        m.screen = crate::geometry::Size::new(120, 90);
        m.afk_tick();
        assert!(matches!(m.activity, Activity::Idle));
        assert_eq!(m.pos, m.centered_pos());
        assert_eq!(m.timers.due_at(TimerKind::AfkNext), Some(m.now + 2000));
    }

    #[test]
    fn afk_sit_ends_and_reschedules() {
        let mut m = mascot();
        only(&mut m, "enable_sitting");
        m.timers.stop(TimerKind::StartAfk);
        m.afk_tick();
        assert!(matches!(m.activity, Activity::Sitting));
        let end = m.timers.due_at(TimerKind::ActivityEnd).unwrap();
        assert!((8000..=15_000).contains(&end));
        m.advance(end);
        assert!(matches!(m.activity, Activity::Idle));
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn afk_sleep_wakes_by_itself() {
        let mut m = mascot();
        only(&mut m, "enable_sleeping");
        m.timers.stop(TimerKind::StartAfk);
        m.afk_tick();
        assert!(matches!(m.activity, Activity::Sleeping));
        let end = m.timers.due_at(TimerKind::ActivityEnd).unwrap();
        m.advance(end);
        assert!(matches!(m.activity, Activity::Idle));
        assert_eq!(m.zzz_frame, None);
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn afk_character_resumes_on_completion() {
        let mut m = mascot();
        only(&mut m, "enable_character_interactions");
        m.timers.stop(TimerKind::StartAfk);
        m.afk_tick();
        assert!(matches!(m.activity, Activity::Interaction));
        m.advance(1000);
        assert!(matches!(m.activity, Activity::Idle));
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }
}
