//! The behaviour coordinator.
//!
//! `Mascot` owns every piece of runtime state and a set of named timers on a
//! millisecond clock. The app feeds it pointer events and elapsed time; the
//! renderer reads it back. Nothing in here touches the terminal, so the
//! whole behaviour tree can be driven deterministically from tests.

pub(crate) mod afk;
pub(crate) mod edward;
pub(crate) mod hide_seek;
pub(crate) mod rides;
pub(crate) mod showdown;

use crate::catalog::{Catalog, Frame};
use crate::config::Settings;
use crate::geometry::{Direction, Point, Size, CELL_H, CELL_W};
use crate::meme::Meme;
use crate::player::{Player, Step};
use crate::rng::Rng;
use crate::timers::{TimerKind, Timers};
use std::collections::VecDeque;

pub(crate) use edward::EdwardWalk;
pub(crate) use hide_seek::{HidePhase, HideSeek};
pub(crate) use rides::{Ride, RideKind};
pub(crate) use showdown::{DuelPhase, Showdown};

pub(crate) const SITTING: &str = "sitting";
pub(crate) const DANCING: &str = "dancing";
const LYING: &str = "lying";
const SLEEP_BED: &str = "lying_bed";
const SLEEP_ZZZ: &str = "lying_zzz";
const FALLS: &str = "falls";
const DYING: &str = "dying";

const START_AFK_DELAY_MS: u64 = 3000;
const MOUSE_CHECK_MS: u64 = 100;
const ZZZ_MS: u64 = 800;
const FOLLOW_DANCE_MS: u64 = 10_000;

/// Sprite size used before any frame is known.
const FALLBACK_CELLS: (i32, i32) = (6, 4);

/// What the mascot is doing. Exactly one at a time.
#[derive(Clone, Debug)]
pub(crate) enum Activity {
    Idle,
    Walking { dx: i32, dy: i32 },
    Sitting,
    EternalDance,
    TimedDance,
    FollowMouse { since: u64 },
    Sleeping,
    Falling,
    Interaction,
    Ride(Ride),
    HideAndSeek(HideSeek),
    Showdown(Showdown),
    Edward(EdwardWalk),
    Dying,
}

impl Activity {
    /// Special modes block the AFK picker.
    pub(crate) fn is_special(&self) -> bool {
        !matches!(
            self,
            Activity::Idle | Activity::Walking { .. } | Activity::Sitting
        )
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::Walking { .. } => "walking",
            Activity::Sitting => "sitting",
            Activity::EternalDance => "eternal_dance",
            Activity::TimedDance => "timed_dance",
            Activity::FollowMouse { .. } => "follow_mouse",
            Activity::Sleeping => "sleeping",
            Activity::Falling => "falling",
            Activity::Interaction => "interaction",
            Activity::Ride(_) => "ride",
            Activity::HideAndSeek(_) => "hide_and_seek",
            Activity::Showdown(_) => "showdown",
            Activity::Edward(_) => "edward",
            Activity::Dying => "dying",
        }
    }
}

/// Sit poses offered by the context menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SitPose {
    Wind,
    Sitting,
    Dark,
    Casual,
}

impl SitPose {
    pub(crate) const ALL: [SitPose; 4] = [
        SitPose::Wind,
        SitPose::Sitting,
        SitPose::Dark,
        SitPose::Casual,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SitPose::Wind => "Sit Wind",
            SitPose::Sitting => "Sitting",
            SitPose::Dark => "Sit Dark",
            SitPose::Casual => "Casual",
        }
    }

    pub(crate) fn animation(self) -> &'static str {
        match self {
            SitPose::Wind => "sitting_spr_colver_wind",
            SitPose::Sitting => "sitting_spr_clover_sitting",
            SitPose::Dark => "sitting_spr_clover_sit_dark",
            SitPose::Casual => "spr_clover_casual",
        }
    }
}

/// Last known pointer position and whether it has gone quiet.
#[derive(Clone, Debug, Default)]
pub(crate) struct Pointer {
    pub(crate) pos: Point,
    last_polled: Point,
    pub(crate) idle: bool,
}

/// A meme hanging from the meme cart or dropped on the screen.
#[derive(Clone, Debug)]
pub(crate) struct MemeCard {
    pub(crate) meme: Meme,
    pub(crate) pos: Point,
    pub(crate) released: bool,
}

impl MemeCard {
    pub(crate) const COLS: i32 = 30;
    pub(crate) const ROWS: i32 = 7;

    pub(crate) fn size() -> Size {
        Size::new(Self::COLS * CELL_W, Self::ROWS * CELL_H)
    }

    pub(crate) fn contains(&self, p: Point) -> bool {
        let s = Self::size();
        p.x >= self.pos.x && p.x < self.pos.x + s.w && p.y >= self.pos.y && p.y < self.pos.y + s.h
    }
}

pub(crate) struct Mascot {
    pub(crate) catalog: Catalog,
    pub(crate) settings: Settings,
    pub(crate) rng: Rng,
    pub(crate) now: u64,
    pub(crate) timers: Timers,
    pub(crate) player: Player,
    /// Top-left corner in virtual pixels.
    pub(crate) pos: Point,
    pub(crate) screen: Size,
    /// Scale in effect; differs from the configured one while hiding.
    pub(crate) scale: f32,
    pub(crate) visible: bool,
    pub(crate) activity: Activity,
    pub(crate) pointer: Pointer,
    /// Grab offset while the user drags the sprite.
    pub(crate) drag: Option<Point>,
    pub(crate) had_afk_mode_enabled: bool,
    pub(crate) in_game: bool,
    pub(crate) walking_since: Option<u64>,
    pub(crate) zzz_frame: Option<usize>,
    pub(crate) meme: Option<MemeCard>,
    meme_requested: bool,
    notices: VecDeque<String>,
    pub(crate) quit: bool,
}

impl Mascot {
    pub(crate) fn new(catalog: Catalog, settings: Settings, screen: Size) -> Self {
        let rng = Rng::new(settings.seed);
        let pos = Point::new(settings.window.initial_x, settings.window.initial_y);
        let scale = settings.size.current_scale;
        let mut m = Self {
            catalog,
            settings,
            rng,
            now: 0,
            timers: Timers::default(),
            player: Player::default(),
            pos,
            screen,
            scale,
            visible: true,
            activity: Activity::Idle,
            pointer: Pointer::default(),
            drag: None,
            had_afk_mode_enabled: false,
            in_game: false,
            walking_since: None,
            zzz_frame: None,
            meme: None,
            meme_requested: false,
            notices: VecDeque::new(),
            quit: false,
        };

        let initial = m
            .catalog
            .first_in(SITTING)
            .map(str::to_owned)
            .or_else(|| m.catalog.all_names().first().map(|s| s.to_string()));
        if let Some(name) = initial {
            m.start_animation(&name, true);
        }

        m.timers
            .start_repeating(TimerKind::MouseCheck, 0, MOUSE_CHECK_MS);
        let every = m.settings.behavior.proximity_check_interval;
        m.timers.start_repeating(TimerKind::Proximity, 0, every);
        m.timers.start_once(TimerKind::StartAfk, 0, START_AFK_DELAY_MS);
        m
    }

    /* -----------------------------
       Clock
    ------------------------------ */

    /// Moves the clock forward, firing due timers in time order.
    pub(crate) fn advance(&mut self, dt_ms: u64) {
        let target = self.now + dt_ms;
        while let Some((due, kind)) = self.timers.pop_due(target) {
            self.now = due;
            self.on_timer(kind);
            if self.quit {
                break;
            }
        }
        self.now = self.now.max(target);
    }

    fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::AfkNext => self.afk_tick(),
            TimerKind::AnimFrame => self.next_frame(),
            TimerKind::ActivityStep => self.activity_step(),
            TimerKind::ActivityEnd => self.activity_end(),
            TimerKind::IdleReturn => self.return_to_idle(),
            TimerKind::MouseCheck => self.poll_pointer(),
            TimerKind::MouseIdle => {
                if !self.pointer.idle {
                    self.pointer.idle = true;
                    tracing::debug!("pointer idle");
                }
            }
            TimerKind::Proximity => self.check_proximity(),
            TimerKind::Zzz => self.next_zzz_frame(),
            TimerKind::StartAfk => self.start_afk_loop(),
            TimerKind::HideSeekDetect => self.hide_seek_check_timeout(),
            TimerKind::ShowdownShoot => self.fire_heart_shot(),
            TimerKind::ShowdownSlide => self.showdown_slide(),
            TimerKind::ShowdownDifficulty => self.showdown_ramp(),
            TimerKind::ShowdownStrong => self.fire_strong_shot(),
            TimerKind::BulletStep => self.step_hearts(),
            TimerKind::StrongStep => self.step_strong_shots(),
            TimerKind::DyingClose => {
                tracing::info!("goodbye");
                self.quit = true;
            }
        }
    }

    fn activity_step(&mut self) {
        match self.activity {
            Activity::Walking { .. } => self.walk_step(),
            Activity::FollowMouse { .. } => self.follow_step(),
            Activity::Ride(_) => self.ride_step(),
            Activity::HideAndSeek(_) => self.hide_seek_step(),
            Activity::Edward(_) => self.edward_step(),
            _ => self.timers.stop(TimerKind::ActivityStep),
        }
    }

    /// Duration-bound activities end here. Only the AFK picker arms this
    /// timer for the simple modes, so each one resumes the AFK loop.
    fn activity_end(&mut self) {
        match self.activity {
            Activity::Walking { .. } => self.end_walk(),
            Activity::Sitting => {
                self.return_to_idle();
                self.resume_afk(2000, 5000);
            }
            Activity::EternalDance => {
                self.stop_eternal_dance();
                self.resume_afk(3000, 8000);
            }
            Activity::TimedDance => self.stop_timed_dance(),
            Activity::FollowMouse { .. } => {
                self.apply_follow(false);
                self.resume_afk(2000, 5000);
            }
            Activity::Sleeping | Activity::Falling => {
                self.return_to_afk_mode();
                self.resume_afk(2000, 5000);
            }
            Activity::HideAndSeek(_) => self.hide_seek_phase_done(),
            Activity::Showdown(_) => self.showdown_phase_done(),
            Activity::Edward(_) => self.edward_next(),
            _ => {}
        }
    }

    /// Switches activity and cancels whatever the old one had scheduled.
    pub(crate) fn set_activity(&mut self, next: Activity) {
        self.timers.stop_all(&TimerKind::ACTIVITY_SCOPED);
        self.zzz_frame = None;
        if self.activity.name() != next.name() {
            tracing::debug!(from = self.activity.name(), to = next.name(), "activity");
        }
        self.activity = next;
    }

    /// Modes that own the mascot until they finish on their own.
    pub(crate) fn busy(&self) -> bool {
        matches!(
            self.activity,
            Activity::Ride(_)
                | Activity::HideAndSeek(_)
                | Activity::Showdown(_)
                | Activity::Edward(_)
                | Activity::Dying
        )
    }

    /* -----------------------------
       Animation playback
    ------------------------------ */

    /// Unknown names leave the current animation alone.
    pub(crate) fn start_animation(&mut self, name: &str, looping: bool) -> bool {
        let Some(rate) = self.catalog.get(name).map(|a| a.frame_rate_ms) else {
            tracing::debug!(animation = name, "animation not found");
            return false;
        };
        self.player.start(name, looping);
        self.timers
            .start_repeating(TimerKind::AnimFrame, self.now, rate);
        true
    }

    fn frame_count(&self) -> usize {
        self.player
            .name
            .as_deref()
            .and_then(|n| self.catalog.get(n))
            .map(|a| a.frames.len())
            .unwrap_or(0)
    }

    fn next_frame(&mut self) {
        let count = self.frame_count();
        match self.player.advance(count) {
            Step::Next | Step::Wrapped => {}
            Step::Finished => {
                self.timers.stop(TimerKind::AnimFrame);
                self.on_animation_complete();
            }
            Step::Stopped => self.timers.stop(TimerKind::AnimFrame),
        }
    }

    pub(crate) fn hold_last_frame(&mut self) {
        let count = self.frame_count();
        self.player.hold_last(count);
        self.timers.stop(TimerKind::AnimFrame);
    }

    fn on_animation_complete(&mut self) {
        match self.activity {
            Activity::Edward(_)
            | Activity::HideAndSeek(_)
            | Activity::Showdown(_)
            | Activity::Dying => {}
            Activity::Interaction => {
                self.set_activity(Activity::Idle);
                self.resume_afk(3000, 8000);
            }
            _ => {
                if !self.timers.is_active(TimerKind::IdleReturn) {
                    self.timers.start_once(TimerKind::IdleReturn, self.now, 500);
                }
            }
        }
    }

    pub(crate) fn first_anim(&self, category: &str) -> Option<String> {
        self.catalog.first_in(category).map(str::to_owned)
    }

    pub(crate) fn random_anim(&mut self, category: &str) -> Option<String> {
        self.catalog
            .random_from_category(category, &mut self.rng)
            .map(str::to_owned)
    }

    pub(crate) fn play_first_sitting(&mut self) {
        if let Some(name) = self.first_anim(SITTING) {
            self.start_animation(&name, true);
        }
    }

    /* -----------------------------
       Sprite geometry
    ------------------------------ */

    pub(crate) fn frame(&self) -> Option<&Frame> {
        self.player.current(&self.catalog)
    }

    /// Sprite footprint in terminal cells at the current scale.
    pub(crate) fn sprite_cells(&self) -> (i32, i32) {
        let (w, h) = self
            .frame()
            .map(|f| (f.w as i32, f.h() as i32))
            .unwrap_or(FALLBACK_CELLS);
        (scaled(w, self.scale), scaled(h, self.scale))
    }

    pub(crate) fn size(&self) -> Size {
        let (c, r) = self.sprite_cells();
        Size::new(c * CELL_W, r * CELL_H)
    }

    pub(crate) fn center(&self) -> Point {
        let s = self.size();
        Point::new(self.pos.x + s.w / 2, self.pos.y + s.h / 2)
    }

    pub(crate) fn centered_pos(&self) -> Point {
        let s = self.size();
        Point::new((self.screen.w - s.w) / 2, (self.screen.h - s.h) / 2)
    }

    pub(crate) fn hit(&self, p: Point) -> bool {
        let s = self.size();
        self.visible
            && p.x >= self.pos.x
            && p.x < self.pos.x + s.w
            && p.y >= self.pos.y
            && p.y < self.pos.y + s.h
    }

    pub(crate) fn clamp_to_screen(&self, p: Point) -> Point {
        let s = self.size();
        Point::new(
            p.x.clamp(0, (self.screen.w - s.w).max(0)),
            p.y.clamp(0, (self.screen.h - s.h).max(0)),
        )
    }

    pub(crate) fn set_screen(&mut self, screen: Size) {
        self.screen = screen;
        if !self.busy() {
            self.pos = self.clamp_to_screen(self.pos);
        }
    }

    /// The "zzz" overlay frame and its top-left corner, while sleeping.
    pub(crate) fn zzz_overlay(&self) -> Option<(&Frame, Point)> {
        let idx = self.zzz_frame?;
        let frame = self.catalog.get(SLEEP_ZZZ)?.frames.get(idx)?;
        let (w, h) = (
            scaled(frame.w as i32, self.scale) * CELL_W,
            scaled(frame.h() as i32, self.scale) * CELL_H,
        );
        let lift = idx as i32 * (10.0 * self.scale) as i32;
        let gap = (5.0 * self.scale) as i32;
        let c = self.center();
        Some((frame, Point::new(c.x - w / 2, self.pos.y - h - gap - lift)))
    }

    /* -----------------------------
       Pointer
    ------------------------------ */

    pub(crate) fn pointer_moved(&mut self, p: Point) {
        self.pointer.pos = p;
        if let Some(off) = self.drag {
            self.pos = Point::new(p.x - off.x, p.y - off.y);
        }
    }

    fn poll_pointer(&mut self) {
        if self.pointer.pos == self.pointer.last_polled {
            return;
        }
        self.pointer.last_polled = self.pointer.pos;
        if self.pointer.idle {
            self.pointer.idle = false;
            tracing::debug!("pointer active");
        }
        let threshold = self.settings.behavior.mouse_idle_threshold;
        self.timers
            .start_once(TimerKind::MouseIdle, self.now, threshold);
    }

    pub(crate) fn pointer_distance(&self) -> f32 {
        self.center().distance_to(self.pointer.pos)
    }

    pub(crate) fn pointer_near(&self, threshold: f32) -> bool {
        self.pointer_distance() <= threshold
    }

    pub(crate) fn pointer_direction(&self) -> Direction {
        let c = self.center();
        Direction::dominant(self.pointer.pos.x - c.x, self.pointer.pos.y - c.y)
    }

    /// Left press. Returns true when the press hit something we own.
    pub(crate) fn press_left(&mut self, p: Point) -> bool {
        self.pointer.pos = p;
        if self.meme.as_ref().is_some_and(|c| c.released && c.contains(p)) {
            self.meme = None;
            tracing::debug!("meme dismissed");
            return true;
        }
        if !self.hit(p) {
            return false;
        }
        if let Activity::HideAndSeek(h) = &self.activity {
            if matches!(h.phase, HidePhase::Waiting { .. }) {
                self.hide_seek_found();
                return true;
            }
        }
        self.drag = Some(Point::new(p.x - self.pos.x, p.y - self.pos.y));
        true
    }

    pub(crate) fn release_left(&mut self) {
        self.drag = None;
    }

    fn check_proximity(&mut self) {
        if !matches!(self.activity, Activity::Idle)
            || self.drag.is_some()
            || !self.visible
            || self.timers.is_active(TimerKind::IdleReturn)
        {
            return;
        }
        let b = &self.settings.behavior;
        let (threshold, p) = (b.mouse_proximity_threshold, b.reaction_probability);
        if !self.pointer_near(threshold) || !self.rng.roll(p) {
            return;
        }

        let mut reactions: Vec<(String, u64)> = Vec::new();
        for (category, hold_ms) in [("nod", 1500), ("poses", 2000)] {
            for name in self.catalog.by_category(category) {
                reactions.push((name.clone(), hold_ms));
            }
        }
        let Some((name, hold_ms)) = self.rng.choose(&reactions).cloned() else {
            return;
        };
        tracing::debug!(animation = %name, "reacting to pointer");
        if self.start_animation(&name, false) {
            self.timers
                .start_once(TimerKind::IdleReturn, self.now, hold_ms);
        }
    }

    /* -----------------------------
       User-facing modes
    ------------------------------ */

    /// Any deliberate action by the user.
    pub(crate) fn user_interaction(&mut self) {
        match self.activity {
            Activity::EternalDance => {
                self.stop_eternal_dance();
                return;
            }
            Activity::Sleeping | Activity::Falling => {
                self.return_to_afk_mode();
                return;
            }
            _ => {}
        }
        self.stop_afk_loop();
    }

    pub(crate) fn return_to_idle(&mut self) {
        if matches!(
            self.activity,
            Activity::Sleeping | Activity::FollowMouse { .. }
        ) {
            return;
        }
        self.set_activity(Activity::Idle);
        if let Some(name) = self.random_anim(SITTING) {
            self.start_animation(&name, true);
        }
    }

    /// Drops every mode and hands the mascot back to the AFK loop.
    pub(crate) fn return_to_afk_mode(&mut self) {
        self.stop_afk_loop();
        self.set_activity(Activity::Idle);
        self.play_first_sitting();
        self.start_afk_loop();
        self.return_to_idle();
    }

    pub(crate) fn toggle_dance(&mut self) {
        if matches!(self.activity, Activity::EternalDance) {
            self.stop_eternal_dance();
        } else {
            self.start_eternal_dance();
        }
    }

    pub(crate) fn start_eternal_dance(&mut self) {
        self.stop_afk_loop();
        self.set_activity(Activity::EternalDance);
        if let Some(name) = self.first_anim(DANCING) {
            self.start_animation(&name, true);
        }
    }

    pub(crate) fn stop_eternal_dance(&mut self) {
        self.set_activity(Activity::Idle);
        self.start_afk_loop();
        self.return_to_idle();
    }

    pub(crate) fn start_timed_dance(&mut self, ms: u64) {
        self.stop_afk_loop();
        self.set_activity(Activity::TimedDance);
        if let Some(name) = self.first_anim(DANCING) {
            self.start_animation(&name, true);
        }
        self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
    }

    fn stop_timed_dance(&mut self) {
        self.set_activity(Activity::Idle);
        self.start_afk_loop();
        self.return_to_idle();
    }

    pub(crate) fn toggle_follow_mouse(&mut self) {
        let on = !matches!(self.activity, Activity::FollowMouse { .. });
        self.user_interaction();
        self.apply_follow(on);
    }

    pub(crate) fn apply_follow(&mut self, on: bool) {
        if on {
            self.stop_afk_loop();
            self.set_activity(Activity::FollowMouse { since: self.now });
            let every = self.settings.behavior.mouse_follow_update_rate;
            self.timers
                .start_repeating(TimerKind::ActivityStep, self.now, every);
        } else {
            if matches!(self.activity, Activity::FollowMouse { .. }) {
                self.set_activity(Activity::Idle);
            }
            if !self.activity.is_special() {
                self.start_afk_loop();
            }
            self.return_to_idle();
        }
    }

    fn follow_step(&mut self) {
        let Activity::FollowMouse { since } = self.activity else {
            return;
        };
        let c = self.center();
        let (dx, dy) = (self.pointer.pos.x - c.x, self.pointer.pos.y - c.y);
        let distance = c.distance_to(self.pointer.pos);

        if distance < 50.0 {
            self.start_timed_dance(FOLLOW_DANCE_MS);
            return;
        }

        let elapsed = self.now.saturating_sub(since);
        let (speed, running) = if elapsed > 20_000 {
            (24.0, true)
        } else if elapsed > 10_000 {
            (12.0, true)
        } else {
            (6.0, false)
        };

        let anim = walk_animation(Direction::dominant(dx, dy), running);
        if !self.player.is(&anim) {
            self.start_animation(&anim, true);
        }
        let next = Point::new(
            self.pos.x + (dx as f32 / distance * speed) as i32,
            self.pos.y + (dy as f32 / distance * speed) as i32,
        );
        self.pos = self.clamp_to_screen(next);
    }

    pub(crate) fn toggle_sleep(&mut self) {
        if matches!(self.activity, Activity::Sleeping) {
            self.return_to_afk_mode();
        } else {
            self.user_interaction();
            self.enter_sleep();
        }
    }

    pub(crate) fn enter_sleep(&mut self) {
        self.stop_afk_loop();
        self.set_activity(Activity::Sleeping);
        let bed = if self.catalog.exists(SLEEP_BED) {
            Some(SLEEP_BED.to_string())
        } else {
            self.catalog
                .by_category(LYING)
                .iter()
                .find(|n| !n.contains("zzz"))
                .cloned()
        };
        if let Some(name) = bed {
            self.start_animation(&name, true);
        }
        if self.catalog.exists(SLEEP_ZZZ) {
            self.zzz_frame = Some(0);
            self.timers.start_repeating(TimerKind::Zzz, self.now, ZZZ_MS);
        }
    }

    fn next_zzz_frame(&mut self) {
        let count = self
            .catalog
            .get(SLEEP_ZZZ)
            .map(|a| a.frames.len())
            .unwrap_or(0);
        match self.zzz_frame {
            Some(f) if count > 0 => self.zzz_frame = Some((f + 1) % count),
            _ => self.timers.stop(TimerKind::Zzz),
        }
    }

    pub(crate) fn toggle_fall(&mut self) {
        if matches!(self.activity, Activity::Falling) {
            self.return_to_afk_mode();
        } else {
            self.user_interaction();
            self.enter_fall();
        }
    }

    pub(crate) fn enter_fall(&mut self) {
        self.stop_afk_loop();
        self.set_activity(Activity::Falling);
        match self.first_anim(FALLS) {
            Some(name) => {
                self.start_animation(&name, true);
            }
            None => tracing::warn!("no fall animations found"),
        }
    }

    pub(crate) fn sit(&mut self, pose: SitPose) {
        self.user_interaction();
        self.enter_sit(pose.animation());
    }

    pub(crate) fn enter_sit(&mut self, animation: &str) {
        self.stop_afk_loop();
        self.set_activity(Activity::Sitting);
        let sitting = self.catalog.by_category(SITTING);
        let target = sitting
            .iter()
            .find(|n| n.as_str() == animation)
            .or_else(|| sitting.first())
            .cloned();
        if let Some(name) = target {
            self.start_animation(&name, true);
        }
    }

    pub(crate) fn start_character_interaction(&mut self, animation: &str) {
        if !self.catalog.exists(animation) {
            tracing::warn!(animation, "unknown character interaction");
            return;
        }
        self.user_interaction();
        self.stop_afk_loop();
        self.set_activity(Activity::Interaction);
        self.start_animation(animation, false);
    }

    /// Applies a scale from the size menu.
    pub(crate) fn set_scale(&mut self, scale: f32) {
        self.settings.size.current_scale = scale;
        match &mut self.activity {
            Activity::HideAndSeek(h) => h.saved_scale = scale,
            _ => self.scale = scale,
        }
        tracing::info!(scale, name = self.settings.size.current_name(), "size changed");
    }

    pub(crate) fn toggle_afk_mode(&mut self) {
        let on = !self.settings.afk_behavior.afk_mode_enabled;
        self.settings.afk_behavior.afk_mode_enabled = on;
        tracing::info!(enabled = on, "AFK mode toggled");
        if on {
            self.return_to_afk_mode();
        } else {
            self.timers.stop(TimerKind::AfkNext);
        }
    }

    pub(crate) fn disable_afk_temporarily(&mut self) {
        self.settings.afk_behavior.afk_mode_enabled = false;
        self.had_afk_mode_enabled = true;
        self.timers.stop(TimerKind::AfkNext);
        tracing::debug!("AFK mode temporarily disabled");
    }

    pub(crate) fn re_enable_afk(&mut self) {
        self.settings.afk_behavior.afk_mode_enabled = true;
        self.had_afk_mode_enabled = false;
        tracing::debug!("AFK mode re-enabled");
        self.return_to_afk_mode();
    }

    pub(crate) fn toggle_visibility(&mut self) {
        self.visible = !self.visible;
        let text = if self.visible {
            "Mascot is now visible."
        } else {
            "Mascot hidden. Press t to show it again."
        };
        self.notify(text);
    }

    /// Exit through the dying animation.
    pub(crate) fn start_dying(&mut self) {
        if matches!(self.activity, Activity::Dying) {
            return;
        }
        if self.settings.afk_behavior.afk_mode_enabled {
            self.disable_afk_temporarily();
        }
        self.user_interaction();
        self.set_activity(Activity::Dying);
        self.drag = None;

        let Some(name) = self.first_anim(DYING) else {
            tracing::info!("no dying animation, closing");
            self.quit = true;
            return;
        };
        self.start_animation(&name, false);
        let delay = self
            .catalog
            .get(DYING)
            .map(|a| 50 * a.frame_rate_ms + 500)
            .unwrap_or(3000);
        self.timers.start_once(TimerKind::DyingClose, self.now, delay);
    }

    /* -----------------------------
       Notices and the meme channel
    ------------------------------ */

    pub(crate) fn notify(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(notice = %text);
        self.notices.push_back(text);
    }

    pub(crate) fn take_notice(&mut self) -> Option<String> {
        self.notices.pop_front()
    }

    pub(crate) fn take_meme_request(&mut self) -> bool {
        std::mem::take(&mut self.meme_requested)
    }

    /// Settings as they should be persisted: a temporary AFK suspension is
    /// not the user's choice.
    pub(crate) fn settings_to_save(&self) -> Settings {
        let mut s = self.settings.clone();
        if self.had_afk_mode_enabled {
            s.afk_behavior.afk_mode_enabled = true;
        }
        s.window.initial_x = self.pos.x;
        s.window.initial_y = self.pos.y;
        s
    }
}

pub(crate) fn walk_animation(dir: Direction, running: bool) -> String {
    if running {
        format!("walking_spr_pl_run_{}", dir.name())
    } else {
        format!("walking_spr_pl_{}", dir.name())
    }
}

fn scaled(n: i32, scale: f32) -> i32 {
    ((n as f32 * scale).round() as i32).max(1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::builtin;
    use crate::config::AnimationSettings;

    pub(crate) fn mascot() -> Mascot {
        let mut settings = Settings::default();
        settings.seed = 7;
        let catalog = builtin::catalog(&AnimationSettings::default());
        Mascot::new(catalog, settings, Size::new(640, 384))
    }

    /// Only the named AFK behaviour stays enabled.
    pub(crate) fn only(m: &mut Mascot, key: &str) {
        let afk = &mut m.settings.afk_behavior;
        for k in crate::config::AfkBehaviorSettings::KEYS {
            if k != "afk_mode_enabled" {
                afk.set(k, k == key);
            }
        }
    }

    #[test]
    fn starts_sitting_and_schedules_afk() {
        let mut m = mascot();
        assert!(m.player.name.as_deref().unwrap().starts_with("sitting"));
        assert!(!m.timers.is_active(TimerKind::AfkNext));
        m.advance(3000);
        let due = m.timers.due_at(TimerKind::AfkNext).unwrap();
        assert!((5000..=8000).contains(&due));
    }

    #[test]
    fn unknown_animation_keeps_current() {
        let mut m = mascot();
        let before = m.player.name.clone();
        assert!(!m.start_animation("no_such_thing", true));
        assert_eq!(m.player.name, before);
    }

    #[test]
    fn stopping_dance_restarts_afk_loop() {
        let mut m = mascot();
        m.toggle_dance();
        assert!(matches!(m.activity, Activity::EternalDance));
        assert!(!m.timers.is_active(TimerKind::AfkNext));
        assert!(m.player.is("dancing_spr_clover_dance"));

        m.toggle_dance();
        assert!(matches!(m.activity, Activity::Idle));
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn user_action_while_dancing_keeps_afk_running() {
        let mut m = mascot();
        m.start_eternal_dance();
        m.user_interaction();
        assert!(matches!(m.activity, Activity::Idle));
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn follow_mouse_catches_up_then_dances() {
        let mut m = mascot();
        m.pos = Point::new(40, 40);
        m.pointer_moved(Point::new(600, 300));
        m.toggle_follow_mouse();
        let start = m.pointer_distance();
        m.advance(500);
        assert!(m.pointer_distance() < start);
        assert!(m.player.name.as_deref().unwrap().starts_with("walking_spr_pl_"));

        let c = m.center();
        m.pointer_moved(Point::new(c.x + 10, c.y));
        m.advance(60);
        assert!(matches!(m.activity, Activity::TimedDance));

        m.advance(FOLLOW_DANCE_MS);
        assert!(matches!(m.activity, Activity::Idle));
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn follow_mouse_stays_on_screen() {
        let mut m = mascot();
        m.pos = Point::new(500, 100);
        m.pointer_moved(Point::new(2000, -400));
        m.apply_follow(true);
        m.advance(3000);
        let size = m.size();
        assert!(matches!(m.activity, Activity::FollowMouse { .. }));
        assert_eq!(m.pos.y, 0);
        assert!(m.pos.x > 500);
        assert!(m.pos.x + size.w <= m.screen.w);
    }

    #[test]
    fn follow_speeds_up_over_time() {
        let mut m = mascot();
        m.screen = Size::new(100_000, 100_000);
        m.pos = Point::new(0, 0);
        m.pointer_moved(Point::new(90_000, 20));
        m.apply_follow(true);
        m.advance(11_000);
        assert!(m.player.is("walking_spr_pl_run_right"));
        let x = m.pos.x;
        m.advance(50);
        assert!((11..=12).contains(&(m.pos.x - x)));
    }

    #[test]
    fn sleep_cycles_zzz_and_wakes_into_afk() {
        let mut m = mascot();
        m.toggle_sleep();
        assert!(matches!(m.activity, Activity::Sleeping));
        assert!(m.player.is(SLEEP_BED));
        assert_eq!(m.zzz_frame, Some(0));
        m.advance(800);
        assert_eq!(m.zzz_frame, Some(1));
        m.advance(1600);
        assert_eq!(m.zzz_frame, Some(0));
        assert!(m.zzz_overlay().is_some());

        // idle return is a no-op while asleep
        m.return_to_idle();
        assert!(matches!(m.activity, Activity::Sleeping));

        m.toggle_sleep();
        assert!(matches!(m.activity, Activity::Idle));
        assert_eq!(m.zzz_frame, None);
        assert!(!m.timers.is_active(TimerKind::Zzz));
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn sit_pose_falls_back_to_first_sitting() {
        let mut m = mascot();
        m.sit(SitPose::Casual);
        assert!(m.player.is("spr_clover_casual"));
        assert!(matches!(m.activity, Activity::Sitting));
        m.enter_sit("not_a_pose");
        assert!(m.player.is("sitting_spr_clover_sitting"));
        assert!(!m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn interaction_completion_resumes_afk() {
        let mut m = mascot();
        m.start_character_interaction("characters_interactions_spr_clover_wave");
        assert!(matches!(m.activity, Activity::Interaction));
        assert!(!m.timers.is_active(TimerKind::AfkNext));
        m.advance(4 * 150 + 10);
        assert!(matches!(m.activity, Activity::Idle));
        let due = m.timers.due_at(TimerKind::AfkNext).unwrap();
        assert!(due >= m.now + 2000 && due <= m.now + 8000);
    }

    #[test]
    fn proximity_reaction_returns_to_idle() {
        let mut m = mascot();
        m.settings.behavior.reaction_probability = 1.0;
        m.settings.afk_behavior.afk_mode_enabled = false;
        let c = m.center();
        m.pointer_moved(c);
        m.advance(1000);
        let name = m.player.name.clone().unwrap();
        assert!(name == "nod" || name.starts_with("poses"));
        m.pointer_moved(Point::new(-1000, -1000));
        m.advance(2100);
        assert!(m.player.name.as_deref().unwrap().starts_with("sitting") || m.player.is("spr_clover_casual"));
    }

    #[test]
    fn pointer_idle_tracking() {
        let mut m = mascot();
        m.pointer_moved(Point::new(10, 10));
        m.advance(100);
        assert!(!m.pointer.idle);
        m.advance(5100);
        assert!(m.pointer.idle);
        m.pointer_moved(Point::new(20, 10));
        m.advance(100);
        assert!(!m.pointer.idle);
    }

    #[test]
    fn drag_moves_sprite() {
        let mut m = mascot();
        m.settings.afk_behavior.afk_mode_enabled = false;
        let grab = Point::new(m.pos.x + 3, m.pos.y + 3);
        assert!(m.press_left(grab));
        m.pointer_moved(Point::new(203, 153));
        assert_eq!(m.pos, Point::new(200, 150));
        m.release_left();
        m.pointer_moved(Point::new(0, 0));
        assert_eq!(m.pos, Point::new(200, 150));
        assert!(!m.press_left(Point::new(639, 383)));
    }

    #[test]
    fn size_menu_updates_scale_and_footprint() {
        let mut m = mascot();
        let (w, _) = m.sprite_cells();
        m.set_scale(2.0);
        assert_eq!(m.settings.size.current_name(), "Extra Large");
        assert_eq!(m.sprite_cells().0, w * 2);
    }

    #[test]
    fn afk_toggle_off_and_on() {
        let mut m = mascot();
        m.advance(3000);
        m.toggle_afk_mode();
        assert!(!m.settings.afk_behavior.afk_mode_enabled);
        assert!(!m.timers.is_active(TimerKind::AfkNext));
        m.toggle_afk_mode();
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn dying_closes_after_animation_budget() {
        let mut m = mascot();
        m.start_dying();
        assert!(matches!(m.activity, Activity::Dying));
        m.advance(50 * 150 + 499);
        assert!(!m.quit);
        m.advance(1);
        assert!(m.quit);
        assert!(m.settings_to_save().afk_behavior.afk_mode_enabled);
    }

    #[test]
    fn visibility_toggle_leaves_a_notice() {
        let mut m = mascot();
        m.toggle_visibility();
        assert!(!m.visible);
        assert!(m.take_notice().unwrap().contains("hidden"));
        assert!(m.take_notice().is_none());
    }
}
