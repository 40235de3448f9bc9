//! Hide and seek: Edward carries the mascot off and hides it somewhere.

use super::{Activity, Mascot, DANCING};
use crate::geometry::{Direction, Point};
use crate::timers::TimerKind;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const GRAB: &str = "edward_walking_spr_ed_grab_clover";
const PLACE: &str = "edward_walking_spr_ed_place_clover";
const HIDING_POSE: &str = "sitting_spr_clover_sit_dark";

const MOVE_STEP_MS: u64 = 50;
const MOVE_SPEED: f32 = 10.0;
const ARRIVE_PX: f32 = 30.0;
const DETECT_MS: u64 = 5000;
const AUTO_FIND_MS: u64 = 300_000;
const FOUND_DANCE_MS: u64 = 5000;
const MAX_SCANNED_DIRS: usize = 50;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum HidePhase {
    Grab,
    MoveToTaskbar { target: Point },
    Drop,
    Waiting { since: u64, method: HideMethod },
    Found,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HideMethod {
    Desktop,
    Taskbar,
    Offscreen,
    VerySmall,
    UserDirectory,
}

impl HideMethod {
    const ALL: [HideMethod; 5] = [
        HideMethod::Desktop,
        HideMethod::Taskbar,
        HideMethod::Offscreen,
        HideMethod::VerySmall,
        HideMethod::UserDirectory,
    ];

    fn scale(self) -> f32 {
        match self {
            HideMethod::Desktop => 0.8,
            HideMethod::Taskbar => 0.6,
            HideMethod::Offscreen => 0.9,
            HideMethod::VerySmall => 0.5,
            HideMethod::UserDirectory => 0.7,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct HideSeek {
    pub(crate) phase: HidePhase,
    /// Restored when the game ends.
    pub(crate) saved_scale: f32,
}

impl Mascot {
    /// Returns false when another game is already running.
    pub(crate) fn start_hide_and_seek(&mut self) -> bool {
        if self.in_game {
            tracing::debug!("hide and seek refused: game running");
            return false;
        }
        self.user_interaction();
        self.in_game = true;
        if self.settings.afk_behavior.afk_mode_enabled {
            self.disable_afk_temporarily();
        }
        let saved_scale = self.scale;
        self.scale = 1.0;
        self.set_activity(Activity::HideAndSeek(HideSeek {
            phase: HidePhase::Grab,
            saved_scale,
        }));
        tracing::info!("hide and seek started");

        if self.start_animation(GRAB, false) {
            let ms = self.catalog.duration_ms(GRAB).unwrap_or(0) + 500;
            self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
        } else {
            self.hide_seek_move();
        }
        true
    }

    fn set_hide_phase(&mut self, phase: HidePhase) {
        if let Activity::HideAndSeek(h) = &mut self.activity {
            tracing::debug!(?phase, "hide and seek phase");
            h.phase = phase;
        }
    }

    fn hide_phase(&self) -> Option<&HidePhase> {
        match &self.activity {
            Activity::HideAndSeek(h) => Some(&h.phase),
            _ => None,
        }
    }

    pub(crate) fn hide_seek_phase_done(&mut self) {
        match self.hide_phase().cloned() {
            Some(HidePhase::Grab) => self.hide_seek_move(),
            Some(HidePhase::Drop) => self.hide_now(),
            Some(HidePhase::Found) => self.end_hide_and_seek(),
            _ => {}
        }
    }

    fn hide_seek_move(&mut self) {
        let size = self.size();
        // Reachable by the top-left corner, which stays on screen while walking.
        let target = Point::new(
            (self.screen.w / 2 - size.w / 2).clamp(0, (self.screen.w - size.w).max(0)),
            (self.screen.h - 50).min(self.screen.h - size.h).max(0),
        );
        self.set_hide_phase(HidePhase::MoveToTaskbar { target });
        self.timers
            .start_repeating(TimerKind::ActivityStep, self.now, MOVE_STEP_MS);
    }

    pub(crate) fn hide_seek_step(&mut self) {
        let Some(HidePhase::MoveToTaskbar { target }) = self.hide_phase().cloned() else {
            self.timers.stop(TimerKind::ActivityStep);
            return;
        };
        let (dx, dy) = (target.x - self.pos.x, target.y - self.pos.y);
        let distance = self.pos.distance_to(target);
        if distance < ARRIVE_PX {
            self.timers.stop(TimerKind::ActivityStep);
            self.hide_seek_drop();
            return;
        }

        let dir = Direction::dominant(dx, dy);
        let anim = format!("edward_walking_spr_ed_{}_walk_clover", dir.name());
        let anim = if self.catalog.exists(&anim) {
            anim
        } else {
            "edward_walking_spr_ed_down_walk_clover".to_string()
        };
        if !self.player.is(&anim) {
            self.start_animation(&anim, true);
        }

        let next = Point::new(
            self.pos.x + (dx as f32 / distance * MOVE_SPEED) as i32,
            self.pos.y + (dy as f32 / distance * MOVE_SPEED) as i32,
        );
        self.pos = self.clamp_to_screen(next);
    }

    fn hide_seek_drop(&mut self) {
        self.set_hide_phase(HidePhase::Drop);
        if self.start_animation(PLACE, false) {
            let ms = self.catalog.duration_ms(PLACE).unwrap_or(0) + 800;
            self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
        } else {
            self.hide_now();
        }
    }

    fn hide_now(&mut self) {
        let method = self
            .rng
            .choose(&HideMethod::ALL)
            .copied()
            .unwrap_or(HideMethod::Desktop);
        let (w, h) = (self.screen.w, self.screen.h);

        let (method, spot) = match method {
            HideMethod::UserDirectory => match pick_user_directory(&mut self.rng) {
                Some(dir) => {
                    let hash = path_hash(&dir) % 1000;
                    let x = (hash % (w - 200).max(1) as u64) as i32 + 100;
                    let y = ((hash / 10) % (h - 200).max(1) as u64) as i32 + 100;
                    tracing::debug!(dir = %dir.display(), "hiding by a user directory");
                    (method, Point::new(x, y))
                }
                None => (HideMethod::Desktop, self.desktop_spot()),
            },
            HideMethod::Desktop => (method, self.desktop_spot()),
            HideMethod::Taskbar => {
                let spots = [
                    Point::new(100, h - 80),
                    Point::new(w / 2, h - 80),
                    Point::new(w - 150, h - 80),
                    Point::new(50, h - 120),
                ];
                (method, self.pick_spot(&spots))
            }
            HideMethod::Offscreen => {
                let spots = [
                    Point::new(-30, h / 2),
                    Point::new(w - 20, h / 2),
                    Point::new(w / 2, -30),
                    Point::new(w / 2, h - 20),
                ];
                (method, self.pick_spot(&spots))
            }
            HideMethod::VerySmall => {
                let x = self.rng.range_i32(100, (w - 200).max(100));
                let y = self.rng.range_i32(100, (h - 200).max(100));
                (method, Point::new(x, y))
            }
        };

        self.scale = method.scale();
        self.start_animation(HIDING_POSE, true);
        self.pos = if method == HideMethod::Offscreen {
            spot
        } else {
            self.clamp_to_screen(spot)
        };
        self.set_hide_phase(HidePhase::Waiting {
            since: self.now,
            method,
        });
        self.timers
            .start_repeating(TimerKind::HideSeekDetect, self.now, DETECT_MS);
        tracing::info!(?method, x = self.pos.x, y = self.pos.y, "mascot hidden");
    }

    fn desktop_spot(&mut self) -> Point {
        let (w, h) = (self.screen.w, self.screen.h);
        let spots = [
            Point::new(50, 50),
            Point::new(w - 100, 50),
            Point::new(50, h - 100),
            Point::new(w - 100, h - 100),
            Point::new(w / 2, 50),
            Point::new(w / 2, h - 100),
            Point::new(50, h / 2),
            Point::new(w - 100, h / 2),
        ];
        self.pick_spot(&spots)
    }

    fn pick_spot(&mut self, spots: &[Point]) -> Point {
        self.rng.choose(spots).copied().unwrap_or_default()
    }

    pub(crate) fn hide_seek_check_timeout(&mut self) {
        if let Some(HidePhase::Waiting { since, .. }) = self.hide_phase() {
            if self.now.saturating_sub(*since) > AUTO_FIND_MS {
                tracing::info!("nobody came looking, coming out");
                self.hide_seek_found();
            }
        }
    }

    pub(crate) fn hide_seek_found(&mut self) {
        self.timers.stop(TimerKind::HideSeekDetect);
        self.visible = true;
        self.pos = self.centered_pos();
        self.set_hide_phase(HidePhase::Found);
        tracing::info!("mascot found");
        match self.first_anim(DANCING) {
            Some(name) => {
                self.start_animation(&name, true);
                self.timers
                    .start_once(TimerKind::ActivityEnd, self.now, FOUND_DANCE_MS);
            }
            None => self.end_hide_and_seek(),
        }
    }

    fn end_hide_and_seek(&mut self) {
        if let Activity::HideAndSeek(h) = &self.activity {
            self.scale = h.saved_scale;
        }
        self.visible = true;
        self.in_game = false;
        self.set_activity(Activity::Idle);
        if self.had_afk_mode_enabled {
            self.re_enable_afk();
        }
        self.play_first_sitting();
        tracing::info!("hide and seek finished");
    }
}

fn pick_user_directory(rng: &mut crate::rng::Rng) -> Option<PathBuf> {
    let dirs = directories::UserDirs::new()?;
    let roots: Vec<PathBuf> = [
        dirs.document_dir(),
        dirs.picture_dir(),
        dirs.video_dir(),
        dirs.audio_dir(),
        dirs.download_dir(),
    ]
    .into_iter()
    .flatten()
    .filter(|p| p.is_dir())
    .map(Path::to_path_buf)
    .collect();

    let root = rng.choose(&roots)?.clone();
    let mut found = vec![root.clone()];
    let mut pending = vec![root];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            if found.len() >= MAX_SCANNED_DIRS {
                break;
            }
            let path = entry.path();
            if path.is_dir() {
                found.push(path.clone());
                pending.push(path);
            }
        }
        if found.len() >= MAX_SCANNED_DIRS {
            break;
        }
    }
    rng.choose(&found).cloned()
}

fn path_hash(path: &Path) -> u64 {
    let mut h = DefaultHasher::new();
    path.hash(&mut h);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::super::tests::mascot;
    use super::*;

    fn phase(m: &Mascot) -> HidePhase {
        m.hide_phase().cloned().unwrap()
    }

    fn run_until_hidden(m: &mut Mascot) {
        for _ in 0..2000 {
            if matches!(m.hide_phase(), Some(HidePhase::Waiting { .. })) {
                return;
            }
            m.advance(50);
        }
        panic!("never hid");
    }

    #[test]
    fn full_game_restores_scale_and_afk() {
        let mut m = mascot();
        m.set_scale(2.0);
        assert!(m.start_hide_and_seek());
        assert!(m.in_game);
        assert_eq!(m.scale, 1.0);
        assert_eq!(phase(&m), HidePhase::Grab);
        assert!(m.player.is(GRAB));
        assert!(!m.settings.afk_behavior.afk_mode_enabled);

        run_until_hidden(&mut m);
        assert!(m.player.is(HIDING_POSE));
        assert!(m.scale < 1.0);
        assert!(m.timers.is_active(TimerKind::HideSeekDetect));

        let at = Point::new(m.pos.x + 2, m.pos.y + 2);
        assert!(m.press_left(at));
        assert_eq!(phase(&m), HidePhase::Found);
        assert!(m.player.is("dancing_spr_clover_dance"));
        assert!(m.drag.is_none());

        m.advance(FOUND_DANCE_MS);
        assert!(matches!(m.activity, Activity::Idle));
        assert!(!m.in_game);
        assert_eq!(m.scale, 2.0);
        assert!(m.settings.afk_behavior.afk_mode_enabled);
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn second_game_is_refused() {
        let mut m = mascot();
        assert!(m.start_hide_and_seek());
        assert!(!m.start_hide_and_seek());
        assert!(!m.start_showdown());
    }

    #[test]
    fn auto_found_after_five_minutes() {
        let mut m = mascot();
        m.start_hide_and_seek();
        run_until_hidden(&mut m);
        m.advance(AUTO_FIND_MS - DETECT_MS);
        assert!(matches!(phase(&m), HidePhase::Waiting { .. }));
        m.advance(2 * DETECT_MS);
        assert_eq!(phase(&m), HidePhase::Found);
    }

    #[test]
    fn walks_toward_the_bottom_middle() {
        let mut m = mascot();
        m.pos = Point::new(0, 0);
        m.start_hide_and_seek();
        let end = m.timers.due_at(TimerKind::ActivityEnd).unwrap();
        m.advance(end - m.now + 50);
        assert!(matches!(phase(&m), HidePhase::MoveToTaskbar { .. }));
        let before = m.pos;
        m.advance(500);
        assert!(m.pos.x > before.x && m.pos.y > before.y);
        assert!(m.player.name.as_deref().unwrap().starts_with("edward_walking_spr_ed_"));
    }

    #[test]
    fn narrow_screen_still_reaches_the_drop() {
        let mut m = mascot();
        m.set_screen(crate::geometry::Size::new(120, 384));
        m.start_hide_and_seek();
        run_until_hidden(&mut m);
        assert!(m.in_game);

        let at = Point::new(m.pos.x + 1, m.pos.y + 1);
        assert!(m.press_left(at));
        m.advance(FOUND_DANCE_MS);
        assert!(!m.in_game);
        assert!(m.settings.afk_behavior.afk_mode_enabled);
    }
}
