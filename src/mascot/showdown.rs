//! The showdown: a gun duel against the pointer.
//!
//! Hearts are fired at the pointer and win when they reach it. Once the
//! duel has sped up enough, strong shots land on the pointer and lose the
//! game if it is still there when they go off.

use super::{Activity, Mascot, DANCING};
use crate::geometry::Point;
use crate::timers::TimerKind;

const SUMMON: &str = "gun_spr_clover_geno_summon";
const UNSUMMON: [&str; 3] = [
    "spr_clover_geno_unsummon",
    "gun_spr_clover_geno_unsummon",
    "geno_spr_clover_geno_unsummon",
];
pub(crate) const HEART: &str = "gun_spr_heart_yellow_shot";
pub(crate) const STRONG: &str = "gun_spr_shot_strong";

const SHOOT_MS: u64 = 600;
const SLIDE_MS: u64 = 50;
const RAMP_MS: u64 = 10_000;
const STRONG_MS: u64 = 800;
const BULLET_STEP_MS: u64 = 30;
const STRONG_FRAME_MS: u64 = 50;
const HIT_PX: f32 = 30.0;
const BOTTOM_MARGIN: i32 = 50;
const VICTORY_DANCE_MS: u64 = 3000;
const STRONG_LINGER_MS: u64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DuelPhase {
    Summon,
    Shooting,
    VictoryUnsummon,
    VictoryDance,
    DefeatUnsummon,
}

#[derive(Clone, Debug)]
pub(crate) struct Heart {
    /// Centre, in virtual pixels.
    pub(crate) x: f32,
    pub(crate) y: f32,
    vx: f32,
    vy: f32,
    travelled: f32,
    pub(crate) frame: usize,
}

impl Heart {
    pub(crate) fn center(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct StrongShot {
    pub(crate) center: Point,
    pub(crate) frame: usize,
    /// Set once the animation has played out.
    expires_at: Option<u64>,
}

#[derive(Clone, Debug)]
pub(crate) struct Showdown {
    pub(crate) phase: DuelPhase,
    pub(crate) multiplier: u32,
    /// Zero until strong shots have started.
    pub(crate) strong_multiplier: u32,
    pub(crate) hearts: Vec<Heart>,
    pub(crate) strong: Vec<StrongShot>,
}

impl Showdown {
    fn new() -> Self {
        Self {
            phase: DuelPhase::Summon,
            multiplier: 1,
            strong_multiplier: 0,
            hearts: Vec::new(),
            strong: Vec::new(),
        }
    }
}

impl Mascot {
    pub(crate) fn showdown(&self) -> Option<&Showdown> {
        match &self.activity {
            Activity::Showdown(s) => Some(s),
            _ => None,
        }
    }

    fn showdown_mut(&mut self) -> Option<&mut Showdown> {
        match &mut self.activity {
            Activity::Showdown(s) => Some(s),
            _ => None,
        }
    }

    fn duel_phase(&self) -> Option<DuelPhase> {
        self.showdown().map(|s| s.phase)
    }

    fn set_duel_phase(&mut self, phase: DuelPhase) {
        if let Some(s) = self.showdown_mut() {
            s.phase = phase;
        }
        tracing::debug!(?phase, "showdown phase");
    }

    /// Returns false when another game is already running.
    pub(crate) fn start_showdown(&mut self) -> bool {
        if self.in_game {
            tracing::debug!("showdown refused: game running");
            return false;
        }
        self.in_game = true;
        self.user_interaction();
        if self.settings.afk_behavior.afk_mode_enabled {
            self.disable_afk_temporarily();
        }
        self.set_activity(Activity::Showdown(Showdown::new()));
        tracing::info!("showdown started");

        let summoned = self.start_animation(SUMMON, false);
        let size = self.size();
        self.pos = self.clamp_to_screen(Point::new(
            self.screen.w / 2 - size.w / 2,
            self.screen.h - size.h - BOTTOM_MARGIN,
        ));
        if summoned {
            let ms = self.catalog.duration_ms(SUMMON).unwrap_or(0);
            self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
        } else {
            self.begin_shooting();
        }
        true
    }

    pub(crate) fn showdown_phase_done(&mut self) {
        match self.duel_phase() {
            Some(DuelPhase::Summon) => {
                self.hold_last_frame();
                self.begin_shooting();
            }
            Some(DuelPhase::VictoryUnsummon) => {
                self.set_duel_phase(DuelPhase::VictoryDance);
                if let Some(name) = self.first_anim(DANCING) {
                    self.start_animation(&name, true);
                }
                self.timers
                    .start_once(TimerKind::ActivityEnd, self.now, VICTORY_DANCE_MS);
            }
            Some(DuelPhase::VictoryDance) | Some(DuelPhase::DefeatUnsummon) => {
                self.end_showdown()
            }
            _ => {}
        }
    }

    fn begin_shooting(&mut self) {
        self.set_duel_phase(DuelPhase::Shooting);
        if let Some(s) = self.showdown_mut() {
            s.multiplier = 1;
        }
        let now = self.now;
        self.timers
            .start_repeating(TimerKind::ShowdownDifficulty, now, RAMP_MS);
        self.timers.start_repeating(TimerKind::ShowdownSlide, now, SLIDE_MS);
        self.timers.start_repeating(TimerKind::ShowdownShoot, now, SHOOT_MS);
        self.timers
            .start_repeating(TimerKind::BulletStep, now, BULLET_STEP_MS);
    }

    fn multipliers(&self) -> (u32, u32) {
        self.showdown()
            .map(|s| (s.multiplier, s.strong_multiplier))
            .unwrap_or((1, 0))
    }

    pub(crate) fn showdown_ramp(&mut self) {
        if self.duel_phase() != Some(DuelPhase::Shooting) {
            return;
        }
        let (m, strong) = self.multipliers();
        let m = m * 2;
        let now = self.now;
        let strong = if m >= 4 && strong == 0 {
            1
        } else if strong > 0 {
            strong * 2
        } else {
            0
        };
        if let Some(s) = self.showdown_mut() {
            s.multiplier = m;
            s.strong_multiplier = strong;
        }

        let m64 = u64::from(m);
        self.timers
            .start_repeating(TimerKind::ShowdownShoot, now, (SHOOT_MS / m64).max(50));
        self.timers
            .start_repeating(TimerKind::ShowdownSlide, now, (SLIDE_MS / m64).max(10));
        if strong > 0 {
            let s64 = u64::from(strong);
            self.timers
                .start_repeating(TimerKind::ShowdownStrong, now, (STRONG_MS / s64).max(100));
            if self.timers.is_active(TimerKind::StrongStep) {
                let every = (STRONG_FRAME_MS / s64).max(25);
                self.timers.start_repeating(TimerKind::StrongStep, now, every);
            }
        }
        tracing::info!(multiplier = m, strong, "showdown speeds up");
    }

    pub(crate) fn showdown_slide(&mut self) {
        if self.duel_phase() != Some(DuelPhase::Shooting) {
            return;
        }
        let (m, _) = self.multipliers();
        let size = self.size();
        let target = self.pointer.pos.x - size.w / 2;
        let step = 3 * m as i32;
        let gap = target - self.pos.x;
        self.pos.x += if gap.abs() <= step { gap } else { step * gap.signum() };
        self.pos.x = self.pos.x.clamp(0, (self.screen.w - size.w).max(0));
    }

    pub(crate) fn fire_heart_shot(&mut self) {
        if self.duel_phase() != Some(DuelPhase::Shooting) || !self.catalog.exists(HEART) {
            return;
        }
        let (m, _) = self.multipliers();
        let c = self.center();
        let (x, y) = (c.x as f32, self.pos.y as f32 - 30.0 * self.scale);
        let (dx, dy) = (self.pointer.pos.x as f32 - x, self.pointer.pos.y as f32 - y);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return;
        }
        let speed = 8.0 * self.scale * m as f32;
        let heart = Heart {
            x,
            y,
            vx: dx / len * speed,
            vy: dy / len * speed,
            travelled: 0.0,
            frame: 0,
        };
        if let Some(s) = self.showdown_mut() {
            s.hearts.push(heart);
        }
    }

    pub(crate) fn step_hearts(&mut self) {
        let frames = self
            .catalog
            .get(HEART)
            .map(|a| a.frames.len())
            .unwrap_or(1);
        let max_travel = 1000.0 * self.scale;
        let (sw, sh) = (self.screen.w as f32, self.screen.h as f32);
        let pointer = self.pointer.pos;

        let Some(s) = self.showdown_mut() else {
            return;
        };
        let mut hit = false;
        for h in &mut s.hearts {
            h.x += h.vx;
            h.y += h.vy;
            h.travelled += (h.vx * h.vx + h.vy * h.vy).sqrt();
            h.frame = (h.frame + 1).min(frames.saturating_sub(1));
            if h.center().distance_to(pointer) <= HIT_PX {
                hit = true;
            }
        }
        s.hearts.retain(|h| {
            h.travelled <= max_travel
                && h.x >= -100.0
                && h.y >= -100.0
                && h.x <= sw + 100.0
                && h.y <= sh + 100.0
        });

        if hit {
            self.showdown_victory();
        }
    }

    pub(crate) fn fire_strong_shot(&mut self) {
        if self.duel_phase() != Some(DuelPhase::Shooting) || !self.catalog.exists(STRONG) {
            return;
        }
        let (_, strong) = self.multipliers();
        let center = self.pointer.pos;
        if let Some(s) = self.showdown_mut() {
            s.strong.push(StrongShot {
                center,
                frame: 0,
                expires_at: None,
            });
        }
        let every = (STRONG_FRAME_MS / u64::from(strong.max(1))).max(25);
        if !self.timers.is_active(TimerKind::StrongStep) {
            self.timers.start_repeating(TimerKind::StrongStep, self.now, every);
        }
    }

    pub(crate) fn step_strong_shots(&mut self) {
        let frames = self
            .catalog
            .get(STRONG)
            .map(|a| a.frames.len())
            .unwrap_or(1);
        let now = self.now;
        let pointer = self.pointer.pos;

        let Some(s) = self.showdown_mut() else {
            return;
        };
        let mut defeated = false;
        for shot in s.strong.iter_mut().filter(|shot| shot.expires_at.is_none()) {
            if shot.frame + 1 < frames {
                shot.frame += 1;
            } else {
                if shot.center.distance_to(pointer) <= HIT_PX {
                    defeated = true;
                }
                shot.expires_at = Some(now + STRONG_LINGER_MS);
            }
        }
        s.strong.retain(|shot| shot.expires_at.map_or(true, |t| t > now));
        let idle = s.strong.is_empty();

        if defeated {
            self.showdown_defeat();
        } else if idle {
            self.timers.stop(TimerKind::StrongStep);
        }
    }

    fn clear_duel(&mut self) {
        for kind in [
            TimerKind::ShowdownShoot,
            TimerKind::ShowdownSlide,
            TimerKind::ShowdownDifficulty,
            TimerKind::ShowdownStrong,
            TimerKind::BulletStep,
            TimerKind::StrongStep,
        ] {
            self.timers.stop(kind);
        }
        if let Some(s) = self.showdown_mut() {
            s.hearts.clear();
            s.strong.clear();
        }
    }

    fn unsummon(&mut self) {
        let name = UNSUMMON.iter().find(|n| self.catalog.exists(n)).copied();
        let ms = match name {
            Some(name) => {
                self.start_animation(name, false);
                self.catalog.duration_ms(name).unwrap_or(100)
            }
            None => 100,
        };
        self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
    }

    fn showdown_victory(&mut self) {
        tracing::info!("showdown won");
        self.clear_duel();
        self.set_duel_phase(DuelPhase::VictoryUnsummon);
        self.unsummon();
    }

    fn showdown_defeat(&mut self) {
        tracing::info!("showdown lost");
        self.clear_duel();
        self.set_duel_phase(DuelPhase::DefeatUnsummon);
        self.unsummon();
    }

    fn end_showdown(&mut self) {
        self.in_game = false;
        self.set_activity(Activity::Idle);
        if self.had_afk_mode_enabled {
            self.re_enable_afk();
        }
        self.play_first_sitting();
        tracing::info!("showdown finished");
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::mascot;
    use super::*;

    fn phase(m: &Mascot) -> Option<DuelPhase> {
        m.showdown().map(|s| s.phase)
    }

    /// Runs through the summon so shooting has just begun.
    fn armed(m: &mut Mascot) {
        assert!(m.start_showdown());
        assert_eq!(phase(m), Some(DuelPhase::Summon));
        let end = m.timers.due_at(TimerKind::ActivityEnd).unwrap();
        m.advance(end - m.now);
        assert_eq!(phase(m), Some(DuelPhase::Shooting));
    }

    #[test]
    fn summon_places_mascot_at_bottom_centre() {
        let mut m = mascot();
        m.start_showdown();
        let size = m.size();
        assert_eq!(m.pos.y, m.screen.h - size.h - BOTTOM_MARGIN);
        assert!(m.in_game);
        assert!(!m.settings.afk_behavior.afk_mode_enabled);
    }

    #[test]
    fn missing_summon_still_moves_to_bottom_centre() {
        let full = crate::builtin::catalog(&crate::config::AnimationSettings::default());
        let mut catalog = crate::catalog::Catalog::default();
        for category in full.all_categories() {
            for name in full.by_category(category).iter().filter(|n| *n != SUMMON) {
                if let Some(a) = full.get(name) {
                    catalog.add(category, name.clone(), a.frames.clone(), a.frame_rate_ms);
                }
            }
        }
        let mut settings = crate::config::Settings::default();
        settings.seed = 7;
        let mut m = Mascot::new(catalog, settings, crate::geometry::Size::new(640, 384));
        m.pos = Point::new(0, 0);

        assert!(m.start_showdown());
        assert_eq!(phase(&m), Some(DuelPhase::Shooting));
        let size = m.size();
        assert_eq!(
            m.pos,
            Point::new(m.screen.w / 2 - size.w / 2, m.screen.h - size.h - BOTTOM_MARGIN)
        );
    }

    #[test]
    fn heart_reaching_pointer_wins() {
        let mut m = mascot();
        armed(&mut m);
        let c = m.center();
        m.pointer_moved(Point::new(c.x, m.pos.y - 150));
        m.advance(SHOOT_MS + 30 * 20);
        assert!(matches!(
            phase(&m),
            Some(DuelPhase::VictoryUnsummon) | Some(DuelPhase::VictoryDance)
        ));
        assert!(m.showdown().unwrap().hearts.is_empty());

        m.advance(VICTORY_DANCE_MS + 1000);
        assert!(matches!(m.activity, Activity::Idle));
        assert!(!m.in_game);
        assert!(m.settings.afk_behavior.afk_mode_enabled);
    }

    #[test]
    fn slides_toward_pointer() {
        let mut m = mascot();
        armed(&mut m);
        m.pointer_moved(Point::new(-500, -500));
        let x = m.pos.x;
        m.advance(SLIDE_MS);
        assert_eq!(m.pos.x, (x - 3).max(0));
    }

    #[test]
    fn strong_shots_arrive_and_catch_a_still_pointer() {
        let mut m = mascot();
        armed(&mut m);
        // far enough away that hearts leave the screen first
        m.pointer_moved(Point::new(-2000, -2000));
        m.advance(2 * RAMP_MS);
        let s = m.showdown().unwrap();
        assert_eq!(s.multiplier, 4);
        assert_eq!(s.strong_multiplier, 1);
        assert!(m.timers.is_active(TimerKind::ShowdownStrong));

        m.advance(STRONG_MS + 400);
        assert_eq!(phase(&m), Some(DuelPhase::DefeatUnsummon));
        m.advance(1000);
        assert!(matches!(m.activity, Activity::Idle));
        assert!(!m.in_game);
    }

    #[test]
    fn dodged_strong_shot_lingers_then_goes() {
        let mut m = mascot();
        armed(&mut m);
        m.pointer_moved(Point::new(-2000, -2000));
        m.fire_strong_shot();
        m.pointer_moved(Point::new(-3000, -3000));
        m.advance(STRONG_FRAME_MS * 5);
        assert_eq!(phase(&m), Some(DuelPhase::Shooting));
        assert_eq!(m.showdown().unwrap().strong.len(), 1);
        m.advance(STRONG_LINGER_MS + 100);
        assert!(m.showdown().unwrap().strong.is_empty());
    }
}
