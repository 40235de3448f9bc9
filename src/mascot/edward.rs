use super::{Activity, Mascot};
use crate::geometry::{Direction, Point};
use crate::timers::TimerKind;

const SEQUENCE: [&str; 6] = [
    "edward_walking_spr_ed_grab_clover",
    "edward_walking_spr_ed_up_walk_clover",
    "edward_walking_spr_ed_right_walk_clover",
    "edward_walking_spr_ed_down_walk_clover",
    "edward_walking_spr_ed_left_walk_clover",
    "edward_walking_spr_ed_place_clover",
];

const STEP_MS: u64 = 50;
const STEP_PX: i32 = 4;

#[derive(Clone, Debug)]
pub(crate) struct EdwardWalk {
    pub(crate) index: usize,
    dir: Option<Direction>,
}

fn walk_direction(name: &str) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|d| name.contains(&format!("_{}_walk", d.name())))
}

impl Mascot {
    pub(crate) fn start_edward(&mut self) {
        self.user_interaction();
        self.set_activity(Activity::Edward(EdwardWalk {
            index: 0,
            dir: None,
        }));
        tracing::info!("Edward sequence started");
        self.edward_play_current();
    }

    fn edward_index(&self) -> Option<usize> {
        match &self.activity {
            Activity::Edward(e) => Some(e.index),
            _ => None,
        }
    }

    /// Plays the current step, skipping any that are missing.
    fn edward_play_current(&mut self) {
        let Some(mut index) = self.edward_index() else {
            return;
        };
        while let Some(name) = SEQUENCE.get(index) {
            if !self.catalog.exists(name) {
                tracing::debug!(animation = name, "Edward step missing, skipped");
                index += 1;
                continue;
            }

            let dir = walk_direction(name);
            if let Activity::Edward(e) = &mut self.activity {
                e.index = index;
                e.dir = dir;
            }
            self.start_animation(name, false);
            if dir.is_some() {
                self.timers
                    .start_repeating(TimerKind::ActivityStep, self.now, STEP_MS);
            } else {
                self.timers.stop(TimerKind::ActivityStep);
            }

            let pause = match index {
                0 => 500,
                i if i == SEQUENCE.len() - 1 => 800,
                _ => 200,
            };
            let ms = self
                .catalog
                .duration_ms(name)
                .map(|d| d + pause)
                .unwrap_or(2000);
            self.timers.start_once(TimerKind::ActivityEnd, self.now, ms);
            return;
        }
        self.end_edward();
    }

    pub(crate) fn edward_next(&mut self) {
        self.timers.stop(TimerKind::ActivityStep);
        if let Activity::Edward(e) = &mut self.activity {
            e.index += 1;
        }
        self.edward_play_current();
    }

    pub(crate) fn edward_step(&mut self) {
        let Activity::Edward(EdwardWalk { dir: Some(dir), .. }) = self.activity else {
            return;
        };
        let (ux, uy) = dir.unit();
        let next = Point::new(self.pos.x + ux * STEP_PX, self.pos.y + uy * STEP_PX);
        let size = self.size();
        if next.x >= 0
            && next.y >= 0
            && next.x + size.w <= self.screen.w
            && next.y + size.h <= self.screen.h
        {
            self.pos = next;
        }
    }

    fn end_edward(&mut self) {
        self.set_activity(Activity::Idle);
        self.start_afk_loop();
        self.play_first_sitting();
        self.resume_afk(3000, 8000);
        tracing::info!("Edward sequence finished");
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::mascot;
    use super::*;

    #[test]
    fn direction_from_name() {
        assert_eq!(walk_direction(SEQUENCE[1]), Some(Direction::Up));
        assert_eq!(walk_direction(SEQUENCE[4]), Some(Direction::Left));
        assert_eq!(walk_direction(SEQUENCE[0]), None);
    }

    #[test]
    fn runs_every_step_then_returns_to_afk() {
        let mut m = mascot();
        m.pos = m.centered_pos();
        m.start_edward();
        assert!(m.player.is(SEQUENCE[0]));
        assert!(!m.timers.is_active(TimerKind::AfkNext));

        let grab = m.timers.due_at(TimerKind::ActivityEnd).unwrap();
        m.advance(grab - m.now);
        assert!(m.player.is(SEQUENCE[1]));
        let y = m.pos.y;
        m.advance(STEP_MS * 3);
        assert_eq!(m.pos.y, y - 3 * STEP_PX);

        for _ in 0..400 {
            if !matches!(m.activity, Activity::Edward(_)) {
                break;
            }
            m.advance(STEP_MS);
        }
        assert!(matches!(m.activity, Activity::Idle));
        assert!(m.player.is("sitting_spr_clover_sitting"));
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }
}
