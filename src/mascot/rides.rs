use super::{Activity, Mascot, MemeCard};
use crate::geometry::Point;
use crate::meme::Meme;
use crate::timers::TimerKind;

const RIDE_STEP_MS: u64 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RideKind {
    Cart,
    MemeCart,
    WhaleMail,
}

impl RideKind {
    fn category(self) -> &'static str {
        match self {
            RideKind::Cart => "cart",
            RideKind::MemeCart => "meme",
            RideKind::WhaleMail => "basket",
        }
    }

    /// Pixels per step.
    fn speed(self) -> i32 {
        match self {
            RideKind::Cart | RideKind::MemeCart => 3,
            RideKind::WhaleMail => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Ride {
    pub(crate) kind: RideKind,
    /// Final x for carts, final y for the whale.
    target: i32,
    halfway: i32,
    meme_released: bool,
}

impl Mascot {
    pub(crate) fn start_ride(&mut self, kind: RideKind) {
        self.user_interaction();
        self.set_activity(Activity::Idle);
        if let Some(name) = self.first_anim(kind.category()) {
            self.start_animation(&name, true);
        } else {
            tracing::warn!(?kind, "ride animation missing");
        }

        let size = self.size();
        let (target, halfway) = match kind {
            RideKind::Cart | RideKind::MemeCart => {
                self.pos = Point::new(-size.w, self.pos.y);
                (self.screen.w + size.w, self.screen.w / 2)
            }
            RideKind::WhaleMail => {
                self.pos = Point::new(self.pos.x, self.screen.h);
                (-size.h, self.screen.h / 2)
            }
        };
        if kind == RideKind::MemeCart {
            self.meme = None;
            self.meme_requested = true;
        }

        self.set_activity(Activity::Ride(Ride {
            kind,
            target,
            halfway,
            meme_released: false,
        }));
        self.timers
            .start_repeating(TimerKind::ActivityStep, self.now, RIDE_STEP_MS);
        tracing::info!(?kind, "ride started");
    }

    pub(crate) fn ride_step(&mut self) {
        let Activity::Ride(ride) = &self.activity else {
            return;
        };
        let ride = ride.clone();
        let speed = ride.kind.speed();

        let arrived = match ride.kind {
            RideKind::Cart | RideKind::MemeCart => {
                self.pos.x += speed;
                self.pos.x >= ride.target
            }
            RideKind::WhaleMail => {
                self.pos.y -= speed;
                self.pos.y <= ride.target
            }
        };

        if ride.kind == RideKind::MemeCart {
            if !ride.meme_released && self.pos.x >= ride.halfway {
                if let Activity::Ride(r) = &mut self.activity {
                    r.meme_released = true;
                }
                self.release_meme();
            } else if !ride.meme_released {
                self.hook_meme();
            }
        }

        if arrived {
            self.finish_ride();
        }
    }

    fn finish_ride(&mut self) {
        self.set_activity(Activity::Idle);
        self.pos = self.centered_pos();
        self.play_first_sitting();
        self.resume_afk(3000, 8000);
        tracing::info!("ride finished");
    }

    fn hook_meme(&mut self) {
        let below = Point::new(self.pos.x - 50, self.pos.y + self.size().h);
        if let Some(card) = self.meme.as_mut() {
            card.pos = below;
        }
    }

    fn release_meme(&mut self) {
        let ox = self.rng.range_i32(-200, 200);
        let oy = self.rng.range_i32(-150, 150);
        let card = MemeCard::size();
        let at = Point::new(
            (self.pos.x + ox).clamp(0, (self.screen.w - card.w).max(0)),
            (self.pos.y + oy).clamp(0, (self.screen.h - card.h).max(0)),
        );
        if let Some(c) = self.meme.as_mut() {
            c.pos = at;
            c.released = true;
            tracing::debug!(x = at.x, y = at.y, "meme released");
        }
    }

    fn meme_cart_released(&self) -> Option<bool> {
        match &self.activity {
            Activity::Ride(r) if r.kind == RideKind::MemeCart => Some(r.meme_released),
            _ => None,
        }
    }

    /// A fetched (or placeholder) meme arrives from the background thread.
    pub(crate) fn deliver_meme(&mut self, meme: Meme) {
        tracing::info!(title = %meme.title, placeholder = meme.placeholder, "meme delivered");
        self.meme = Some(MemeCard {
            meme,
            pos: Point::default(),
            released: false,
        });
        match self.meme_cart_released() {
            Some(false) => self.hook_meme(),
            _ => self.release_meme(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::mascot;
    use super::*;

    #[test]
    fn cart_crosses_and_recenters() {
        let mut m = mascot();
        m.settings.afk_behavior.afk_mode_enabled = false;
        m.start_ride(RideKind::Cart);
        assert!(m.player.is("cart"));
        assert!(m.pos.x < 0);
        assert!(!m.take_meme_request());

        let x = m.pos.x;
        m.advance(160);
        assert_eq!(m.pos.x, x + 30);

        while matches!(m.activity, Activity::Ride(_)) {
            m.advance(16);
        }
        assert!(matches!(m.activity, Activity::Idle));
        assert_eq!(m.pos, m.centered_pos());
        assert!(m.timers.is_active(TimerKind::AfkNext));
    }

    #[test]
    fn whale_rises_from_the_bottom() {
        let mut m = mascot();
        m.start_ride(RideKind::WhaleMail);
        assert!(m.player.is("basket"));
        assert_eq!(m.pos.y, m.screen.h);
        m.advance(16 * 10);
        assert_eq!(m.pos.y, m.screen.h - 20);
    }

    #[test]
    fn meme_hangs_then_drops_and_stays() {
        let mut m = mascot();
        m.settings.afk_behavior.afk_mode_enabled = false;
        m.start_ride(RideKind::MemeCart);
        assert!(m.take_meme_request());
        m.deliver_meme(Meme::placeholder());
        let card = m.meme.clone().unwrap();
        assert!(!card.released);
        assert_eq!(card.pos.x, m.pos.x - 50);

        m.advance(16 * 200);
        let card = m.meme.clone().unwrap();
        assert!(card.released);
        let size = MemeCard::size();
        assert!(card.pos.x >= 0 && card.pos.x + size.w <= m.screen.w);

        m.advance(20_000);
        assert!(m.meme.is_some());
        let inside = Point::new(card.pos.x + 5, card.pos.y + 5);
        assert!(m.press_left(inside));
        assert!(m.meme.is_none());
    }

    #[test]
    fn late_meme_lands_released() {
        let mut m = mascot();
        m.start_ride(RideKind::MemeCart);
        m.advance(16 * 200);
        m.deliver_meme(Meme::placeholder());
        assert!(m.meme.as_ref().unwrap().released);
    }
}
