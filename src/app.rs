use crate::builtin;
use crate::catalog::Catalog;
use crate::config::{load_afk_toggles, load_settings, save_afk_toggles, save_settings_atomic, Paths};
use crate::geometry::{Point, Size};
use crate::input::{collect_input_nonblocking, map_event_to_action, Layer, UiAction};
use crate::mascot::Mascot;
use crate::meme::MemeFetcher;
use crate::menu::{self, build_context_menu, AfkDialog, Command, DialogOutcome, Effect, MenuOutcome, MenuState};
use crate::render::{
    draw_dialog, draw_mascot, draw_meme, draw_menu, draw_projectiles, draw_status, Terminal, BG,
};
use crate::Cli;
use anyhow::Context;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Clock granularity handed to the coordinator.
const TICK_MS: u64 = 10;
/// Longer stalls (suspend, debugger) are not replayed.
const MAX_CATCH_UP: Duration = Duration::from_millis(250);
const NOTICE_FOR: Duration = Duration::from_secs(3);

enum Overlay {
    None,
    Menu(MenuState),
    Dialog(AfkDialog),
}

impl Overlay {
    fn layer(&self) -> Layer {
        match self {
            Overlay::None => Layer::Desktop,
            Overlay::Menu(_) => Layer::Menu,
            Overlay::Dialog(_) => Layer::Dialog,
        }
    }
}

pub(crate) struct App {
    mascot: Mascot,
    settings_path: PathBuf,
    afk_settings_path: PathBuf,
    configured_seed: u64,
    memes: MemeFetcher,
    term: Terminal,
    overlay: Overlay,
    notice: Option<(String, Instant)>,
    should_quit: bool,
}

/// The last terminal row is the status line.
fn screen_size(cols: u16, rows: u16) -> Size {
    Size::from_cells(cols, rows.saturating_sub(1))
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0xC0FFEE)
}

impl App {
    fn init(cli: &Cli, paths: Paths) -> anyhow::Result<Self> {
        let settings_path = cli.settings.clone().unwrap_or(paths.settings_path);
        let afk_settings_path = cli.afk_settings.clone().unwrap_or(paths.afk_settings_path);

        let mut settings = load_settings(&settings_path);
        load_afk_toggles(&afk_settings_path, &mut settings.afk_behavior);
        if cli.no_meme {
            settings.meme.enabled = false;
        }

        let configured_seed = settings.seed;
        let seed = cli.seed.unwrap_or(settings.seed);
        settings.seed = if seed == 0 { clock_seed() } else { seed };
        tracing::info!(seed = settings.seed, "rng seeded");

        let mut catalog = builtin::catalog(&settings.animation);
        if let Some(dir) = &cli.sprites {
            match Catalog::load_dir(dir, &settings.animation) {
                Ok(extra) => {
                    tracing::info!(
                        dir = %dir.display(),
                        animations = extra.all_names().len(),
                        "sprites loaded"
                    );
                    catalog.overlay(extra);
                }
                Err(e) => tracing::warn!(error = %e, "sprites directory unusable, built-in pack only"),
            }
        }

        tracing::debug!(categories = ?catalog.all_categories(), "catalog ready");

        let memes = MemeFetcher::new(settings.meme.clone());
        let term = Terminal::begin()?;
        let mut mascot = Mascot::new(catalog, settings, screen_size(term.cols, term.rows));
        mascot.set_screen(screen_size(term.cols, term.rows));

        Ok(Self {
            mascot,
            settings_path,
            afk_settings_path,
            configured_seed,
            memes,
            term,
            overlay: Overlay::None,
            notice: None,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.mascot.settings.render.fps_cap.max(10).min(240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let tick = Duration::from_millis(TICK_MS);

        let mut last_frame = Instant::now();
        let mut accum = Duration::ZERO;

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                self.mascot.set_screen(screen_size(self.term.cols, self.term.rows));
                if let Overlay::Menu(_) = self.overlay {
                    self.overlay = Overlay::None;
                }
            }

            // input
            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(self.overlay.layer(), ev) {
                    self.handle(action);
                }
                if self.should_quit {
                    break;
                }
            }

            // fixed-step clock
            let now = Instant::now();
            accum = accum
                .saturating_add(now.saturating_duration_since(last_frame))
                .min(MAX_CATCH_UP);
            last_frame = now;
            while accum >= tick {
                self.mascot.advance(TICK_MS);
                accum = accum.saturating_sub(tick);
            }

            // meme channel
            if self.mascot.take_meme_request() {
                self.memes.request();
            }
            if let Some(meme) = self.memes.poll() {
                self.mascot.deliver_meme(meme);
            }

            if self.mascot.quit {
                self.should_quit = true;
            }

            self.render_frame()?;
            spin_sleep(frame_dt, Instant::now());
        }
        Ok(())
    }

    fn cell_point(col: u16, row: u16) -> Point {
        Point::from_cell(col, row)
    }

    fn handle(&mut self, action: UiAction) {
        if action == UiAction::Quit {
            tracing::info!("quit requested");
            self.should_quit = true;
            return;
        }
        if let UiAction::PointerMoved(c, r) = action {
            self.mascot.pointer_moved(Self::cell_point(c, r));
            return;
        }

        match std::mem::replace(&mut self.overlay, Overlay::None) {
            Overlay::None => self.handle_desktop(action),
            Overlay::Menu(menu) => self.handle_menu(menu, action),
            Overlay::Dialog(dialog) => self.handle_dialog(dialog, action),
        }
    }

    fn handle_desktop(&mut self, action: UiAction) {
        let m = &mut self.mascot;
        match action {
            UiAction::Exit => self.run_command(Command::Exit),
            UiAction::ToggleVisibility => m.toggle_visibility(),
            UiAction::OpenMenuAtMascot => {
                let (col, row) = if m.visible {
                    let (c, r) = m.center().to_cell();
                    (c.max(0) as u16, r.max(0) as u16)
                } else {
                    (0, self.term.rows.saturating_sub(1))
                };
                self.open_menu(col, row);
            }
            UiAction::OpenMenuAt(c, r) => {
                let on_tray = r + 1 >= self.term.rows;
                if on_tray || (m.visible && m.hit(Self::cell_point(c, r))) {
                    self.open_menu(c, r);
                }
            }
            UiAction::Press(c, r) => {
                if m.visible || m.meme.is_some() {
                    m.press_left(Self::cell_point(c, r));
                }
            }
            UiAction::Drag(c, r) => m.pointer_moved(Self::cell_point(c, r)),
            UiAction::Release => m.release_left(),
            _ => {}
        }
    }

    fn open_menu(&mut self, col: u16, row: u16) {
        let items = build_context_menu(&self.mascot);
        self.overlay = Overlay::Menu(MenuState::open(items, col, row, self.term.cols, self.term.rows));
    }

    fn handle_menu(&mut self, mut menu: MenuState, action: UiAction) {
        let (outcome, cmd) = match action {
            UiAction::Move(d) => {
                menu.move_by(d);
                (MenuOutcome::Stay, None)
            }
            UiAction::Activate => (MenuOutcome::Stay, menu.enter()),
            UiAction::Back => (menu.back(), None),
            UiAction::Hover(c, r) => {
                menu.hover(c, r);
                self.mascot.pointer_moved(Self::cell_point(c, r));
                (MenuOutcome::Stay, None)
            }
            UiAction::Click(c, r) => menu.click(c, r),
            _ => (MenuOutcome::Stay, None),
        };

        match (outcome, cmd) {
            (_, Some(cmd)) => self.run_command(cmd),
            (MenuOutcome::Stay, None) => self.overlay = Overlay::Menu(menu),
            (MenuOutcome::Close, None) => {}
        }
    }

    fn run_command(&mut self, cmd: Command) {
        if menu::apply(&mut self.mascot, cmd) == Effect::OpenAfkSettings {
            self.overlay = Overlay::Dialog(AfkDialog::new(&self.mascot.settings.afk_behavior));
        }
    }

    fn handle_dialog(&mut self, mut dialog: AfkDialog, action: UiAction) {
        let outcome = match action {
            UiAction::Move(d) => {
                dialog.move_by(d);
                DialogOutcome::Stay
            }
            UiAction::Activate => dialog.activate(),
            UiAction::Click(c, r) => dialog.click(c, r, self.term.cols, self.term.rows),
            UiAction::Back => DialogOutcome::Cancel,
            _ => DialogOutcome::Stay,
        };

        match outcome {
            DialogOutcome::Stay => self.overlay = Overlay::Dialog(dialog),
            DialogOutcome::Rejected(why) => {
                self.mascot.notify(why);
                self.overlay = Overlay::Dialog(dialog);
            }
            DialogOutcome::Apply(afk) => {
                self.mascot.apply_afk_toggles(&afk);
                let saved = self.mascot.settings_to_save().afk_behavior;
                if let Err(e) = save_afk_toggles(&self.afk_settings_path, &saved) {
                    tracing::warn!(error = %format!("{e:#}"), "could not save AFK behaviour settings");
                    self.mascot.notify("Could not save AFK settings.");
                }
            }
            DialogOutcome::Cancel => {}
        }
    }

    fn current_notice(&mut self) -> Option<String> {
        let expired = self
            .notice
            .as_ref()
            .map_or(true, |(_, at)| at.elapsed() >= NOTICE_FOR);
        if expired {
            self.notice = self.mascot.take_notice().map(|n| (n, Instant::now()));
        }
        self.notice.as_ref().map(|(n, _)| n.clone())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let color = self.mascot.settings.render.enable_color;
        let notice = self.current_notice();
        let buf = &mut self.term.cur;
        buf.clear(BG);

        draw_mascot(buf, &self.mascot, color);
        draw_projectiles(buf, &self.mascot, color);
        if let Some(card) = &self.mascot.meme {
            draw_meme(buf, card, color);
        }
        match &self.overlay {
            Overlay::Menu(menu) => draw_menu(buf, menu),
            Overlay::Dialog(dialog) => draw_dialog(buf, dialog),
            Overlay::None => {}
        }
        draw_status(buf, &self.mascot, notice.as_deref());

        self.term.present(true)?;
        Ok(())
    }

    fn save_now(&self) -> anyhow::Result<()> {
        let mut settings = self.mascot.settings_to_save();
        settings.seed = self.configured_seed;
        save_settings_atomic(&self.settings_path, &settings)
            .with_context(|| format!("saving {}", self.settings_path.display()))?;
        save_afk_toggles(&self.afk_settings_path, &settings.afk_behavior)
            .with_context(|| format!("saving {}", self.afk_settings_path.display()))?;
        Ok(())
    }
}

pub(crate) fn run(cli: &Cli, paths: Paths) -> anyhow::Result<()> {
    let mut app = App::init(cli, paths)?;
    let result = app.run();
    // The terminal comes back even when the loop failed.
    let restored = app.term.end();
    if let Err(e) = app.save_now() {
        tracing::warn!(error = %format!("{e:#}"), "settings not saved");
    }
    tracing::info!(ok = result.is_ok(), "termascot exiting");
    result.and(restored)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
