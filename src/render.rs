use crate::catalog::Frame;
use crate::geometry::{Point, CELL_H, CELL_W};
use crate::mascot::showdown::{HEART, STRONG};
use crate::mascot::{Mascot, MemeCard};
use crate::menu::{AfkDialog, DialogRow, MenuState, BUTTONS};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetAttribute, Attribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

pub(crate) const BG: Color = Color::Reset;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: BG,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    /// Signed coordinates; anything off the buffer is dropped.
    pub(crate) fn put(&mut self, x: i32, y: i32, c: Cell) {
        if x >= 0 && y >= 0 && x <= u16::MAX as i32 && y <= u16::MAX as i32 {
            self.set(x as u16, y as u16, c);
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
            c.bold = false;
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            DisableMouseCapture,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;
        let mut last_bold = false;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                if last_bold != c.bold {
                    let attr = if c.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = c.bold;
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Primitives
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(
            xx,
            y,
            Cell {
                ch,
                fg,
                bg,
                bold: false,
            },
        );
    }
}

pub(crate) fn draw_box(buf: &mut CellBuffer, x0: u16, y0: u16, w: u16, h: u16, fg: Color, bg: Color) {
    if w < 2 || h < 2 {
        return;
    }
    let cell = |ch| Cell {
        ch,
        fg,
        bg,
        bold: false,
    };
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            buf.set(x, y, cell(' '));
        }
    }
    for x in x0..x0 + w {
        buf.set(x, y0, cell('─'));
        buf.set(x, y0 + h - 1, cell('─'));
    }
    for y in y0..y0 + h {
        buf.set(x0, y, cell('│'));
        buf.set(x0 + w - 1, y, cell('│'));
    }
    buf.set(x0, y0, cell('┌'));
    buf.set(x0 + w - 1, y0, cell('┐'));
    buf.set(x0, y0 + h - 1, cell('└'));
    buf.set(x0 + w - 1, y0 + h - 1, cell('┘'));
}

/// Nearest-neighbour blit of a text-art frame. Spaces are transparent.
pub(crate) fn draw_frame(buf: &mut CellBuffer, frame: &Frame, top_left: Point, scale: f32, fg: Color) {
    let col0 = top_left.x.div_euclid(CELL_W);
    let row0 = top_left.y.div_euclid(CELL_H);
    let out_w = ((frame.w as f32 * scale).round() as i32).max(1);
    let out_h = ((frame.h() as f32 * scale).round() as i32).max(1);

    // Only the part that lands on the buffer; large scales can cover the screen many times over.
    let (j0, j1) = ((-row0).max(0), out_h.min(buf.h as i32 - row0));
    let (i0, i1) = ((-col0).max(0), out_w.min(buf.w as i32 - col0));
    for j in j0..j1 {
        let sy = ((j as f32 / scale) as usize).min(frame.h().saturating_sub(1));
        for i in i0..i1 {
            let sx = ((i as f32 / scale) as usize).min(frame.w.saturating_sub(1));
            let ch = frame.at(sx, sy);
            if ch == ' ' {
                continue;
            }
            buf.put(
                col0 + i,
                row0 + j,
                Cell {
                    ch,
                    fg,
                    bg: BG,
                    bold: true,
                },
            );
        }
    }
}

/// Draws `frame` so that its centre sits on `center`.
fn draw_frame_centered(buf: &mut CellBuffer, frame: &Frame, center: Point, scale: f32, fg: Color) {
    let w = ((frame.w as f32 * scale).round() as i32).max(1) * CELL_W;
    let h = ((frame.h() as f32 * scale).round() as i32).max(1) * CELL_H;
    draw_frame(buf, frame, Point::new(center.x - w / 2, center.y - h / 2), scale, fg);
}

fn tint(color: bool, c: Color) -> Color {
    if color {
        c
    } else {
        Color::White
    }
}

/* -----------------------------
   Scene
------------------------------ */

pub(crate) fn draw_mascot(buf: &mut CellBuffer, m: &Mascot, color: bool) {
    if !m.visible {
        return;
    }
    if let Some(frame) = m.frame() {
        draw_frame(buf, frame, m.pos, m.scale, tint(color, Color::Yellow));
    }
    if let Some((frame, at)) = m.zzz_overlay() {
        draw_frame(buf, frame, at, m.scale, tint(color, Color::Cyan));
    }
}

pub(crate) fn draw_projectiles(buf: &mut CellBuffer, m: &Mascot, color: bool) {
    let Some(duel) = m.showdown() else {
        return;
    };
    if let Some(anim) = m.catalog.get(HEART) {
        for h in &duel.hearts {
            if let Some(f) = anim.frames.get(h.frame).or_else(|| anim.frames.last()) {
                draw_frame_centered(buf, f, h.center(), m.scale, tint(color, Color::Yellow));
            }
        }
    }
    if let Some(anim) = m.catalog.get(STRONG) {
        for s in &duel.strong {
            if let Some(f) = anim.frames.get(s.frame).or_else(|| anim.frames.last()) {
                draw_frame_centered(buf, f, s.center, 1.0, tint(color, Color::Red));
            }
        }
    }
}

pub(crate) fn draw_meme(buf: &mut CellBuffer, card: &MemeCard, color: bool) {
    let x = card.pos.x.div_euclid(CELL_W);
    let y = card.pos.y.div_euclid(CELL_H);
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u16, y as u16);
    let (w, h) = (MemeCard::COLS as u16, MemeCard::ROWS as u16);
    let (fg, bg) = if color {
        (Color::Black, Color::Yellow)
    } else {
        (Color::White, BG)
    };
    draw_box(buf, x, y, w, h, fg, bg);

    let inner = (w - 4) as usize;
    let mut lines = vec![card.meme.title.as_str()];
    lines.extend(card.meme.lines.iter().map(String::as_str));
    for (i, line) in lines.iter().take((h - 3) as usize).enumerate() {
        let text: String = line.chars().take(inner).collect();
        let pad = if card.meme.placeholder {
            (inner.saturating_sub(text.chars().count()) / 2) as u16
        } else {
            0
        };
        draw_text(buf, x + 2 + pad, y + 1 + i as u16, &text, fg, bg);
    }
    if card.released {
        draw_text(buf, x + w.saturating_sub(10), y + h - 1, "[click]", fg, bg);
    }
}

pub(crate) fn draw_menu(buf: &mut CellBuffer, menu: &MenuState) {
    for level in &menu.levels {
        let (w, h) = level.size();
        draw_box(buf, level.x, level.y, w, h, Color::White, Color::DarkGrey);
        for (i, item) in level.items.iter().enumerate() {
            let (fg, bg) = if i == level.cursor {
                (Color::Black, Color::White)
            } else {
                (Color::White, Color::DarkGrey)
            };
            let label = format!(" {:<width$} ", item.label(), width = w.saturating_sub(4) as usize);
            draw_text(buf, level.x + 1, level.y + 1 + i as u16, &label, fg, bg);
        }
    }
}

pub(crate) fn draw_dialog(buf: &mut CellBuffer, d: &AfkDialog) {
    let (x0, y0, w, h) = AfkDialog::layout(buf.w, buf.h);
    let (fg, bg) = (Color::White, Color::DarkGrey);
    draw_box(buf, x0, y0, w, h, fg, bg);
    draw_text(buf, x0 + 2, y0, " AFK Behavior Settings ", fg, bg);

    let selected = d.selected_row();
    for (i, row) in AfkDialog::rows().iter().enumerate() {
        let y = y0 + 2 + i as u16;
        if y >= y0 + h - 1 {
            break;
        }
        let (rfg, rbg) = if i == selected {
            (Color::Black, Color::White)
        } else {
            (fg, bg)
        };
        match row {
            DialogRow::Header(name) => {
                draw_text(buf, x0 + 2, y, &format!("{name}:"), Color::Yellow, bg);
            }
            DialogRow::Toggle { key, label } => {
                let on = d.draft.get(key).unwrap_or(false);
                let mark = if on { "[x]" } else { "[ ]" };
                draw_text(buf, x0 + 4, y, &format!("{mark} {label}"), rfg, rbg);
            }
            DialogRow::Button(b) => {
                draw_text(buf, x0 + 4, y, &format!("< {} >", BUTTONS[*b]), rfg, rbg);
            }
        }
    }
}

/// The bottom line doubles as the tray.
pub(crate) fn draw_status(buf: &mut CellBuffer, m: &Mascot, notice: Option<&str>) {
    if buf.h == 0 {
        return;
    }
    let y = buf.h - 1;
    let bg = Color::DarkBlue;
    for x in 0..buf.w {
        buf.set(
            x,
            y,
            Cell {
                ch: ' ',
                fg: Color::White,
                bg,
                bold: false,
            },
        );
    }
    let afk = if m.settings.afk_behavior.afk_mode_enabled {
        "AFK on"
    } else {
        "AFK off"
    };
    let shown = if m.visible { "" } else { " (hidden)" };
    let text = match notice {
        Some(n) => format!(" termascot{shown} | {n}"),
        None => format!(
            " termascot{shown} | {} | {afk} | m/right-click menu  t show/hide  q exit",
            m.activity.name()
        ),
    };
    draw_text(buf, 0, y, &text, Color::White, bg);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> Frame {
        Frame::parse(text).unwrap()
    }

    fn row(buf: &CellBuffer, y: u16) -> String {
        (0..buf.w).map(|x| buf.cells[buf.idx(x, y)].ch).collect()
    }

    #[test]
    fn frame_blit_is_transparent_and_clipped() {
        let mut buf = CellBuffer::new(6, 3);
        draw_text(&mut buf, 0, 0, "......", Color::White, BG);
        draw_frame(&mut buf, &frame("a b\nccc"), Point::new(-CELL_W, 0), 1.0, Color::White);
        assert_eq!(row(&buf, 0), ".b....");
        assert_eq!(row(&buf, 1), "cc    ");
    }

    #[test]
    fn frame_blit_scales_up() {
        let mut buf = CellBuffer::new(6, 4);
        draw_frame(&mut buf, &frame("ab"), Point::new(0, 0), 2.0, Color::White);
        assert_eq!(row(&buf, 0), "aabb  ");
        assert_eq!(row(&buf, 1), "aabb  ");
        assert_eq!(row(&buf, 2), "      ");
    }

    #[test]
    fn box_has_corners() {
        let mut buf = CellBuffer::new(4, 3);
        draw_box(&mut buf, 0, 0, 4, 3, Color::White, BG);
        assert_eq!(row(&buf, 0), "┌──┐");
        assert_eq!(row(&buf, 1), "│  │");
        assert_eq!(row(&buf, 2), "└──┘");
    }

    #[test]
    fn status_shows_notice() {
        let m = crate::mascot::tests::mascot();
        let mut buf = CellBuffer::new(60, 2);
        draw_status(&mut buf, &m, Some("hello"));
        assert!(row(&buf, 1).contains("hello"));
        draw_status(&mut buf, &m, None);
        assert!(row(&buf, 1).contains("idle"));
    }
}
