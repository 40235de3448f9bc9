//! Context menu, AFK behaviour dialog and the commands they issue.

use crate::config::AfkBehaviorSettings;
use crate::mascot::{rides::RideKind, Activity, Mascot, SitPose};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    ToggleDance,
    ToggleFollow,
    Sit(SitPose),
    ToggleSleep,
    ToggleFall,
    ToggleAfkMode,
    ReturnToAfk,
    SetScale(f32),
    Character(String),
    Edward,
    CartRide,
    MemeCart,
    WhaleMail,
    HideAndSeek,
    Showdown,
    OpenAfkSettings,
    Exit,
}

/// Things only the app can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    None,
    OpenAfkSettings,
}

/// Runs a menu command against the mascot.
pub(crate) fn apply(m: &mut Mascot, cmd: Command) -> Effect {
    let always = matches!(
        cmd,
        Command::Exit | Command::SetScale(_) | Command::OpenAfkSettings
    );
    if m.busy() && !always {
        tracing::debug!(?cmd, activity = m.activity.name(), "command ignored while busy");
        return Effect::None;
    }
    tracing::debug!(?cmd, "menu command");

    match cmd {
        Command::ToggleDance => m.toggle_dance(),
        Command::ToggleFollow => m.toggle_follow_mouse(),
        Command::Sit(pose) => m.sit(pose),
        Command::ToggleSleep => m.toggle_sleep(),
        Command::ToggleFall => m.toggle_fall(),
        Command::ToggleAfkMode => m.toggle_afk_mode(),
        Command::ReturnToAfk => m.return_to_afk_mode(),
        Command::SetScale(s) => m.set_scale(s),
        Command::Character(name) => m.start_character_interaction(&name),
        Command::Edward => m.start_edward(),
        Command::CartRide => m.start_ride(RideKind::Cart),
        Command::MemeCart => m.start_ride(RideKind::MemeCart),
        Command::WhaleMail => m.start_ride(RideKind::WhaleMail),
        Command::HideAndSeek => {
            if !m.start_hide_and_seek() {
                m.notify("A game is already running.");
            }
        }
        Command::Showdown => {
            if !m.start_showdown() {
                m.notify("A game is already running.");
            }
        }
        Command::OpenAfkSettings => return Effect::OpenAfkSettings,
        Command::Exit => m.start_dying(),
    }
    Effect::None
}

/* -----------------------------
   Context menu
------------------------------ */

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MenuItem {
    Action(String, Command),
    Submenu(String, Vec<MenuItem>),
}

impl MenuItem {
    fn action(label: impl Into<String>, cmd: Command) -> Self {
        MenuItem::Action(label.into(), cmd)
    }

    pub(crate) fn label(&self) -> String {
        match self {
            MenuItem::Action(l, _) => l.clone(),
            MenuItem::Submenu(l, _) => format!("{l} >"),
        }
    }
}

fn check(on: bool) -> &'static str {
    if on {
        "[x]"
    } else {
        "[ ]"
    }
}

/// `characters_interactions_spr_clover_wave` -> `Characters Interactions Spr Clover Wave`
pub(crate) fn pretty_name(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                Some(f) => f.to_uppercase().chain(c.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub(crate) fn build_context_menu(m: &Mascot) -> Vec<MenuItem> {
    let dancing = matches!(m.activity, Activity::EternalDance);
    let following = matches!(m.activity, Activity::FollowMouse { .. });
    let sleeping = matches!(m.activity, Activity::Sleeping);
    let falling = matches!(m.activity, Activity::Falling);
    let afk_on = m.settings.afk_behavior.afk_mode_enabled;

    let mut items = vec![
        MenuItem::action(
            if dancing { "Stop Dancing" } else { "Dance Forever" },
            Command::ToggleDance,
        ),
        MenuItem::action(format!("Follow Mouse {}", check(following)), Command::ToggleFollow),
        MenuItem::Submenu(
            "Sit".into(),
            SitPose::ALL
                .iter()
                .map(|p| MenuItem::action(p.label(), Command::Sit(*p)))
                .collect(),
        ),
        MenuItem::action(format!("Sleep {}", check(sleeping)), Command::ToggleSleep),
        MenuItem::action(format!("Fall {}", check(falling)), Command::ToggleFall),
        MenuItem::action(
            format!("AFK Mode ({})", if afk_on { "ON" } else { "OFF" }),
            Command::ToggleAfkMode,
        ),
    ];
    if afk_on {
        items.push(MenuItem::action("Return to AFK", Command::ReturnToAfk));
    }

    let size = &m.settings.size;
    let current = size.current_scale;
    items.push(MenuItem::Submenu(
        format!("Size ({})", size.current_name()),
        size.choices()
            .map(|(scale, name)| {
                let mark = if (scale - current).abs() < f32::EPSILON { "*" } else { " " };
                MenuItem::action(format!("{mark} {name} ({scale}x)"), Command::SetScale(scale))
            })
            .collect(),
    ));

    let mut characters: Vec<MenuItem> = m
        .catalog
        .by_category("characters_interactions")
        .iter()
        .map(|n| MenuItem::action(pretty_name(n), Command::Character(n.clone())))
        .collect();
    characters.push(MenuItem::action("Edward", Command::Edward));
    items.push(MenuItem::Submenu("Character".into(), characters));

    items.extend([
        MenuItem::action("Cart Ride", Command::CartRide),
        MenuItem::action("Meme Cart", Command::MemeCart),
        MenuItem::action("Whale Mail", Command::WhaleMail),
        MenuItem::Submenu(
            "Minigames".into(),
            vec![
                MenuItem::action("Hide and Seek", Command::HideAndSeek),
                MenuItem::action("Showdown", Command::Showdown),
            ],
        ),
        MenuItem::action("AFK Behavior Settings", Command::OpenAfkSettings),
        MenuItem::action("Exit", Command::Exit),
    ]);
    items
}

#[derive(Clone, Debug)]
pub(crate) struct MenuLevel {
    pub(crate) items: Vec<MenuItem>,
    pub(crate) cursor: usize,
    pub(crate) x: u16,
    pub(crate) y: u16,
}

impl MenuLevel {
    fn new(items: Vec<MenuItem>, x: u16, y: u16, cols: u16, rows: u16) -> Self {
        let mut level = Self {
            items,
            cursor: 0,
            x: 0,
            y: 0,
        };
        let (w, h) = level.size();
        level.x = x.min(cols.saturating_sub(w));
        level.y = y.min(rows.saturating_sub(h));
        level
    }

    /// Box size including the border.
    pub(crate) fn size(&self) -> (u16, u16) {
        let widest = self
            .items
            .iter()
            .map(|i| i.label().chars().count())
            .max()
            .unwrap_or(0);
        ((widest + 4) as u16, (self.items.len() + 2) as u16)
    }

    fn item_at(&self, col: u16, row: u16) -> Option<usize> {
        let (w, h) = self.size();
        let inside = col > self.x && col < self.x + w - 1 && row > self.y && row < self.y + h - 1;
        inside.then(|| (row - self.y - 1) as usize)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MenuOutcome {
    Stay,
    Close,
}

/// An open context menu: the root plus any open submenus.
#[derive(Clone, Debug)]
pub(crate) struct MenuState {
    pub(crate) levels: Vec<MenuLevel>,
    cols: u16,
    rows: u16,
}

impl MenuState {
    pub(crate) fn open(items: Vec<MenuItem>, col: u16, row: u16, cols: u16, rows: u16) -> Self {
        Self {
            levels: vec![MenuLevel::new(items, col, row, cols, rows)],
            cols,
            rows,
        }
    }

    fn top(&mut self) -> Option<&mut MenuLevel> {
        self.levels.last_mut()
    }

    pub(crate) fn move_by(&mut self, delta: i32) {
        if let Some(l) = self.top() {
            let n = l.items.len() as i32;
            if n > 0 {
                l.cursor = (l.cursor as i32 + delta).rem_euclid(n) as usize;
            }
        }
    }

    /// Activates the highlighted item. Returns a command when one was chosen.
    pub(crate) fn enter(&mut self) -> Option<Command> {
        let (cols, rows) = (self.cols, self.rows);
        let level = self.levels.last()?;
        let (w, _) = level.size();
        match level.items.get(level.cursor)?.clone() {
            MenuItem::Action(_, cmd) => Some(cmd),
            MenuItem::Submenu(_, children) => {
                let x = level.x + w;
                let y = level.y + 1 + level.cursor as u16;
                self.levels.push(MenuLevel::new(children, x, y, cols, rows));
                None
            }
        }
    }

    /// Closes the innermost level.
    pub(crate) fn back(&mut self) -> MenuOutcome {
        self.levels.pop();
        if self.levels.is_empty() {
            MenuOutcome::Close
        } else {
            MenuOutcome::Stay
        }
    }

    pub(crate) fn hover(&mut self, col: u16, row: u16) {
        if let Some(l) = self.top() {
            if let Some(i) = l.item_at(col, row) {
                l.cursor = i;
            }
        }
    }

    /// Mouse click. A click outside every level closes the menu.
    pub(crate) fn click(&mut self, col: u16, row: u16) -> (MenuOutcome, Option<Command>) {
        let hit = self
            .levels
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, l)| l.item_at(col, row).map(|i| (depth, i)));
        let Some((depth, index)) = hit else {
            return (MenuOutcome::Close, None);
        };
        self.levels.truncate(depth + 1);
        if let Some(l) = self.top() {
            l.cursor = index;
        }
        (MenuOutcome::Stay, self.enter())
    }
}

/* -----------------------------
   AFK behaviour dialog
------------------------------ */

pub(crate) static GROUPS: [(&str, &[(&str, &str)]); 3] = [
    (
        "Movement",
        &[
            ("enable_walking", "Walking & Running"),
            ("enable_mouse_following", "Mouse Following"),
            ("enable_cart_rides", "Cart Rides"),
            ("enable_whale_mail", "Whale Mail Delivery"),
        ],
    ),
    (
        "Animation",
        &[
            ("enable_sitting", "Sitting Animations"),
            ("enable_dancing", "Dancing"),
            ("enable_sleeping", "Sleeping"),
            ("enable_falling", "Falling"),
        ],
    ),
    (
        "Interactive",
        &[
            ("enable_character_interactions", "Character Interactions"),
            ("enable_minigames", "Minigames"),
        ],
    ),
];

pub(crate) const BUTTONS: [&str; 4] = ["Select All", "Deselect All", "OK", "Cancel"];

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DialogRow {
    Header(&'static str),
    Toggle {
        key: &'static str,
        label: &'static str,
    },
    Button(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DialogOutcome {
    Stay,
    Rejected(&'static str),
    Apply(AfkBehaviorSettings),
    Cancel,
}

/// Edits a draft copy of the toggles; nothing changes until OK.
#[derive(Clone, Debug)]
pub(crate) struct AfkDialog {
    pub(crate) draft: AfkBehaviorSettings,
    pub(crate) cursor: usize,
}

impl AfkDialog {
    pub(crate) const W: u16 = 44;

    pub(crate) fn new(current: &AfkBehaviorSettings) -> Self {
        Self {
            draft: current.clone(),
            cursor: 0,
        }
    }

    pub(crate) fn rows() -> Vec<DialogRow> {
        let mut rows = Vec::new();
        for &(name, toggles) in GROUPS.iter() {
            rows.push(DialogRow::Header(name));
            for &(key, label) in toggles {
                rows.push(DialogRow::Toggle { key, label });
            }
        }
        rows.extend((0..BUTTONS.len()).map(DialogRow::Button));
        rows
    }

    fn selectable() -> Vec<usize> {
        Self::rows()
            .iter()
            .enumerate()
            .filter(|(_, r)| !matches!(r, DialogRow::Header(_)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Row index of the highlighted entry.
    pub(crate) fn selected_row(&self) -> usize {
        Self::selectable().get(self.cursor).copied().unwrap_or(0)
    }

    pub(crate) fn move_by(&mut self, delta: i32) {
        let n = Self::selectable().len() as i32;
        self.cursor = (self.cursor as i32 + delta).rem_euclid(n) as usize;
    }

    fn toggle_keys() -> impl Iterator<Item = &'static str> {
        GROUPS.iter().flat_map(|(_, t)| t.iter().map(|(k, _)| *k))
    }

    fn set_all(&mut self, on: bool) {
        for key in Self::toggle_keys() {
            self.draft.set(key, on);
        }
    }

    pub(crate) fn activate(&mut self) -> DialogOutcome {
        match Self::rows().get(self.selected_row()) {
            Some(DialogRow::Toggle { key, .. }) => {
                let on = self.draft.get(key).unwrap_or(false);
                self.draft.set(key, !on);
                DialogOutcome::Stay
            }
            Some(DialogRow::Button(0)) => {
                self.set_all(true);
                DialogOutcome::Stay
            }
            Some(DialogRow::Button(1)) => {
                self.set_all(false);
                DialogOutcome::Stay
            }
            Some(DialogRow::Button(2)) => {
                let any = Self::toggle_keys().any(|k| self.draft.get(k).unwrap_or(false));
                if any {
                    DialogOutcome::Apply(self.draft.clone())
                } else {
                    DialogOutcome::Rejected("Enable at least one AFK behaviour.")
                }
            }
            Some(DialogRow::Button(_)) => DialogOutcome::Cancel,
            _ => DialogOutcome::Stay,
        }
    }

    /// Top-left and size of the dialog box on a `cols` x `rows` screen.
    pub(crate) fn layout(cols: u16, rows: u16) -> (u16, u16, u16, u16) {
        let w = Self::W.min(cols);
        let h = (Self::rows().len() as u16 + 4).min(rows);
        (cols.saturating_sub(w) / 2, rows.saturating_sub(h) / 2, w, h)
    }

    pub(crate) fn click(&mut self, col: u16, row: u16, cols: u16, rows: u16) -> DialogOutcome {
        let (x0, y0, w, _) = Self::layout(cols, rows);
        if col <= x0 || col >= x0 + w || row < y0 + 2 {
            return DialogOutcome::Stay;
        }
        let index = (row - y0 - 2) as usize;
        match Self::selectable().iter().position(|r| *r == index) {
            Some(c) => {
                self.cursor = c;
                self.activate()
            }
            None => DialogOutcome::Stay,
        }
    }
}
