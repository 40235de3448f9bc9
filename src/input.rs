use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InputEvent {
    Key { key: KeyCode, mods: KeyModifiers },
    Mouse { kind: MouseEventKind, col: u16, row: u16 },
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        match event::read()? {
            Event::Key(k) => {
                if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                    out.push(InputEvent::Key {
                        key: k.code,
                        mods: k.modifiers,
                    });
                }
            }
            Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) => out.push(InputEvent::Mouse {
                kind,
                col: column,
                row,
            }),
            _ => {}
        }
        if out.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

/// Which layer currently owns the keyboard and mouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Layer {
    Desktop,
    Menu,
    Dialog,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UiAction {
    /// Ctrl+C: leave immediately.
    Quit,
    /// Leave through the dying animation.
    Exit,
    ToggleVisibility,
    OpenMenuAtMascot,
    OpenMenuAt(u16, u16),
    Press(u16, u16),
    Drag(u16, u16),
    Release,
    PointerMoved(u16, u16),
    Move(i32),
    Activate,
    Back,
    Click(u16, u16),
    Hover(u16, u16),
}

pub(crate) fn map_event_to_action(layer: Layer, ev: InputEvent) -> Option<UiAction> {
    match ev {
        InputEvent::Key { key, mods } => map_key(layer, key, mods),
        InputEvent::Mouse { kind, col, row } => map_mouse(layer, kind, col, row),
    }
}

fn map_key(layer: Layer, key: KeyCode, mods: KeyModifiers) -> Option<UiAction> {
    // Global
    if matches!(key, KeyCode::Char('c') | KeyCode::Char('C'))
        && mods.contains(KeyModifiers::CONTROL)
    {
        return Some(UiAction::Quit);
    }

    match layer {
        Layer::Desktop => match key {
            KeyCode::Char('m') | KeyCode::Char('M') => Some(UiAction::OpenMenuAtMascot),
            KeyCode::Char('t') | KeyCode::Char('T') => Some(UiAction::ToggleVisibility),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(UiAction::Exit),
            _ => None,
        },
        Layer::Menu | Layer::Dialog => match key {
            KeyCode::Up => Some(UiAction::Move(-1)),
            KeyCode::Down => Some(UiAction::Move(1)),
            KeyCode::Tab => Some(UiAction::Move(1)),
            KeyCode::BackTab => Some(UiAction::Move(-1)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(UiAction::Activate),
            KeyCode::Right if layer == Layer::Menu => Some(UiAction::Activate),
            KeyCode::Left if layer == Layer::Menu => Some(UiAction::Back),
            KeyCode::Esc => Some(UiAction::Back),
            _ => None,
        },
    }
}

fn map_mouse(layer: Layer, kind: MouseEventKind, col: u16, row: u16) -> Option<UiAction> {
    match (layer, kind) {
        (Layer::Desktop, MouseEventKind::Down(MouseButton::Left)) => Some(UiAction::Press(col, row)),
        (Layer::Desktop, MouseEventKind::Down(MouseButton::Right)) => {
            Some(UiAction::OpenMenuAt(col, row))
        }
        (Layer::Desktop, MouseEventKind::Drag(MouseButton::Left)) => Some(UiAction::Drag(col, row)),
        (Layer::Desktop, MouseEventKind::Up(MouseButton::Left)) => Some(UiAction::Release),
        (_, MouseEventKind::Moved) if layer == Layer::Menu => Some(UiAction::Hover(col, row)),
        (_, MouseEventKind::Moved) => Some(UiAction::PointerMoved(col, row)),
        (Layer::Menu | Layer::Dialog, MouseEventKind::Down(_)) => Some(UiAction::Click(col, row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: KeyCode) -> InputEvent {
        InputEvent::Key {
            key: c,
            mods: KeyModifiers::NONE,
        }
    }

    fn mouse(kind: MouseEventKind) -> InputEvent {
        InputEvent::Mouse { kind, col: 4, row: 2 }
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let ev = InputEvent::Key {
            key: KeyCode::Char('c'),
            mods: KeyModifiers::CONTROL,
        };
        for layer in [Layer::Desktop, Layer::Menu, Layer::Dialog] {
            assert_eq!(map_event_to_action(layer, ev.clone()), Some(UiAction::Quit));
        }
    }

    #[test]
    fn desktop_keys() {
        assert_eq!(
            map_event_to_action(Layer::Desktop, key(KeyCode::Char('q'))),
            Some(UiAction::Exit)
        );
        assert_eq!(
            map_event_to_action(Layer::Desktop, key(KeyCode::Char('t'))),
            Some(UiAction::ToggleVisibility)
        );
        assert_eq!(map_event_to_action(Layer::Desktop, key(KeyCode::Up)), None);
    }

    #[test]
    fn menu_keys_do_not_leak_to_desktop() {
        assert_eq!(map_event_to_action(Layer::Menu, key(KeyCode::Char('q'))), None);
        assert_eq!(map_event_to_action(Layer::Menu, key(KeyCode::Left)), Some(UiAction::Back));
        assert_eq!(map_event_to_action(Layer::Dialog, key(KeyCode::Left)), None);
    }

    #[test]
    fn mouse_buttons() {
        assert_eq!(
            map_event_to_action(Layer::Desktop, mouse(MouseEventKind::Down(MouseButton::Right))),
            Some(UiAction::OpenMenuAt(4, 2))
        );
        assert_eq!(
            map_event_to_action(Layer::Menu, mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(UiAction::Click(4, 2))
        );
        assert_eq!(
            map_event_to_action(Layer::Dialog, mouse(MouseEventKind::Moved)),
            Some(UiAction::PointerMoved(4, 2))
        );
        assert_eq!(
            map_event_to_action(Layer::Desktop, mouse(MouseEventKind::ScrollUp)),
            None
        );
    }
}
