use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::entities::GameState;

/// Represents semantic game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Fire,
    Pause,
    Resume,
    Restart,
    Quit,
}

/// Keys that stay active while held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeldKey {
    Left,
    Right,
    Fire,
}

fn held_key(code: KeyCode) -> Option<HeldKey> {
    match code {
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(HeldKey::Left),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(HeldKey::Right),
        KeyCode::Char(' ') => Some(HeldKey::Fire),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct KeyState {
    left: bool,
    right: bool,
    fire: bool,
}

impl KeyState {
    fn press(&mut self, key: HeldKey) {
        match key {
            // Opposite directions cancel so the latest press wins
            HeldKey::Left => {
                self.left = true;
                self.right = false;
            }
            HeldKey::Right => {
                self.right = true;
                self.left = false;
            }
            HeldKey::Fire => self.fire = true,
        }
    }

    fn release(&mut self, key: HeldKey) {
        match key {
            HeldKey::Left => self.left = false,
            HeldKey::Right => self.right = false,
            HeldKey::Fire => self.fire = false,
        }
    }
}

/// Manages input polling and translates raw key events into game actions
#[derive(Default)]
pub struct InputManager {
    key_state: KeyState,
    oneshot_actions: Vec<InputAction>,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains pending terminal events. Call once per frame before
    /// [`InputManager::get_actions`].
    pub fn poll_events(&mut self, game_state: GameState) -> color_eyre::Result<()> {
        self.oneshot_actions.clear();

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_key_event(key_event, game_state);
            }
        }

        Ok(())
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent, game_state: GameState) {
        match key_event.kind {
            KeyEventKind::Press => self.handle_key_press(key_event, game_state),
            KeyEventKind::Release => {
                if let Some(key) = held_key(key_event.code) {
                    self.key_state.release(key);
                }
            }
            _ => {}
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent, game_state: GameState) {
        // Quit works in any state
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        let oneshot = match (game_state, key_event.code) {
            (GameState::Playing, KeyCode::Char('p') | KeyCode::Char('P')) => {
                Some(InputAction::Pause)
            }
            (GameState::Paused, KeyCode::Char('p') | KeyCode::Char('P')) => {
                Some(InputAction::Resume)
            }
            (GameState::GameOver, KeyCode::Char('r') | KeyCode::Char('R')) => {
                Some(InputAction::Restart)
            }
            _ => None,
        };
        if let Some(action) = oneshot {
            self.oneshot_actions.push(action);
            return;
        }

        if game_state == GameState::Playing
            && let Some(key) = held_key(key_event.code)
        {
            self.key_state.press(key);
        }
    }

    /// One-shot actions of this frame followed by the held keys
    pub fn get_actions(&self, game_state: GameState) -> Vec<InputAction> {
        let mut actions = self.oneshot_actions.clone();

        if game_state == GameState::Playing {
            let held = [
                (self.key_state.left, InputAction::MoveLeft),
                (self.key_state.right, InputAction::MoveRight),
                (self.key_state.fire, InputAction::Fire),
            ];
            actions.extend(
                held.into_iter()
                    .filter_map(|(active, action)| active.then_some(action)),
            );
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn test_held_keys_repeat_until_released() {
        let mut input = InputManager::new();
        input.handle_key_event(press(KeyCode::Left), GameState::Playing);
        input.handle_key_event(press(KeyCode::Char(' ')), GameState::Playing);
        assert_eq!(
            input.get_actions(GameState::Playing),
            vec![InputAction::MoveLeft, InputAction::Fire]
        );

        input.handle_key_event(release(KeyCode::Char(' ')), GameState::Playing);
        assert_eq!(input.get_actions(GameState::Playing), vec![InputAction::MoveLeft]);
    }

    #[test]
    fn test_latest_direction_wins() {
        let mut input = InputManager::new();
        input.handle_key_event(press(KeyCode::Char('a')), GameState::Playing);
        input.handle_key_event(press(KeyCode::Char('d')), GameState::Playing);
        assert_eq!(input.get_actions(GameState::Playing), vec![InputAction::MoveRight]);
    }

    #[test]
    fn test_state_specific_oneshots() {
        let mut input = InputManager::new();
        input.handle_key_event(press(KeyCode::Char('p')), GameState::Playing);
        input.handle_key_event(press(KeyCode::Char('p')), GameState::Paused);
        input.handle_key_event(press(KeyCode::Char('r')), GameState::Playing);
        input.handle_key_event(press(KeyCode::Char('r')), GameState::GameOver);
        assert_eq!(
            input.get_actions(GameState::GameOver),
            vec![InputAction::Pause, InputAction::Resume, InputAction::Restart]
        );
    }

    #[test]
    fn test_movement_ignored_outside_play() {
        let mut input = InputManager::new();
        input.handle_key_event(press(KeyCode::Right), GameState::Paused);
        assert!(input.get_actions(GameState::Playing).is_empty());
    }

    #[test]
    fn test_quit_from_any_state() {
        let mut input = InputManager::new();
        input.handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            GameState::GameOver,
        );
        assert_eq!(input.get_actions(GameState::GameOver), vec![InputAction::Quit]);
    }
}
