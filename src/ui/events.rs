// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// La ligne de saisie du ticker est toujours active : les lettres servent à
// taper le symbole, donc les raccourcis passent par des touches spéciales
// (Entrée, Échap, flèches, Ctrl+...).
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (redessine, relève les résultats du worker)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),

                // Resize, souris, Release... : un Tick suffit à redessiner
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : identifier une touche
// ============================================================================
// CONCEPT RUST : Pattern matching avec if let + matches!
// ============================================================================

/// Échap : quitter (avec confirmation)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Ctrl+C : quitter immédiatement
pub fn is_force_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
    } else {
        false
    }
}

/// Ctrl+U : vider la saisie (comme dans un shell)
pub fn is_clear_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('u'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Entrée
pub fn is_enter_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Enter)
    } else {
        false
    }
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Backspace)
    } else {
        false
    }
}

/// Flèche haut / Page Up : défilement vers le haut
pub fn is_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up | KeyCode::PageUp)
    } else {
        false
    }
}

/// Flèche bas / Page Down : défilement vers le bas
pub fn is_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down | KeyCode::PageDown)
    } else {
        false
    }
}

/// Caractère valide dans un ticker : alphanumérique, '-', '.', '^', '=' ou espace
///
/// Les combinaisons avec Ctrl / Alt ne sont pas des caractères de saisie
pub fn is_ticker_char_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        plain
            && matches!(
                key.code,
                KeyCode::Char(c) if c.is_alphanumeric() || matches!(c, '-' | '.' | '^' | '=' | ' ')
            )
    } else {
        false
    }
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Esc)));
        assert!(!is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_control_shortcuts() {
        assert!(is_force_quit_event(&ctrl('c')));
        assert!(!is_force_quit_event(&key(KeyCode::Char('c'))));
        assert!(is_clear_event(&ctrl('u')));
    }

    #[test]
    fn test_ticker_chars() {
        assert!(is_ticker_char_event(&key(KeyCode::Char('a'))));
        assert!(is_ticker_char_event(&key(KeyCode::Char('Q'))));
        assert!(is_ticker_char_event(&key(KeyCode::Char('.'))));
        assert!(is_ticker_char_event(&key(KeyCode::Char('^'))));
        assert!(!is_ticker_char_event(&key(KeyCode::Char('/'))));
        assert!(!is_ticker_char_event(&ctrl('c')));
        assert_eq!(get_char_from_event(&key(KeyCode::Char('z'))), Some('z'));
        assert_eq!(get_char_from_event(&key(KeyCode::Enter)), None);
    }
}
