// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Ownership : l'App appartient au thread UI, le worker ne la touche jamais
//
// CYCLE DE VIE DU SNAPSHOT :
// - submit() : vide l'erreur ET le snapshot précédent, passe en chargement
// - snapshot_loaded() : remplace entièrement le snapshot
// - fetch_failed() : affiche l'erreur, aucun snapshot partiel
// ============================================================================

use chrono::{DateTime, Local};

use crate::models::CanonicalSnapshot;

/// Ticker pré-rempli au lancement
pub const DEFAULT_TICKER: &str = "AAPL";

/// Normalise la saisie utilisateur : trim + majuscules
///
/// Retourne None si la saisie est vide (aucune requête n'est envoyée)
pub fn normalize_symbol(input: &str) -> Option<String> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Saisie du ticker (toujours active, sauf pendant un chargement)
    pub input_buffer: String,

    /// Une requête est en cours : la saisie est désactivée
    pub is_loading: bool,

    /// Ticker en cours de chargement
    pub pending_symbol: Option<String>,

    /// Dernière erreur à afficher (remplace le dashboard)
    pub error: Option<String>,

    /// Snapshot affiché, reconstruit à chaque fetch réussi
    pub snapshot: Option<CanonicalSnapshot>,

    /// Heure locale du dernier fetch réussi
    pub last_updated: Option<DateTime<Local>>,

    /// Défilement vertical du dashboard (en lignes)
    pub scroll: u16,

    /// Défilement maximal, recalculé à chaque rendu
    pub scroll_limit: u16,

    /// Two-step quit : première pression de Échap = confirmation demandée
    pub confirm_quit: bool,
}

impl App {
    /// Crée l'application avec un ticker pré-rempli
    pub fn new(initial_ticker: &str) -> Self {
        Self {
            running: true,
            input_buffer: initial_ticker.to_string(),
            is_loading: false,
            pending_symbol: None,
            error: None,
            snapshot: None,
            last_updated: None,
            scroll: 0,
            scroll_limit: 0,
            confirm_quit: false,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Saisie du ticker
    // ========================================================================

    /// Ajoute un caractère (ignoré pendant un chargement)
    pub fn append_char(&mut self, c: char) {
        if !self.is_loading {
            self.input_buffer.push(c);
        }
    }

    /// Supprime le dernier caractère (ignoré pendant un chargement)
    pub fn backspace(&mut self) {
        if !self.is_loading {
            self.input_buffer.pop();
        }
    }

    /// Vide la saisie (ignoré pendant un chargement)
    pub fn clear_input(&mut self) {
        if !self.is_loading {
            self.input_buffer.clear();
        }
    }

    /// Valide la saisie
    ///
    /// Retourne le symbole normalisé à envoyer au worker, ou None si :
    /// - une requête est déjà en cours (une seule à la fois)
    /// - la saisie est vide après trim
    pub fn submit(&mut self) -> Option<String> {
        if self.is_loading {
            return None;
        }

        let symbol = normalize_symbol(&self.input_buffer)?;

        self.input_buffer = symbol.clone();
        self.is_loading = true;
        self.pending_symbol = Some(symbol.clone());
        self.error = None;
        self.snapshot = None;
        self.scroll = 0;

        Some(symbol)
    }

    /// Vérifie si une requête est en cours
    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// Fetch réussi : le snapshot remplace entièrement le précédent
    pub fn snapshot_loaded(&mut self, snapshot: CanonicalSnapshot) {
        self.is_loading = false;
        self.pending_symbol = None;
        self.error = None;
        self.snapshot = Some(snapshot);
        self.last_updated = Some(Local::now());
    }

    /// Fetch échoué : message d'erreur, plus aucun snapshot affiché
    pub fn fetch_failed(&mut self, message: String) {
        self.is_loading = false;
        self.pending_symbol = None;
        self.snapshot = None;
        self.error = Some(message);
    }

    // ========================================================================
    // Défilement
    // ========================================================================

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Descend d'une ligne, sans dépasser la fin du contenu
    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1).min(self.scroll_limit);
    }

    /// Met à jour la borne (contenu ou terminal redimensionné)
    pub fn set_scroll_limit(&mut self, limit: u16) {
        self.scroll_limit = limit;
        self.scroll = self.scroll.min(limit);
    }

    // ========================================================================
    // Confirmation de quit
    // ========================================================================

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(DEFAULT_TICKER)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_creation() {
        let app = App::default();
        assert!(app.is_running());
        assert_eq!(app.input_buffer, "AAPL");
        assert!(!app.is_loading_data());
        assert!(app.snapshot.is_none());
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::default();
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("  aapl "), Some("AAPL".to_string()));
        assert_eq!(normalize_symbol("brk.b"), Some("BRK.B".to_string()));
        assert_eq!(normalize_symbol("   "), None);
        assert_eq!(normalize_symbol(""), None);
    }

    #[test]
    fn test_submit_clears_previous_state() {
        let mut app = App::new(" msft ");
        app.snapshot = Some(CanonicalSnapshot::default());
        app.error = Some("old error".to_string());

        assert_eq!(app.submit(), Some("MSFT".to_string()));
        assert!(app.is_loading_data());
        assert_eq!(app.input_buffer, "MSFT");
        assert!(app.snapshot.is_none());
        assert!(app.error.is_none());
    }

    #[test]
    fn test_empty_submit_is_ignored() {
        let mut app = App::new("  ");
        assert_eq!(app.submit(), None);
        assert!(!app.is_loading_data());
    }

    #[test]
    fn test_input_disabled_while_loading() {
        let mut app = App::new("AAPL");
        assert!(app.submit().is_some());

        app.append_char('X');
        app.backspace();
        app.clear_input();
        assert_eq!(app.input_buffer, "AAPL");

        // Une seule requête à la fois
        assert_eq!(app.submit(), None);
    }

    #[test]
    fn test_snapshot_lifecycle() {
        let mut app = App::new("AAPL");
        app.submit();
        app.snapshot_loaded(CanonicalSnapshot::default());
        assert!(!app.is_loading_data());
        assert!(app.snapshot.is_some());
        assert!(app.last_updated.is_some());

        app.submit();
        app.fetch_failed("ticker not found".to_string());
        assert!(app.snapshot.is_none());
        assert_eq!(app.error.as_deref(), Some("ticker not found"));

        // La saisie est de nouveau active
        app.append_char('L');
        assert_eq!(app.input_buffer, "AAPLL");
    }

    #[test]
    fn test_scroll_saturates() {
        let mut app = App::default();
        app.set_scroll_limit(5);
        app.scroll_up();
        assert_eq!(app.scroll, 0);
        app.scroll_down();
        app.scroll_down();
        app.scroll_up();
        assert_eq!(app.scroll, 1);
    }

    #[test]
    fn test_scroll_stops_at_limit() {
        let mut app = App::default();
        app.set_scroll_limit(2);
        for _ in 0..10 {
            app.scroll_down();
        }
        assert_eq!(app.scroll, 2);

        // Terminal agrandi : le contenu tient en moins de lignes
        app.set_scroll_limit(1);
        assert_eq!(app.scroll, 1);

        app.set_scroll_limit(0);
        app.scroll_down();
        assert_eq!(app.scroll, 0);
    }
}
