// ============================================================================
// findash - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client HTTP du backend
pub mod app;       // État de l'application
pub mod config;    // Configuration (URL, route, timeout)
pub mod format;    // Formatage monnaie / pourcentages
pub mod models;    // Payload brut et snapshot canonique
pub mod ui;        // Interface utilisateur
