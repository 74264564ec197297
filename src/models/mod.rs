// ============================================================================
// Module : models
// ============================================================================
// Structures de données : payload brut, table de résolution, snapshot
// canonique et résumé de l'historique des prix
// ============================================================================

pub mod fields;   // Table des chemins d'accès par champ canonique
pub mod history;  // Résumé min / max / dernier prix
pub mod payload;  // Document JSON brut et coercition de types
pub mod snapshot; // Snapshot canonique et normalisation

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use findash::models::snapshot::CanonicalSnapshot;
// On peut faire : use findash::models::CanonicalSnapshot;
pub use fields::{Field, ValueKind};
pub use history::{summarize_history, HistorySummary};
pub use payload::RawPayload;
pub use snapshot::{normalize, CanonicalSnapshot, Scalar};
