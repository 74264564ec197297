// ============================================================================
// Module : api
// ============================================================================
// Client HTTP vers le backend d'analyse financière
// ============================================================================

pub mod backend;  // Client backend (fiche entreprise + health check)

// Re-export des éléments principaux
pub use backend::{ApiClient, FetchError, HealthStatus};
