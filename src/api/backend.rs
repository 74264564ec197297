// ============================================================================
// API Client : backend d'analyse financière
// ============================================================================
// Récupère le payload financier d'un ticker depuis le backend HTTP
//
// Contrat réseau :
// - GET {base}/company?ticker=<SYM>            (route par défaut)
// - GET {base}/api/financial-analysis/<SYM>    (route alternative)
// - Corps : le payload JSON brut, ou l'enveloppe {success, data, error}
// - GET {base}/health : état du backend
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : requêtes non-bloquantes
// 2. thiserror : une erreur typée par cas d'échec
// 3. reqwest::Url : construction d'URL avec encodage automatique
// ============================================================================

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{BackendConfig, Route};
use crate::models::RawPayload;

/// Message affiché quand le backend signale un échec sans préciser l'erreur
pub const GENERIC_FAILURE: &str = "Failed to fetch data";

// ============================================================================
// Taxonomie des erreurs
// ============================================================================
// CONCEPT RUST : #[derive(Error)] (thiserror)
// - #[error("...")] génère l'implémentation de Display
// - #[source] chaîne l'erreur d'origine (visible dans les logs, pas dans l'UI)
// ============================================================================

/// Erreurs possibles lors d'un fetch
///
/// Le texte de Display est exactement ce que voit l'utilisateur
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL de base inutilisable
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Échec réseau (connexion refusée, DNS, timeout...)
    #[error("Failed to connect to backend")]
    Transport(#[source] reqwest::Error),

    /// Statut HTTP hors 2xx
    #[error("HTTP {0}")]
    Status(u16),

    /// Le backend a répondu {success: false, error: "..."}
    #[error("{0}")]
    Backend(String),

    /// Le corps de la réponse n'est pas du JSON
    #[error("Invalid response from backend")]
    InvalidBody(#[source] serde_json::Error),
}

/// Réponse de GET /health
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP vers le backend
///
/// CONCEPT RUST : reqwest::Client est un Arc interne
/// - Le cloner est peu coûteux, le pool de connexions est partagé
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl ApiClient {
    /// Crée un client avec le timeout de la configuration
    pub fn new(config: BackendConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("findash/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self::with_http_client(config, http))
    }

    /// Crée un client à partir d'un reqwest::Client déjà configuré
    pub fn with_http_client(config: BackendConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Configuration utilisée par ce client
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Récupère le payload brut d'un ticker
    ///
    /// Le symbole doit déjà être normalisé (trim + majuscules).
    ///
    /// # Erreurs
    /// * `Transport` - backend injoignable
    /// * `Status` - réponse HTTP hors 2xx
    /// * `Backend` - enveloppe {success: false}
    /// * `InvalidBody` - corps non JSON
    #[instrument(skip(self), fields(base = %self.config.base_url, route = ?self.config.route))]
    pub async fn fetch_company(&self, symbol: &str) -> Result<RawPayload, FetchError> {
        let url = build_company_url(&self.config, symbol)?;
        debug!(url = %url, "Built backend URL");

        let body = self.get_bytes(url).await?;
        let payload = decode_company_body(&body)?;

        info!(bytes = body.len(), "Company payload received");
        Ok(payload)
    }

    /// Interroge GET /health
    #[instrument(skip(self), fields(base = %self.config.base_url))]
    pub async fn health(&self) -> Result<HealthStatus, FetchError> {
        let url = build_health_url(&self.config)?;
        let body = self.get_bytes(url).await?;

        let status: HealthStatus =
            serde_json::from_slice(&body).map_err(FetchError::InvalidBody)?;
        info!(status = %status.status, "Backend health checked");
        Ok(status)
    }

    /// GET commun : transport + vérification du statut HTTP
    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        let response = self.http.get(url).send().await.map_err(|e| {
            error!(error = %e, "Backend request failed");
            FetchError::Transport(e)
        })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            warn!(status = %status, "Backend returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        Ok(body.to_vec())
    }
}

// ============================================================================
// Construction des URLs
// ============================================================================

/// Construit l'URL de la fiche entreprise selon la route configurée
///
/// Le symbole est encodé (path segment ou query string) par reqwest::Url
pub fn build_company_url(config: &BackendConfig, symbol: &str) -> Result<Url, FetchError> {
    let mut url = parse_base(&config.base_url)?;

    {
        // CONCEPT RUST : portée explicite
        // - path_segments_mut() emprunte url mutablement
        // - l'emprunt se termine à la fin du bloc
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(config.base_url.clone()))?;
        segments.pop_if_empty();

        match config.route {
            Route::Query => {
                segments.push("company");
            }
            Route::Path => {
                segments.extend(["api", "financial-analysis", symbol]);
            }
        }
    }

    if config.route == Route::Query {
        url.query_pairs_mut().append_pair("ticker", symbol);
    }

    Ok(url)
}

/// Construit l'URL du health check
pub fn build_health_url(config: &BackendConfig) -> Result<Url, FetchError> {
    let mut url = parse_base(&config.base_url)?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(config.base_url.clone()))?
        .pop_if_empty()
        .push("health");
    Ok(url)
}

fn parse_base(base_url: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| FetchError::InvalidUrl(format!("{} ({})", base_url, e)))?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

// ============================================================================
// Décodage de la réponse
// ============================================================================

/// Décode le corps d'une réponse 2xx
///
/// - Corps non JSON : InvalidBody
/// - Objet avec un booléen "success" : enveloppe
/// - Tout le reste : payload brut
pub fn decode_company_body(body: &[u8]) -> Result<RawPayload, FetchError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Response body is not JSON");
        FetchError::InvalidBody(e)
    })?;

    unwrap_envelope(value)
}

/// Déballe l'enveloppe {success, data, error} si elle est présente
///
/// CONCEPT RUST : match avec guard sur Option
/// - success absent ou non booléen : le document est le payload lui-même
/// - success: true sans objet "data" : échec générique, rien à afficher
pub fn unwrap_envelope(mut value: Value) -> Result<RawPayload, FetchError> {
    let success = value.get("success").and_then(Value::as_bool);

    match success {
        Some(true) => match value.get_mut("data").map(Value::take) {
            Some(data) if data.is_object() => Ok(RawPayload::new(data)),
            _ => {
                warn!("Success envelope without a data object");
                Err(envelope_error(&value))
            }
        },
        Some(false) => {
            let err = envelope_error(&value);
            warn!(error = %err, "Backend reported failure");
            Err(err)
        }
        None => Ok(RawPayload::new(value)),
    }
}

/// Message d'erreur de l'enveloppe, sinon le message générique
fn envelope_error(envelope: &Value) -> FetchError {
    let message = envelope
        .get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(GENERIC_FAILURE)
        .to_string();
    FetchError::Backend(message)
}

// ============================================================================
// Tests unitaires
// ============================================================================
