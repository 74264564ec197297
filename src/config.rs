// ============================================================================
// Configuration
// ============================================================================
// Paramètres du backend, fournis par la ligne de commande ou l'environnement
//
// Ordre de priorité :
// 1. argument CLI (--api-base, --route, --timeout)
// 2. variable d'environnement (FINDASH_API_BASE, FINDASH_ROUTE, ...)
// 3. fichier .env (chargé par dotenv au démarrage)
// 4. valeur par défaut
// ============================================================================

use std::time::Duration;

use clap::{Args, ValueEnum};

/// URL du backend si rien n'est configuré
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Ancienne variable d'environnement du frontend web, encore acceptée
pub const LEGACY_API_BASE_ENV: &str = "REACT_APP_API_BASE";

/// Timeout par défaut d'une requête (secondes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Convention d'URL utilisée pour interroger le backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Route {
    /// GET {base}/company?ticker=<SYM>
    #[default]
    Query,
    /// GET {base}/api/financial-analysis/<SYM>
    Path,
}

/// Configuration résolue du client backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub route: Route,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Configuration avec la route et le timeout par défaut
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            route: Route::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

/// Arguments CLI liés au backend
///
/// CONCEPT RUST : #[derive(Args)]
/// - Groupe d'arguments réutilisable, aplati dans la CLI avec #[command(flatten)]
/// - env = "..." : clap lit la variable si l'argument est absent
#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// URL de base du backend (ex: http://localhost:8000)
    #[arg(long, env = "FINDASH_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Convention d'URL : query (/company?ticker=) ou path (/api/financial-analysis/)
    #[arg(long, env = "FINDASH_ROUTE", value_enum, default_value_t = Route::Query, global = true)]
    pub route: Route,

    /// Timeout d'une requête, en secondes (au moins 1)
    #[arg(
        long,
        env = "FINDASH_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout: u64,
}

impl BackendArgs {
    /// Résout la configuration finale
    ///
    /// L'URL de base vient de --api-base / FINDASH_API_BASE, sinon de
    /// REACT_APP_API_BASE, sinon de la valeur par défaut.
    pub fn resolve(&self) -> BackendConfig {
        let legacy = std::env::var(LEGACY_API_BASE_ENV).ok();
        self.resolve_with_fallback(legacy)
    }

    fn resolve_with_fallback(&self, legacy: Option<String>) -> BackendConfig {
        // Une valeur vide ou blanche compte comme absente, à chaque niveau
        let usable = |url: Option<String>| {
            url.map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
        };

        let base_url = usable(self.api_base.clone())
            .or_else(|| usable(legacy))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        BackendConfig::new(base_url)
            .with_route(self.route)
            .with_timeout(Duration::from_secs(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(api_base: Option<&str>) -> BackendArgs {
        BackendArgs {
            api_base: api_base.map(str::to_string),
            route: Route::Path,
            timeout: 5,
        }
    }

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.route, Route::Query);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_explicit_base_wins_over_legacy() {
        let config = args(Some("http://api:9000")).resolve_with_fallback(Some("http://old".into()));
        assert_eq!(config.base_url, "http://api:9000");
        assert_eq!(config.route, Route::Path);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_legacy_then_default() {
        let config = args(None).resolve_with_fallback(Some("http://old:8000".into()));
        assert_eq!(config.base_url, "http://old:8000");

        let config = args(Some("   ")).resolve_with_fallback(None);
        assert_eq!(config.base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn test_blank_base_falls_through_to_legacy() {
        let config = args(Some("   ")).resolve_with_fallback(Some(" http://old:8000 ".into()));
        assert_eq!(config.base_url, "http://old:8000");

        let config = args(Some("")).resolve_with_fallback(Some("  ".into()));
        assert_eq!(config.base_url, DEFAULT_API_BASE);
    }

    #[derive(Debug, clap::Parser)]
    struct TestCli {
        #[command(flatten)]
        backend: BackendArgs,
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        use clap::Parser;

        assert!(TestCli::try_parse_from(["findash", "--timeout", "0"]).is_err());

        let cli = TestCli::try_parse_from(["findash", "--timeout", "3"]).unwrap();
        assert_eq!(cli.backend.timeout, 3);
    }
}
