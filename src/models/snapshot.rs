// ============================================================================
// Structure : CanonicalSnapshot
// ============================================================================
// Enregistrement canonique construit à partir d'un RawPayload
//
// - Chaque champ est optionnel (présent | absent)
// - Construit en entier à chaque fetch réussi, jamais fusionné
// - Les champs "pourcentage" gardent la valeur BRUTE (fraction ou %),
//   la normalisation est faite au formatage (voir format::normalize_percent)
//
// CONCEPTS RUST :
// 1. Composition : le snapshot regroupe plusieurs sous-structures
// 2. #[derive(Default)] : tous les champs à None / false / vide
// 3. Fonction pure : normalize() ne panique jamais, quelle que soit l'entrée
// ============================================================================

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::models::fields::{Field, STATEMENT_SECTIONS};
use crate::models::payload::{coerce_number, coerce_series, coerce_text, RawPayload};

/// Valeur scalaire affichée telle quelle (score de santé : nombre ou lettre)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

/// Données de marché
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketData {
    pub current_price: Option<f64>,
    /// Variation brute (fraction 0.015 ou pourcentage 1.5)
    pub change_percent: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub avg_volume: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
}

/// Ratios de valorisation et de rentabilité
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub beta: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub profit_margin: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub dividend_yield: Option<f64>,
}

/// Analyse qualitative
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub health_score: Option<Scalar>,
    pub recommendation: Option<String>,
    pub target_mean_price: Option<f64>,
    pub description: Option<String>,
}

/// Compte de résultat (TTM)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomeStatement {
    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
}

/// Bilan (MRQ)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceSheet {
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub shareholder_equity: Option<f64>,
}

/// Flux de trésorerie (TTM)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CashFlow {
    pub operating: Option<f64>,
    pub investing: Option<f64>,
    pub financing: Option<f64>,
    pub free: Option<f64>,
}

/// Enregistrement canonique, entièrement résolu
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalSnapshot {
    pub ticker: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    /// Horodatage fourni par le backend, si présent et lisible
    pub as_of: Option<NaiveDateTime>,

    pub market: MarketData,
    pub metrics: KeyMetrics,
    pub analysis: Analysis,

    pub income: IncomeStatement,
    pub balance: BalanceSheet,
    pub cash_flow: CashFlow,
    /// Vrai si le payload contient une section d'états financiers
    pub has_statements: bool,

    /// Série de prix, du plus ancien au plus récent
    pub price_history: Option<Vec<f64>>,
}

impl CanonicalSnapshot {
    /// Nom à afficher en titre : nom de l'entreprise, sinon le ticker
    pub fn display_name(&self) -> Option<&str> {
        self.company_name.as_deref().or(self.ticker.as_deref())
    }
}

// ============================================================================
// Normalisation
// ============================================================================

/// Construit un CanonicalSnapshot à partir d'un payload quelconque
///
/// CONCEPT : Fonction totale
/// - Aucun chemin d'erreur : un champ absent ou non numérique devient None
/// - Un payload qui n'est même pas un objet donne un snapshot vide
pub fn normalize(payload: &RawPayload) -> CanonicalSnapshot {
    let number = |field: Field| payload.resolve(field.paths()).and_then(coerce_number);
    let text = |field: Field| payload.resolve_text(field.paths());

    let ticker = text(Field::Ticker);
    let company_name = text(Field::CompanyName).or_else(|| ticker.clone());

    let snapshot = CanonicalSnapshot {
        company_name,
        sector: text(Field::Sector),
        industry: text(Field::Industry),
        as_of: payload
            .resolve(Field::Timestamp.paths())
            .and_then(Value::as_str)
            .and_then(parse_timestamp),

        market: MarketData {
            current_price: number(Field::CurrentPrice),
            change_percent: number(Field::ChangePercent),
            market_cap: number(Field::MarketCap),
            volume: number(Field::Volume),
            avg_volume: number(Field::AvgVolume),
            week_52_high: number(Field::Week52High),
            week_52_low: number(Field::Week52Low),
        },

        metrics: KeyMetrics {
            beta: number(Field::Beta),
            pe_ratio: number(Field::PeRatio),
            pb_ratio: number(Field::PbRatio),
            debt_to_equity: number(Field::DebtToEquity),
            current_ratio: number(Field::CurrentRatio),
            roe: number(Field::Roe),
            roa: number(Field::Roa),
            profit_margin: number(Field::ProfitMargin),
            gross_margin: number(Field::GrossMargin),
            operating_margin: number(Field::OperatingMargin),
            revenue_growth: number(Field::RevenueGrowth),
            dividend_yield: number(Field::DividendYield),
        },

        analysis: Analysis {
            health_score: payload
                .resolve(Field::HealthScore.paths())
                .and_then(coerce_scalar),
            recommendation: text(Field::Recommendation),
            target_mean_price: number(Field::TargetMeanPrice),
            description: text(Field::Description),
        },

        income: IncomeStatement {
            revenue: number(Field::Revenue),
            gross_profit: number(Field::GrossProfit),
            operating_income: number(Field::OperatingIncome),
            net_income: number(Field::NetIncome),
        },

        balance: BalanceSheet {
            total_assets: number(Field::TotalAssets),
            total_liabilities: number(Field::TotalLiabilities),
            shareholder_equity: number(Field::ShareholderEquity),
        },

        cash_flow: CashFlow {
            operating: number(Field::OperatingCashFlow),
            investing: number(Field::InvestingCashFlow),
            financing: number(Field::FinancingCashFlow),
            free: number(Field::FreeCashFlow),
        },

        has_statements: payload.has_any(STATEMENT_SECTIONS),

        price_history: payload
            .resolve(Field::PriceHistory.paths())
            .and_then(coerce_series),

        ticker,
    };

    debug!(
        ticker = ?snapshot.ticker,
        has_price = snapshot.market.current_price.is_some(),
        has_statements = snapshot.has_statements,
        history_points = snapshot.price_history.as_ref().map(Vec::len),
        "Payload normalized"
    );

    snapshot
}

/// Score de santé : nombre si possible, sinon texte brut ("A", "Strong")
fn coerce_scalar(value: &Value) -> Option<Scalar> {
    match value {
        Value::Number(_) => coerce_number(value).map(Scalar::Number),
        _ => coerce_text(value).map(Scalar::Text),
    }
}

/// Parse l'horodatage du backend
///
/// Formats acceptés :
/// - ISO 8601 sans fuseau ("2024-01-15T10:30:00.123456"), format datetime.isoformat()
/// - RFC 3339 avec fuseau ("2024-01-15T10:30:00Z"), converti en heure naïve UTC
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_of(value: Value) -> CanonicalSnapshot {
        normalize(&RawPayload::new(value))
    }

    #[test]
    fn test_nested_dialect_wins_over_flat() {
        let snapshot = snapshot_of(json!({
            "market_data": { "current_price": 10 },
            "current_price": 20
        }));

        assert_eq!(snapshot.market.current_price, Some(10.0));
    }

    #[test]
    fn test_flat_dialect_fallback() {
        let snapshot = snapshot_of(json!({
            "ticker": "MSFT",
            "current_price": 410.5,
            "52_week_high": 430.0,
            "52_week_low": 310.0,
            "1_month_change": -2.4,
            "beta": 0.9,
            "roe": 0.38
        }));

        assert_eq!(snapshot.market.current_price, Some(410.5));
        assert_eq!(snapshot.market.week_52_high, Some(430.0));
        assert_eq!(snapshot.market.week_52_low, Some(310.0));
        assert_eq!(snapshot.market.change_percent, Some(-2.4));
        assert_eq!(snapshot.metrics.beta, Some(0.9));
        assert_eq!(snapshot.metrics.roe, Some(0.38));
    }

    #[test]
    fn test_backend_dialect_aliases() {
        let snapshot = snapshot_of(json!({
            "ticker": "AAPL",
            "company_name": "Apple Inc.",
            "sector": "Technology",
            "timestamp": "2024-01-15T10:30:00.123456",
            "financial_statements": {
                "income_statement": { "total_revenue": 3.8e11, "net_income": 9.7e10 },
                "balance_sheet": { "shareholders_equity": 6.2e10 },
                "cash_flow": { "free_cash_flow": 9.9e10 }
            },
            "key_metrics": { "roe_percent": 156.08, "debt_to_equity_ratio": 4.67 },
            "market_data": { "pe_ratio": 29.1, "52_week_high": 199.62, "dividend_yield": 0.0051 },
            "analysis": { "recommendation": "buy", "target_mean_price": 210.5 }
        }));

        assert_eq!(snapshot.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(snapshot.sector.as_deref(), Some("Technology"));
        assert!(snapshot.as_of.is_some());
        assert!(snapshot.has_statements);
        assert_eq!(snapshot.income.revenue, Some(3.8e11));
        assert_eq!(snapshot.income.net_income, Some(9.7e10));
        assert_eq!(snapshot.balance.shareholder_equity, Some(6.2e10));
        assert_eq!(snapshot.cash_flow.free, Some(9.9e10));
        assert_eq!(snapshot.metrics.roe, Some(156.08));
        assert_eq!(snapshot.metrics.debt_to_equity, Some(4.67));
        assert_eq!(snapshot.metrics.pe_ratio, Some(29.1));
        assert_eq!(snapshot.metrics.dividend_yield, Some(0.0051));
        assert_eq!(snapshot.market.week_52_high, Some(199.62));
        assert_eq!(snapshot.analysis.recommendation.as_deref(), Some("buy"));
        assert_eq!(snapshot.analysis.target_mean_price, Some(210.5));
    }

    #[test]
    fn test_non_numeric_winner_is_absent() {
        // La première valeur non nulle gagne, même si elle n'est pas numérique
        let snapshot = snapshot_of(json!({
            "market_data": { "market_cap": "unknown" },
            "market_cap": 1e9
        }));

        assert_eq!(snapshot.market.market_cap, None);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let snapshot = snapshot_of(json!({ "market_data": { "volume": "1200300" } }));
        assert_eq!(snapshot.market.volume, Some(1_200_300.0));
    }

    #[test]
    fn test_company_name_falls_back_to_ticker() {
        let snapshot = snapshot_of(json!({ "ticker": "TSLA", "company": { "name": "" } }));
        assert_eq!(snapshot.company_name.as_deref(), Some("TSLA"));
        assert_eq!(snapshot.display_name(), Some("TSLA"));

        let snapshot = snapshot_of(json!({
            "ticker": "TSLA",
            "company": { "name": "Tesla, Inc." },
            "company_name": "Tesla"
        }));
        assert_eq!(snapshot.company_name.as_deref(), Some("Tesla, Inc."));
    }

    #[test]
    fn test_garbage_payload_never_faults() {
        for value in [json!(null), json!(42), json!("text"), json!([1, 2]), json!({})] {
            let snapshot = snapshot_of(value);
            assert_eq!(snapshot, CanonicalSnapshot::default());
        }
    }

    #[test]
    fn test_statements_flag_and_history() {
        let snapshot = snapshot_of(json!({
            "financials": { "income_statement": { "revenue": 1000 } },
            "market_data": { "price_history": [3, 1, 2] }
        }));

        assert!(snapshot.has_statements);
        assert_eq!(snapshot.income.revenue, Some(1000.0));
        assert_eq!(snapshot.price_history, Some(vec![3.0, 1.0, 2.0]));

        let snapshot = snapshot_of(json!({ "ticker": "X" }));
        assert!(!snapshot.has_statements);
        assert_eq!(snapshot.price_history, None);
    }

    #[test]
    fn test_health_score_number_or_text() {
        let snapshot = snapshot_of(json!({ "analysis": { "financial_health_score": 82 } }));
        assert_eq!(snapshot.analysis.health_score, Some(Scalar::Number(82.0)));

        let snapshot = snapshot_of(json!({ "financial_health_score": "A-" }));
        assert_eq!(
            snapshot.analysis.health_score,
            Some(Scalar::Text("A-".to_string()))
        );
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15T10:30:00").is_some());
        assert!(parse_timestamp("2024-01-15T10:30:00.123456").is_some());
        assert!(parse_timestamp("2024-01-15T10:30:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
