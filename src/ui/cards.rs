// ============================================================================
// Cartes du dashboard
// ============================================================================
// Transforme un CanonicalSnapshot en cartes (titre + lignes libellé/valeur)
//
// Ce module ne dessine rien : il produit des données prêtes à afficher,
// utilisées par le rendu ratatui (dashboard.rs) ET par la sortie texte
// de la commande `findash show`.
// ============================================================================

use std::fmt::Write as _;

use crate::format::{classify_change, format_field, format_scalar, format_text, ChangeIndicator};
use crate::models::{summarize_history, CanonicalSnapshot, Field};

/// Famille de carte (sert au placement dans la grille)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardGroup {
    /// Vue de marché, ratios, rentabilité, range 52 semaines
    Metrics,
    /// Compte de résultat, bilan, flux de trésorerie
    Statements,
    /// Résumé de l'historique des prix
    History,
}

/// Une ligne "libellé : valeur"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: &'static str,
    /// Champ canonique d'origine
    pub field: Field,
    pub value: String,
}

/// Une carte du dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: &'static str,
    pub group: CardGroup,
    pub rows: Vec<Row>,
}

impl Card {
    fn new(title: &'static str, group: CardGroup, rows: Vec<Row>) -> Self {
        Self { title, group, rows }
    }

    /// Valeur d'une ligne par libellé (pratique pour les tests et la sortie texte)
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

/// Ligne numérique : le formateur est choisi par la table des champs
fn row(label: &'static str, field: Field, value: Option<f64>) -> Row {
    Row {
        label,
        field,
        value: format_field(field, value),
    }
}

/// Ligne dont la valeur est déjà mise en forme (texte, score)
fn text_row(label: &'static str, field: Field, value: String) -> Row {
    Row { label, field, value }
}

/// En-tête : nom, prix, variation, ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub price: String,
    pub change: Option<ChangeIndicator>,
    pub subline: String,
    /// "Technology · Consumer Electronics", si connu
    pub classification: Option<String>,
}

/// Construit l'en-tête à partir du snapshot
pub fn build_header(snapshot: &CanonicalSnapshot) -> Header {
    let classification = match (snapshot.sector.as_deref(), snapshot.industry.as_deref()) {
        (Some(sector), Some(industry)) => Some(format!("{} · {}", sector, industry)),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    };

    Header {
        title: format_text(snapshot.display_name()),
        price: format_field(Field::CurrentPrice, snapshot.market.current_price),
        change: classify_change(snapshot.market.change_percent),
        subline: snapshot.ticker.clone().unwrap_or_default(),
        classification,
    }
}

/// Construit toutes les cartes, dans l'ordre d'affichage
///
/// - Les 4 cartes de métriques sont toujours présentes
/// - Les états financiers seulement si le payload en contient une section
/// - Le résumé des prix seulement si une série est fournie
pub fn build_cards(snapshot: &CanonicalSnapshot) -> Vec<Card> {
    let market = &snapshot.market;
    let metrics = &snapshot.metrics;
    let analysis = &snapshot.analysis;

    let mut cards = vec![
        Card::new(
            "Market Overview",
            CardGroup::Metrics,
            vec![
                row("Market Cap", Field::MarketCap, market.market_cap),
                row("Volume", Field::Volume, market.volume),
                row("Avg Volume", Field::AvgVolume, market.avg_volume),
                row("Beta", Field::Beta, metrics.beta),
            ],
        ),
        Card::new(
            "Valuation Ratios",
            CardGroup::Metrics,
            vec![
                row("P/E", Field::PeRatio, metrics.pe_ratio),
                row("P/B", Field::PbRatio, metrics.pb_ratio),
                row("Debt/Equity", Field::DebtToEquity, metrics.debt_to_equity),
                row("Current Ratio", Field::CurrentRatio, metrics.current_ratio),
            ],
        ),
        Card::new(
            "Profitability",
            CardGroup::Metrics,
            vec![
                row("ROE", Field::Roe, metrics.roe),
                row("ROA", Field::Roa, metrics.roa),
                row("Profit Margin", Field::ProfitMargin, metrics.profit_margin),
                row("Gross Margin", Field::GrossMargin, metrics.gross_margin),
                row("Operating Margin", Field::OperatingMargin, metrics.operating_margin),
                row("Revenue Growth", Field::RevenueGrowth, metrics.revenue_growth),
                row("Dividend Yield", Field::DividendYield, metrics.dividend_yield),
            ],
        ),
        Card::new(
            "52-Week Range",
            CardGroup::Metrics,
            vec![
                row("High", Field::Week52High, market.week_52_high),
                row("Low", Field::Week52Low, market.week_52_low),
                text_row(
                    "Health Score",
                    Field::HealthScore,
                    format_scalar(analysis.health_score.as_ref()),
                ),
                row("Target Price", Field::TargetMeanPrice, analysis.target_mean_price),
                text_row(
                    "Recommendation",
                    Field::Recommendation,
                    format_text(analysis.recommendation.as_deref()),
                ),
            ],
        ),
    ];

    if snapshot.has_statements {
        let income = &snapshot.income;
        let balance = &snapshot.balance;
        let cash = &snapshot.cash_flow;

        cards.push(Card::new(
            "Income Statement (TTM)",
            CardGroup::Statements,
            vec![
                row("Revenue", Field::Revenue, income.revenue),
                row("Gross Profit", Field::GrossProfit, income.gross_profit),
                row("Operating Income", Field::OperatingIncome, income.operating_income),
                row("Net Income", Field::NetIncome, income.net_income),
            ],
        ));
        cards.push(Card::new(
            "Balance Sheet (MRQ)",
            CardGroup::Statements,
            vec![
                row("Total Assets", Field::TotalAssets, balance.total_assets),
                row("Total Liabilities", Field::TotalLiabilities, balance.total_liabilities),
                row("Shareholder Equity", Field::ShareholderEquity, balance.shareholder_equity),
            ],
        ));
        cards.push(Card::new(
            "Cash Flow (TTM)",
            CardGroup::Statements,
            vec![
                row("Operating CF", Field::OperatingCashFlow, cash.operating),
                row("Investing CF", Field::InvestingCashFlow, cash.investing),
                row("Financing CF", Field::FinancingCashFlow, cash.financing),
                row("Free CF", Field::FreeCashFlow, cash.free),
            ],
        ));
    }

    if let Some(series) = snapshot.price_history.as_deref() {
        let summary = summarize_history(Some(series));
        cards.push(Card::new(
            "30-Day Price Summary",
            CardGroup::History,
            vec![
                row("Low", Field::PriceHistory, summary.low),
                row("High", Field::PriceHistory, summary.high),
                row("Latest", Field::PriceHistory, summary.latest),
            ],
        ));
    }

    cards
}

/// Rendu texte brut (commande `findash show`)
///
/// Format :
/// ```text
/// Apple Inc. (AAPL)
/// $150.25  +1.50%
///
/// [Market Overview]
///   Market Cap        $2.50T
/// ```
pub fn to_plain_text(snapshot: &CanonicalSnapshot) -> String {
    let header = build_header(snapshot);
    let mut out = String::new();

    // write! sur une String ne peut pas échouer
    if header.subline.is_empty() || header.subline == header.title {
        let _ = writeln!(out, "{}", header.title);
    } else {
        let _ = writeln!(out, "{} ({})", header.title, header.subline);
    }
    if let Some(classification) = &header.classification {
        let _ = writeln!(out, "{}", classification);
    }

    match &header.change {
        Some(change) => {
            let _ = writeln!(out, "{}  {}", header.price, change.label);
        }
        None => {
            let _ = writeln!(out, "{}", header.price);
        }
    }

    for card in build_cards(snapshot) {
        let _ = writeln!(out, "\n[{}]", card.title);
        for row in &card.rows {
            let _ = writeln!(out, "  {:<20}{}", row.label, row.value);
        }
    }

    if let Some(description) = &snapshot.analysis.description {
        let _ = writeln!(out, "\n[About]\n  {}", description);
    }

    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ChangeDirection;
    use crate::models::snapshot::KeyMetrics;
    use crate::models::{normalize, RawPayload, ValueKind};
    use serde_json::json;

    fn snapshot_of(value: serde_json::Value) -> CanonicalSnapshot {
        normalize(&RawPayload::new(value))
    }

    #[test]
    fn test_aapl_scenario_header() {
        let snapshot = snapshot_of(json!({
            "ticker": "AAPL",
            "market_data": {
                "current_price": 150.25,
                "change_percent": 0.015,
                "market_cap": 2.5e12
            }
        }));

        let header = build_header(&snapshot);
        assert_eq!(header.title, "AAPL");
        assert_eq!(header.price, "$150.25");
        let change = header.change.unwrap();
        assert_eq!(change.label, "+1.50%");
        assert_eq!(change.direction, ChangeDirection::Positive);
        assert_eq!(header.subline, "AAPL");

        let cards = build_cards(&snapshot);
        assert_eq!(cards[0].value_of("Market Cap"), Some("$2.50T"));
    }

    #[test]
    fn test_empty_snapshot_renders_na() {
        let cards = build_cards(&CanonicalSnapshot::default());

        // 4 cartes de métriques, pas d'états financiers ni d'historique
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.group == CardGroup::Metrics));
        for card in &cards {
            for row in &card.rows {
                assert_eq!(row.value, "N/A", "{} / {}", card.title, row.label);
            }
        }

        let header = build_header(&CanonicalSnapshot::default());
        assert_eq!(header.title, "N/A");
        assert_eq!(header.price, "N/A");
        assert!(header.change.is_none());
    }

    #[test]
    fn test_statement_and_history_cards() {
        let snapshot = snapshot_of(json!({
            "ticker": "AAPL",
            "financials": {
                "income_statement": { "revenue": 3.83e11, "net_income": 9.7e10 },
                "balance_sheet": { "total_assets": 3.5e11 },
                "cash_flow": { "operating_cash_flow": -2.5e9 }
            },
            "price_history": [3, 1, 2]
        }));

        let cards = build_cards(&snapshot);
        assert_eq!(cards.len(), 8);

        let income = cards.iter().find(|c| c.title == "Income Statement (TTM)").unwrap();
        assert_eq!(income.value_of("Revenue"), Some("$383.00B"));
        assert_eq!(income.value_of("Gross Profit"), Some("N/A"));

        let cash = cards.iter().find(|c| c.title == "Cash Flow (TTM)").unwrap();
        assert_eq!(cash.value_of("Operating CF"), Some("$-2500000000.00"));

        let history = cards.last().unwrap();
        assert_eq!(history.group, CardGroup::History);
        assert_eq!(history.value_of("Low"), Some("$1.00"));
        assert_eq!(history.value_of("High"), Some("$3.00"));
        assert_eq!(history.value_of("Latest"), Some("$2.00"));
    }

    #[test]
    fn test_empty_history_card_shows_na() {
        let snapshot = snapshot_of(json!({ "market_data": { "price_history": [] } }));
        let cards = build_cards(&snapshot);

        let history = cards.last().unwrap();
        assert_eq!(history.title, "30-Day Price Summary");
        assert!(history.rows.iter().all(|r| r.value == "N/A"));
    }

    #[test]
    fn test_profitability_percentages() {
        let snapshot = snapshot_of(json!({
            "key_metrics": { "roe": 0.25, "profit_margin": 24.3, "dividend_yield": 0.005 }
        }));

        let cards = build_cards(&snapshot);
        let profitability = &cards[2];
        assert_eq!(profitability.value_of("ROE"), Some("25.00%"));
        assert_eq!(profitability.value_of("Profit Margin"), Some("24.30%"));
        assert_eq!(profitability.value_of("Dividend Yield"), Some("0.50%"));
        assert_eq!(profitability.value_of("Revenue Growth"), Some("N/A"));
    }

    #[test]
    fn test_rows_use_the_field_formatter() {
        let mut snapshot = CanonicalSnapshot::default();
        snapshot.metrics = KeyMetrics {
            roe: Some(0.2),
            roa: Some(0.2),
            profit_margin: Some(0.2),
            gross_margin: Some(0.2),
            operating_margin: Some(0.2),
            revenue_growth: Some(0.2),
            dividend_yield: Some(0.2),
            beta: Some(0.2),
            ..KeyMetrics::default()
        };
        snapshot.market.market_cap = Some(0.2);
        snapshot.market.volume = Some(1234.0);

        for card in build_cards(&snapshot) {
            for row in &card.rows {
                if row.value == "N/A" {
                    continue;
                }
                match row.field.kind() {
                    ValueKind::Percent => assert_eq!(row.value, "20.00%", "{}", row.label),
                    ValueKind::Currency => assert_eq!(row.value, "$0.20", "{}", row.label),
                    ValueKind::Count => assert_eq!(row.value, "1,234", "{}", row.label),
                    ValueKind::Ratio | ValueKind::Text => assert_eq!(row.value, "0.2", "{}", row.label),
                }
            }
        }
    }

    #[test]
    fn test_plain_text_output() {
        let snapshot = snapshot_of(json!({
            "ticker": "AAPL",
            "company_name": "Apple Inc.",
            "market_data": { "current_price": 150.25, "change_percent": -0.0075 }
        }));

        let text = to_plain_text(&snapshot);
        assert!(text.starts_with("Apple Inc. (AAPL)\n$150.25  -0.75%\n"));
        assert!(text.contains("[Market Overview]"));
        assert!(text.contains("Market Cap"));
    }
}
