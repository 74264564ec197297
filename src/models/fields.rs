// ============================================================================
// Table de résolution des champs
// ============================================================================
// Pour chaque champ canonique, une liste ORDONNÉE de chemins d'accès :
// 1. dialecte imbriqué (market_data, key_metrics, financials, ...)
// 2. alias émis par le backend de référence (financial_statements,
//    *_percent, market_data.52_week_high, ...)
// 3. dialecte plat (champs au premier niveau)
//
// La première valeur définie et non nulle gagne.
//
// CONCEPT RUST : &'static [&'static [&'static str]]
// - Tables entièrement constantes, aucune allocation
// - Le compilateur les place dans le binaire (section read-only)
// ============================================================================

/// Chemin d'accès : suite de clés dans le document JSON
pub type Path = &'static [&'static str];

/// Champ canonique reconnu par le normaliseur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // Identité
    Ticker,
    CompanyName,
    Sector,
    Industry,
    Timestamp,

    // Données de marché
    CurrentPrice,
    ChangePercent,
    MarketCap,
    Volume,
    AvgVolume,
    Week52High,
    Week52Low,

    // Ratios et métriques clés
    Beta,
    PeRatio,
    PbRatio,
    DebtToEquity,
    CurrentRatio,
    Roe,
    Roa,
    ProfitMargin,
    GrossMargin,
    OperatingMargin,
    RevenueGrowth,
    DividendYield,

    // Analyse
    HealthScore,
    Recommendation,
    TargetMeanPrice,
    Description,

    // États financiers
    Revenue,
    GrossProfit,
    OperatingIncome,
    NetIncome,
    TotalAssets,
    TotalLiabilities,
    ShareholderEquity,
    OperatingCashFlow,
    InvestingCashFlow,
    FinancingCashFlow,
    FreeCashFlow,

    // Historique
    PriceHistory,
}

/// Sections dont la présence déclenche l'affichage des états financiers
pub const STATEMENT_SECTIONS: &[Path] = &[
    &["financials"],
    &["financial_statements"],
    &["income_statement"],
    &["balance_sheet"],
    &["cash_flow"],
];

/// Forme d'affichage d'un champ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Montant en dollars avec suffixe de magnitude
    Currency,
    /// Fraction ou pourcentage, normalisé |v| <= 1 -> v * 100
    Percent,
    /// Compteur avec séparateurs de milliers
    Count,
    /// Nombre brut
    Ratio,
    /// Texte libre
    Text,
}

impl Field {
    /// Tous les champs, dans l'ordre de déclaration
    #[cfg(test)]
    pub const ALL: [Field; 40] = [
        Field::Ticker,
        Field::CompanyName,
        Field::Sector,
        Field::Industry,
        Field::Timestamp,
        Field::CurrentPrice,
        Field::ChangePercent,
        Field::MarketCap,
        Field::Volume,
        Field::AvgVolume,
        Field::Week52High,
        Field::Week52Low,
        Field::Beta,
        Field::PeRatio,
        Field::PbRatio,
        Field::DebtToEquity,
        Field::CurrentRatio,
        Field::Roe,
        Field::Roa,
        Field::ProfitMargin,
        Field::GrossMargin,
        Field::OperatingMargin,
        Field::RevenueGrowth,
        Field::DividendYield,
        Field::HealthScore,
        Field::Recommendation,
        Field::TargetMeanPrice,
        Field::Description,
        Field::Revenue,
        Field::GrossProfit,
        Field::OperatingIncome,
        Field::NetIncome,
        Field::TotalAssets,
        Field::TotalLiabilities,
        Field::ShareholderEquity,
        Field::OperatingCashFlow,
        Field::InvestingCashFlow,
        Field::FinancingCashFlow,
        Field::FreeCashFlow,
        Field::PriceHistory,
    ];

    /// Chemins d'accès, du plus prioritaire au moins prioritaire
    pub fn paths(self) -> &'static [Path] {
        match self {
            Field::Ticker => &[&["ticker"], &["company", "ticker"]],
            // company.name puis company_name ; le ticker sert de repli final
            Field::CompanyName => &[&["company", "name"], &["company_name"]],
            Field::Sector => &[&["company", "sector"], &["sector"]],
            Field::Industry => &[&["company", "industry"], &["industry"]],
            Field::Timestamp => &[&["timestamp"]],

            Field::CurrentPrice => &[&["market_data", "current_price"], &["current_price"]],
            Field::ChangePercent => &[&["market_data", "change_percent"], &["1_month_change"]],
            Field::MarketCap => &[&["market_data", "market_cap"], &["market_cap"]],
            Field::Volume => &[&["market_data", "volume"], &["volume"]],
            Field::AvgVolume => &[&["market_data", "avg_volume"], &["avg_volume"]],
            Field::Week52High => &[
                &["market_data", "week_52_high"],
                &["market_data", "52_week_high"],
                &["52_week_high"],
            ],
            Field::Week52Low => &[
                &["market_data", "week_52_low"],
                &["market_data", "52_week_low"],
                &["52_week_low"],
            ],

            Field::Beta => &[&["key_metrics", "beta"], &["market_data", "beta"], &["beta"]],
            Field::PeRatio => &[
                &["key_metrics", "pe_ratio"],
                &["market_data", "pe_ratio"],
                &["pe_ratio"],
            ],
            Field::PbRatio => &[
                &["key_metrics", "pb_ratio"],
                &["market_data", "pb_ratio"],
                &["pb_ratio"],
            ],
            Field::DebtToEquity => &[
                &["key_metrics", "debt_to_equity"],
                &["key_metrics", "debt_to_equity_ratio"],
                &["debt_to_equity"],
            ],
            Field::CurrentRatio => &[&["key_metrics", "current_ratio"], &["current_ratio"]],
            Field::Roe => &[&["key_metrics", "roe"], &["key_metrics", "roe_percent"], &["roe"]],
            Field::Roa => &[&["key_metrics", "roa"], &["key_metrics", "roa_percent"], &["roa"]],
            Field::ProfitMargin => &[
                &["key_metrics", "profit_margin"],
                &["key_metrics", "profit_margin_percent"],
                &["profit_margin"],
            ],
            Field::GrossMargin => &[
                &["key_metrics", "gross_margin"],
                &["key_metrics", "gross_margin_percent"],
                &["gross_margin"],
            ],
            Field::OperatingMargin => &[
                &["key_metrics", "operating_margin"],
                &["key_metrics", "operating_margin_percent"],
                &["operating_margin"],
            ],
            Field::RevenueGrowth => &[&["key_metrics", "revenue_growth"], &["revenue_growth"]],
            Field::DividendYield => &[
                &["key_metrics", "dividend_yield"],
                &["market_data", "dividend_yield"],
                &["dividend_yield"],
            ],

            Field::HealthScore => &[
                &["analysis", "financial_health_score"],
                &["financial_health_score"],
            ],
            Field::Recommendation => &[&["analysis", "recommendation"], &["recommendation"]],
            Field::TargetMeanPrice => &[
                &["analysis", "target_mean_price"],
                &["target_mean_price"],
            ],
            Field::Description => &[
                &["analysis", "description"],
                &["company", "description"],
                &["description"],
            ],

            Field::Revenue => &[
                &["financials", "income_statement", "revenue"],
                &["financial_statements", "income_statement", "total_revenue"],
                &["income_statement", "revenue"],
            ],
            Field::GrossProfit => &[
                &["financials", "income_statement", "gross_profit"],
                &["financial_statements", "income_statement", "gross_profit"],
                &["income_statement", "gross_profit"],
            ],
            Field::OperatingIncome => &[
                &["financials", "income_statement", "operating_income"],
                &["financial_statements", "income_statement", "operating_income"],
                &["income_statement", "operating_income"],
            ],
            Field::NetIncome => &[
                &["financials", "income_statement", "net_income"],
                &["financial_statements", "income_statement", "net_income"],
                &["income_statement", "net_income"],
            ],
            Field::TotalAssets => &[
                &["financials", "balance_sheet", "total_assets"],
                &["financial_statements", "balance_sheet", "total_assets"],
                &["balance_sheet", "total_assets"],
            ],
            Field::TotalLiabilities => &[
                &["financials", "balance_sheet", "total_liabilities"],
                &["financial_statements", "balance_sheet", "total_liabilities"],
                &["balance_sheet", "total_liabilities"],
            ],
            Field::ShareholderEquity => &[
                &["financials", "balance_sheet", "shareholder_equity"],
                &["financial_statements", "balance_sheet", "shareholders_equity"],
                &["balance_sheet", "shareholder_equity"],
            ],
            Field::OperatingCashFlow => &[
                &["financials", "cash_flow", "operating_cash_flow"],
                &["financial_statements", "cash_flow", "operating_cash_flow"],
                &["cash_flow", "operating_cash_flow"],
            ],
            Field::InvestingCashFlow => &[
                &["financials", "cash_flow", "investing_cash_flow"],
                &["financial_statements", "cash_flow", "investing_cash_flow"],
                &["cash_flow", "investing_cash_flow"],
            ],
            Field::FinancingCashFlow => &[
                &["financials", "cash_flow", "financing_cash_flow"],
                &["financial_statements", "cash_flow", "financing_cash_flow"],
                &["cash_flow", "financing_cash_flow"],
            ],
            Field::FreeCashFlow => &[
                &["financials", "cash_flow", "free_cash_flow"],
                &["financial_statements", "cash_flow", "free_cash_flow"],
                &["cash_flow", "free_cash_flow"],
            ],

            Field::PriceHistory => &[&["market_data", "price_history"], &["price_history"]],
        }
    }

    /// Forme d'affichage du champ
    ///
    /// Le choix du formateur se fait ici et nulle part ailleurs
    pub fn kind(self) -> ValueKind {
        match self {
            Field::Ticker
            | Field::CompanyName
            | Field::Sector
            | Field::Industry
            | Field::Timestamp
            | Field::Recommendation
            | Field::Description => ValueKind::Text,

            Field::ChangePercent
            | Field::Roe
            | Field::Roa
            | Field::ProfitMargin
            | Field::GrossMargin
            | Field::OperatingMargin
            | Field::RevenueGrowth
            | Field::DividendYield => ValueKind::Percent,

            Field::Volume | Field::AvgVolume => ValueKind::Count,

            Field::Beta
            | Field::PeRatio
            | Field::PbRatio
            | Field::DebtToEquity
            | Field::CurrentRatio
            | Field::HealthScore => ValueKind::Ratio,

            Field::CurrentPrice
            | Field::MarketCap
            | Field::Week52High
            | Field::Week52Low
            | Field::TargetMeanPrice
            | Field::Revenue
            | Field::GrossProfit
            | Field::OperatingIncome
            | Field::NetIncome
            | Field::TotalAssets
            | Field::TotalLiabilities
            | Field::ShareholderEquity
            | Field::OperatingCashFlow
            | Field::InvestingCashFlow
            | Field::FinancingCashFlow
            | Field::FreeCashFlow
            | Field::PriceHistory => ValueKind::Currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_field_has_paths() {
        for field in Field::ALL {
            assert!(!field.paths().is_empty(), "{:?} has no path", field);
            for path in field.paths() {
                assert!(!path.is_empty(), "{:?} has an empty path", field);
            }
        }
    }

    #[test]
    fn test_all_is_exhaustive_and_unique() {
        let unique: HashSet<Field> = Field::ALL.iter().copied().collect();
        assert_eq!(unique.len(), Field::ALL.len());
    }

    #[test]
    fn test_nested_path_comes_before_flat_path() {
        // Le premier chemin est imbriqué ; le dernier est plat ou "flat.sous_objet"
        let nested_first = [
            Field::CurrentPrice,
            Field::MarketCap,
            Field::Beta,
            Field::Roe,
            Field::Week52High,
            Field::Revenue,
            Field::PriceHistory,
        ];

        for field in nested_first {
            let paths = field.paths();
            assert!(paths[0].len() > 1, "{:?} should try a nested path first", field);
            assert!(paths[paths.len() - 1].len() <= 2);
        }
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Field::ChangePercent.kind(), ValueKind::Percent);
        assert_eq!(Field::DividendYield.kind(), ValueKind::Percent);
        assert_eq!(Field::MarketCap.kind(), ValueKind::Currency);
        assert_eq!(Field::Volume.kind(), ValueKind::Count);
        assert_eq!(Field::DebtToEquity.kind(), ValueKind::Ratio);
        assert_eq!(Field::Recommendation.kind(), ValueKind::Text);
    }
}
