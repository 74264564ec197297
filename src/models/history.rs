// ============================================================================
// Résumé de l'historique des prix
// ============================================================================
// Plus bas, plus haut et dernier prix d'une série chronologique
// ============================================================================

use serde::Serialize;

/// Résumé d'une série de prix (tous les champs absents si la série est vide)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HistorySummary {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub latest: Option<f64>,
}

/// Calcule min / max / dernier élément
///
/// CONCEPT RUST : fold sur un itérateur
/// - f64 n'implémente pas Ord (à cause de NaN), donc pas de .min() direct
/// - f64::min / f64::max ignorent les NaN
///
/// Une série absente ou vide ne panique pas : tout est None
pub fn summarize_history(series: Option<&[f64]>) -> HistorySummary {
    let series = match series {
        Some(series) if !series.is_empty() => series,
        _ => return HistorySummary::default(),
    };

    let low = series.iter().copied().fold(f64::INFINITY, f64::min);
    let high = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    HistorySummary {
        low: Some(low),
        high: Some(high),
        latest: series.last().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_empty_history() {
        assert_eq!(summarize_history(Some(&[])), HistorySummary::default());
        assert_eq!(summarize_history(None), HistorySummary::default());
    }

    #[test]
    fn test_summarize_history() {
        let summary = summarize_history(Some(&[3.0, 1.0, 2.0]));
        assert_eq!(summary.low, Some(1.0));
        assert_eq!(summary.high, Some(3.0));
        assert_eq!(summary.latest, Some(2.0));
    }

    #[test]
    fn test_single_point_history() {
        let summary = summarize_history(Some(&[42.5]));
        assert_eq!(summary.low, Some(42.5));
        assert_eq!(summary.high, Some(42.5));
        assert_eq!(summary.latest, Some(42.5));
    }
}
