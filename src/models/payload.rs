// ============================================================================
// Structure : RawPayload
// ============================================================================
// Document JSON brut renvoyé par le backend, non fiable par définition
//
// Deux dialectes coexistent côté backend :
// - imbriqué : market_data / key_metrics / financials / analysis / company
// - plat : les mêmes champs au premier niveau ("52_week_high", "beta", ...)
//
// CONCEPTS RUST :
// 1. Newtype pattern : RawPayload(Value) encapsule serde_json::Value
// 2. Option<&T> : chaque accès peut échouer sans jamais paniquer
// 3. Opérateur ? sur Option : sortie anticipée dès qu'un segment manque
// ============================================================================

use serde_json::Value;

/// Document JSON brut (dialecte imbriqué, plat, ou un mélange des deux)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload(Value);

impl RawPayload {
    /// Encapsule une valeur JSON quelconque (objet, tableau, scalaire...)
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Suit un chemin de clés dans le document
    ///
    /// Retourne None si un segment manque, si un segment intermédiaire
    /// n'est pas un objet, ou si la valeur finale est `null`.
    ///
    /// CONCEPT RUST : ? sur Option
    /// - as_object()? : sort avec None si ce n'est pas un objet
    /// - get(key)? : sort avec None si la clé n'existe pas
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let mut current = &self.0;
        for key in path {
            current = current.as_object()?.get(*key)?;
        }

        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// Évalue les chemins dans l'ordre : la première valeur définie et non
    /// nulle gagne, qu'elle soit numérique ou non
    pub fn resolve(&self, paths: &[&[&str]]) -> Option<&Value> {
        paths.iter().find_map(|path| self.lookup(path))
    }

    /// Évalue les chemins dans l'ordre et garde la première chaîne non vide
    ///
    /// Sémantique "ou logique" : une chaîne vide passe au chemin suivant
    pub fn resolve_text(&self, paths: &[&[&str]]) -> Option<String> {
        paths
            .iter()
            .filter_map(|path| self.lookup(path))
            .find_map(coerce_text)
    }

    /// Vrai si au moins un des chemins mène à une valeur non nulle
    pub fn has_any(&self, paths: &[&[&str]]) -> bool {
        paths.iter().any(|path| self.lookup(path).is_some())
    }
}

// ============================================================================
// Coercition de types
// ============================================================================
// Le backend peut envoyer des nombres, des chaînes numériques ("12.5"),
// ou n'importe quoi d'autre. La coercition se fait APRÈS la résolution.
// ============================================================================

/// Convertit une valeur JSON en nombre
///
/// - Number : converti en f64
/// - String : parsée après trim ("12.5" -> 12.5), vide -> None
/// - Tout le reste (bool, objet, tableau) : None
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };

    // "NaN" / "inf" sont acceptés par parse::<f64>, on les rejette
    if number.is_finite() {
        Some(number)
    } else {
        None
    }
}

/// Convertit une valeur JSON en texte affichable
///
/// Les chaînes vides sont considérées comme absentes
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Convertit une valeur JSON en série numérique
///
/// Seuls les tableaux sont acceptés ; les éléments non numériques sont
/// ignorés, l'ordre chronologique est conservé.
pub fn coerce_series(value: &Value) -> Option<Vec<f64>> {
    let items = value.as_array()?;
    Some(items.iter().filter_map(coerce_number).collect())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_path() {
        let payload = RawPayload::new(json!({
            "market_data": { "current_price": 150.25 }
        }));

        assert_eq!(
            payload.lookup(&["market_data", "current_price"]),
            Some(&json!(150.25))
        );
        assert_eq!(payload.lookup(&["market_data", "volume"]), None);
        assert_eq!(payload.lookup(&["key_metrics", "beta"]), None);
    }

    #[test]
    fn test_lookup_through_non_object_is_absent() {
        let payload = RawPayload::new(json!({ "market_data": 42 }));
        assert_eq!(payload.lookup(&["market_data", "current_price"]), None);

        let payload = RawPayload::new(json!([1, 2, 3]));
        assert_eq!(payload.lookup(&["ticker"]), None);
    }

    #[test]
    fn test_null_counts_as_absent() {
        let payload = RawPayload::new(json!({
            "market_data": { "current_price": null },
            "current_price": 20
        }));

        let paths: &[&[&str]] = &[&["market_data", "current_price"], &["current_price"]];
        assert_eq!(payload.resolve(paths), Some(&json!(20)));
    }

    #[test]
    fn test_first_non_null_wins_even_if_not_numeric() {
        let payload = RawPayload::new(json!({
            "market_data": { "current_price": "n/a" },
            "current_price": 20
        }));

        let paths: &[&[&str]] = &[&["market_data", "current_price"], &["current_price"]];
        let winner = payload.resolve(paths).unwrap();
        assert_eq!(winner, &json!("n/a"));
        assert_eq!(coerce_number(winner), None);
    }

    #[test]
    fn test_resolve_text_skips_empty_strings() {
        let payload = RawPayload::new(json!({
            "company": { "name": "" },
            "company_name": "Apple Inc."
        }));

        let paths: &[&[&str]] = &[&["company", "name"], &["company_name"]];
        assert_eq!(payload.resolve_text(paths), Some("Apple Inc.".to_string()));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!(" 0.125 ")), Some(0.125));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!({ "value": 1 })), None);
    }

    #[test]
    fn test_coerce_series_skips_garbage() {
        let series = coerce_series(&json!([1.0, "2", null, "x", 3])).unwrap();
        assert_eq!(series, vec![1.0, 2.0, 3.0]);

        assert_eq!(coerce_series(&json!("not a list")), None);
        assert_eq!(coerce_series(&json!([])), Some(vec![]));
    }
}
