// ============================================================================
// Formatage pour l'affichage
// ============================================================================
// Transforme les valeurs du snapshot en chaînes déterministes :
// - devises avec suffixe de magnitude ($2.50T, $1.20B, $3.40M, $5.60K)
// - pourcentages avec normalisation fraction / pourcentage
// - indicateur de variation (+1.50% / -0.75%)
// - volumes avec séparateurs de milliers
//
// Toutes les fonctions sont pures et renvoient "N/A" pour une valeur absente.
// ============================================================================

use crate::models::{Field, Scalar, ValueKind};

/// Texte affiché pour toute valeur absente ou invalide
pub const NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// Arrondi à 2 décimales
// ============================================================================

/// Formate un nombre avec exactement 2 décimales
///
/// Les égalités binaires exactes (0.125, 2.375, ...) sont arrondies en
/// s'éloignant de zéro ; `format!("{:.2}")` les arrondirait au pair.
/// Un nombre de la forme k/200 n'est représentable en binaire que si
/// |v| * 8 est un entier impair, d'où le test ci-dessous.
///
/// Le signe "-" n'est ajouté que pour une valeur strictement négative :
/// -0.0 donne "0.00", -0.001 donne "-0.00".
pub fn to_fixed_2(value: f64) -> String {
    let magnitude = value.abs();
    let eighths = magnitude * 8.0;
    let sign = if value < 0.0 { "-" } else { "" };

    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        // Entier impair donc < 2^53 : le calcul en centièmes tient dans un u64
        let hundredths = (eighths as u64 * 25 + 1) / 2;
        format!("{}{}.{:02}", sign, hundredths / 100, hundredths % 100)
    } else {
        format!("{}{:.2}", sign, magnitude)
    }
}

/// Arrondit un nombre positif à `decimals` décimales, moitié vers le haut
///
/// L'arrondi porte sur l'écriture décimale la plus courte du nombre
/// ("0.0075", pas 0.00749999...), comme un affichage localisé.
fn round_half_up(magnitude: f64, decimals: usize) -> String {
    let repr = magnitude.to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    if frac_part.len() <= decimals {
        return format!("{}.{:0<width$}", int_part, frac_part, width = decimals);
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(decimals))
        .collect();

    if frac_part.as_bytes()[decimals] >= b'5' {
        // Retenue de droite à gauche : 0.9996 -> 1.000
        let mut carried = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carried = false;
                break;
            }
        }
        if carried {
            digits.insert(0, b'1');
        }
    }

    let digits: String = digits.into_iter().map(char::from).collect();
    let (int_digits, frac_digits) = digits.split_at(digits.len() - decimals);
    format!("{}.{}", int_digits, frac_digits)
}

// ============================================================================
// Devises
// ============================================================================

/// Formate un montant en dollars avec suffixe de magnitude
///
/// Les seuils sont évalués de haut en bas sur la valeur SIGNÉE : un montant
/// négatif prend toujours la branche simple ("$-5000000000.00").
///
/// # Exemples
/// - Some(2.5e12) -> "$2.50T"
/// - Some(150.25) -> "$150.25"
/// - None / NaN -> "N/A"
pub fn format_currency(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return NOT_AVAILABLE.to_string(),
    };

    if value >= 1e12 {
        format!("${}T", to_fixed_2(value / 1e12))
    } else if value >= 1e9 {
        format!("${}B", to_fixed_2(value / 1e9))
    } else if value >= 1e6 {
        format!("${}M", to_fixed_2(value / 1e6))
    } else if value >= 1e3 {
        format!("${}K", to_fixed_2(value / 1e3))
    } else {
        format!("${}", to_fixed_2(value))
    }
}

// ============================================================================
// Pourcentages
// ============================================================================

/// Normalise une valeur ambiguë fraction / pourcentage
///
/// Règle : |v| <= 1 est une fraction (multipliée par 100), sinon la valeur
/// est déjà un pourcentage. Exactement ±1 est une fraction (-> ±100).
pub fn normalize_percent(value: f64) -> f64 {
    if value.abs() <= 1.0 {
        value * 100.0
    } else {
        value
    }
}

/// Formate un pourcentage : "12.50%", "-3.00%" ou "N/A"
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", to_fixed_2(normalize_percent(v))),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Sens de la variation de prix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    /// Variation >= 0
    Positive,
    /// Variation < 0
    Negative,
}

/// Indicateur de variation prêt à afficher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeIndicator {
    pub direction: ChangeDirection,
    /// "+1.50%" pour une hausse, "-0.75%" pour une baisse
    pub label: String,
}

/// Classe une variation brute et construit son libellé
///
/// Retourne None si la variation est absente (rien n'est affiché)
pub fn classify_change(change: Option<f64>) -> Option<ChangeIndicator> {
    let change = change.filter(|c| c.is_finite())?;
    let percent = normalize_percent(change);

    let direction = if percent >= 0.0 {
        ChangeDirection::Positive
    } else {
        ChangeDirection::Negative
    };

    // Le signe négatif est porté par le nombre lui-même
    let prefix = match direction {
        ChangeDirection::Positive => "+",
        ChangeDirection::Negative => "",
    };

    Some(ChangeIndicator {
        direction,
        label: format!("{}{}%", prefix, to_fixed_2(percent)),
    })
}

// ============================================================================
// Volumes, ratios, scalaires
// ============================================================================

/// Formate un compteur avec séparateurs de milliers : "1,234,567"
///
/// Jusqu'à 3 décimales arrondies moitié vers le haut, zéros finaux
/// supprimés ("1,234.5")
pub fn format_count(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return NOT_AVAILABLE.to_string(),
    };

    let fixed = round_half_up(value.abs(), 3);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let is_zero = int_part == "0" && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
    }
}

/// Insère une virgule toutes les 3 positions en partant de la droite
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}

/// Formate un ratio tel quel (représentation la plus courte) : "1.25", "28"
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        // -0.0 s'afficherait "-0"
        Some(v) if v == 0.0 => "0".to_string(),
        Some(v) if v.is_finite() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Formate la valeur numérique d'un champ selon sa forme d'affichage
///
/// Un champ texte n'a pas de valeur numérique : le nombre est affiché brut
pub fn format_field(field: Field, value: Option<f64>) -> String {
    match field.kind() {
        ValueKind::Currency => format_currency(value),
        ValueKind::Percent => format_percent(value),
        ValueKind::Count => format_count(value),
        ValueKind::Ratio | ValueKind::Text => format_ratio(value),
    }
}

/// Formate un scalaire (nombre ou texte) tel quel
pub fn format_scalar(value: Option<&Scalar>) -> String {
    match value {
        Some(Scalar::Number(n)) => format_ratio(Some(*n)),
        Some(Scalar::Text(s)) => s.clone(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Texte libre, "N/A" si absent
pub fn format_text(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

// ============================================================================
// Tests unitaires
// ============================================================================
