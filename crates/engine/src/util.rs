//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

const MAX_NAME_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Trim a required name, rejecting blank or oversized values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(EngineError::InvalidName(format!(
            "{label} name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim optional free text; blank collapses to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(EngineError::InvalidName(format!(
            "description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Case-folded uniqueness key for category names.
///
/// NFKC folds compatibility forms (full-width letters, ligatures) so that
/// visually identical names collide.
pub(crate) fn normalize_category_key(display: &str) -> String {
    fold_text(display.trim())
}

/// NFKC then full Unicode lowercase. Stored next to searchable columns and
/// applied to search terms, so both sides of a `LIKE` fold identically.
pub(crate) fn fold_text(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Build a `LIKE` pattern matching `term` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(normalize_required_name("  Cash ", "wallet").unwrap(), "Cash");
    }

    #[test]
    fn required_name_rejects_blank() {
        assert_eq!(
            normalize_required_name("   ", "wallet"),
            Err(EngineError::InvalidName(
                "wallet name must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn optional_text_collapses_blank() {
        assert_eq!(normalize_optional_text(None).unwrap(), None);
        assert_eq!(normalize_optional_text(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_optional_text(Some(" lunch ")).unwrap(),
            Some("lunch".to_string())
        );
    }

    #[test]
    fn category_key_ignores_case_and_width() {
        assert_eq!(normalize_category_key("Food"), normalize_category_key("food"));
        assert_eq!(normalize_category_key(" FOOD "), "food");
        assert_eq!(normalize_category_key("Ｆｏｏｄ"), "food");
    }

    #[test]
    fn fold_text_lowercases_beyond_ascii() {
        assert_eq!(fold_text("École FEES"), "école fees");
        assert_eq!(fold_text("ÜBER"), "über");
        assert!(fold_text("Café Ｌｕｎｃｈ").contains(&fold_text("CAFÉ lunch")));
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("rent"), "%rent%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
