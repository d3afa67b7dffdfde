//! Routing slugs.

/// Reserved slug used by static path generation to mean "every product".
///
/// Lookups by this slug never reach the store.
pub const ALL_PRODUCTS_SLUG: &str = "all";

/// Derive a URL slug from a display name.
///
/// Lowercases, folds common Latin accents, and joins runs of anything else
/// with a single `-`. `"Sérum Exosomas 10%"` becomes `"serum-exosomas-10"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c);
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("Sérum Exosomas 10%"), "serum-exosomas-10");
        assert_eq!(slugify("  PDRN -- Booster  "), "pdrn-booster");
        assert_eq!(slugify("Niñez"), "ninez");
        assert_eq!(slugify("!!!"), "");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: slugify is idempotent.
            #[test]
            fn slugify_is_idempotent(name in "\\PC{0,60}") {
                let once = slugify(&name);
                prop_assert_eq!(slugify(&once), once.clone());
            }

            /// Property: output only contains [a-z0-9-] with no leading, trailing or doubled dashes.
            #[test]
            fn slugify_output_is_url_safe(name in "\\PC{0,60}") {
                let slug = slugify(&name);
                prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
                prop_assert!(!slug.starts_with('-'));
                prop_assert!(!slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
            }
        }
    }
}
