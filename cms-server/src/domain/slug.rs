use deunicode::deunicode;

use super::error::DomainError;

/// Derives a URL slug: transliterated to ASCII, lowercased, words joined by `-`.
pub(crate) fn slugify(input: &str) -> Result<String, DomainError> {
    let ascii = deunicode(input);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_whitespace() || matches!(ch, '-' | '_' | ',' | '.' | '/' | ':' | ';') {
            pending_separator = true;
        }
        // apostrophes and other symbols are dropped without splitting the word
    }

    if slug.is_empty() {
        return Err(DomainError::Validation {
            field: "slug",
            message: "title must contain letters or digits",
        });
    }
    Ok(slug)
}

/// Matches `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub(crate) fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .split('-')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::{is_valid_slug, slugify};

    #[test]
    fn slugify_lowercases_and_joins_words() {
        assert_eq!(slugify("Hello Rust World").unwrap(), "hello-rust-world");
    }

    #[test]
    fn slugify_folds_diacritics() {
        assert_eq!(slugify("Crème Brûlée à la Française").unwrap(), "creme-brulee-a-la-francaise");
    }

    #[test]
    fn slugify_transliterates_letters_without_decomposition() {
        assert_eq!(slugify("Straße über Øresund").unwrap(), "strasse-uber-oresund");
        assert_eq!(slugify("Łódź and Ærø travel").unwrap(), "lodz-and-aero-travel");
    }

    #[test]
    fn slugify_transliterates_non_latin_scripts() {
        assert_eq!(slugify("Привет, мир! Первый пост").unwrap(), "privet-mir-pervyi-post");

        let slug = slugify("日本語のブログ").unwrap();
        assert!(is_valid_slug(&slug), "{slug} must be a valid slug");
    }

    #[test]
    fn slugify_collapses_separators_and_strips_punctuation() {
        assert_eq!(slugify("  Rust -- it's  fast!!  ").unwrap(), "rust-its-fast");
        assert_eq!(slugify("snake_case_title").unwrap(), "snake-case-title");
    }

    #[test]
    fn slugify_rejects_symbol_only_titles() {
        assert!(slugify("!!! ???").is_err());
        assert!(slugify("  --  ").is_err());
    }

    #[test]
    fn derived_slugs_satisfy_slug_shape() {
        for title in ["A Title", "Ünïcödé tëxt 2024", "--edge--case--", "Ærø, Łódź & Straße"] {
            let slug = slugify(title).unwrap();
            assert!(is_valid_slug(&slug), "{slug} must be a valid slug");
        }
    }

    #[test]
    fn is_valid_slug_rejects_bad_shapes() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug("Upper"));
        assert!(is_valid_slug("ok-slug-2"));
    }
}
