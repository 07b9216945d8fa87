/// Normalizes a phone identifier to its store-key form.
///
/// Keeps decimal digits and `+` in their original order, drops everything
/// else (spaces, parentheses, hyphens, letters). Applied to every path
/// parameter and to the `phone` field of creation payloads before any
/// length check.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting_characters() {
        assert_eq!(normalize("8 (916) 123-45-67"), "89161234567");
        assert_eq!(normalize("+7 916 123 45 67"), "+79161234567");
    }

    #[test]
    fn test_idempotent_on_normalized_input() {
        let normalized = normalize("+7 (916) 123-45-67");
        assert_eq!(normalize(&normalized), normalized);
    }

    #[test]
    fn test_drops_letters_and_symbols() {
        assert_eq!(normalize("call me: 89161234567 ext. 12"), "8916123456712");
        assert_eq!(normalize("abc"), "");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }
}
