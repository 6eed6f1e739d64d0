//! Token estimation.
//!
//! Fixed ratio of four characters per token, rounded down. Used for
//! observability only; nothing is trimmed against it.

pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count() / 4;
    u32::try_from(chars).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn rounds_down() {
        assert_eq!(estimate_tokens("abc"), 0);
        assert_eq!(estimate_tokens("test"), 1);
        assert_eq!(estimate_tokens("testing"), 1);
        assert_eq!(estimate_tokens("12345678"), 2);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(estimate_tokens("éééé"), 1);
    }
}
