/// print bytes as a truncated hex string
pub fn debug_hex(bytes: impl AsRef<[u8]>) -> String {
    truncate_hex(hex::encode(bytes.as_ref()))
}

pub fn truncate_hex(hex_string: impl AsRef<str>) -> String {
    let hex_string = hex_string.as_ref();
    let hex_value = hex_string.strip_prefix("0x").unwrap_or(hex_string);

    if hex_value.len() <= 8 {
        return hex_string.to_string();
    }

    format!(
        "0x{}...{}",
        &hex_value[..4],
        &hex_value[hex_value.len() - 4..]
    )
}

/// Shortens an opaque token (base64 digest, authorize id) for log fields.
pub fn truncate_token(token: impl AsRef<str>) -> String {
    let token = token.as_ref();
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return token.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_hex() {
        assert_eq!(
            truncate_hex("0x5bf078bd83995fe83092d93c5655f059"),
            "0x5bf0...f059"
        );
    }

    #[test]
    fn short_values_are_untouched() {
        assert_eq!(truncate_hex("abcd"), "abcd");
        assert_eq!(truncate_token("q83v"), "q83v");
        assert_eq!(debug_hex([]), "");
    }

    #[test]
    fn long_tokens_keep_head_and_tail() {
        assert_eq!(
            truncate_token("aGVsbG8gd29ybGQgZGlnZXN0PT0="),
            "aGVsbG...PT0="
        );
    }
}
