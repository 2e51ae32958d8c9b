/// Parse a Discord identifier from its decimal string form.
///
/// Snowflakes travel as strings in most JSON payloads because they exceed the
/// safe integer range of JavaScript clients. Values above `i64::MAX` are
/// rejected since the column is a signed 64-bit integer.
pub fn parse_discord_id(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    value.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::parse_discord_id;

    #[test]
    fn parses_snowflakes() {
        assert_eq!(parse_discord_id("12345"), Some(12345));
        assert_eq!(
            parse_discord_id(" 1104459318476316752 "),
            Some(1_104_459_318_476_316_752)
        );
        assert_eq!(parse_discord_id("0"), Some(0));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_discord_id(""), None);
        assert_eq!(parse_discord_id("   "), None);
        assert_eq!(parse_discord_id("12a"), None);
        assert_eq!(parse_discord_id("18446744073709551615"), None);
    }
}
