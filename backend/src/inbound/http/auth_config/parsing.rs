//! Environment value parsing helpers for auth configuration.

pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Parse a strictly positive number of seconds.
pub(super) fn parse_ttl(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|seconds| *seconds > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(true))]
    #[case("YES", Some(true))]
    #[case(" n ", Some(false))]
    #[case("false", Some(false))]
    #[case("maybe", None)]
    #[case("", None)]
    fn booleans(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(raw), expected);
    }

    #[rstest]
    #[case("3600", Some(3_600))]
    #[case(" 60 ", Some(60))]
    #[case("0", None)]
    #[case("-5", None)]
    #[case("1h", None)]
    fn lifetimes(#[case] raw: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_ttl(raw), expected);
    }
}
