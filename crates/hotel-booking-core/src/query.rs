//! Parsing of `key=value&key=value` strings
//!
//! Used for both URL query strings and form-encoded request bodies.

use std::collections::HashMap;

/// Parse a query string or form body into a map
///
/// The input is split on `&`, each pair on `=`. Pairs which do not consist
/// of exactly a key and a non-empty value (`a`, `a=`, `a=b=c`) are dropped.
/// If a key occurs more than once, the last occurrence wins. No URL decoding
/// is performed, values are passed through raw.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&') {
        let mut parts: Vec<&str> = pair.split('=').collect();
        // trailing empty parts do not count (`a=` has a single part)
        while parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        if let [key, value] = parts[..] {
            params.insert(key.to_owned(), value.to_owned());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::parse_query;

    #[test]
    fn splits_pairs() {
        let params = parse_query("guestName=alice&roomNumber=3&date=2024-03-15");
        assert_eq!(params.len(), 3);
        assert_eq!(params["guestName"], "alice");
        assert_eq!(params["roomNumber"], "3");
        assert_eq!(params["date"], "2024-03-15");
    }

    #[test]
    fn drops_malformed_pairs() {
        let params = parse_query("a&b=&c=1=2&d=4&&");
        assert_eq!(params.len(), 1);
        assert_eq!(params["d"], "4");
    }

    #[test]
    fn empty_input() {
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn last_duplicate_wins() {
        let params = parse_query("date=2024-01-01&date=2024-01-02");
        assert_eq!(params["date"], "2024-01-02");
    }

    #[test]
    fn values_are_not_decoded() {
        let params = parse_query("guestName=John%20Doe");
        assert_eq!(params["guestName"], "John%20Doe");
    }
}
