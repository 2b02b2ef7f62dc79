//! Predicates over raw manifest values.
//!
//! Manifests are untyped YAML, so every rule works on [`serde_yaml::Value`]
//! and these helpers decide what counts as empty, URL-shaped or numeric.

use serde_yaml::Value;
use url::Url;

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "ssh", "git"];

/// Strip YAML tags (`!foo bar`) so predicates see the underlying value.
pub(crate) fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

/// Null, `false`, zero, and empty strings/sequences/mappings are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match untagged(value) {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(_) => true,
    }
}

/// Scalar rendered the way a flag comparison expects.
///
/// Booleans become `true`/`false`, numbers their decimal text and strings
/// themselves. Null and collections have no string form.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match untagged(value) {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// A non-empty string, or `None` for anything else.
pub(crate) fn non_empty_str(value: &Value) -> Option<&str> {
    match untagged(value) {
        Value::String(s) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Parse an unsigned integer written either as a YAML integer or as a
/// string of ASCII digits. Signs, decimals and whitespace are rejected.
/// Digit strings too large for `u64` saturate to `u64::MAX`.
pub(crate) fn integer_like(value: &Value) -> Option<u64> {
    match untagged(value) {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            Some(s.parse().unwrap_or(u64::MAX))
        }
        _ => None,
    }
}

/// Absolute URL with a supported scheme and a plausible host.
pub(crate) fn is_url(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };
    if !URL_SCHEMES.contains(&url.scheme()) {
        return false;
    }
    url.host_str()
        .is_some_and(|host| host == "localhost" || (host.contains('.') && !host.ends_with('.')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(input: &str) -> Value {
        serde_yaml::from_str(input).unwrap()
    }

    #[test]
    fn truthiness_follows_emptiness() {
        assert!(!is_truthy(&yaml("~")));
        assert!(!is_truthy(&yaml("false")));
        assert!(!is_truthy(&yaml("0")));
        assert!(!is_truthy(&yaml("''")));
        assert!(!is_truthy(&yaml("[]")));
        assert!(!is_truthy(&yaml("{}")));
        assert!(is_truthy(&yaml("acme")));
        assert!(is_truthy(&yaml("[a]")));
        assert!(is_truthy(&yaml("1")));
    }

    #[test]
    fn scalar_string_renders_flags() {
        assert_eq!(scalar_string(&yaml("true")).as_deref(), Some("true"));
        assert_eq!(scalar_string(&yaml("false")).as_deref(), Some("false"));
        assert_eq!(scalar_string(&yaml("'True'")).as_deref(), Some("True"));
        assert_eq!(scalar_string(&yaml("1")).as_deref(), Some("1"));
        assert_eq!(scalar_string(&yaml("~")), None);
        assert_eq!(scalar_string(&yaml("[true]")), None);
    }

    #[test]
    fn integer_like_accepts_digits_only() {
        assert_eq!(integer_like(&yaml("100")), Some(100));
        assert_eq!(integer_like(&yaml("'256'")), Some(256));
        assert_eq!(integer_like(&yaml("-5")), None);
        assert_eq!(integer_like(&yaml("1.5")), None);
        assert_eq!(integer_like(&yaml("'12a'")), None);
        assert_eq!(integer_like(&yaml("''")), None);
        assert_eq!(
            integer_like(&yaml("'99999999999999999999999'")),
            Some(u64::MAX)
        );
    }

    #[test]
    fn url_validation() {
        assert!(is_url("https://github.com/acme/skill"));
        assert!(is_url("http://localhost:8080/repo"));
        assert!(is_url("git://example.org/repo.git"));
        assert!(!is_url("github.com/acme/skill"));
        assert!(!is_url("https://nodot"));
        assert!(!is_url("mailto:someone@example.com"));
        assert!(!is_url("not a url"));
    }

    #[test]
    fn tags_are_transparent() {
        let tagged = yaml("!custom value");
        assert_eq!(non_empty_str(&tagged), Some("value"));
        assert!(is_truthy(&tagged));
    }
}
