//! String `format` validators.
//!
//! Unknown format names always pass; non-string values never do.

use std::net::Ipv6Addr;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use patchguard_json_pointer::is_well_formed;
use regex::Regex;
use serde_json::Value;

fn email_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn date_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").ok())
        .as_ref()
}

fn time_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").ok())
        .as_ref()
}

fn date_time_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\d{4})-(\d{2})-(\d{2})[Tt](\d{2}):(\d{2}):(\d{2})(\.\d+)?([Zz]|([+-])(\d{2}):(\d{2}))$",
        )
        .ok()
    })
    .as_ref()
}

fn duration_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^P(?:\d+Y)?(?:\d+M)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?$|^P\d+W$",
        )
        .ok()
    })
    .as_ref()
}

fn scheme_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").ok())
        .as_ref()
}

fn template_nesting_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^}]*\{|\}[^{]*\}").ok())
        .as_ref()
}

fn template_expression_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\{[+#./;?&]?[a-zA-Z0-9_]+(?::[1-9][0-9]*|\*)?(?:,[a-zA-Z0-9_]+(?::[1-9][0-9]*|\*)?)*\}",
        )
        .ok()
    })
    .as_ref()
}

fn hostname_label_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?$").ok())
        .as_ref()
}

fn uuid_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$",
        )
        .ok()
    })
    .as_ref()
}

fn relative_pointer_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(0|[1-9][0-9]*)(#|/.*)?$").ok())
        .as_ref()
}

fn is_match(re: Option<&Regex>, s: &str) -> bool {
    re.is_some_and(|re| re.is_match(s))
}

fn num(caps: &regex::Captures<'_>, i: usize) -> u32 {
    caps.get(i)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(u32::MAX)
}

/// Checks `value` against the named format.
pub fn validate_format(format: &str, value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    match format {
        "email" | "idn-email" => is_match(email_regex(), s),
        "date" => is_date(s),
        "time" => is_time(s),
        "date-time" => is_date_time(s),
        "duration" => s != "P" && s != "PT" && is_match(duration_regex(), s),
        "uri" | "iri" => has_scheme(s),
        "uri-reference" => is_reference_prefix(s) || !s.chars().any(char::is_control),
        "iri-reference" => is_reference_prefix(s) || has_scheme(s),
        "uri-template" => is_uri_template(s),
        "hostname" => is_hostname(s),
        "idn-hostname" => is_idn_hostname(s),
        "ipv4" => is_ipv4(s),
        "ipv6" => is_ipv6(s),
        "uuid" => is_match(uuid_regex(), s),
        "json-pointer" => is_well_formed(s),
        "relative-json-pointer" => is_relative_pointer(s),
        "regex" => Regex::new(s).is_ok(),
        _ => true,
    }
}

fn is_date(s: &str) -> bool {
    let Some(caps) = date_regex().and_then(|re| re.captures(s)) else {
        return false;
    };
    NaiveDate::from_ymd_opt(num(&caps, 1) as i32, num(&caps, 2), num(&caps, 3)).is_some()
}

fn is_time(s: &str) -> bool {
    let Some(caps) = time_regex().and_then(|re| re.captures(s)) else {
        return false;
    };
    num(&caps, 1) <= 23 && num(&caps, 2) <= 59 && num(&caps, 3) <= 60
}

fn is_date_time(s: &str) -> bool {
    let Some(caps) = date_time_regex().and_then(|re| re.captures(s)) else {
        return false;
    };
    let date = NaiveDate::from_ymd_opt(num(&caps, 1) as i32, num(&caps, 2), num(&caps, 3));
    let time = NaiveTime::from_hms_opt(num(&caps, 4), num(&caps, 5), num(&caps, 6));
    let offset_ok = caps.get(9).is_none() || (num(&caps, 10) <= 23 && num(&caps, 11) <= 59);
    date.is_some() && time.is_some() && offset_ok
}

fn has_scheme(s: &str) -> bool {
    is_match(scheme_regex(), s)
}

fn is_reference_prefix(s: &str) -> bool {
    s.is_empty() || s.starts_with('/') || s.starts_with('#') || s.starts_with('?')
}

fn is_uri_template(s: &str) -> bool {
    if is_match(template_nesting_regex(), s) {
        return false;
    }
    let Some(expr) = template_expression_regex() else {
        return false;
    };
    let stripped = expr.replace_all(s, "");
    !stripped.contains(['{', '}'])
}

fn is_hostname(s: &str) -> bool {
    s.len() <= 253
        && s.split('.')
            .all(|label| (1..=63).contains(&label.len()) && is_match(hostname_label_regex(), label))
}

fn is_idn_hostname(s: &str) -> bool {
    s.chars().count() <= 253
        && s.split('.').all(|label| {
            let len = label.chars().count();
            (1..=63).contains(&len) && !label.starts_with('-') && !label.ends_with('-')
        })
}

fn is_ipv4(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|part| {
            (1..=3).contains(&part.len())
                && part.bytes().all(|b| b.is_ascii_digit())
                && !(part.len() > 1 && part.starts_with('0'))
                && part.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

fn is_ipv6(s: &str) -> bool {
    match s.split_once('%') {
        Some((addr, zone)) => {
            addr.to_ascii_lowercase().starts_with("fe80:")
                && !zone.is_empty()
                && zone.chars().all(|c| c.is_ascii_alphanumeric())
                && addr.parse::<Ipv6Addr>().is_ok()
        }
        None => s.parse::<Ipv6Addr>().is_ok(),
    }
}

fn is_relative_pointer(s: &str) -> bool {
    let Some(caps) = relative_pointer_regex().and_then(|re| re.captures(s)) else {
        return false;
    };
    match caps.get(2).map(|m| m.as_str()) {
        Some(suffix) if suffix.starts_with('/') => is_well_formed(suffix),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(format: &str, s: &str) -> bool {
        validate_format(format, &json!(s))
    }

    #[test]
    fn email() {
        assert!(check("email", "user@example.com"));
        assert!(check("email", "user@sub.domain.com"));
        assert!(!check("email", "not-email"));
        assert!(!check("email", "@missing.user"));
        assert!(check("idn-email", "名前@例え.jp"));
    }

    #[test]
    fn dates_and_times() {
        assert!(check("date", "2024-01-15"));
        assert!(check("date", "2024-02-29"));
        assert!(!check("date", "2023-02-29"));
        assert!(!check("date", "2024-13-01"));
        assert!(!check("date", "not-a-date"));
        assert!(check("time", "23:59:60"));
        assert!(check("time", "10:30:00.250+02:00"));
        assert!(!check("time", "24:00:00"));
        assert!(check("date-time", "2024-01-15T10:30:00Z"));
        assert!(check("date-time", "2024-01-15t10:30:00.5+03:00"));
        assert!(!check("date-time", "2024-01-15T10:30:60Z"));
        assert!(!check("date-time", "2024-01-15T10:30:00"));
        assert!(!check("date-time", "not-datetime"));
    }

    #[test]
    fn durations() {
        assert!(check("duration", "P1Y2M3DT4H5M6.5S"));
        assert!(check("duration", "P3W"));
        assert!(!check("duration", "P"));
        assert!(!check("duration", "PT"));
        assert!(!check("duration", "1Y"));
    }

    #[test]
    fn uris() {
        assert!(check("uri", "https://example.com"));
        assert!(check("uri", "ftp://files.org/doc"));
        assert!(check("uri", "mailto:someone@example.com"));
        assert!(!check("uri", "not a uri"));
        assert!(check("uri-reference", "../relative/path"));
        assert!(check("iri-reference", "#frag"));
        assert!(!check("iri-reference", "no scheme"));
        assert!(check("uri-template", "https://x.org/{user}/items{?page,size}"));
        assert!(!check("uri-template", "https://x.org/{a{b}}"));
        assert!(!check("uri-template", "https://x.org/{a"));
    }

    #[test]
    fn hosts_and_addresses() {
        assert!(check("hostname", "api.example.com"));
        assert!(!check("hostname", "-bad.example.com"));
        assert!(!check("hostname", "a..b"));
        assert!(check("idn-hostname", "bücher.example"));
        assert!(!check("idn-hostname", "bücher-.example"));
        assert!(check("ipv4", "192.168.1.1"));
        assert!(check("ipv4", "0.0.0.0"));
        assert!(!check("ipv4", "256.1.1.1"));
        assert!(!check("ipv4", "1.2.3"));
        assert!(!check("ipv4", "01.2.3.4"));
        assert!(check("ipv6", "::1"));
        assert!(check("ipv6", "2001:db8::8a2e:370:7334"));
        assert!(check("ipv6", "fe80::1%eth0"));
        assert!(!check("ipv6", "12345::"));
    }

    #[test]
    fn identifiers() {
        assert!(check("uuid", "550e8400-e29b-41d4-a716-446655440000"));
        assert!(!check("uuid", "not-a-uuid"));
        assert!(check("json-pointer", ""));
        assert!(check("json-pointer", "/a~1b"));
        assert!(!check("json-pointer", "/a~2"));
        assert!(check("relative-json-pointer", "0#"));
        assert!(check("relative-json-pointer", "2/a/b"));
        assert!(!check("relative-json-pointer", "01/a"));
        assert!(!check("relative-json-pointer", "1/a~"));
        assert!(check("regex", "^[a-z]+$"));
        assert!(!check("regex", "(unclosed"));
    }

    #[test]
    fn unknown_format_and_non_string() {
        assert!(check("custom-format", "anything"));
        assert!(!validate_format("email", &json!(123)));
    }
}
