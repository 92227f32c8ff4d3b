use crate::error::{Result, RspError};
use crate::parsed_query::{ParsedQuery, R2S, WindowDefinition};
use crate::windowing::StreamType;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static REGISTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^REGISTER\s+(RSTREAM|ISTREAM|DSTREAM)\s+(<[^>]+>|\S+)\s+AS\b").unwrap()
});

static WINDOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^FROM\s+NAMED\s+WINDOW\s+(\S+)\s+ON\s+STREAM\s+(\S+)\s+\[\s*RANGE\s+(\S+)\s+STEP\s+([^\s\]]+)\s*\]",
    )
    .unwrap()
});

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^PREFIX\s+([^:\s]*):\s*<([^>]+)>").unwrap());

static WINDOW_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bWINDOW(\s)").unwrap());

/// Line-oriented RSP-QL parser.
///
/// Splits an RSP-QL query into its `REGISTER` operator, its window
/// declarations and the plain SPARQL that the R2R operator evaluates, where
/// every `WINDOW w { ... }` block becomes `GRAPH w { ... }`.
pub struct RSPQLParser {
    query: String,
}

impl RSPQLParser {
    pub fn new(query: String) -> Self {
        Self { query }
    }

    pub fn parse(&self) -> Result<ParsedQuery> {
        let mut parsed = ParsedQuery::default();
        let mut sparql_lines = Vec::new();
        let mut prefixes: HashMap<String, String> = HashMap::new();

        for line in self.query.lines() {
            let trimmed = line.trim();

            if let Some(caps) = REGISTER_RE.captures(trimmed) {
                parsed.set_r2s(R2S {
                    operator: stream_type(&caps[1]),
                    name: unwrap_iri(&caps[2], &prefixes),
                });
            } else if starts_with_ignore_case(trimmed, "FROM NAMED WINDOW") {
                let caps = WINDOW_RE.captures(trimmed).ok_or_else(|| {
                    RspError::Parse(format!("malformed window declaration: {}", trimmed))
                })?;
                let window = WindowDefinition {
                    window_name: unwrap_iri(&caps[1], &prefixes),
                    stream_name: unwrap_iri(&caps[2], &prefixes),
                    width: parse_bound("RANGE", &caps[3])?,
                    slide: parse_bound("STEP", &caps[4])?,
                };
                debug!(
                    window = %window.window_name,
                    stream = %window.stream_name,
                    width = window.width,
                    slide = window.slide,
                    "parsed window definition"
                );
                parsed.add_s2r(window);
            } else {
                if let Some(caps) = PREFIX_RE.captures(trimmed) {
                    prefixes.insert(caps[1].to_string(), caps[2].to_string());
                }
                sparql_lines.push(WINDOW_KEYWORD_RE.replace_all(trimmed, "GRAPH$1").into_owned());
            }
        }

        parsed.set_sparql(sparql_lines.join("\n"));
        Ok(parsed)
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.is_char_boundary(prefix.len())
        && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn stream_type(operator: &str) -> StreamType {
    match operator.to_ascii_uppercase().as_str() {
        "ISTREAM" => StreamType::IStream,
        "DSTREAM" => StreamType::DStream,
        _ => StreamType::RStream,
    }
}

fn parse_bound(keyword: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|e| RspError::Parse(format!("invalid {} value '{}': {}", keyword, value, e)))
}

/// Expand `<iri>` or `prefix:local`. Unknown prefixes expand to an empty string.
fn unwrap_iri(prefixed_iri: &str, prefixes: &HashMap<String, String>) -> String {
    let trimmed = prefixed_iri.trim();
    if let Some(iri) = trimmed.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        return iri.to_string();
    }
    match trimmed.split_once(':') {
        Some((prefix, local)) => prefixes
            .get(prefix)
            .map(|namespace| format!("{}{}", namespace, local))
            .unwrap_or_default(),
        None => String::new(),
    }
}
