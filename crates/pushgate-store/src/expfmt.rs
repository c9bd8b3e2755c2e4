//! Text exposition format parsing for pushed bodies.
//!
//! Accepts the line-oriented Prometheus text format: one sample per line
//! (`name{label="value",...} value [timestamp]`), with `#` comment lines
//! and blank lines ignored. Samples are aggregated into families by
//! metric name.

use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::types::{LabelSet, MetricFamily, Sample};

/// Parse a comma-separated list of `name="value"` pairs into a label set.
///
/// The empty string parses to an empty set. Values support `\"`, `\\` and
/// `\n` escapes. Also used by the HTTP layer for label selectors.
pub fn parse_label_pairs(input: &str) -> StoreResult<LabelSet> {
    let mut labels = LabelSet::new();
    let mut rest = input.trim();
    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else {
            return Err(StoreError::Parse(format!(
                "expected name=\"value\" near {rest:?}"
            )));
        };
        let name = rest[..eq].trim();
        let (value, after) = scan_quoted(rest[eq + 1..].trim_start())?;
        labels.insert(name, &value)?;
        rest = after.trim_start();
        if let Some(r) = rest.strip_prefix(',') {
            rest = r.trim_start();
            if rest.is_empty() {
                return Err(StoreError::Parse("trailing comma in label list".into()));
            }
        } else if !rest.is_empty() {
            return Err(StoreError::Parse(format!(
                "expected ',' between label pairs near {rest:?}"
            )));
        }
    }
    Ok(labels)
}

/// Scan a double-quoted value. Returns the unescaped value and the
/// remainder after the closing quote.
fn scan_quoted(input: &str) -> StoreResult<(String, &str)> {
    let Some(body) = input.strip_prefix('"') else {
        return Err(StoreError::Parse(format!(
            "expected quoted value near {input:?}"
        )));
    };
    let mut value = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &body[i + 1..])),
            '\\' => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, other)) => {
                    return Err(StoreError::Parse(format!("unsupported escape \\{other}")));
                }
                None => return Err(StoreError::Parse("unterminated escape".into())),
            },
            _ => value.push(c),
        }
    }
    Err(StoreError::Parse("unterminated quoted value".into()))
}

/// Parse a pushed body into metric families.
///
/// Parsing is all-or-nothing: the first malformed line fails the whole
/// body and nothing is ingested.
pub fn parse_exposition(body: &str) -> StoreResult<Vec<MetricFamily>> {
    let mut families: BTreeMap<String, MetricFamily> = BTreeMap::new();
    for (idx, raw) in body.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        parse_sample_line(line, &mut families)
            .map_err(|e| StoreError::Parse(format!("line {}: {e}", idx + 1)))?;
    }
    Ok(families.into_values().collect())
}

fn is_metric_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

fn parse_sample_line(
    line: &str,
    families: &mut BTreeMap<String, MetricFamily>,
) -> Result<(), String> {
    let name_end = line
        .char_indices()
        .find(|&(_, c)| !is_metric_name_char(c))
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("invalid metric name near {line:?}"));
    }

    let rest = line[name_end..].trim_start();
    let (labels, rest) = if let Some(inner) = rest.strip_prefix('{') {
        let (block, after) = split_label_block(inner)?;
        let labels = parse_label_pairs(block).map_err(|e| e.to_string())?;
        (labels, after.trim_start())
    } else {
        (LabelSet::new(), rest)
    };

    let mut fields = rest.split_whitespace();
    let value = fields
        .next()
        .ok_or_else(|| "missing sample value".to_string())?
        .parse::<f64>()
        .map_err(|e| format!("invalid sample value: {e}"))?;
    // An optional trailing timestamp is accepted and ignored; the store
    // stamps groups with its own push time.
    if let Some(ts) = fields.next() {
        ts.parse::<i64>().map_err(|e| format!("invalid timestamp: {e}"))?;
    }
    if fields.next().is_some() {
        return Err("unexpected trailing data".into());
    }

    families
        .entry(name.to_string())
        .or_insert_with(|| MetricFamily::new(name))
        .samples
        .push(Sample { labels, value });
    Ok(())
}

/// Split the inside of a `{...}` block from the remainder, honoring
/// quotes and escapes so `}` inside a value does not terminate the block.
fn split_label_block(input: &str) -> Result<(&str, &str), String> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '}' if !in_quotes => return Ok((&input[..i], &input[i + 1..])),
            _ => {}
        }
    }
    Err("unterminated label block".into())
}
