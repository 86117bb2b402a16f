//! TOML parser with helpful error messages

use std::path::Path;

use anyhow::{Context, Result};

use super::schema::TetherConfig;

/// Parse tether.toml with detailed error messages
pub fn parse_tether_toml(path: &Path) -> Result<TetherConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_tether_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse tether.toml content from string
pub fn parse_tether_toml_str(content: &str) -> Result<TetherConfig> {
    let config: TetherConfig =
        toml::from_str(content).map_err(|e| describe_toml_error(&e, content))?;

    config.validate_values()?;

    Ok(config)
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &TetherConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration to TOML")
}

/// Attach the offending source lines to a TOML error when a span is known.
fn describe_toml_error(error: &toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();
    let Some(span) = error.span() else {
        return anyhow::anyhow!("TOML parsing error: {}", message);
    };

    let line_num = content[..span.start.min(content.len())]
        .bytes()
        .filter(|b| *b == b'\n')
        .count()
        + 1;

    anyhow::anyhow!(
        "TOML parsing error at line {}:\n{}\n\nError: {}",
        line_num,
        line_context(content, line_num),
        message
    )
}

/// Render up to two lines either side of `line_num`, marking the line itself.
fn line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(3);
    let end = (line_num + 2).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let num = start + offset + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
