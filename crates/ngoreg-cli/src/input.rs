//! # Zone List Input & Output
//!
//! Zone lists are read from JSON or YAML files, either as a bare sequence of
//! nodes or wrapped as `{ zones: [...] }` (the API request shape). `-`
//! reads standard input. Output is pretty-printed JSON.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ngoreg_core::ZoneNode;

/// Input encoding of a zone list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Guess the format from a file extension; JSON when unknown.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ZoneListDocument {
    Bare(Vec<ZoneNode>),
    Wrapped { zones: Vec<ZoneNode> },
}

/// Parse a zone list from text.
pub fn parse_zone_list(text: &str, format: Format) -> Result<Vec<ZoneNode>> {
    let doc: ZoneListDocument = match format {
        Format::Json => serde_json::from_str(text).context("invalid JSON zone list")?,
        Format::Yaml => serde_yaml::from_str(text).context("invalid YAML zone list")?,
    };
    Ok(match doc {
        ZoneListDocument::Bare(zones) | ZoneListDocument::Wrapped { zones } => zones,
    })
}

/// Read a zone list from `path`, or from standard input when `path` is `-`.
///
/// Standard input is parsed as YAML, which also accepts JSON.
pub fn read_zone_list(path: &Path) -> Result<Vec<ZoneNode>> {
    let (text, format) = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read standard input")?;
        (buf, Format::Yaml)
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        (text, Format::from_path(path))
    };
    let zones = parse_zone_list(&text, format)
        .with_context(|| format!("while parsing {}", path.display()))?;
    tracing::debug!(path = %path.display(), zones = zones.len(), "zone list loaded");
    Ok(zones)
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize output")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngoreg_core::SENEGAL;

    #[test]
    fn bare_and_wrapped_json() {
        let bare = r#"[{"zone_type":"region","name":"Dakar"}]"#;
        let wrapped = r#"{"zones":[{"zone_type":"region","name":"Dakar"}]}"#;
        assert_eq!(
            parse_zone_list(bare, Format::Json).unwrap(),
            parse_zone_list(wrapped, Format::Json).unwrap()
        );
    }

    #[test]
    fn yaml_list() {
        let text = "\
zones:
  - zone_type: country
    name: Sénégal
  - zone_type: department
    name: Mbour
    parent_name: Thiès
";
        let zones = parse_zone_list(text, Format::Yaml).unwrap();
        assert_eq!(
            zones,
            vec![
                ZoneNode::country(SENEGAL),
                ZoneNode::department("Mbour", "Thiès")
            ]
        );
    }

    #[test]
    fn unknown_zone_type_is_an_error() {
        let err = parse_zone_list(r#"[{"zone_type":"province","name":"X"}]"#, Format::Json)
            .unwrap_err();
        assert!(format!("{err:#}").contains("invalid JSON"));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("z.yml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("z.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("z.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("zones")), Format::Json);
    }
}
