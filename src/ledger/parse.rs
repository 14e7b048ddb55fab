//! Reading the most recent block back out of a ledger

use std::collections::BTreeMap;

use crate::error::{RegenError, Result};
use crate::ledger::ecosystem::EcosystemTable;
use crate::ledger::{LanguageReleaseInfo, ReleaseRecord};

/// Fields of a block's preamble
#[derive(Debug, PartialEq, Eq)]
struct Header<'a> {
    title: &'a str,
    doc_version: &'a str,
    doc_location: &'a str,
    tool_version: &'a str,
}

/// Parse the last block of a ledger.
///
/// Blocks are separated by blank lines. A missing release line for a language
/// just leaves it out of the result; a block without the expected preamble is
/// an error.
pub fn parse_last(text: &str, ecosystems: &EcosystemTable) -> Result<ReleaseRecord> {
    let text = text.trim_end();
    if text.trim_start().is_empty() {
        return Err(RegenError::EmptyLedger);
    }

    let block = text.rsplit("\n\n").next().unwrap_or(text);
    let lines: Vec<&str> = block.lines().collect();

    let header = (0..lines.len())
        .find_map(|i| parse_header(&lines[i..]))
        .ok_or_else(|| {
            RegenError::MalformedRelease(
                "expected '## <title>', '### Changes', 'Based on:', OpenAPI Doc and Speakeasy CLI lines"
                    .to_string(),
            )
        })?;

    let patterns = ecosystems
        .iter()
        .map(|eco| eco.line_pattern().map(|re| (eco, re)))
        .collect::<Result<Vec<_>>>()?;

    let mut languages = BTreeMap::new();
    for (eco, re) in &patterns {
        let Some(caps) = lines.iter().find_map(|line| re.captures(line)) else {
            continue;
        };

        let path = &caps["path"];
        languages.insert(
            eco.language.clone(),
            LanguageReleaseInfo {
                package_name: eco.package_name(&caps["package"], path),
                path: path.to_string(),
                version: caps["version"].to_string(),
                url: caps["url"].to_string(),
            },
        );
    }

    Ok(ReleaseRecord {
        title: header.title.to_string(),
        doc_version: header.doc_version.to_string(),
        doc_location: header.doc_location.to_string(),
        tool_version: header.tool_version.to_string(),
        languages,
    })
}

fn parse_header<'a>(lines: &[&'a str]) -> Option<Header<'a>> {
    let [title, changes, based_on, doc, tool, ..] = lines else {
        return None;
    };

    let title = title.strip_prefix("## ")?;
    if *changes != "### Changes" || *based_on != "Based on:" {
        return None;
    }

    let (doc_version, doc_location) = doc.strip_prefix("- OpenAPI Doc ")?.split_once(' ')?;
    let (tool_version, _) = tool.strip_prefix("- Speakeasy CLI ")?.split_once(' ')?;

    Some(Header {
        title,
        doc_version,
        doc_location,
        tool_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = "\n\n## 2024-01-01 00:00:00\n### Changes\nBased on:\n- OpenAPI Doc 0.9.0 spec.yaml\n- Speakeasy CLI 1.19.0 https://github.com/speakeasy-api/speakeasy\n\n## 2024-02-01 00:00:00\n### Changes\nBased on:\n- OpenAPI Doc 1.0.0 https://example.com/openapi.yaml\n- Speakeasy CLI 1.20.0 https://github.com/speakeasy-api/speakeasy\n### Releases\n- [PyPI v0.2.0] https://pypi.org/project/acme-sdk/0.2.0 - python\n- [Composer v0.1.1] https://packagist.org/packages/acme/sdk#v0.1.1 - php";

    #[test]
    fn test_parses_only_last_block() {
        let record = parse_last(LEDGER, &EcosystemTable::default()).unwrap();
        assert_eq!(record.title, "2024-02-01 00:00:00");
        assert_eq!(record.doc_version, "1.0.0");
        assert_eq!(record.doc_location, "https://example.com/openapi.yaml");
        assert_eq!(record.tool_version, "1.20.0");

        let python = &record.languages["python"];
        assert_eq!(python.package_name, "acme-sdk");
        assert_eq!(python.version, "0.2.0");
        assert_eq!(python.path, "python");
        assert_eq!(python.url, "https://pypi.org/project/acme-sdk/0.2.0");

        let php = &record.languages["php"];
        assert_eq!(php.package_name, "acme/sdk");
        assert_eq!(php.version, "0.1.1");
        assert!(!record.languages.contains_key("go"));
    }

    #[test]
    fn test_trailing_newlines_are_ignored() {
        let text = format!("{LEDGER}\n\n\n");
        let record = parse_last(&text, &EcosystemTable::default()).unwrap();
        assert_eq!(record.title, "2024-02-01 00:00:00");
    }

    #[test]
    fn test_empty_ledger() {
        assert!(matches!(parse_last("", &EcosystemTable::default()), Err(RegenError::EmptyLedger)));
        assert!(matches!(parse_last("\n\n  \n", &EcosystemTable::default()), Err(RegenError::EmptyLedger)));
    }

    #[test]
    fn test_missing_preamble_is_malformed() {
        let text = "\n\n## 2024-02-01\n- OpenAPI Doc 1.0.0 spec.yaml\n- Speakeasy CLI 1.20.0 https://github.com/speakeasy-api/speakeasy";
        assert!(matches!(
            parse_last(text, &EcosystemTable::default()),
            Err(RegenError::MalformedRelease(_))
        ));
    }

    #[test]
    fn test_truncated_last_block_is_malformed() {
        let text = format!("{LEDGER}\n\n## 2024-03-01 00:00:00\n### Changes\nBased on:");
        assert!(matches!(
            parse_last(&text, &EcosystemTable::default()),
            Err(RegenError::MalformedRelease(_))
        ));
    }

    #[test]
    fn test_header_fields_split_on_first_space() {
        let lines = [
            "## Nightly build",
            "### Changes",
            "Based on:",
            "- OpenAPI Doc 2023.10 ./specs/my api.yaml",
            "- Speakeasy CLI 1.20.0 https://github.com/speakeasy-api/speakeasy",
        ];
        let header = parse_header(&lines).unwrap();
        assert_eq!(header.title, "Nightly build");
        assert_eq!(header.doc_version, "2023.10");
        assert_eq!(header.doc_location, "./specs/my api.yaml");
        assert_eq!(header.tool_version, "1.20.0");
    }
}
