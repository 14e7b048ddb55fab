//! Rendering release records as ledger blocks

use crate::ledger::ecosystem::EcosystemTable;
use crate::ledger::ReleaseRecord;

/// Link printed after the tool version in every block
pub const TOOL_URL: &str = "https://github.com/speakeasy-api/speakeasy";

/// Render `record` as a ledger block.
///
/// The block starts with a blank line so consecutive appends stay separated.
/// Languages without an ecosystem in `ecosystems` get no release line.
pub fn format_record(record: &ReleaseRecord, ecosystems: &EcosystemTable) -> String {
    let lines: Vec<String> = record
        .languages
        .iter()
        .filter_map(|(language, info)| ecosystems.get(language).map(|eco| eco.release_line(info)))
        .collect();

    let releases = if lines.is_empty() {
        String::new()
    } else {
        format!("\n### Releases\n{}", lines.join("\n"))
    };

    format!(
        "\n\n## {}\n### Changes\nBased on:\n- OpenAPI Doc {} {}\n- Speakeasy CLI {} {}{}",
        record.title,
        record.doc_version,
        record.doc_location,
        record.tool_version,
        TOOL_URL,
        releases
    )
}
