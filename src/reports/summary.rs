//! Summary and table report generators for shell output.
//!
//! `SummaryReporter` gives one line per run, `TableReporter` the full ranking.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, RunReport};
use crate::model::{CellKey, GroupResult, Pairing};
use crate::scoring::Reconciliation;

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

fn format_score(value: f64) -> String {
    format!("{value:.3}")
}

fn optional_score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_score)
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn run_line(&self, report: &RunReport<'_>) -> String {
        let run = report.reconciliation;
        let ranked = run.results.len();
        let top = run.results.first().map_or_else(
            || self.color("no rankable groups", "red"),
            |r| {
                format!(
                    "top {} ({}) {}",
                    r.group_label,
                    truncate(&r.group_name, 24),
                    self.color(&format_score(r.combined_score), "green")
                )
            },
        );
        let mut line = format!(
            "{}  {}  {} {}  {}",
            self.color(&report.metadata.label(), "cyan"),
            run.mode,
            ranked,
            plural(ranked, "group", "groups"),
            top
        );
        let diagnostics = &run.diagnostics;
        if !diagnostics.is_empty() {
            line.push_str(&self.color(
                &format!(
                    "  [{} dropped, {} omitted, {} ambiguous]",
                    diagnostics.dropped.len(),
                    diagnostics.omitted.len(),
                    diagnostics.ambiguous.len()
                ),
                "dim",
            ));
        }
        line
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate_run_report(
        &self,
        report: &RunReport<'_>,
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        Ok(self.run_line(report))
    }

    fn generate_batch_report(
        &self,
        reports: &[RunReport<'_>],
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::with_capacity(reports.len() + 2);
        lines.push(self.color("Two-State Score Summary", "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));
        lines.extend(reports.iter().map(|r| self.run_line(r)));

        let empty = reports
            .iter()
            .filter(|r| r.reconciliation.is_empty())
            .count();
        lines.push(String::new());
        lines.push(format!(
            "Runs: {} | Empty rankings: {}",
            reports.len(),
            empty
        ));
        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}

/// Table reporter for compact terminal output
pub struct TableReporter {
    /// Use colored output
    colored: bool,
}

impl TableReporter {
    /// Create a new table reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    /// Pad before coloring so escape codes do not count toward the width.
    fn cell(&self, text: &str, width: usize, color: &str) -> String {
        self.color(&pad(&truncate(text, width), width), color)
    }

    fn header(&self, balance: bool, show_cells: bool) -> String {
        let mut columns = vec![
            self.cell("RANK", 5, "bold"),
            self.cell("GROUP", 8, "bold"),
            self.cell("NAME", 24, "bold"),
            self.cell("COMBINED", 10, "bold"),
            self.cell("BEST A", 9, "bold"),
            self.cell("BEST B", 9, "bold"),
            self.cell("MODEL A", 16, "bold"),
            self.cell("MODEL B", 16, "bold"),
            self.cell("PAIRING", 10, "bold"),
        ];
        if balance {
            columns.push(self.cell("BALANCE", 8, "bold"));
            columns.push(self.cell("TSBI", 9, "bold"));
        }
        if show_cells {
            for key in CellKey::ALL {
                columns.push(self.cell(&key.source_label(), 12, "bold"));
            }
        }
        columns.join(" ")
    }

    fn row(&self, rank: usize, result: &GroupResult, balance: bool, show_cells: bool) -> String {
        let pairing_color = match result.pairing {
            Some(Pairing::Swapped) => "yellow",
            _ => "",
        };
        let model_b = result
            .model_for_b
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let pairing = result
            .pairing
            .map_or_else(|| "-".to_string(), |p| p.to_string());

        let mut columns = vec![
            self.cell(&rank.to_string(), 5, ""),
            self.cell(&result.group_label, 8, ""),
            self.cell(&result.group_name, 24, ""),
            self.cell(&format_score(result.combined_score), 10, "green"),
            self.cell(&format_score(result.best_ref_a), 9, ""),
            self.cell(&optional_score(result.best_ref_b), 9, ""),
            self.cell(&result.model_for_a.to_string(), 16, "dim"),
            self.cell(&model_b, 16, "dim"),
            self.cell(&pairing, 10, pairing_color),
        ];
        if balance {
            let balance_text = match result.balance {
                Some(b) if b < 0.0 => "undef".to_string(),
                other => optional_score(other),
            };
            let balance_color = if result.balance.map_or(false, |b| b < 0.0) {
                "red"
            } else {
                ""
            };
            columns.push(self.cell(&balance_text, 8, balance_color));
            columns.push(self.cell(&optional_score(result.tsbi_score), 9, "cyan"));
        }
        if show_cells {
            for cell in &result.cells {
                let text = match cell.best_model {
                    Some(model) => format!("{}#{model}", format_score(cell.best_score)),
                    None => "-".to_string(),
                };
                columns.push(self.cell(&text, 12, "dim"));
            }
        }
        columns.join(" ").trim_end().to_string()
    }

    fn footer(&self, run: &Reconciliation, fingerprint: &str) -> String {
        let diagnostics = &run.diagnostics;
        format!(
            "Ranked: {} | Dropped records: {} | Omitted groups: {} | Ambiguous pairings: {} | Fingerprint: {}",
            run.results.len(),
            diagnostics.dropped.len(),
            diagnostics.omitted.len(),
            diagnostics.ambiguous.len(),
            self.color(fingerprint, "dim")
        )
    }
}

impl Default for TableReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TableReporter {
    fn generate_run_report(
        &self,
        report: &RunReport<'_>,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let run = report.reconciliation;
        let balance = report.metadata.balance;
        let mut lines = Vec::new();

        // Title
        lines.push(format!(
            "{}  {}",
            self.color(&report.metadata.label(), "bold"),
            self.color(&format!("({})", run.mode), "dim")
        ));

        let header = self.header(balance, config.show_cells);
        let rule_width = UnicodeWidthStr::width(strip_ansi(&header).as_str());
        lines.push(header);
        lines.push("─".repeat(rule_width));

        let rows = config.rows(run);
        if rows.is_empty() {
            lines.push(self.color("  No rankable groups", "dim"));
        }
        for (i, result) in rows.iter().enumerate() {
            lines.push(self.row(i + 1, result, balance, config.show_cells));
        }
        if rows.len() < run.results.len() {
            lines.push(self.color(
                &format!("  ... {} more", run.results.len() - rows.len()),
                "dim",
            ));
        }

        if config.include_diagnostics {
            for omitted in &run.diagnostics.omitted {
                lines.push(self.color(
                    &format!("  omitted {}: {}", omitted.label, omitted.reason),
                    "yellow",
                ));
            }
            for dropped in &run.diagnostics.dropped {
                lines.push(self.color(
                    &format!("  dropped ({}): {}", dropped.reference, dropped.error),
                    "red",
                ));
            }
        }

        lines.push(String::new());
        lines.push(self.footer(run, &report.metadata.fingerprint));

        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Table
    }
}

/// Find the largest byte index <= `index` that is a char boundary.
const fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let bytes = s.as_bytes();
        let mut i = index;
        // UTF-8 continuation bytes start with 0b10xxxxxx
        while i > 0 && (bytes[i] & 0xC0) == 0x80 {
            i -= 1;
        }
        i
    }
}

/// Truncate to at most `max_width` display columns, ending in "..." when cut.
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut end = 0;
    for (idx, ch) in s.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        end = idx + ch.len_utf8();
    }
    format!("{}...", &s[..floor_char_boundary(s, end)])
}

/// Right-pad to `width` display columns.
fn pad(s: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(used)))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{empty_cells, DeclaredVersion, GroupId, ModelProvenance};
    use crate::reports::ReportMetadata;
    use crate::scoring::{Mode, OmissionReason, OmittedGroup, RunDiagnostics};

    fn row(label: &str, a: f64, b: f64) -> GroupResult {
        GroupResult {
            group: GroupId::normalize(label).unwrap(),
            group_label: label.to_string(),
            group_name: "Unknown".to_string(),
            combined_score: a + b,
            best_ref_a: a,
            best_ref_b: Some(b),
            model_for_a: ModelProvenance::new(label, DeclaredVersion::V1, Some(1)),
            model_for_b: Some(ModelProvenance::new(label, DeclaredVersion::V2, Some(2))),
            pairing: Some(Pairing::Canonical),
            anchor: None,
            cells: empty_cells(),
            balance: None,
            tsbi_score: None,
        }
    }

    fn run() -> Reconciliation {
        Reconciliation {
            mode: Mode::MultiGroup,
            results: vec![row("TS010", 0.82, 0.79), row("TS020", 0.75, 0.70)],
            diagnostics: RunDiagnostics {
                omitted: vec![OmittedGroup {
                    group: GroupId::normalize("TS030").unwrap(),
                    label: "TS030".to_string(),
                    reason: OmissionReason::NoUsableData,
                }],
                ..RunDiagnostics::default()
            },
        }
    }

    #[test]
    fn test_table_report_plain() {
        let run = run();
        let metadata = ReportMetadata::for_run(&run, false)
            .target("T1228")
            .score_type("GDT_TS");
        let text = TableReporter::new()
            .no_color()
            .generate_run_report(&RunReport::new(&metadata, &run), &ReportConfig::default())
            .unwrap();

        assert!(!text.contains('\x1b'));
        assert!(text.starts_with("T1228/GDT_TS  (multi-group)"));
        assert!(text.contains("TS010_v1_1"));
        assert!(text.contains("1.610"));
        assert!(!text.contains("TSBI"));
        assert!(text.contains("Ranked: 2 | Dropped records: 0 | Omitted groups: 1"));
    }

    #[test]
    fn test_table_respects_max_rows_and_diagnostics() {
        let run = run();
        let metadata = ReportMetadata::for_run(&run, true);
        let config = ReportConfig {
            max_rows: Some(1),
            include_diagnostics: true,
            show_cells: false,
        };
        let text = TableReporter::new()
            .no_color()
            .generate_run_report(&RunReport::new(&metadata, &run), &config)
            .unwrap();

        assert!(text.contains("TSBI"));
        assert!(!text.contains("TS020_v1_1"));
        assert!(text.contains("... 1 more"));
        assert!(text.contains("omitted TS030: no usable data"));
    }

    #[test]
    fn test_summary_batch() {
        let full = run();
        let empty = Reconciliation {
            mode: Mode::SingleState,
            results: Vec::new(),
            diagnostics: RunDiagnostics::default(),
        };
        let meta_full = ReportMetadata::for_run(&full, false).target("T1228");
        let meta_empty = ReportMetadata::for_run(&empty, false).target("T1239");
        let reports = [
            RunReport::new(&meta_full, &full),
            RunReport::new(&meta_empty, &empty),
        ];
        let text = SummaryReporter::new()
            .no_color()
            .generate_batch_report(&reports, &ReportConfig::default())
            .unwrap();

        assert!(text.contains("T1228  multi-group  2 groups  top TS010 (Unknown) 1.610"));
        assert!(text.contains("T1239  single-state  0 groups  no rankable groups"));
        assert!(text.contains("Runs: 2 | Empty rankings: 1"));
    }

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate("日本語日本語", 8), "日本...");
        assert_eq!(pad("ab", 4), "ab  ");
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi(&ansi_color("x", "red", true)), "x");
    }
}
