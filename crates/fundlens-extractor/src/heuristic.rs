//! Heuristic fund-metric extraction
//!
//! Scans text segments for indicator phrases by plain case-insensitive
//! substring matching and pulls the nearby numbers. Ambiguity is resolved by
//! position: fund size takes the largest candidate, NAV and capital figures
//! take the number on the indicator's own line. Nothing here fails; missing
//! figures stay `None`.

use fundlens_domain::{Chunk, FundMetrics};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

const FUND_SIZE_INDICATORS: &[&str] = &[
    "total fund size",
    "fund size",
    "total commitments",
    "total committed",
    "committed capital",
    "capital commitments",
    "fund commitments",
];

const NAV_INDICATORS: &[&str] = &[
    "net asset value",
    "fund nav",
    "total nav",
    "unrealized fair value",
    "fair value",
    "net assets",
    "nav",
];

const CALLED_INDICATORS: &[&str] = &[
    "cumulative paid in capital",
    "paid in capital",
    "paid-in capital",
    "cumulative called",
    "called capital",
    "capital calls",
    "drawn down",
];

const UNCALLED_INDICATORS: &[&str] = &[
    "uncalled capital",
    "unfunded commitment",
    "remaining commitment",
    "available for drawdown",
    "uncalled",
    "unfunded",
];

/// Ratio keywords; lines carrying them are not capital lines
const RATIO_KEYWORDS: &[&str] = &["tvpi", "dpi", "rvpi", "moic", "multiple", "to paid-in"];

/// Words a summary table row must carry before its numbers are trusted
const TABLE_ROW_KEYWORDS: &[&str] = &["total", "fund", "capital", "nav", "commit", "called", "paid"];

/// Performance metric keyword, then the first number on the same line
static PERFORMANCE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(irr|internal rate of return|moic|multiple on invested capital|tvpi|dpi|rvpi)\b[^0-9\n]*?(-?\d+(?:\.\d+)?)\s*(?:%|x)?",
    )
    .ok()
});

/// Indicator-phrase extractor for fund-level figures
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    tolerance: f64,
}

impl FieldExtractor {
    /// Create an extractor with the default consistency tolerance (0.01)
    pub fn new() -> Self {
        Self { tolerance: 0.01 }
    }

    /// Extract fund metrics from raw text
    pub fn extract_fund_metrics(&self, text: &str) -> FundMetrics {
        let mut metrics = FundMetrics::default();
        self.scan(text, &mut metrics);
        self.finish(metrics)
    }

    /// Extract fund metrics from chunker output
    ///
    /// Chunks are scanned in order; a figure found in a later chunk replaces
    /// one found earlier. The fund name detected by the chunker fills
    /// `company_name`.
    pub fn extract_from_chunks(&self, chunks: &[Chunk]) -> FundMetrics {
        let mut metrics = FundMetrics::default();
        for chunk in chunks {
            self.scan(&chunk.content, &mut metrics);
            if metrics.company_name.is_none() {
                metrics.company_name = chunk.context.fund_name.clone();
            }
        }
        self.finish(metrics)
    }

    fn scan(&self, text: &str, metrics: &mut FundMetrics) {
        let mut table = FundMetrics::default();

        for segment in segments(text) {
            analyze_segment(&segment, metrics);
            for line in &segment {
                if let Some((size, nav, called)) = table_row(line) {
                    table.fund_size = table.fund_size.or(size);
                    table.fund_nav = table.fund_nav.or(nav);
                    table.cumulative_called_capital = table.cumulative_called_capital.or(called);
                }
            }
        }

        // table rows only fill figures no indicator phrase produced
        metrics.fill_missing_from(&table);
    }

    fn finish(&self, mut metrics: FundMetrics) -> FundMetrics {
        if metrics.uncalled_capital.is_none() {
            if let (Some(size), Some(called)) = (metrics.fund_size, metrics.cumulative_called_capital) {
                if size >= called {
                    debug!("Deriving uncalled capital from fund size and called capital");
                    metrics.uncalled_capital = Some(size - called);
                }
            }
        }

        for warning in self.consistency_warnings(&metrics) {
            warn!("{}", warning);
        }
        metrics
    }

    /// Internal-consistency findings; values are reported, never corrected
    pub fn consistency_warnings(&self, metrics: &FundMetrics) -> Vec<String> {
        let mut warnings = Vec::new();

        if let (Some(size), Some(called), Some(uncalled)) = (
            metrics.fund_size,
            metrics.cumulative_called_capital,
            metrics.uncalled_capital,
        ) {
            if (size - (called + uncalled)).abs() > self.tolerance {
                warnings.push(format!(
                    "Fund size ({}) does not equal called ({}) + uncalled ({}) capital",
                    size, called, uncalled
                ));
            }
        }

        if let (Some(tvpi), Some(dpi), Some(rvpi)) = (metrics.tvpi, metrics.dpi, metrics.rvpi) {
            if (tvpi - (dpi + rvpi)).abs() > self.tolerance {
                warnings.push(format!(
                    "TVPI ({}) does not equal DPI ({}) + RVPI ({})",
                    tvpi, dpi, rvpi
                ));
            }
        }

        warnings
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Split text into paragraphs; headings and blank lines start a new one
fn segments(text: &str) -> Vec<Vec<&str>> {
    let mut out: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if trimmed.is_empty() {
                continue;
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn analyze_segment(lines: &[&str], metrics: &mut FundMetrics) {
    let lowered: Vec<String> = lines.iter().map(|l| l.to_ascii_lowercase()).collect();
    let all_numbers: Vec<f64> = lines.iter().flat_map(|l| numbers_in(l)).collect();

    // fund size: the largest number on an indicator line, else in the segment
    let size_lines: Vec<usize> = matching_lines(&lowered, FUND_SIZE_INDICATORS, UNCALLED_INDICATORS);
    if !size_lines.is_empty() {
        let on_lines = size_lines.iter().flat_map(|&i| numbers_in(lines[i]));
        if let Some(size) = max(on_lines).or_else(|| max(all_numbers.iter().copied())) {
            metrics.fund_size = Some(size);
        }
    }

    if let Some(nav) = line_value(lines, &lowered, NAV_INDICATORS, &[], &all_numbers) {
        metrics.fund_nav = Some(nav);
    }

    let called_exclusions: Vec<&str> = UNCALLED_INDICATORS.iter().chain(RATIO_KEYWORDS).copied().collect();
    if let Some(called) = line_value(lines, &lowered, CALLED_INDICATORS, &called_exclusions, &all_numbers) {
        metrics.cumulative_called_capital = Some(called);
    }

    if let Some(uncalled) = line_value(lines, &lowered, UNCALLED_INDICATORS, &[], &all_numbers) {
        metrics.uncalled_capital = Some(uncalled);
    }

    if let Some(re) = PERFORMANCE.as_ref() {
        for line in lines {
            for caps in re.captures_iter(line) {
                let (Some(keyword), Some(number)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let Ok(value) = number.as_str().parse::<f64>() else {
                    continue;
                };
                match keyword.as_str().to_ascii_lowercase().as_str() {
                    "irr" | "internal rate of return" => metrics.irr = Some(value),
                    "moic" | "multiple on invested capital" => metrics.moic = Some(value),
                    "tvpi" => metrics.tvpi = Some(value),
                    "dpi" => metrics.dpi = Some(value),
                    "rvpi" => metrics.rvpi = Some(value),
                    _ => {}
                }
            }
        }
    }
}

/// Indices of lines containing an indicator and none of the exclusions
fn matching_lines(lowered: &[String], indicators: &[&str], exclusions: &[&str]) -> Vec<usize> {
    lowered
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            indicators.iter().any(|ind| line.contains(ind))
                && !exclusions.iter().any(|ex| line.contains(ex))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Number on the first indicator line, preferring one after the phrase;
/// falls back to the segment maximum
fn line_value(
    lines: &[&str],
    lowered: &[String],
    indicators: &[&str],
    exclusions: &[&str],
    all_numbers: &[f64],
) -> Option<f64> {
    let matched = matching_lines(lowered, indicators, exclusions);
    if matched.is_empty() {
        return None;
    }

    for &i in &matched {
        let line = lines[i];
        let lower = &lowered[i];
        // ASCII lowercasing keeps byte offsets aligned with the original line
        let after = indicators
            .iter()
            .find_map(|ind| lower.find(ind).map(|pos| pos + ind.len()))
            .and_then(|end| line.get(end..));
        if let Some(value) = after.and_then(|rest| numbers_in(rest).into_iter().next()) {
            return Some(value);
        }
        if let Some(value) = numbers_in(line).into_iter().next() {
            return Some(value);
        }
    }

    max(all_numbers.iter().copied())
}

/// Summary table rows: numbers sorted descending map to fund size, NAV and
/// called capital
fn table_row(line: &str) -> Option<(Option<f64>, Option<f64>, Option<f64>)> {
    let lower = line.to_ascii_lowercase();

    let since_inception = lower.contains("since inception");
    let summary_row = line.trim_start().starts_with('|')
        && numeric_cells(line) >= 2
        && !RATIO_KEYWORDS.iter().any(|k| lower.contains(k))
        && TABLE_ROW_KEYWORDS.iter().any(|k| lower.contains(k));
    if !since_inception && !summary_row {
        return None;
    }

    let mut numbers = numbers_in(line);
    if numbers.is_empty() {
        return None;
    }
    numbers.sort_by(|a, b| b.total_cmp(a));
    debug!(row = line.trim(), "Table row heuristic");
    Some((
        numbers.first().copied(),
        numbers.get(1).copied(),
        numbers.get(2).copied(),
    ))
}

fn numeric_cells(line: &str) -> usize {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty() && parse_amount(cell).is_some())
        .count()
}

fn max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}

/// Units that mark the preceding token as an amount rather than a year
const AMOUNT_UNITS: &[&str] = &["keur", "teur", "eur", "€", "usd", "$", "k", "m", "mn", "million", "thousand"];

/// Every numeric-looking whitespace-delimited token in the text
///
/// Bare years (`2023` with no separator, currency or unit) are skipped.
pub(crate) fn numbers_in(text: &str) -> Vec<f64> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens
        .iter()
        .enumerate()
        .filter(|&(i, token)| !is_year(token) || tokens.get(i + 1).is_some_and(|next| is_unit(next)))
        .filter_map(|(_, token)| parse_amount(token))
        .collect()
}

fn bare(token: &str) -> &str {
    token
        .trim_start_matches(|c: char| matches!(c, '|' | '(' | '*' | '"'))
        .trim_end_matches(|c: char| matches!(c, '|' | ')' | ':' | ';' | '*' | '"' | '.' | ','))
}

fn is_year(token: &str) -> bool {
    let t = bare(token);
    t.len() == 4
        && t.bytes().all(|b| b.is_ascii_digit())
        && t.parse::<u32>().is_ok_and(|y| (1900..=2100).contains(&y))
}

fn is_unit(token: &str) -> bool {
    let t = bare(token).to_lowercase();
    AMOUNT_UNITS.contains(&t.as_str())
}

/// Parse a token such as `50,000`, `€1.2M` or `$250k`
///
/// Percentages and multiples (`12%`, `1.8x`) are not amounts and are rejected.
pub(crate) fn parse_amount(token: &str) -> Option<f64> {
    let t = bare(token).trim_start_matches(&['€', '$'][..]).trim_end_matches('€');

    let (digits, multiplier) = if let Some(d) = t.strip_suffix(&['k', 'K'][..]) {
        (d, 1_000.0)
    } else if let Some(d) = t.strip_suffix('M') {
        (d, 1_000_000.0)
    } else {
        (t, 1.0)
    };
    let digits = digits.trim_start_matches(&['€', '$'][..]);

    if !digits.starts_with(|c: char| c.is_ascii_digit())
        || !digits.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
        || digits.matches('.').count() > 1
    {
        return None;
    }

    digits
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .map(|n| n * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
# Acme Ventures Fund II - Q4 2023

## Fund Overview
Total commitments: 50,000 kEUR
Paid in capital: 30,000 kEUR
Uncalled capital: 20,000 kEUR
Net asset value (NAV): 62,500 kEUR

## Performance
Net IRR: 12.5%
TVPI: 1.8x
DPI: 0.5x
RVPI: 1.3x
";

    #[test]
    fn test_fund_size_scenario() {
        let metrics = FieldExtractor::new()
            .extract_fund_metrics("## Fund Size\nTotal commitments: 50,000 kEUR");
        assert_eq!(metrics.fund_size, Some(50000.0));
    }

    #[test]
    fn test_full_report() {
        let m = FieldExtractor::new().extract_fund_metrics(REPORT);
        assert_eq!(m.fund_size, Some(50000.0));
        assert_eq!(m.cumulative_called_capital, Some(30000.0));
        assert_eq!(m.uncalled_capital, Some(20000.0));
        assert_eq!(m.fund_nav, Some(62500.0));
        assert_eq!(m.irr, Some(12.5));
        assert_eq!(m.tvpi, Some(1.8));
        assert_eq!(m.dpi, Some(0.5));
        assert_eq!(m.rvpi, Some(1.3));
    }

    #[test]
    fn test_fund_size_takes_max() {
        let m = FieldExtractor::new()
            .extract_fund_metrics("Fund size of 40,000 kEUR at first close, 55,000 kEUR at final close");
        assert_eq!(m.fund_size, Some(55000.0));
    }

    #[test]
    fn test_nav_prefers_indicator_line() {
        let text = "Portfolio overview 2023\nThe fund NAV stood at 42,000 kEUR\nGross proceeds 90,000 kEUR";
        let m = FieldExtractor::new().extract_fund_metrics(text);
        assert_eq!(m.fund_nav, Some(42000.0));
    }

    #[test]
    fn test_uncalled_line_is_not_called_capital() {
        let m = FieldExtractor::new().extract_fund_metrics("Uncalled capital: 5,000 kEUR");
        assert_eq!(m.uncalled_capital, Some(5000.0));
        assert_eq!(m.cumulative_called_capital, None);
    }

    #[test]
    fn test_ratio_line_is_not_called_capital() {
        let m = FieldExtractor::new()
            .extract_fund_metrics("Total value to paid-in capital (TVPI): 1.8x");
        assert_eq!(m.cumulative_called_capital, None);
        assert_eq!(m.tvpi, Some(1.8));
    }

    #[test]
    fn test_table_row_heuristic() {
        let text = "| Since inception | 50,000 | 42,000 | 30,000 |";
        let m = FieldExtractor::new().extract_fund_metrics(text);
        assert_eq!(m.fund_size, Some(50000.0));
        assert_eq!(m.fund_nav, Some(42000.0));
        assert_eq!(m.cumulative_called_capital, Some(30000.0));
    }

    #[test]
    fn test_table_row_does_not_override_indicators() {
        let text = "Total commitments: 80,000 kEUR\n\n| Fund total | 50,000 | 42,000 |";
        let m = FieldExtractor::new().extract_fund_metrics(text);
        assert_eq!(m.fund_size, Some(80000.0));
        assert_eq!(m.fund_nav, Some(42000.0));
    }

    #[test]
    fn test_portfolio_rows_are_ignored() {
        let text = "| Acme GmbH | Seed | 1,000 | 3,000 |";
        let m = FieldExtractor::new().extract_fund_metrics(text);
        assert_eq!(m, FundMetrics::default());
    }

    #[test]
    fn test_uncalled_derived() {
        let m = FieldExtractor::new()
            .extract_fund_metrics("Fund size: 100 kEUR\n\nCalled capital: 60 kEUR");
        assert_eq!(m.uncalled_capital, Some(40.0));
    }

    #[test]
    fn test_consistency_warnings() {
        let metrics = FundMetrics {
            fund_size: Some(100.0),
            cumulative_called_capital: Some(60.0),
            uncalled_capital: Some(30.0),
            tvpi: Some(2.0),
            dpi: Some(0.8),
            rvpi: Some(1.3),
            ..Default::default()
        };
        let warnings = FieldExtractor::new().consistency_warnings(&metrics);
        assert_eq!(warnings.len(), 2);

        // values are kept as found
        let text = "Fund size: 100 kEUR\nCalled capital: 60 kEUR\nUncalled capital: 30 kEUR";
        let m = FieldExtractor::new().extract_fund_metrics(text);
        assert_eq!(m.uncalled_capital, Some(30.0));
    }

    #[test]
    fn test_year_is_not_fund_size() {
        let text = "Fund size as of December 2023\nThe vintage year 2019 fund closed in 2020.";
        let m = FieldExtractor::new().extract_fund_metrics(text);
        assert_eq!(m.fund_size, None);

        let m = FieldExtractor::new().extract_fund_metrics("Fund size as of 2023: 2000 kEUR");
        assert_eq!(m.fund_size, Some(2000.0));
    }

    #[test]
    fn test_numbers_in_skips_bare_years() {
        assert_eq!(numbers_in("December 2023: 45,000 and 2024."), vec![45000.0]);
        assert_eq!(numbers_in("2050 kEUR"), vec![2050.0]);
        assert_eq!(numbers_in("2,023 units"), vec![2023.0]);
        assert_eq!(numbers_in("code 1850"), vec![1850.0]);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50,000"), Some(50000.0));
        assert_eq!(parse_amount("€1.5M"), Some(1_500_000.0));
        assert_eq!(parse_amount("$250k"), Some(250_000.0));
        assert_eq!(parse_amount("(3,000)."), Some(3000.0));
        assert_eq!(parse_amount("12.5%"), None);
        assert_eq!(parse_amount("1.8x"), None);
        assert_eq!(parse_amount("31.12.2023"), None);
        assert_eq!(parse_amount("Q4"), None);
        assert_eq!(parse_amount("kEUR"), None);
    }

    #[test]
    fn test_empty_and_junk_input() {
        let extractor = FieldExtractor::new();
        assert_eq!(extractor.extract_fund_metrics(""), FundMetrics::default());
        assert_eq!(
            extractor.extract_fund_metrics("lorem ipsum | | ###"),
            FundMetrics::default()
        );
    }

    #[test]
    fn test_extract_from_chunks_uses_context() {
        use fundlens_chunker::{ChunkingConfig, DocumentMetadata, SemanticChunker};

        let chunker = SemanticChunker::new(ChunkingConfig::default()).unwrap();
        let chunks = chunker.chunk_document(REPORT, &DocumentMetadata::default());
        let m = FieldExtractor::new().extract_from_chunks(&chunks);

        assert_eq!(m.fund_size, Some(50000.0));
        assert_eq!(m.tvpi, Some(1.8));
        assert_eq!(m.company_name.as_deref(), Some("Acme Ventures Fund II"));
    }
}
