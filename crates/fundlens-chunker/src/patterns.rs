//! Compiled patterns for structure detection

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|pat| Regex::new(pat).ok()).collect()
}

/// True if any pattern matches
pub(crate) fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

// --- Content classification ---

/// Markdown pipe tables
pub(crate) static TABLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // three pipes on one line: | a | b |
        r"\|[^\n]*\|[^\n]*\|",
        // row starting with a pipe
        r"(?m)^\s*\|[^\n]*\|",
        // two-column row without outer pipes: Name | Value
        r"[A-Za-z]+[ \t]+\|[ \t]+[A-Za-z0-9]+",
    ])
});

pub(crate) static CHART_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[r"(?i)\b(?:charts?|graphs?|figures?|diagrams?|visuali[sz]ations?)\b"])
});

pub(crate) static FINANCIAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\b(?:irr|moic|tvpi|dpi|rvpi|nav|returns?|valuations?|cash[ -]flows?|distributions?|commitments?)\b",
    ])
});

pub(crate) static EXECUTIVE_SUMMARY_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?i)\bexecutive\s+summary\b"]));

pub(crate) static SUMMARY_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?i)\bsummary\b"]));

/// Metric strings recorded on a section, e.g. `IRR: 12.5%`, `TVPI: 1.8x`
pub(crate) static METRIC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bIRR\s*:?\s*-?\d+(?:\.\d+)?\s*%",
        r"(?i)\b(?:MOIC|TVPI|DPI|RVPI)\s*:?\s*\d+(?:\.\d+)?\s*x\b",
    ])
});

// --- Document context ---

/// Fund name; capture group 1 is the name
pub(crate) static FUND_NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // Fund name: Acme Ventures II
        r"(?im)^[ \t]*fund(?:[ \t]+name)?[ \t]*:[ \t]*([A-Za-z][A-Za-z0-9 &.\-]*?)[ \t]*$",
        // Acme Ventures Fund II
        r"\b((?:[A-Z][A-Za-z&]*[ \t]+)+Fund(?:[ \t]+[IVX]+)?)\b",
    ])
});

/// Reporting period; group 1 is `Q1`-`Q4` or `quarter`, group 2 the year
pub(crate) static PERIOD_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?i)\b(Q[1-4]|quarter)\s*(\d{4})\b"]));

pub(crate) static ANNUAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| compile(&[r"(?i)\bannual\b"]));

pub(crate) static QUARTERLY_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?i)\bquarterly\b"]));
