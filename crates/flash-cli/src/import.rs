//! Tab-separated card lists
//!
//! One card per line: `front<TAB>back`. Blank lines and lines starting with
//! `#` are ignored. Text after a second tab is dropped.

/// Label pairs read from a TSV document
#[derive(Debug, Default, PartialEq)]
pub struct ParsedPairs {
    pub pairs: Vec<(String, String)>,
    /// 1-based line numbers that had no tab
    pub malformed: Vec<usize>,
}

pub fn parse_pairs(text: &str) -> ParsedPairs {
    let mut parsed = ParsedPairs::default();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t');
        match (fields.next(), fields.next()) {
            (Some(front), Some(back)) => {
                parsed
                    .pairs
                    .push((front.trim().to_string(), back.trim().to_string()));
            }
            _ => parsed.malformed.push(index + 1),
        }
    }

    parsed
}
