use anyhow::{anyhow, Result};
use log::debug;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::analysis::AnalysisRecord;

/// Pull a structured analysis record out of raw model output.
///
/// Tries a fenced code block first, then the widest brace-delimited
/// substring. When neither parses, the text is wrapped in a
/// `parsed: false` record instead of raising; malformed model output
/// is routine, not an error.
pub fn extract_analysis(text: &str) -> AnalysisRecord {
    let fenced = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
    if let Some(captures) = fenced.captures(text) {
        if let Ok(record) = parse_json_lenient(&captures[1]) {
            return record;
        }
    }

    // No fence, or the fenced block was junk. Take everything from the
    // first `{` to the last `}` and hope.
    let bare = Regex::new(r"(?s)\{.*\}").unwrap();
    if let Some(found) = bare.find(text) {
        if let Ok(record) = parse_json_lenient(found.as_str()) {
            return record;
        }
    }

    debug!(
        "no parsable JSON in model response ({} chars), keeping raw text",
        text.len()
    );
    AnalysisRecord::from_raw_text(text)
}

/// Strict parse with one retry after stripping trailing commas, which
/// models sprinkle into otherwise valid JSON.
pub fn parse_json_lenient<T: DeserializeOwned>(json_string: &str) -> Result<T> {
    match serde_json::from_str(json_string) {
        Ok(parsed) => Ok(parsed),
        Err(strict_error) => {
            let cleaned = strip_trailing_commas(json_string);
            serde_json::from_str(&cleaned)
                .map_err(|e| anyhow!("unparsable JSON: {e} (strict parse: {strict_error})"))
        }
    }
}

fn strip_trailing_commas(json_str: &str) -> String {
    let re = Regex::new(r",(\s*[\]}])").unwrap();
    re.replace_all(json_str, "$1").to_string()
}
