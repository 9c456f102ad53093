use serde_json::{Map, Value};

use super::types::{Report, TestRecord};

/// Parse report text into records.
///
/// JSON (a single object or an array of objects) is decoded directly.
/// Anything else is read line by line as `TEST: VALUE (REF)` or
/// `TEST - VALUE (REF)`. Lines matching neither shape are skipped.
pub fn parse_report(raw: &str) -> Report {
    if let Some(report) = parse_structured(raw) {
        tracing::debug!(records = report.len(), "Parsed structured report");
        return report;
    }

    let records: Vec<TestRecord> = raw.lines().filter_map(parse_line).collect();
    tracing::debug!(records = records.len(), "Parsed line-oriented report");
    Report::new(records)
}

// ═══════════════════════════════════════════
// Structured path
// ═══════════════════════════════════════════

/// `None` when the text is not JSON or not object-shaped, so the caller
/// falls through to the line grammar.
fn parse_structured(raw: &str) -> Option<Report> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    match value {
        Value::Object(map) => Some(Report::new(record_from_object(&map).into_iter().collect())),
        Value::Array(items) => {
            if !items.iter().all(Value::is_object) {
                return None;
            }
            let records = items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(record_from_object)
                .collect();
            Some(Report::new(records))
        }
        _ => None,
    }
}

/// Permissive mapping: `test` must be a non-empty string; numeric or boolean
/// values are stringified; a missing or null `reference` is absent.
fn record_from_object(map: &Map<String, Value>) -> Option<TestRecord> {
    let test = map.get("test")?.as_str()?.trim();
    if test.is_empty() {
        return None;
    }

    let value = match map.get("value") {
        None | Some(Value::Null) => String::new(),
        Some(v) => scalar_to_string(v)?.trim().to_string(),
    };

    let reference = map.get("reference").and_then(scalar_to_string);

    Some(TestRecord::new(test, value, reference))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ═══════════════════════════════════════════
// Line path
// ═══════════════════════════════════════════

fn parse_line(line: &str) -> Option<TestRecord> {
    // ':' wins over '-' so that "HDL CHOLESTEROL - DIRECT: 35" keeps its name
    let separator = if line.contains(':') {
        ':'
    } else if line.contains('-') {
        '-'
    } else {
        return None;
    };

    let (left, right) = line.split_once(separator)?;
    let test = left.trim();
    let rest = right.trim();
    if test.is_empty() || rest.is_empty() {
        return None;
    }

    let (value, reference) = split_reference(rest);
    Some(TestRecord::new(test, value, reference))
}

/// Value before the first `(`, reference strictly between the first `(` and
/// the first `)`. A lone parenthesis leaves the text intact; a `)` ahead of
/// the `(` yields an empty reference.
fn split_reference(rest: &str) -> (&str, Option<String>) {
    match (rest.find('('), rest.find(')')) {
        (Some(open), Some(close)) if open < close => {
            (rest[..open].trim(), Some(rest[open + 1..close].to_string()))
        }
        // `)` ahead of `(` still cuts the value; nothing lies between them.
        (Some(open), Some(_)) => (rest[..open].trim(), Some(String::new())),
        _ => (rest, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(test: &str, value: &str, reference: Option<&str>) -> TestRecord {
        TestRecord::new(test, value, reference.map(str::to_string))
    }

    #[test]
    fn colon_line_with_reference() {
        let report = parse_report("HDL: 35 (40-60 mg/dL)");
        assert_eq!(report.records(), &[record("HDL", "35", Some("40-60 mg/dL"))]);
    }

    #[test]
    fn dash_line_without_reference() {
        let report = parse_report("HDL - 35");
        assert_eq!(report.records(), &[record("HDL", "35", None)]);
    }

    #[test]
    fn json_array_bypasses_line_parsing() {
        let report = parse_report(r#"[{"test":"HDL","value":"35"}]"#);
        assert_eq!(report.records(), &[record("HDL", "35", None)]);
    }

    #[test]
    fn colon_takes_priority_over_dash() {
        let report = parse_report("HDL CHOLESTEROL - DIRECT: 35 (40-60 mg/dL)");
        assert_eq!(
            report.records(),
            &[record("HDL CHOLESTEROL - DIRECT", "35", Some("40-60 mg/dL"))]
        );
    }

    #[test]
    fn splits_on_first_separator_only() {
        let report = parse_report("BUN / SR.CREATININE RATIO: 8.15 (9:1-23:1 Ratio)");
        assert_eq!(
            report.records(),
            &[record("BUN / SR.CREATININE RATIO", "8.15", Some("9:1-23:1 Ratio"))]
        );
    }

    #[test]
    fn reference_is_first_parenthesised_span() {
        let report = parse_report("ESR: 28 (0-15) (mm/hr)");
        assert_eq!(report.records(), &[record("ESR", "28", Some("0-15"))]);
    }

    #[test]
    fn unbalanced_parenthesis_kept_in_value() {
        let report = parse_report("HDL: 35 (40-60 mg/dL\nLDL: 176 )");
        assert_eq!(
            report.records(),
            &[
                record("HDL", "35 (40-60 mg/dL", None),
                record("LDL", "176 )", None),
            ]
        );
    }

    #[test]
    fn reversed_parentheses_give_empty_reference() {
        let report = parse_report("HDL: 35 ) note (");
        assert_eq!(report.records(), &[record("HDL", "35 ) note", Some(""))]);

        let report = parse_report("LDL - 176 ) (< 100");
        assert_eq!(report.records(), &[record("LDL", "176 )", Some(""))]);
    }

    #[test]
    fn lines_without_separator_or_parts_are_skipped() {
        let raw = "LIPID PROFILE\n\n: 35\nHDL:\n   \nTRIGLYCERIDES: 182";
        let report = parse_report(raw);
        assert_eq!(report.records(), &[record("TRIGLYCERIDES", "182", None)]);
    }

    #[test]
    fn value_may_be_empty_when_only_reference_given() {
        let report = parse_report("HDL: (40-60)");
        assert_eq!(report.records(), &[record("HDL", "", Some("40-60"))]);
    }

    #[test]
    fn duplicates_and_order_preserved() {
        let report = parse_report("HDL: 35\nLDL: 176\nHDL: 38");
        let names: Vec<&str> = report.iter().map(|r| r.test.as_str()).collect();
        assert_eq!(names, vec!["HDL", "LDL", "HDL"]);
    }

    #[test]
    fn crlf_lines_are_handled() {
        let report = parse_report("HDL: 35\r\nLDL - 176\r\n");
        assert_eq!(
            report.records(),
            &[record("HDL", "35", None), record("LDL", "176", None)]
        );
    }

    #[test]
    fn empty_input_gives_empty_report() {
        assert!(parse_report("").is_empty());
        assert!(parse_report("\n\n").is_empty());
    }

    #[test]
    fn json_object_is_single_record() {
        let report = parse_report(r#"{"test":"HDL","value":35,"reference":"40-60"}"#);
        assert_eq!(report.records(), &[record("HDL", "35", Some("40-60"))]);
    }

    #[test]
    fn json_items_mapped_permissively() {
        let raw = r#"[
            {"test": " TSH ", "value": 2.5, "reference": null},
            {"test": "Fasting", "value": true},
            {"value": "orphan"},
            {"test": "", "value": "1"},
            {"test": "Note", "value": ["nested"]},
            {"test": "CRP"}
        ]"#;
        let report = parse_report(raw);
        assert_eq!(
            report.records(),
            &[
                record("TSH", "2.5", None),
                record("Fasting", "true", None),
                record("CRP", "", None),
            ]
        );
    }

    #[test]
    fn json_array_of_scalars_falls_back_to_lines() {
        // Not object-shaped, so read as text: no separator, no records
        assert!(parse_report("[1, 2, 3]").is_empty());
    }

    #[test]
    fn empty_json_array_is_empty_report() {
        assert!(parse_report("[]").is_empty());
    }

    #[test]
    fn malformed_json_falls_back_to_lines() {
        let report = parse_report("{\"test\": \"HDL\"\nLDL: 176");
        assert_eq!(
            report.records(),
            &[record("{\"test\"", "\"HDL\"", None), record("LDL", "176", None)]
        );
    }

    #[test]
    fn sample_json_report_parses() {
        let report = parse_report(include_str!("../../../demos/lipid_panel.json"));
        assert_eq!(report.len(), 14);
        let hdl = report
            .iter()
            .find(|r| r.test == "HDL CHOLESTEROL - DIRECT")
            .unwrap();
        assert_eq!(hdl.value, "35");
        assert_eq!(hdl.reference.as_deref(), Some("40-60 mg/dL"));
    }

    #[test]
    fn sample_text_report_parses() {
        let report = parse_report(include_str!("../../../demos/lipid_panel.txt"));
        assert_eq!(report.len(), 7);
        assert_eq!(report.records()[5], record("HOMOCYSTEINE", "14.38", Some("<15 µmol/L")));
        assert_eq!(report.records()[6], record("HBA1C", "5.4", None));
    }
}
