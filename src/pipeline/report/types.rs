use serde::{Deserialize, Serialize};

/// One line item of a lab report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub test: String,
    pub value: String,
    pub reference: Option<String>,
}

impl TestRecord {
    pub fn new(test: impl Into<String>, value: impl Into<String>, reference: Option<String>) -> Self {
        Self {
            test: test.into(),
            value: value.into(),
            reference,
        }
    }

    /// `- TEST: VALUE (reference: REF)`, the line format used in prompts.
    pub fn render(&self) -> String {
        match &self.reference {
            Some(reference) => format!("- {}: {} (reference: {})", self.test, self.value, reference),
            None => format!("- {}: {}", self.test, self.value),
        }
    }
}

/// Parsed report in source order. Duplicated test names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    records: Vec<TestRecord>,
}

impl Report {
    pub fn new(records: Vec<TestRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One record per line.
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(TestRecord::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a TestRecord;
    type IntoIter = std::slice::Iter<'a, TestRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_reference_when_present() {
        let record = TestRecord::new("HDL", "35", Some("40-60 mg/dL".into()));
        assert_eq!(record.render(), "- HDL: 35 (reference: 40-60 mg/dL)");
    }

    #[test]
    fn renders_without_reference() {
        let record = TestRecord::new("Sodium", "140", None);
        assert_eq!(record.render(), "- Sodium: 140");
    }

    #[test]
    fn report_renders_in_order() {
        let report = Report::new(vec![
            TestRecord::new("LDL", "176", None),
            TestRecord::new("HDL", "35", None),
        ]);
        assert_eq!(report.render(), "- LDL: 176\n- HDL: 35");
    }

    #[test]
    fn report_serializes_as_plain_array() {
        let report = Report::new(vec![TestRecord::new("HDL", "35", None)]);
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"[{"test":"HDL","value":"35","reference":null}]"#);
    }
}
