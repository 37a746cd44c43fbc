use serde::{Deserialize, Serialize};

pub const PREAMBLE_NUMBER: &str = "0";
pub const PREAMBLE_TITLE: &str = "Preamble";

/// EDGAR filing header. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub sequence: String,
    pub filename: String,
    pub description: String,
}

impl Metadata {
    /// (key, value) pairs in output order.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("type", self.doc_type.as_str()),
            ("sequence", self.sequence.as_str()),
            ("filename", self.filename.as_str()),
            ("description", self.description.as_str()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_empty())
    }
}

/// A numbered section, the preamble (number "0") or an exhibit ("Exhibit A").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub number: String,
    pub title: String,
    pub text: String,
}

impl Section {
    pub fn preamble(text: String) -> Self {
        Section {
            number: PREAMBLE_NUMBER.to_string(),
            title: PREAMBLE_TITLE.to_string(),
            text,
        }
    }

    pub fn is_preamble(&self) -> bool {
        self.number == PREAMBLE_NUMBER
    }
}

/// Parsed filing: header plus preamble, sections and exhibits in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractDocument {
    pub metadata: Metadata,
    pub sections: Vec<Section>,
}

impl ContractDocument {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.sections.is_empty()
    }

    pub fn section_numbers(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.number.as_str()).collect()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape() {
        let doc = ContractDocument {
            metadata: Metadata {
                doc_type: "EX-10.2".into(),
                sequence: "2".into(),
                ..Default::default()
            },
            sections: vec![Section::preamble("Intro".into())],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["metadata"]["type"], "EX-10.2");
        assert_eq!(json["metadata"]["filename"], "");
        assert_eq!(json["sections"][0]["number"], "0");
        assert_eq!(json["sections"][0]["title"], "Preamble");

        let keys: Vec<&String> = json["metadata"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn tolerant_deserialize() {
        let doc: ContractDocument =
            serde_json::from_str(r#"{"sections":[{"number":"1","text":"x"}]}"#).unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.sections[0].title, "");
        assert!(!doc.is_empty());
    }
}
