//! Rule-based symptom matching.
//!
//! A [`DiseaseCatalogue`] is a read-only list of diseases, each with a handful of keyword
//! symptoms. [`DiseaseCatalogue::diagnose`] counts, per disease, how many keywords occur in the
//! free-text symptom description (case-sensitive substring match) and picks the disease with the
//! strictly highest count. Earlier diseases win ties.
//!
//! The catalogue can be loaded from YAML:
//!
//! ```yaml
//! diseases:
//!   - name: Flu
//!     keywords: [fever, cough, headache]
//! ```

use crate::constants::{MAX_DISEASES, MAX_DISEASE_KEYWORDS};
use crate::{RegistryError, RegistryResult};
use clinic_types::NonEmptyText;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disease {
    name: String,
    keywords: Vec<String>,
}

impl Disease {
    pub fn new(name: NonEmptyText, keywords: Vec<NonEmptyText>) -> Self {
        Self {
            name: name.into_inner(),
            keywords: keywords.into_iter().map(NonEmptyText::into_inner).collect(),
        }
    }

    fn seed(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Number of keywords found in `symptoms`.
    pub fn matches(&self, symptoms: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| symptoms.contains(keyword.as_str()))
            .count()
    }
}

/// Outcome of matching a symptom description against the catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosisMatch<'a> {
    Possible { disease: &'a Disease, matches: usize },
    NoMatch,
}

impl DiagnosisMatch<'_> {
    pub fn disease_name(&self) -> Option<&str> {
        match self {
            DiagnosisMatch::Possible { disease, .. } => Some(disease.name()),
            DiagnosisMatch::NoMatch => None,
        }
    }
}

impl fmt::Display for DiagnosisMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosisMatch::Possible { disease, .. } => {
                write!(f, "Possible diagnosis: {}", disease.name())
            }
            DiagnosisMatch::NoMatch => f.write_str("No specific diagnosis"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiseaseCatalogue {
    diseases: Vec<Disease>,
}

impl DiseaseCatalogue {
    /// Builds a catalogue after checking it against the catalogue limits.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Catalogue`] if the catalogue is empty, holds more than
    /// `MAX_DISEASES` diseases, or a disease lists no keywords or more than
    /// `MAX_DISEASE_KEYWORDS`.
    pub fn new(diseases: Vec<Disease>) -> RegistryResult<Self> {
        if diseases.is_empty() {
            return Err(RegistryError::Catalogue(
                "catalogue must list at least one disease".into(),
            ));
        }
        if diseases.len() > MAX_DISEASES {
            return Err(RegistryError::Catalogue(format!(
                "catalogue lists {} diseases, maximum is {MAX_DISEASES}",
                diseases.len()
            )));
        }
        for disease in &diseases {
            if disease.keywords.is_empty() || disease.keywords.len() > MAX_DISEASE_KEYWORDS {
                return Err(RegistryError::Catalogue(format!(
                    "disease '{}' must list between 1 and {MAX_DISEASE_KEYWORDS} keywords",
                    disease.name
                )));
            }
        }
        Ok(Self { diseases })
    }

    /// The catalogue the clinic ships with.
    pub fn seeded() -> Self {
        Self {
            diseases: vec![
                Disease::seed("Flu", &["fever", "cough", "headache"]),
                Disease::seed("Common Cold", &["runny nose", "sneezing", "sore throat"]),
                Disease::seed("COVID-19", &["fever", "cough", "shortness of breath"]),
            ],
        }
    }

    /// Parse a catalogue from YAML text.
    ///
    /// Schema mismatches report the path of the offending field (e.g. `diseases[1].keywords`).
    pub fn parse_yaml(yaml_text: &str) -> RegistryResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire = serde_path_to_error::deserialize::<_, CatalogueWire>(deserializer).map_err(
            |err| {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                RegistryError::Catalogue(format!("schema mismatch at {path}: {source}"))
            },
        )?;

        Self::new(
            wire.diseases
                .into_iter()
                .map(|d| Disease::new(d.name, d.keywords))
                .collect(),
        )
    }

    /// Load a catalogue from a YAML file.
    pub fn load(path: &Path) -> RegistryResult<Self> {
        let text = fs::read_to_string(path).map_err(RegistryError::FileRead)?;
        let catalogue = Self::parse_yaml(&text)?;
        tracing::info!(
            path = %path.display(),
            diseases = catalogue.diseases.len(),
            "loaded disease catalogue"
        );
        Ok(catalogue)
    }

    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    pub fn diagnose(&self, symptoms: &str) -> DiagnosisMatch<'_> {
        let mut best = DiagnosisMatch::NoMatch;
        let mut max_matches = 0;

        for disease in &self.diseases {
            let matches = disease.matches(symptoms);
            if matches > max_matches {
                max_matches = matches;
                best = DiagnosisMatch::Possible { disease, matches };
            }
        }

        best
    }
}

impl Default for DiseaseCatalogue {
    fn default() -> Self {
        Self::seeded()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogueWire {
    diseases: Vec<DiseaseWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DiseaseWire {
    name: NonEmptyText,
    keywords: Vec<NonEmptyText>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fever_and_cough_tie_goes_to_flu() {
        let catalogue = DiseaseCatalogue::seeded();
        let result = catalogue.diagnose("fever cough");
        assert_eq!(result.disease_name(), Some("Flu"));
        assert_eq!(result.to_string(), "Possible diagnosis: Flu");
    }

    #[test]
    fn highest_count_wins_over_definition_order() {
        let catalogue = DiseaseCatalogue::seeded();
        let result = catalogue.diagnose("fever, cough and shortness of breath");
        assert!(matches!(
            result,
            DiagnosisMatch::Possible { matches: 3, .. }
        ));
        assert_eq!(result.disease_name(), Some("COVID-19"));
    }

    #[test]
    fn single_keyword_is_enough() {
        let catalogue = DiseaseCatalogue::seeded();
        assert_eq!(
            catalogue.diagnose("constant sneezing").disease_name(),
            Some("Common Cold")
        );
    }

    #[test]
    fn matching_is_case_sensitive() {
        let catalogue = DiseaseCatalogue::seeded();
        let result = catalogue.diagnose("Fever and COUGH");
        assert_eq!(result, DiagnosisMatch::NoMatch);
        assert_eq!(result.to_string(), "No specific diagnosis");
    }

    #[test]
    fn parses_custom_catalogue() {
        let yaml = r#"diseases:
  - name: Migraine
    keywords: [headache, nausea, light sensitivity]
  - name: Flu
    keywords: [fever, cough]
"#;
        let catalogue = DiseaseCatalogue::parse_yaml(yaml).unwrap();
        assert_eq!(catalogue.diseases().len(), 2);
        assert_eq!(
            catalogue.diagnose("headache and nausea").disease_name(),
            Some("Migraine")
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let yaml = r#"diseases:
  - name: Flu
    keywords: [fever]
    severity: 3
"#;
        let err = DiseaseCatalogue::parse_yaml(yaml).unwrap_err();
        match err {
            RegistryError::Catalogue(msg) => {
                assert!(msg.contains("severity"), "unexpected message: {msg}");
            }
            other => panic!("expected Catalogue error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_keywords() {
        let yaml = "diseases:\n  - name: Flu\n    keywords: [fever, \"  \"]\n";
        let err = DiseaseCatalogue::parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::Catalogue(msg) if msg.contains("keywords")));
    }

    #[test]
    fn rejects_too_many_keywords() {
        let yaml = "diseases:\n  - name: Everything\n    keywords: [a, b, c, d, e, f]\n";
        let err = DiseaseCatalogue::parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::Catalogue(msg) if msg.contains("Everything")));
    }

    #[test]
    fn rejects_empty_catalogue() {
        let err = DiseaseCatalogue::parse_yaml("diseases: []\n").unwrap_err();
        assert!(matches!(err, RegistryError::Catalogue(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("diseases.yaml");
        fs::write(
            &path,
            "diseases:\n  - name: Gastroenteritis\n    keywords: [vomiting, diarrhoea]\n",
        )
        .unwrap();

        let catalogue = DiseaseCatalogue::load(&path).unwrap();
        assert_eq!(catalogue.diseases()[0].name(), "Gastroenteritis");

        let missing = DiseaseCatalogue::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(missing, RegistryError::FileRead(_)));
    }

    #[test]
    fn bundled_catalogue_extends_the_seed() {
        let catalogue =
            DiseaseCatalogue::parse_yaml(include_str!("../../../config/diseases.yaml")).unwrap();
        assert_eq!(
            &catalogue.diseases()[..3],
            DiseaseCatalogue::seeded().diseases()
        );
        assert_eq!(
            catalogue.diagnose("headache and aura").disease_name(),
            Some("Migraine")
        );
    }
}
