use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opaque identifier for a stored record, used to retrieve it later
pub type RecordId = String;

/// Key scheme whose material is being moved, selected by a substring of the
/// key directory path ("tfhe-rs" or "seal"; anything else is Lattigo-BGV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyScheme {
    Bgv,
    TfheRs,
    Seal,
}

impl KeyScheme {
    pub fn detect(dir: &Path) -> Self {
        let path = dir.to_string_lossy();
        if path.contains("tfhe-rs") {
            KeyScheme::TfheRs
        } else if path.contains("seal") {
            KeyScheme::Seal
        } else {
            KeyScheme::Bgv
        }
    }

    /// Filename prefix for this scheme's key files
    pub fn prefix(&self) -> &'static str {
        match self {
            KeyScheme::Bgv => "bgv",
            KeyScheme::TfheRs => "tfhe",
            KeyScheme::Seal => "seal",
        }
    }

    /// TFHE-rs keys carry their parameters inline; the others ship a params file
    pub fn has_parameters(&self) -> bool {
        !matches!(self, KeyScheme::TfheRs)
    }

    pub fn secret_key_file(&self) -> String {
        format!("{}-secret-key.b64", self.prefix())
    }

    pub fn public_key_file(&self) -> String {
        format!("{}-public-key.b64", self.prefix())
    }

    pub fn params_file(&self) -> Option<String> {
        self.has_parameters()
            .then(|| format!("{}-params.b64", self.prefix()))
    }
}

/// Key material read from (or written back to) a key directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBundle {
    pub secret_key: String,
    pub public_key: String,
    pub parameters: Option<String>,
}

/// One vault row: at most one chunk per field. Record j holds the j-th chunk
/// of each field; a field is absent once its chunks are exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
}

/// Retrieval filter: record ids, in the order the fields will be reassembled
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub ids: Vec<RecordId>,
}

impl RecordFilter {
    pub fn by_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RecordId>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn scheme_detection_by_path_substring() {
        assert_eq!(KeyScheme::detect(Path::new("../lattigo/keys")), KeyScheme::Bgv);
        assert_eq!(KeyScheme::detect(Path::new("keys")), KeyScheme::Bgv);
        assert_eq!(
            KeyScheme::detect(Path::new("/home/user/tfhe-rs/keys")),
            KeyScheme::TfheRs
        );
        assert_eq!(KeyScheme::detect(Path::new("seal/keys")), KeyScheme::Seal);
    }

    #[test]
    fn scheme_file_sets() {
        assert_eq!(KeyScheme::Bgv.secret_key_file(), "bgv-secret-key.b64");
        assert_eq!(KeyScheme::Bgv.public_key_file(), "bgv-public-key.b64");
        assert_eq!(KeyScheme::Bgv.params_file().as_deref(), Some("bgv-params.b64"));

        assert_eq!(KeyScheme::Seal.params_file().as_deref(), Some("seal-params.b64"));

        // TFHE-rs has no separate parameters file
        assert_eq!(KeyScheme::TfheRs.secret_key_file(), "tfhe-secret-key.b64");
        assert_eq!(KeyScheme::TfheRs.params_file(), None);
    }

    #[test]
    fn record_json_omits_absent_fields() {
        let record = Record {
            secret_key: Some("abc".into()),
            public_key: None,
            parameters: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"secret_key":"abc"}"#);

        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn detect_ignores_unrelated_components() {
        let dir = PathBuf::from("/data/experiments/run-42/keys");
        assert_eq!(KeyScheme::detect(&dir), KeyScheme::Bgv);
    }
}
