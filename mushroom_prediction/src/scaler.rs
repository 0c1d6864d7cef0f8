use crate::model_service::{ArtifactError, Scaler};
use serde::Deserialize;
use std::path::Path;

/// Standardization `(x - mean) / scale` exported from the fitted training scaler.
///
/// Either array may be omitted when the scaler was fit without centering or
/// without scaling. A zero scale leaves the feature unscaled.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new(mean: Option<Vec<f64>>, scale: Option<Vec<f64>>) -> Self {
        Self { mean, scale }
    }

    pub fn from_file(path: &Path, expected_len: usize) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scaler: StandardScaler =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        scaler.check_len(expected_len)?;
        Ok(scaler)
    }

    fn check_len(&self, expected: usize) -> Result<(), ArtifactError> {
        for values in [&self.mean, &self.scale].into_iter().flatten() {
            if values.len() != expected {
                return Err(ArtifactError::LengthMismatch {
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        let mut out = features.to_vec();
        if let Some(mean) = &self.mean {
            if mean.len() != out.len() {
                return Err(ArtifactError::LengthMismatch {
                    expected: mean.len(),
                    actual: out.len(),
                });
            }
            out.iter_mut().zip(mean).for_each(|(v, m)| *v -= m);
        }
        if let Some(scale) = &self.scale {
            if scale.len() != out.len() {
                return Err(ArtifactError::LengthMismatch {
                    expected: scale.len(),
                    actual: out.len(),
                });
            }
            out.iter_mut()
                .zip(scale)
                .filter(|(_, s)| **s != 0.0)
                .for_each(|(v, s)| *v /= s);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_transform_standardizes() {
        let scaler = StandardScaler::new(Some(vec![1.0, 2.0, 3.0]), Some(vec![2.0, 0.5, 0.0]));

        let out = scaler.transform(&[3.0, 3.0, 10.0]).unwrap();

        assert_eq!(out, vec![1.0, 2.0, 7.0]);
    }

    #[test]
    fn test_transform_rejects_wrong_length() {
        let scaler = StandardScaler::new(Some(vec![0.0; 4]), None);

        assert!(matches!(
            scaler.transform(&[1.0, 2.0]),
            Err(ArtifactError::LengthMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_from_file_without_mean() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"scale": [2.0, 4.0]}}"#).unwrap();

        let scaler = StandardScaler::from_file(file.path(), 2).unwrap();

        assert_eq!(scaler.transform(&[2.0, 2.0]).unwrap(), vec![1.0, 0.5]);
    }

    #[test]
    fn test_from_file_checks_feature_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mean": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0]}}"#).unwrap();

        let err = StandardScaler::from_file(file.path(), 2301).unwrap_err();

        assert!(matches!(err, ArtifactError::LengthMismatch { expected: 2301, actual: 3 }));
    }

    #[test]
    fn test_from_file_reports_corrupt_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            StandardScaler::from_file(file.path(), 2),
            Err(ArtifactError::Parse { .. })
        ));
    }
}
