use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    pub model: ModelConfig,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.try_into().map_err(serde::de::Error::custom)
}

pub trait Validatable {
    fn validate(&self) -> Result<(), String>;
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
    pub onnx_file: String,
    pub scaler_file: String,
    pub label_encoder_file: String,
    #[serde(default = "default_model_instances")]
    pub num_instances: usize,
}

fn default_model_instances() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl ModelConfig {
    pub fn get_onnx_path(&self) -> PathBuf {
        self.model_dir.join(&self.onnx_file)
    }

    pub fn get_scaler_path(&self) -> PathBuf {
        self.model_dir.join(&self.scaler_file)
    }

    pub fn get_label_encoder_path(&self) -> PathBuf {
        self.model_dir.join(&self.label_encoder_file)
    }
}

impl Validatable for ModelConfig {
    fn validate(&self) -> Result<(), String> {
        if self.num_instances == 0 {
            return Err("model.num_instances must be at least 1".to_string());
        }
        for path in [
            self.get_onnx_path(),
            self.get_scaler_path(),
            self.get_label_encoder_path(),
        ] {
            if !path.exists() {
                return Err(format!("Model artifact not found: {:?}", path));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(format!(
                "{} is not a supported minimum log level. Use either `debug` or `info`.",
                other
            )),
        }
    }
}

/// Layers `base.yaml`, the `APP_ENVIRONMENT` file, `APP_*` variables and finally `PORT`.
pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("no working directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let config = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(format!("{}.yaml", environment.as_str())),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("server.port", std::env::var("PORT").ok())?
        .build()?;

    config.try_deserialize::<Config>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_config(dir: PathBuf) -> ModelConfig {
        ModelConfig {
            model_dir: dir,
            onnx_file: "mushroom_cnn.onnx".to_string(),
            scaler_file: "mushroom_scaler.json".to_string(),
            label_encoder_file: "mushroom_label_encoder.json".to_string(),
            num_instances: 1,
        }
    }

    #[test]
    fn test_artifact_paths_are_joined_to_model_dir() {
        let config = model_config(PathBuf::from("models"));

        assert_eq!(config.get_onnx_path(), PathBuf::from("models/mushroom_cnn.onnx"));
        assert_eq!(
            config.get_label_encoder_path(),
            PathBuf::from("models/mushroom_label_encoder.json")
        );
    }

    #[test]
    fn test_validate_reports_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = model_config(dir.path().to_path_buf());

        let err = config.validate().unwrap_err();
        assert!(err.contains("mushroom_cnn.onnx"));
    }

    #[test]
    fn test_validate_accepts_present_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = model_config(dir.path().to_path_buf());
        for path in [
            config.get_onnx_path(),
            config.get_scaler_path(),
            config.get_label_encoder_path(),
        ] {
            std::fs::write(path, b"{}").unwrap();
        }

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_log_level_and_environment() {
        assert!(matches!(LogLevel::try_from("DEBUG".to_string()), Ok(LogLevel::Debug)));
        assert!(LogLevel::try_from("trace".to_string()).is_err());
        assert!(matches!(
            Environment::try_from("Production".to_string()),
            Ok(Environment::Production)
        ));
    }

    #[test]
    fn test_server_address() {
        let server = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
        };

        assert_eq!(server.get_address(), "0.0.0.0:5000");
    }
}
