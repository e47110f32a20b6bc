use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::models::ClassLabels;

/// Image damage classifier HTTP service
#[derive(Parser, Debug)]
#[command(name = "damage-classifier")]
#[command(version)]
#[command(about = "Serves POST /predict for a pre-trained image classifier")]
pub struct Cli {
    /// Host to bind to
    #[arg(long, env = "CLASSIFIER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "CLASSIFIER_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Path to the ONNX model artifact
    #[arg(long, env = "CLASSIFIER_MODEL_PATH", default_value = "transfer_model_best.onnx")]
    pub model_path: PathBuf,

    /// Class labels in the order the model was trained with
    #[arg(
        long,
        env = "CLASSIFIER_LABELS",
        value_delimiter = ',',
        default_value = "damaged,intact"
    )]
    pub labels: Vec<String>,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "CLASSIFIER_MAX_UPLOAD_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Log filter directive
    #[arg(long = "log", env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub model_path: PathBuf,
    pub labels: ClassLabels,
    pub max_upload_bytes: usize,
}

impl TryFrom<Cli> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> anyhow::Result<Self> {
        let bind_addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
        let labels = ClassLabels::new(cli.labels).map_err(anyhow::Error::msg)?;
        if cli.max_upload_bytes == 0 {
            anyhow::bail!("max upload size must be greater than zero");
        }

        Ok(Self {
            bind_addr,
            model_path: cli.model_path,
            labels,
            max_upload_bytes: cli.max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<AppConfig> {
        let argv = std::iter::once("damage-classifier").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv)?;
        AppConfig::try_from(cli)
    }

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.model_path, PathBuf::from("transfer_model_best.onnx"));
        assert_eq!(config.labels.as_slice(), ["damaged", "intact"]);
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn labels_keep_their_order() {
        let config = parse(&["--labels", "intact,damaged,unknown", "--port", "8081"]).unwrap();
        assert_eq!(config.labels.as_slice(), ["intact", "damaged", "unknown"]);
        assert_eq!(config.bind_addr.port(), 8081);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(parse(&["--labels", "damaged,,intact"]).is_err());
        assert!(parse(&["--host", "not a host"]).is_err());
        assert!(parse(&["--max-upload-bytes", "0"]).is_err());
    }
}
