use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use imagetext_db::DbConfig;
use imagetext_ocr::{EngineKind, OcrConfig};

/// Default cap on a request body, which bounds how much of an upload is
/// buffered in memory.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Parser)]
#[command(name = "imagetext-server", version, about = "Image upload and OCR service")]
pub struct Cli {
    #[command(flatten)]
    pub config: ServerConfig,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the configured OCR engine on a local image and print the text
    Ocr {
        /// Path to a PNG or JPEG file
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OcrEngineArg {
    Tesseract,
    Disabled,
}

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "IMAGETEXT_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Database connection URL (sqlite:<path>, sqlite::memory:, postgres://...).
    /// Defaults to a SQLite file in the data directory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory of static assets served at `/`
    #[arg(long, env = "IMAGETEXT_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// OCR engine
    #[arg(long, env = "IMAGETEXT_OCR_ENGINE", value_enum, default_value_t = OcrEngineArg::Tesseract)]
    pub ocr_engine: OcrEngineArg,

    /// Path to the tesseract executable
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    pub tesseract_path: PathBuf,

    /// Tesseract language code(s)
    #[arg(long, env = "IMAGETEXT_OCR_LANG", default_value = "eng")]
    pub ocr_lang: String,

    /// Kill an OCR run after this many seconds. Unset waits indefinitely.
    #[arg(long, env = "IMAGETEXT_OCR_TIMEOUT")]
    pub ocr_timeout: Option<u64>,

    /// Largest accepted request body in bytes
    #[arg(long, env = "IMAGETEXT_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_url.clone().filter(|u| !u.is_empty()))
    }

    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            engine: match self.ocr_engine {
                OcrEngineArg::Tesseract => EngineKind::Tesseract,
                OcrEngineArg::Disabled => EngineKind::Disabled,
            },
            tesseract_path: self.tesseract_path.clone(),
            language: self.ocr_lang.clone(),
            timeout: self.ocr_timeout.map(Duration::from_secs),
        }
    }

    /// Reject settings that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            bail!("max upload size must be greater than zero");
        }
        if self.ocr_timeout == Some(0) {
            bail!("ocr timeout must be greater than zero");
        }
        if let Some(dir) = &self.static_dir {
            if !dir.is_dir() {
                bail!("static directory {} does not exist", dir.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["imagetext-server"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn explicit_flags() {
        let cli = parse(&[
            "--port",
            "8080",
            "--bind",
            "127.0.0.1",
            "--database-url",
            "sqlite::memory:",
            "--ocr-engine",
            "disabled",
            "--ocr-timeout",
            "30",
            "--max-upload-bytes",
            "1024",
        ]);
        let config = cli.config;
        assert_eq!(config.addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.db_config().url.as_deref(), Some("sqlite::memory:"));
        let ocr = config.ocr_config();
        assert_eq!(ocr.engine, EngineKind::Disabled);
        assert_eq!(ocr.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_upload_bytes, 1024);
        config.validate().unwrap();
    }

    #[test]
    fn ocr_subcommand() {
        let cli = parse(&["--ocr-lang", "deu", "ocr", "scan.png"]);
        assert_eq!(cli.config.ocr_config().language, "deu");
        match cli.command {
            Some(Commands::Ocr { path }) => assert_eq!(path, PathBuf::from("scan.png")),
            None => panic!("expected ocr subcommand"),
        }
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let mut config = parse(&["--max-upload-bytes", "0"]).config;
        assert!(config.validate().is_err());

        config.max_upload_bytes = DEFAULT_MAX_UPLOAD_BYTES;
        config.ocr_timeout = Some(0);
        assert!(config.validate().is_err());

        config.ocr_timeout = None;
        config.static_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(config.validate().is_err());

        let tmp = tempfile::tempdir().unwrap();
        config.static_dir = Some(tmp.path().to_path_buf());
        config.validate().unwrap();
    }
}
