use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

// Anything matching one of these never leaves the local machine.
const DEFAULT_IGNORE: &[&str] = &[
    ".specstory",
    ".git",
    ".gitignore",
    "node_modules",
    "*.tsbuildinfo",
    "php/config.php",
    "src",
    "tsconfig.json",
    "package*.json",
    "upsync.yaml",
];

pub fn read_config(path: Option<PathBuf>) -> Result<DeployConfig> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (PathBuf::from("./upsync.yaml"), false),
    };

    if !path.exists() {
        if explicit {
            bail!("config file not found: {}", path.display());
        }
        return Ok(DeployConfig::default());
    }

    let file =
        File::open(&path).with_context(|| format!("could not open {}", path.display()))?;
    let reader = BufReader::new(file);

    serde_yaml::from_reader(reader).with_context(|| format!("could not parse {}", path.display()))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub user: String,
    pub host: String,
    pub port: u16,
    pub remote_dir: PathBuf,
    pub key_file: PathBuf,
    pub local_root: PathBuf,
    pub ignore: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            user: "abaljeu".to_string(),
            host: "ftp.collaborative-systems.org".to_string(),
            port: 22,
            remote_dir: "public_html/ambit".into(),
            key_file: default_key_file(),
            local_root: ".".into(),
            ignore: DEFAULT_IGNORE.iter().map(|rule| rule.to_string()).collect(),
        }
    }
}

fn default_key_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".ssh")
        .join("collab-sys.rsa")
}
