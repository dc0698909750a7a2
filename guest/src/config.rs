use serde::{Deserialize, Serialize};

/// What an Alpine base container is bootstrapped with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpineConfig {
    pub release: String,
    pub arch: String,
    pub base_packages: Vec<String>,
    pub nameservers: Vec<String>,
    pub root_password: Option<String>,
}

impl Default for AlpineConfig {
    fn default() -> Self {
        Self {
            release: "3.19".to_string(),
            arch: "amd64".to_string(),
            base_packages: vec!["ca-certificates".to_string()],
            nameservers: vec!["1.1.1.1".to_string()],
            root_password: None,
        }
    }
}
