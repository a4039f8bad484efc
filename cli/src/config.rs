use anyhow::{Context, Result};

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// User id used when a command is run without `--user`.
    pub default_user: Option<i32>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let default_user = parse_user(std::env::var("CRM_DEFAULT_USER").ok().as_deref())
            .context("invalid CRM_DEFAULT_USER")?;
        Ok(Self { default_user })
    }
}

fn parse_user(raw: Option<&str>) -> Result<Option<i32>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(Some(value.parse()?)),
        None => Ok(None),
    }
}
