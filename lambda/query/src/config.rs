use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let table_name = std::env::var("DDB_TABLE").context("DDB_TABLE must be provided")?;
        Ok(Config { table_name })
    }
}
