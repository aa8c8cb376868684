//! Configuration shared by the loaders and the command line.

use crate::options::ParseMode;
use crate::prefixes::PrefixMap;
use anyhow::Result;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(default, setter(into))]
pub struct Config {
    /// Prefix table used to encode terms into concise keys.
    #[serde(default)]
    pub prefixes: PrefixMap,
    /// Abort loading at the first statement that fails to parse.
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn parse_mode(&self) -> ParseMode {
        ParseMode::from(self.strict)
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Prints out the current Config in a clear and readable way for command line output.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  Strict: {}", self.strict);
        if self.prefixes.is_empty() {
            println!("  Prefixes: (none)");
        } else {
            println!("  Prefixes:");
            for (prefix, namespace) in self.prefixes.iter() {
                println!("    {prefix}: <{namespace}>");
            }
        }
    }
}
