use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::instructions::MAX_CONSTANT;

/// When to emit the bootstrap prologue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Bootstrap {
    /// Only if some module declares the entry function.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub entry_function: String,
    pub stack_base: u16,
    pub bootstrap: Bootstrap,
    /// Reject `goto`/`if-goto` targets never declared in the same function,
    /// and labels declared twice.
    pub strict_labels: bool,
    /// Emit `// [ADDR] command` before each command's code.
    pub annotate: bool,
    /// Copy comment and blank source lines to the output.
    pub echo_comments: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            entry_function: "Sys.init".to_string(),
            stack_base: 256,
            bootstrap: Bootstrap::Auto,
            strict_labels: true,
            annotate: true,
            echo_comments: true,
        }
    }
}

impl TranslatorConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The bootstrap loads `stack_base` with an A-instruction.
    pub fn validate(&self) -> Result<()> {
        if self.stack_base > MAX_CONSTANT {
            bail!("stack_base {} does not fit in 15 bits (max {MAX_CONSTANT})", self.stack_base);
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
