//! Offline extraction of a saved model reply.

use std::io::Read;
use std::path::PathBuf;

use tracing::info;

/// Input parameters for the Extract command strategy.
#[derive(Debug, Clone)]
pub struct ExtractInput {
    /// File holding the raw reply; stdin when `None`
    pub file: Option<PathBuf>,
}

/// Strategy that runs the extraction pipeline on a reply without calling a model.
#[derive(Debug, Clone, Copy)]
pub struct ExtractStrategy;

impl super::CommandStrategy for ExtractStrategy {
    type Input = ExtractInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let raw = match input.file {
            Some(ref path) => std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let extraction = parley_extract::extract(&raw);
        info!("Extraction finished via {} layer", extraction.layer.as_str());

        println!("=== Display Text ===\n");
        println!("{}\n", extraction.display_text);
        println!("=== Structured Summary ({}) ===\n", extraction.layer.as_str());
        println!("{}", serde_json::to_string_pretty(&extraction.summary)?);

        Ok(())
    }
}
