//! `describe` subcommand.

use std::io::Write;

use anyhow::{Context, Result};
use edls_core::BridgeConfig;
use edls_core::config::{LanguageDescriptor, TokenGrammar};
use serde::Serialize;

#[derive(Serialize)]
struct Description<'a> {
    language: &'a LanguageDescriptor,
    grammar: &'a TokenGrammar,
}

/// Print what the bridge registers with the editor.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn run(config: &BridgeConfig, as_toml: bool, out: &mut impl Write) -> Result<()> {
    if as_toml {
        let rendered = config.to_toml().context("failed to render configuration")?;
        out.write_all(rendered.as_bytes())?;
        return Ok(());
    }

    let description = Description {
        language: &config.language,
        grammar: &config.grammar,
    };
    serde_json::to_writer_pretty(&mut *out, &description)?;
    writeln!(out)?;
    Ok(())
}
