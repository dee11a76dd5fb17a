//! normalize command - Normalize a draft report read from a file or stdin

use std::io::Read;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde_json::json;

use crate::cli::args::NormalizeArgs;
use crate::core::dialect::Dialect;
use crate::core::normalize::normalize as normalize_draft;
use crate::engine::Context;
use crate::ui::output;

fn read_draft(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read the draft from stdin")?;
            Ok(text)
        }
    }
}

/// Normalize a draft and print the result.
pub fn normalize(ctx: &Context, args: NormalizeArgs) -> Result<()> {
    let dialect: Dialect = args.dialect.parse()?;
    let draft = read_draft(args.file.as_deref())?;

    let report = normalize_draft(dialect, &draft, &args.headers, &args.pseudo_headers);

    let verbosity = ctx.verbosity();
    output::debug(
        format!(
            "{} headers, {} pseudo-headers, {} body bytes",
            report.headers.len(),
            report.pseudo_headers.len(),
            report.body.len()
        ),
        verbosity,
    );
    for header in &report.headers {
        output::debug(format!("header {}", header), verbosity);
    }

    if args.json {
        let value = json!({
            "dialect": dialect.name(),
            "headers": report.headers,
            "pseudo_headers": report.pseudo_headers,
            "body": report.body,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for line in &report.pseudo_headers {
            println!("{}", line);
        }
        println!();
        print!("{}", report.body);
    }

    Ok(())
}
