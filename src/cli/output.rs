use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub pretty: bool,
}

/// Print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T, opts: &OutputOptions) -> Result<()> {
    let json = if opts.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
