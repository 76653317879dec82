//! Line-oriented script runner.
//!
//! Each non-empty line is one call: `init`, `invoke <name> [args...]` or
//! `query <name> [args...]`, split with shell quoting rules so a status may
//! contain spaces (`invoke update bob "on leave"`) or be empty (`''`).
//! Lines starting with `#` are comments. A failing line is reported and the
//! run continues.

use std::io::{BufRead, Write};

use idtable_core::Caller;
use idtable_router::Router;
use tracing::warn;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn into_result(self) -> anyhow::Result<()> {
        if self.failed > 0 {
            anyhow::bail!("{} of {} lines failed", self.failed, self.failed + self.succeeded);
        }
        Ok(())
    }
}

pub fn run(
    router: &Router,
    caller: &Caller,
    input: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lineno = index + 1;
        match run_line(router, caller, line) {
            Ok(output) => {
                summary.succeeded += 1;
                writeln!(out, "{lineno}: {output}")?;
            }
            Err(e) => {
                summary.failed += 1;
                warn!(line = lineno, error = %e, "batch line failed");
                writeln!(out, "{lineno}: error: {e}")?;
            }
        }
    }
    Ok(summary)
}

fn run_line(router: &Router, caller: &Caller, line: &str) -> anyhow::Result<String> {
    let Some(words) = shlex::split(line) else {
        anyhow::bail!("unbalanced quotes: {line}");
    };
    let Some((verb, rest)) = words.split_first() else {
        anyhow::bail!("unrecognized line: {line}");
    };
    match (verb.as_str(), rest.split_first()) {
        ("init", None) => {
            router.init()?;
            Ok("ok".to_string())
        }
        ("invoke", Some((name, args))) => {
            router.invoke_as(caller, name, args)?;
            Ok("ok".to_string())
        }
        ("query", Some((name, args))) => {
            let value = router.query_as(caller, name, args)?;
            Ok(String::from_utf8_lossy(&value).into_owned())
        }
        _ => anyhow::bail!("unrecognized line: {line}"),
    }
}
