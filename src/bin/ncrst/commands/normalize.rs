use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;

use amber_restart::Frame;
use amber_restart::io::{AmberRestart, Format, Mode, RestartOptions};

use crate::cli::NormalizeArgs;
use crate::display::Context as DisplayContext;

pub fn run_normalize(args: NormalizeArgs, ctx: DisplayContext) -> Result<()> {
    if same_file(&args.input, &args.output) {
        bail!(
            "Input and output are the same file ('{}').\n\nThe output is truncated before it is written; choose another path.",
            args.input.display()
        );
    }

    let mut input = AmberRestart::open(&args.input, Mode::Read)
        .with_context(|| format!("Failed to open restart '{}'", args.input.display()))?;
    let mut frame = Frame::new();
    input
        .read(&mut frame)
        .with_context(|| format!("Failed to read the frame of '{}'", args.input.display()))?;

    if args.no_velocities {
        frame = without_velocities(&frame);
    }

    let mut options = RestartOptions {
        version: args.container.into(),
        ..RestartOptions::default()
    };
    if let Some(program) = args.program {
        options.program = program;
    }

    let mut output = AmberRestart::open_with(&args.output, Mode::Write, &options)
        .with_context(|| format!("Failed to create '{}'", args.output.display()))?;
    output
        .write(&frame)
        .with_context(|| format!("Failed to write '{}'", args.output.display()))?;
    output
        .close()
        .with_context(|| format!("Failed to flush '{}'", args.output.display()))?;

    info!(
        "normalized '{}' into '{}' ({})",
        args.input.display(),
        args.output.display(),
        options.version
    );
    if ctx.interactive {
        eprintln!(
            "   ✓ Wrote {} atoms{} to '{}'",
            frame.size(),
            if frame.has_velocities() { " with velocities" } else { "" },
            args.output.display()
        );
    }
    Ok(())
}

/// Whether both paths name the same file. Paths that cannot be resolved,
/// such as an output that does not exist yet, are compared as written.
fn same_file(input: &Path, output: &Path) -> bool {
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => input == output,
    }
}

fn without_velocities(frame: &Frame) -> Frame {
    let mut stripped = Frame::with_capacity(frame.size());
    stripped.positions_mut().copy_from_slice(frame.positions());
    stripped.set_cell(*frame.cell());
    stripped
}
