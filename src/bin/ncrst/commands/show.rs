use std::io::{self, Write};

use anyhow::{Context, Result};

use amber_restart::io::{AmberRestart, Format, Mode};
use amber_restart::{CellShape, Frame, UnitCell};

use crate::cli::ShowArgs;
use crate::display::{Context as DisplayContext, print_kv_table, print_vector_table};

pub fn run_show(args: ShowArgs, _ctx: DisplayContext) -> Result<()> {
    let mut restart = AmberRestart::open(&args.file, Mode::Read)
        .with_context(|| format!("Failed to open restart '{}'", args.file.display()))?;

    let mut frame = Frame::new();
    restart
        .read(&mut frame)
        .with_context(|| format!("Failed to read the frame of '{}'", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    print_kv_table(&mut out, "Frame Summary", ("Metric", "Value"), &summary_rows(&frame));
    print_vector_table(&mut out, "Positions (Å)", frame.positions(), args.atoms);
    if let Some(velocities) = frame.velocities() {
        print_vector_table(&mut out, "Velocities (Å/ps)", velocities, args.atoms);
    }

    out.flush()?;
    Ok(())
}

fn summary_rows(frame: &Frame) -> Vec<(String, String)> {
    let cell = frame.cell();
    let mut rows = vec![
        ("Atoms".to_string(), frame.size().to_string()),
        (
            "Velocities".to_string(),
            if frame.has_velocities() { "yes" } else { "no" }.to_string(),
        ),
        ("Cell".to_string(), shape_name(cell).to_string()),
    ];

    if cell.shape() != CellShape::Infinite {
        rows.push((
            "Lengths (Å)".to_string(),
            format!("{:.4} × {:.4} × {:.4}", cell.a(), cell.b(), cell.c()),
        ));
        rows.push((
            "Angles (α β γ)".to_string(),
            format!("{:.2}° {:.2}° {:.2}°", cell.alpha(), cell.beta(), cell.gamma()),
        ));
        rows.push(("Volume (Å³)".to_string(), format!("{:.3}", cell.volume())));
    }
    rows
}

fn shape_name(cell: &UnitCell) -> &'static str {
    match cell.shape() {
        CellShape::Infinite => "infinite",
        CellShape::Orthorhombic => "orthorhombic",
        CellShape::Triclinic => "triclinic",
    }
}
