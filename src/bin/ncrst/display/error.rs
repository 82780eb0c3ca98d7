use std::io::{self, Write};

use amber_restart::io::Error as RestartError;
use amber_restart::netcdf::Error as NetcdfError;
use anyhow::Error;

use crate::util::text::wrap;

const WIDTH: usize = 59;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), WIDTH) {
        let _ = writeln!(stderr, "   ║  {:<WIDTH$} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), WIDTH - 2) {
            let _ = writeln!(stderr, "   ║    {:<w$} ║", line, w = WIDTH - 2);
        }
    }

    let hints = hints_for(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in &hints {
            for (i, line) in wrap(hint, WIDTH - 4).iter().enumerate() {
                let bullet = if i == 0 { "•" } else { " " };
                let _ = writeln!(stderr, "   ║    {} {:<w$} ║", bullet, line, w = WIDTH - 4);
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

fn hints_for(err: &Error) -> Vec<String> {
    let mut hints = Vec::new();

    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<RestartError>() {
            restart_hints(e, &mut hints);
            break;
        }
        if let Some(e) = cause.downcast_ref::<NetcdfError>() {
            netcdf_hints(e, &mut hints);
            break;
        }
        if let Some(e) = cause.downcast_ref::<io::Error>() {
            std_io_hints(e, &mut hints);
            break;
        }
    }
    hints
}

fn restart_hints(err: &RestartError, hints: &mut Vec<String>) {
    match err {
        RestartError::Io { source } => std_io_hints(source, hints),
        RestartError::InvalidFormat { .. } => {
            hints.push("The file does not follow the AMBERRESTART 1.0 convention".into());
            hints.push("Run `ncrst inspect <FILE>` to see its attributes and dimensions".into());
            hints.push("Rerun with -v to see which check failed".into());
        }
        RestartError::UnsupportedMode(mode) => {
            hints.push(format!("Restart files cannot be opened in {mode} mode"));
        }
        RestartError::UnsupportedCompression(compression) => {
            hints.push(format!("Decompress the file first ({compression} is not supported)"));
        }
        RestartError::SingleFrame(_) => {
            hints.push("A restart file holds exactly one frame".into());
            hints.push("Use a NetCDF trajectory (.nc) for several frames".into());
        }
        RestartError::Lookup(inner) | RestartError::Container(inner) => netcdf_hints(inner, hints),
    }
}

fn netcdf_hints(err: &NetcdfError, hints: &mut Vec<String>) {
    match err {
        NetcdfError::Io { source } => std_io_hints(source, hints),
        NetcdfError::Format(_) => {
            hints.push("Only NetCDF classic (CDF-1) and 64-bit offset (CDF-2) files are supported".into());
            hints.push("NetCDF-4 files can be converted with `nccopy -k classic`".into());
        }
        NetcdfError::MissingDimension(_)
        | NetcdfError::MissingVariable(_)
        | NetcdfError::MissingAttribute { .. } => {
            hints.push("The file lacks data that restart files must contain".into());
            hints.push("Run `ncrst inspect <FILE>` to list what it does contain".into());
        }
        NetcdfError::TypeMismatch { .. } | NetcdfError::AttributeType { .. } => {
            hints.push("The file stores a variable with an unexpected type".into());
        }
        _ => {}
    }
}

fn std_io_hints(err: &io::Error, hints: &mut Vec<String>) {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::NotFound => {
            hints.push("File or directory not found".into());
            hints.push("Check the path spelling and ensure the file exists".into());
        }
        ErrorKind::PermissionDenied => {
            hints.push("Permission denied accessing the file".into());
            hints.push("Check file permissions with `ls -la`".into());
        }
        ErrorKind::UnexpectedEof => {
            hints.push("The file ended before all data could be read".into());
            hints.push("It may have been truncated while being copied or written".into());
        }
        ErrorKind::WriteZero | ErrorKind::StorageFull => {
            hints.push("Failed to write data, check the available disk space".into());
        }
        _ => {}
    }
}
