use std::io::{self, Write};

use anyhow::{Context, Result};

use amber_restart::io::Mode;
use amber_restart::io::ncrst::is_valid;
use amber_restart::netcdf::{DimensionSummary, NcFile, VariableSummary};

use crate::cli::InspectArgs;
use crate::display::{Context as DisplayContext, print_kv_table};

pub fn run_inspect(args: InspectArgs, _ctx: DisplayContext) -> Result<()> {
    let file = NcFile::open(&args.file, Mode::Read)
        .with_context(|| format!("Failed to open '{}'", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let dimensions = file.dimensions();
    let variables = file.variables();

    let convention = if is_valid(&file, None) {
        "AMBERRESTART 1.0"
    } else {
        "not an Amber restart"
    };
    let summary = vec![
        ("File".to_string(), args.file.display().to_string()),
        ("Format".to_string(), file.version().to_string()),
        ("Dimensions".to_string(), dimensions.len().to_string()),
        ("Variables".to_string(), variables.len().to_string()),
        ("Convention".to_string(), convention.to_string()),
    ];
    print_kv_table(&mut out, "Container", ("Property", "Value"), &summary);

    let rows: Vec<(String, String)> = dimensions
        .iter()
        .map(|dim| (dim.name.clone(), describe_dimension(dim)))
        .collect();
    print_kv_table(&mut out, "Dimensions", ("Name", "Size"), &rows);

    let rows: Vec<(String, String)> = variables
        .iter()
        .map(|var| (var.name.clone(), describe_variable(var)))
        .collect();
    print_kv_table(&mut out, "Variables", ("Name", "Type and shape"), &rows);

    let rows: Vec<(String, String)> = variables
        .iter()
        .flat_map(|var| {
            var.attributes
                .iter()
                .map(move |(name, value)| (format!("{}:{name}", var.name), value.to_string()))
        })
        .collect();
    if !rows.is_empty() {
        print_kv_table(&mut out, "Variable Attributes", ("Attribute", "Value"), &rows);
    }

    let rows: Vec<(String, String)> = file
        .global_attributes()
        .into_iter()
        .map(|(name, value)| (name, value.to_string()))
        .collect();
    print_kv_table(&mut out, "Global Attributes", ("Attribute", "Value"), &rows);

    out.flush()?;
    Ok(())
}

fn describe_dimension(dim: &DimensionSummary) -> String {
    if dim.unlimited {
        format!("unlimited ({} records)", dim.size)
    } else {
        dim.size.to_string()
    }
}

fn describe_variable(var: &VariableSummary) -> String {
    let shape: Vec<String> = var
        .dimensions
        .iter()
        .map(|dim| format!("{}={}", dim.name, dim.size))
        .collect();
    format!("{}[{}]", var.nc_type, shape.join(", "))
}
