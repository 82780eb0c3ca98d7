mod inspect;
mod normalize;
mod show;

use inspect::run_inspect;
use normalize::run_normalize;
use show::run_show;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Inspect(args) => run_inspect(args, ctx),
        Command::Show(args) => run_show(args, ctx),
        Command::Normalize(args) => run_normalize(args, ctx),
    }
}
