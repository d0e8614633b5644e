use pjlink_frame::POWR;
use serde::Serialize;

use crate::cmd::{with_projector, ConnectArgs, PowerArgs};
use crate::exit::CliResult;
use crate::output::{print_json, print_raw, print_table, OutputFormat};

#[derive(Serialize)]
struct PowerOutput {
    power: pjlink_session::PowerState,
}

pub fn run(args: PowerArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    with_projector(connect, "power", |projector| {
        if let Some(state) = args.state {
            return projector.set_power(state.into(), false);
        }

        if format == OutputFormat::Raw {
            print_raw(&projector.get(POWR)?);
            return Ok(());
        }

        let power = projector.get_power()?;
        match format {
            OutputFormat::Json => print_json(&PowerOutput { power }),
            OutputFormat::Table => print_table(&["POWER"], vec![vec![power.to_string()]]),
            OutputFormat::Pretty | OutputFormat::Raw => println!("{power}"),
        }
        Ok(())
    })
}
