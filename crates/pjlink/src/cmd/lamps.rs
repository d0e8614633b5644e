use pjlink_frame::LAMP;
use pjlink_session::Lamp;

use crate::cmd::{with_projector, ConnectArgs};
use crate::exit::CliResult;
use crate::output::{print_json, print_raw, print_table, OutputFormat};

fn state(lamp: &Lamp) -> &'static str {
    if lamp.on {
        "on"
    } else {
        "off"
    }
}

pub fn run(connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    with_projector(connect, "lamps", |projector| {
        if format == OutputFormat::Raw {
            print_raw(&projector.get(LAMP)?);
            return Ok(());
        }

        let lamps = projector.get_lamps()?;
        match format {
            OutputFormat::Json => print_json(&lamps),
            OutputFormat::Table => print_table(
                &["LAMP", "STATE", "HOURS"],
                lamps
                    .iter()
                    .enumerate()
                    .map(|(i, lamp)| {
                        vec![
                            (i + 1).to_string(),
                            state(lamp).to_string(),
                            lamp.hours.to_string(),
                        ]
                    })
                    .collect(),
            ),
            OutputFormat::Pretty | OutputFormat::Raw => {
                for (i, lamp) in lamps.iter().enumerate() {
                    println!("Lamp {}: {} ({} hours)", i + 1, state(lamp), lamp.hours);
                }
            }
        }
        Ok(())
    })
}
