use pjlink_frame::INST;

use crate::cmd::{with_projector, ConnectArgs};
use crate::exit::CliResult;
use crate::output::{print_json, print_raw, print_table, OutputFormat};

pub fn run(connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    with_projector(connect, "inputs", |projector| {
        if format == OutputFormat::Raw {
            print_raw(&projector.get(INST)?);
            return Ok(());
        }

        let inputs = projector.get_inputs()?;
        match format {
            OutputFormat::Json => print_json(&inputs),
            OutputFormat::Table => print_table(
                &["SOURCE", "NUMBER"],
                inputs
                    .iter()
                    .map(|input| vec![input.source.to_string(), input.number.to_string()])
                    .collect(),
            ),
            OutputFormat::Pretty | OutputFormat::Raw => {
                for input in &inputs {
                    println!("{}-{}", input.source, input.number);
                }
            }
        }
        Ok(())
    })
}
