use pjlink_frame::INPT;

use crate::cmd::{with_projector, ConnectArgs, InputArgs};
use crate::exit::CliResult;
use crate::output::{print_json, print_raw, print_table, OutputFormat};

pub fn run(args: InputArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    with_projector(connect, "input", |projector| {
        if let Some(source) = args.source {
            return projector.set_input(source, args.number);
        }

        if format == OutputFormat::Raw {
            print_raw(&projector.get(INPT)?);
            return Ok(());
        }

        let input = projector.get_input()?;
        match format {
            OutputFormat::Json => print_json(&input),
            OutputFormat::Table => print_table(
                &["SOURCE", "NUMBER"],
                vec![vec![input.source.to_string(), input.number.to_string()]],
            ),
            OutputFormat::Pretty | OutputFormat::Raw => println!("{input}"),
        }
        Ok(())
    })
}
