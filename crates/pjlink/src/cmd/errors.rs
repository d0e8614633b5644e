use pjlink_frame::ERST;

use crate::cmd::{with_projector, ConnectArgs};
use crate::exit::CliResult;
use crate::output::{print_json, print_raw, print_table, OutputFormat};

pub fn run(connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    with_projector(connect, "errors", |projector| {
        if format == OutputFormat::Raw {
            print_raw(&projector.get(ERST)?);
            return Ok(());
        }

        let report = projector.get_errors()?;
        if format == OutputFormat::Json {
            print_json(&report);
            return Ok(());
        }

        let mut rows: Vec<_> = report.iter().collect();
        rows.sort_by_key(|(name, _)| *name);
        if format == OutputFormat::Table {
            print_table(
                &["SUBSYSTEM", "STATUS"],
                rows.iter()
                    .map(|(name, level)| vec![name.to_string(), level.to_string()])
                    .collect(),
            );
        } else {
            for (name, level) in rows {
                println!("{name}: {level}");
            }
        }
        Ok(())
    })
}
