use pjlink_frame::{INF1, INF2, INFO, NAME};

use crate::cmd::{with_projector, ConnectArgs};
use crate::exit::CliResult;
use crate::output::{print_json, print_raw, print_table, OutputFormat};

pub fn run(connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    with_projector(connect, "info", |projector| {
        if format == OutputFormat::Raw {
            for body in [NAME, INF1, INF2, INFO] {
                print_raw(&projector.get(body)?);
            }
            return Ok(());
        }

        let info = projector.get_info()?;
        let fields = [
            ("Name", &info.name),
            ("Manufacturer", &info.manufacturer),
            ("Product Name", &info.product_name),
            ("Other Info", &info.other_info),
        ];
        match format {
            OutputFormat::Json => print_json(&info),
            OutputFormat::Table => print_table(
                &["FIELD", "VALUE"],
                fields
                    .iter()
                    .map(|(label, value)| vec![label.to_string(), value.to_string()])
                    .collect(),
            ),
            OutputFormat::Pretty | OutputFormat::Raw => {
                for (label, value) in fields {
                    println!("{label}: {value}");
                }
            }
        }
        Ok(())
    })
}
