use pjlink_frame::AVMT;

use crate::cmd::{with_projector, ConnectArgs, MuteArgs};
use crate::exit::CliResult;
use crate::output::{print_json, print_raw, print_table, OutputFormat};

fn describe(muted: bool) -> &'static str {
    if muted {
        "muted"
    } else {
        "unmuted"
    }
}

/// `mute` and `unmute` share this; without a target both just report.
pub fn run(
    args: MuteArgs,
    muted: bool,
    connect: &ConnectArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let context = if muted { "mute" } else { "unmute" };
    with_projector(connect, context, |projector| {
        if let Some(target) = args.target {
            return projector.set_mute(target, muted);
        }

        if format == OutputFormat::Raw {
            print_raw(&projector.get(AVMT)?);
            return Ok(());
        }

        let state = projector.get_mute()?;
        match format {
            OutputFormat::Json => print_json(&state),
            OutputFormat::Table => print_table(
                &["STREAM", "STATE"],
                vec![
                    vec!["video".to_string(), describe(state.video).to_string()],
                    vec!["audio".to_string(), describe(state.audio).to_string()],
                ],
            ),
            OutputFormat::Pretty | OutputFormat::Raw => {
                println!("video: {}", describe(state.video));
                println!("audio: {}", describe(state.audio));
            }
        }
        Ok(())
    })
}
