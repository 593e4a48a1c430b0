use anyhow::Context;
use readable::ReadableGpt;
use std::fs::File;
use std::io::{self, Write};
use std::process;

mod readable;

const EXIT_OK: i32 = 0;
const EXIT_ARG_ERROR: i32 = 1;
const EXIT_CMD_ERROR: i32 = 2;

struct Args {
    image_filenames: Vec<String>,
    show_version: bool,
}

impl Args {
    fn parse() -> Self {
        (meap::let_map! {
            let {
                image_filenames = pos_multi("PATH").desc("paths to disk images or devices");
                show_version = flag('V').name("version").desc("print version and exit");
            } in {
                Self {
                    image_filenames,
                    show_version,
                }
            }
        })
        .with_help_default()
        .parse_env_or_exit()
    }
}

fn read_image(image_filename: &str) -> anyhow::Result<ReadableGpt> {
    let mut image_file = File::open(image_filename)
        .with_context(|| format!("unable to open {}", image_filename))?;
    let gpt = mini_gpt::read_gpt(&mut image_file)
        .with_context(|| format!("unable to read GPT from {}", image_filename))?;
    log::info!(
        "{}: {} of {} primary entries in use",
        image_filename,
        gpt.used_entries().count(),
        gpt.entries.len()
    );
    Ok(ReadableGpt::from(&gpt))
}

fn write_json<W: Write>(mut output: W, gpts: &[ReadableGpt]) -> anyhow::Result<()> {
    serde_json::to_writer(&mut output, gpts).context("unable to encode JSON")?;
    writeln!(output)?;
    Ok(())
}

/// Returns the process exit status.
fn run<O: Write, E: Write>(args: Args, mut output: O, mut error_output: E) -> i32 {
    let Args {
        image_filenames,
        show_version,
    } = args;
    if show_version {
        return match writeln!(output, "Ver: {}", env!("CARGO_PKG_VERSION")) {
            Ok(()) => EXIT_OK,
            Err(_) => EXIT_CMD_ERROR,
        };
    }
    if image_filenames.is_empty() {
        let _ = writeln!(error_output, "no input");
        return EXIT_ARG_ERROR;
    }
    // images that cannot be read are reported and left out of the output
    let gpts = image_filenames
        .iter()
        .filter_map(|image_filename| match read_image(image_filename) {
            Ok(gpt) => Some(gpt),
            Err(e) => {
                let _ = writeln!(error_output, "{:#}", e);
                None
            }
        })
        .collect::<Vec<_>>();
    match write_json(output, &gpts) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            let _ = writeln!(error_output, "{:#}", e);
            EXIT_CMD_ERROR
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::init();
    let status = run(args, io::stdout().lock(), io::stderr().lock());
    process::exit(status);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn args(image_filenames: &[&str], show_version: bool) -> Args {
        Args {
            image_filenames: image_filenames.iter().map(|s| s.to_string()).collect(),
            show_version,
        }
    }

    fn run_captured(args: Args) -> (i32, String, String) {
        let mut output = Vec::new();
        let mut error_output = Vec::new();
        let status = run(args, &mut output, &mut error_output);
        (
            status,
            String::from_utf8(output).unwrap(),
            String::from_utf8(error_output).unwrap(),
        )
    }

    #[test]
    fn no_input_is_an_argument_error() {
        let (status, output, error_output) = run_captured(args(&[], false));
        assert_eq!(status, EXIT_ARG_ERROR);
        assert_eq!(output, "");
        assert_eq!(error_output, "no input\n");
    }

    #[test]
    fn show_version() {
        let (status, output, _) = run_captured(args(&[], true));
        assert_eq!(status, EXIT_OK);
        assert!(output.starts_with("Ver: "));
    }

    #[test]
    fn unreadable_image_is_skipped() {
        let (status, output, error_output) = run_captured(args(&["/nonexistent/disk.img"], false));
        assert_eq!(status, EXIT_OK);
        assert_eq!(output, "[]\n");
        assert!(error_output.contains("/nonexistent/disk.img"));
    }

    #[test]
    fn output_failure_is_a_command_error() {
        let mut error_output = Vec::new();
        let status = run(
            args(&["/nonexistent/disk.img"], false),
            BrokenPipe,
            &mut error_output,
        );
        assert_eq!(status, EXIT_CMD_ERROR);
        assert!(String::from_utf8(error_output)
            .unwrap()
            .contains("unable to encode JSON"));
    }

    #[test]
    fn empty_input_is_an_empty_array() {
        let mut output = Vec::new();
        write_json(&mut output, &[]).unwrap();
        assert_eq!(output, b"[]\n");
    }
}
