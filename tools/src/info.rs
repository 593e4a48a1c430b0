use anyhow::Context;
use std::fs::File;

mod error;

struct Args {
    image_filename: String,
    debug: bool,
}

impl Args {
    fn parse() -> Self {
        (meap::let_map! {
            let {
                image_filename = opt_req("PATH", 'i').name("image").desc("path to disk image");
                debug = flag('d').name("debug").desc("print debugging info");
            } in {
                Self {
                    image_filename,
                    debug,
                }
            }
        })
        .with_help_default()
        .parse_env_or_exit()
    }
}

fn read_image(image_filename: &str) -> anyhow::Result<mini_gpt::Gpt> {
    let mut image_file = File::open(image_filename)
        .with_context(|| format!("unable to open {}", image_filename))?;
    let gpt = mini_gpt::read_gpt(&mut image_file)
        .with_context(|| format!("unable to read GPT from {}", image_filename))?;
    Ok(gpt)
}

fn main() {
    let Args {
        image_filename,
        debug,
    } = Args::parse();
    env_logger::init();
    let gpt = error::or_die(read_image(&image_filename));
    if debug {
        println!("{:#?}", gpt);
        return;
    }
    println!("{}", gpt);
    if !gpt.mbr.is_valid() {
        log::warn!("{} has no valid MBR signature", image_filename);
    }
    match (gpt.header.is_valid(), gpt.backup_header.is_valid()) {
        (true, true) => (),
        (false, true) => log::warn!("primary header is corrupt, backup header is intact"),
        (true, false) => log::warn!("backup header is corrupt, primary header is intact"),
        (false, false) => log::warn!("both GPT headers are corrupt"),
    }
    println!("Used partitions: {}", gpt.used_entries().count());
}
