use clap::Parser;
use sql_dump::dump::dump_config::DumpConfig;
use sql_dump::dump::result_error::error::Error;
use sql_dump::dump::result_error::WithMsg;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::exit;
use tracing::{error, info};
use validator::Validate;

/// Dump a SQLite database as SQL statements
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of config file
    #[arg(short, long)]
    config: PathBuf,
    /// Write the dump to stdout instead of a new file in out_dir
    #[arg(long)]
    stdout: bool,
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let res = File::open(&args.config)
        .map_err(Error::from)
        .and_then(|f| {
            serde_yml::from_reader::<_, DumpConfig>(f)
                .map_err(Error::from)
                .with_msg(format!("Parse YAML config failed: {:?}", &args.config))
        })
        .and_then(|dc| {
            dc.validate()
                .map_err(Error::from)
                .map(|_| dc)
                .with_msg(format!("Config validation failed: {:?}", &args.config))
        })
        .and_then(|dc| {
            if args.stdout {
                dc.run_to(BufWriter::new(std::io::stdout()))
            } else {
                dc.run().map(|path| info!("Dump finished: {:?}", path))
            }
        });

    if let Err(e) = res {
        error!("{e}");
        exit(1);
    }
}
