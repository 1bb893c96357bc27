#[macro_use]
extern crate log;

use clap::{value_parser, Arg, ArgMatches, Command};
use log::LevelFilter;
use std::path::PathBuf;

mod generator;
mod statistics;
mod writer;

use generator::Generator;
use statistics::Statistics;
use writer::Writer;

fn main() {
    println!("{:_^41}", "FOLIO_BENCHMARK");
    println!("{}", folio::build_info::build_info());
    env_logger::Builder::new()
        .filter_module("folio_benchmark", LevelFilter::Debug)
        .filter_module("folio", LevelFilter::Warn)
        .init();
    if let Err(e) = start_app() {
        error!("benchmark failed: {:#}", e);
        std::process::exit(1);
    }
}

fn start_app() -> folio::Result<()> {
    info!("Prepare app matches");
    let matches = prepare_matches();
    let count = arg::<u64>(&matches, "count");
    let erase_percent = arg::<u64>(&matches, "erase").min(100);
    let max_reports = arg::<usize>(&matches, "max_reports");

    info!("Create new generator");
    let mut generator = Generator::new(count, matches.get_one::<u64>("seed").copied());

    info!("Create new writer");
    let dir = matches
        .get_one::<PathBuf>("dst_dir")
        .cloned()
        .unwrap_or_else(std::env::temp_dir);
    let mut writer = Writer::new(&dir, arg::<u32>(&matches, "node_size"))?;

    info!("Start insert cycle");
    let mut statistics = Statistics::new("insert", max_reports);
    while let Some((key, value)) = generator.next() {
        statistics.add(writer.insert(key, value)?);
    }
    statistics.display();

    info!("Start lookup cycle");
    let mut statistics = Statistics::new("lookup", max_reports);
    for &key in generator.keys() {
        statistics.add(writer.get(key)?);
    }
    statistics.display();

    info!("Start erase cycle");
    let mut statistics = Statistics::new("erase", max_reports);
    let to_erase = generator.keys().len() as u64 * erase_percent / 100;
    for &key in generator.keys().iter().take(to_erase as usize) {
        statistics.add(writer.erase(key)?);
    }
    statistics.display();

    writer.close()
}

fn arg<T>(matches: &ArgMatches, id: &str) -> T
where
    T: Clone + Default + Send + Sync + 'static,
{
    matches.get_one::<T>(id).cloned().unwrap_or_default()
}

fn prepare_matches() -> ArgMatches {
    Command::new("folio-benchmark")
        .arg(
            Arg::new("count")
                .short('n')
                .takes_value(true)
                .value_parser(value_parser!(u64))
                .default_value("100000")
                .help("number of distinct keys"),
        )
        .arg(
            Arg::new("node_size")
                .short('s')
                .takes_value(true)
                .value_parser(value_parser!(u32))
                .default_value("316"),
        )
        .arg(
            Arg::new("erase")
                .short('e')
                .takes_value(true)
                .value_parser(value_parser!(u64))
                .default_value("50")
                .help("percent of keys erased after lookups"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .takes_value(true)
                .value_parser(value_parser!(u64))
                .help("shuffle seed, random by default"),
        )
        .arg(
            Arg::new("max_reports")
                .short('r')
                .takes_value(true)
                .value_parser(value_parser!(usize))
                .default_value("100"),
        )
        .arg(
            Arg::new("dst_dir")
                .long("dir")
                .takes_value(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches()
}
