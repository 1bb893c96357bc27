#![allow(dead_code)]

use chrono::Local;
use env_logger::fmt::Color;
use log::Level;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

use folio::{Builder, CompositeIndex, FixedStr, OrderedIndex};

pub type Tag = FixedStr<16>;

pub fn init_logger() {
    env_logger::builder()
        .format(|buf, record: &log::Record| {
            let mut style = buf.style();
            let color = match record.level() {
                Level::Error => Color::Red,
                Level::Warn => Color::Yellow,
                Level::Info => Color::Green,
                Level::Debug => Color::Cyan,
                Level::Trace => Color::White,
            };
            style.set_color(color);
            writeln!(
                buf,
                "[{} {} {:>30}:{:^4}] - {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S"),
                style.value(record.level()),
                record.module_path().unwrap_or(""),
                style.value(record.line().unwrap_or(0)),
                style.value(record.args())
            )
        })
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .unwrap_or(());
}

pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        init_logger();
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    pub fn single(&self, file_name: &str, node_size: u32) -> OrderedIndex<u64, u64> {
        Builder::new()
            .path(self.path(file_name))
            .node_size(node_size)
            .build()
            .unwrap()
    }

    pub fn composite(&self, file_name: &str, node_size: u32) -> CompositeIndex<u32, Tag, u64> {
        Builder::new()
            .path(self.path(file_name))
            .node_size(node_size)
            .build_composite()
            .unwrap()
    }
}

/// Logs its seed, `FOLIO_TEST_SEED` replays it.
pub fn rng() -> StdRng {
    init_logger();
    let seed = std::env::var("FOLIO_TEST_SEED")
        .ok()
        .and_then(|seed| seed.parse().ok())
        .unwrap_or_else(rand::random);
    log::info!("shuffle seed: {}", seed);
    StdRng::seed_from_u64(seed)
}

pub fn shuffled_keys(count: u64) -> Vec<u64> {
    let mut keys = (0..count).map(|i| i * 3).collect::<Vec<_>>();
    keys.shuffle(&mut rng());
    keys
}

pub fn tag(text: &str) -> Tag {
    Tag::new(text).unwrap()
}
