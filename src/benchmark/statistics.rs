use std::ops::Add;
use std::time::{Duration, Instant};

pub struct Statistics {
    name: &'static str,
    max_reports: usize,
    pile: Vec<Report>,
    started: Instant,
}

impl Statistics {
    pub fn new(name: &'static str, max_reports: usize) -> Self {
        Self {
            name,
            max_reports: max_reports.max(2),
            pile: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn add(&mut self, report: Report) {
        self.pile.push(report);
        if self.pile.len() >= self.max_reports {
            self.merge();
        }
    }

    fn merge(&mut self) {
        let new_pile: Vec<_> = self
            .pile
            .chunks(2)
            .map(|pair| pair.iter().fold(Report::default(), |ra, rb| ra + *rb))
            .collect();
        trace!(
            "merge: before {}, after {}",
            self.pile.len(),
            new_pile.len()
        );
        self.pile = new_pile;
    }

    pub fn display(&self) {
        let total = self
            .pile
            .iter()
            .fold(Report::default(), |ra, rb| ra + *rb);
        println!("\n - - - - - - - - {} - - - - - - - -", self.name);
        if total.ops == 0 {
            println!("no operations");
            return;
        }
        println!("operations:    {}", total.ops);
        println!("wall time:     {:?}", self.started.elapsed());
        println!("avg latency:   {:?}", total.latency / total.ops);
        println!("max latency:   {:?}", total.max);
        if let Some(slowest) = self.pile.iter().map(Report::avg).max() {
            println!("slowest batch: {:?} avg", slowest);
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct Report {
    ops: u32,
    latency: Duration,
    max: Duration,
}

impl Report {
    pub fn new(started: Instant) -> Self {
        let latency = started.elapsed();
        Self {
            ops: 1,
            latency,
            max: latency,
        }
    }

    fn avg(&self) -> Duration {
        self.latency / self.ops.max(1)
    }
}

impl Add for Report {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ops: self.ops + rhs.ops,
            latency: self.latency + rhs.latency,
            max: self.max.max(rhs.max),
        }
    }
}
