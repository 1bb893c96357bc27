use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

pub struct Generator {
    keys: Vec<u64>,
    next: usize,
}

impl Generator {
    pub fn new(count: u64, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        // odd keys leave gaps so lookups probe between neighbours too
        let mut keys = (0..count).map(|i| i * 2 + 1).collect::<Vec<_>>();
        keys.shuffle(&mut rng);
        Self { keys, next: 0 }
    }

    pub fn next(&mut self) -> Option<(u64, u64)> {
        let key = *self.keys.get(self.next)?;
        self.next += 1;
        Some((key, key.rotate_left(17)))
    }

    pub fn keys(&self) -> &[u64] {
        &self.keys
    }
}
