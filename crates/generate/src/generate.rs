// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! Logfile generator
//!
//! The main function is [gen_lines], it produces instrument logs with four columns:
//! a timestamp, a level, a component and a message. The message values vary between lines
//! while the message templates are shared:
//!
//! ```rust
//! # use logkeys_generate::{gen_lines};
//! let line = gen_lines().next().unwrap();
//! assert_eq!(line.split(',').count(), 4);
//! ```

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const SEED: u64 = 42;

const LEVELS: &[&str] = &["INFO", "INFO", "INFO", "WARN", "ERROR", "DEBUG"];
const COMPONENTS: &[&str] = &["XRImDet", "Network", "Power", "Scheduler"];

// `{}` are replaced with random numbers
const TEMPLATES: &[&str] = &[
    "Frame {} took {}.{} ms",
    "Temperature {}.{} C on panel {}",
    "Link up on port {}",
    "timeout:{} after {} retries",
    "Rail PA{}-{} voltage {}.{}e+01 V",
    "queue[{}]{} drained",
    "Heartbeat",
];

fn fixed_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn pick<'a>(rng: &mut impl Rng, xs: &[&'a str]) -> &'a str {
    xs[rng.random_range(0..xs.len())]
}

fn gen_message(rng: &mut impl Rng, templates: &[&str]) -> String {
    let template = pick(rng, templates);
    let mut result = String::with_capacity(template.len() + 16);
    let mut parts = template.split("{}");
    if let Some(first) = parts.next() {
        result.push_str(first);
    }
    for part in parts {
        result.push_str(&rng.random_range(0..10_000u32).to_string());
        result.push_str(part);
    }
    result
}

fn gen_line(rng: &mut impl Rng, templates: &[&str]) -> String {
    format!(
        "2023-06-{:02} {:02}:{:02}:{:02}.{:03},{},{},{}",
        rng.random_range(1..31),
        rng.random_range(0..24),
        rng.random_range(0..60),
        rng.random_range(0..60),
        rng.random_range(0..1000),
        pick(rng, LEVELS),
        pick(rng, COMPONENTS),
        gen_message(rng, templates)
    )
}

struct RandomLine {
    rng: ChaCha8Rng,
    templates: &'static [&'static str],
}

impl Iterator for RandomLine {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        Some(gen_line(&mut self.rng, self.templates))
    }
}

/// Generate lines using every message template.
pub fn gen_lines() -> impl Iterator<Item = String> {
    gen_lines_with(SEED, TEMPLATES.len())
}

/// Generate lines with a custom seed, using only the first `templates` message templates.
/// This is useful to produce two snapshots that do not share every template.
pub fn gen_lines_with(seed: u64, templates: usize) -> impl Iterator<Item = String> {
    RandomLine {
        rng: fixed_rng(seed),
        templates: &TEMPLATES[..templates.clamp(1, TEMPLATES.len())],
    }
}

/// The number of message templates.
pub fn templates_count() -> usize {
    TEMPLATES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_line() {
        let mut rng = fixed_rng(SEED);
        let line = gen_line(&mut rng, TEMPLATES);
        let columns = line.split(',').collect::<Vec<_>>();
        assert_eq!(columns.len(), 4);
        assert!(columns[0].starts_with("2023-06-"));
        assert!(LEVELS.contains(&columns[1]));
        assert!(COMPONENTS.contains(&columns[2]));
    }

    #[test]
    fn test_gen_lines() {
        let first = gen_lines().take(10).collect::<Vec<String>>();
        let second = gen_lines().take(10).collect::<Vec<String>>();
        assert_eq!(first, second);
        assert_ne!(first, gen_lines_with(43, 7).take(10).collect::<Vec<_>>());
    }

    #[test]
    fn test_gen_templates() {
        assert!(gen_lines_with(SEED, 1)
            .take(20)
            .all(|line| line.contains(",Frame ")));
        assert!(gen_lines_with(SEED, 0).next().is_some());
    }
}
