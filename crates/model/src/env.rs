// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module provides a global environment.

use std::cell::Cell;

pub struct Env {
    pub output: OutputMode,
    // A progress line is printed without a new line
    progress: Cell<bool>,
}

impl Env {
    pub fn new() -> Env {
        Env::new_with_output(OutputMode::Debug)
    }

    pub fn new_with_output(output: OutputMode) -> Env {
        Env {
            output,
            progress: Cell::new(false),
        }
    }

    /// Helper function to debug
    pub fn debug_or_progress(&self, msg: &str) {
        match self.output {
            OutputMode::FastTerminal => {
                print!("\r\x1b[K\x1b[1;33m[+]\x1b[0m {}", msg);
                self.progress.set(true)
            }
            OutputMode::Debug => tracing::debug!("{}", msg),
            OutputMode::Quiet => {}
        }
    }

    /// Erase the current progress line, this must be called before logging.
    pub fn clear_progress(&self) {
        if self.progress.replace(false) {
            print!("\r\x1b[K");
        }
    }

    /// Returns true when the last progress line has not been erased.
    pub fn has_progress(&self) -> bool {
        self.progress.get()
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum OutputMode {
    // Print every steps
    Debug,
    // Print progress using \r
    FastTerminal,
    // Do not print progress, only errors
    Quiet,
}

impl OutputMode {
    pub fn inlined(&self) -> bool {
        matches!(self, OutputMode::FastTerminal)
    }
}

#[test]
fn test_progress() {
    let env = Env::new_with_output(OutputMode::FastTerminal);
    assert!(!env.has_progress());
    env.debug_or_progress("Reading a.log");
    assert!(env.has_progress());
    env.clear_progress();
    assert!(!env.has_progress());

    let env = Env::new_with_output(OutputMode::Quiet);
    env.debug_or_progress("Reading a.log");
    assert!(!env.has_progress());
}
