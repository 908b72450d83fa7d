// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module is the entrypoint of the logkeys command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use logkeys_model::config::Config;
use logkeys_model::env::{Env, OutputMode};
use logkeys_model::{reconcile, verify, Job, Preset, Profile, Summary, VerifyReport};
use std::path::{Path, PathBuf};
use time_humanize::{Accuracy, HumanTime, Tense};

#[derive(Parser)]
#[clap(version, about, long_about = None)]
#[clap(disable_help_subcommand = true)]
struct Cli {
    #[clap(long, help = "Analysis profiles configuration", value_name = "FILE")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

/// Command line overrides of the selected profile.
#[derive(Args)]
struct ProfileArgs {
    #[clap(long, help = "The keyword column, starting at 1", value_name = "N")]
    column: Option<usize>,

    #[clap(long, help = "The file layout, only CSV is supported", value_name = "TYPE")]
    file_type: Option<String>,

    #[clap(
        long,
        help = "Replace the profile rules with a preset: none, default or instrument",
        value_name = "NAME"
    )]
    preset: Option<String>,

    #[clap(
        long = "rule",
        help = "Append a rule, written as PATTERN=>REPLACEMENT",
        value_name = "RULE"
    )]
    rules: Vec<String>,

    #[clap(long, help = "Where to write the keywords found in both files", value_name = "FILE")]
    matched: Option<PathBuf>,

    #[clap(long, help = "Where to write the keywords found in one file", value_name = "FILE")]
    mismatch: Option<PathBuf>,
}

impl ProfileArgs {
    fn profile(self, config: &Config, file: &Path) -> Result<Profile> {
        let mut profile = config.get_profile(file)?.clone();
        if let Some(column) = self.column {
            profile.column = column;
        }
        if let Some(file_type) = self.file_type {
            profile.file_type = file_type.as_str().into();
        }
        if let Some(preset) = self.preset {
            profile.rules = preset.parse::<Preset>()?.rules();
        }
        for rule in self.rules {
            profile.rules.push(rule.parse()?);
        }
        if let Some(matched) = self.matched {
            profile.matched = matched;
        }
        if let Some(mismatch) = self.mismatch {
            profile.mismatch = mismatch;
        }
        tracing::debug!(
            file = %file.display(),
            file_type = %profile.file_type,
            column = profile.column,
            rules = profile.rules.len(),
            "Selected profile"
        );
        Ok(profile)
    }
}

#[derive(Subcommand)]
enum Commands {
    #[clap(about = "Compare the keywords of two log files")]
    Diff {
        file1: PathBuf,
        file2: PathBuf,
        #[clap(flatten)]
        args: ProfileArgs,
    },

    #[clap(about = "Check the matched output of a previous diff")]
    Verify {
        file1: PathBuf,
        file2: PathBuf,
        #[clap(flatten)]
        args: ProfileArgs,
    },

    // Debug normalizer
    #[clap(hide = true, about = "Normalize a single line")]
    DebugNormalizer {
        line: String,
        #[clap(long, help = "Select the profile of this file", value_name = "FILE")]
        file: Option<PathBuf>,
        #[clap(flatten)]
        args: ProfileArgs,
    },

    // Debug iterator
    #[clap(hide = true, about = "Iterate a single file")]
    DebugIterator { path: PathBuf },
}

impl Cli {
    fn run(self, env: &Env) -> Result<()> {
        let config = match self.config {
            Some(path) => Config::from_path(path.clone())
                .with_context(|| format!("Failed to load the configuration {:?}", path))?,
            None => Config::default(),
        };
        match self.command {
            Commands::Diff { file1, file2, args } => {
                let profile = args.profile(&config, &file1)?;
                let job = Job::new(file1, file2, profile);
                let summary = reconcile(env, &job).context("Keyword extraction failed")?;
                env.clear_progress();
                print_summary(&job, &summary);
                Ok(())
            }
            Commands::Verify { file1, file2, args } => {
                let profile = args.profile(&config, &file1)?;
                let job = Job::new(file1, file2, profile);
                let report = verify(env, &job).context("Keyword verification failed")?;
                env.clear_progress();
                print_report(&report);
                println!("{} is valid", job.profile.matched.display());
                Ok(())
            }

            // Debug handlers
            Commands::DebugNormalizer { line, file, args } => {
                let profile = args.profile(&config, file.as_deref().unwrap_or(Path::new("")))?;
                let keyword = logkeys_normalizer::normalize(
                    &line,
                    &profile.file_type,
                    profile.column,
                    &profile.rules,
                )?;
                for rule in &profile.rules {
                    println!("rule:     {}", rule);
                }
                println!("keyword:  {:?}", keyword.as_str());
                println!("identity: {:?}", keyword.identity());
                Ok(())
            }
            Commands::DebugIterator { path } => {
                let reader = logkeys_model::reader::from_path(&path)
                    .with_context(|| format!("Failed to open {:?}", path))?;
                for line in logkeys_iterator::BytesLines::new(reader) {
                    match line {
                        Ok((bytes, nr)) => match std::str::from_utf8(&bytes) {
                            Ok(txt) => println!("{} | {}", nr, txt.trim_end_matches(['\r', '\n'])),
                            Err(e) => println!("{} | error: {}", nr, e),
                        },
                        Err(e) => println!("{}", e),
                    }
                }
                Ok(())
            }
        }
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let logger = tracing_subscriber::Registry::default();

    let (_flush, debug) = match std::env::var_os("LOGKEYS_LOG") {
        None => {
            // Default INFO stdout logger
            logger
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .compact()
                        .with_filter(tracing_subscriber::filter::LevelFilter::INFO),
                )
                .init();
            (None, false)
        }
        Some(_level) => {
            // Tracing spans
            let logger = logger.with(
                tracing_tree::HierarchicalLayer::new(1)
                    .with_targets(true)
                    .with_bracketed_fields(true)
                    .with_filter(tracing_subscriber::filter::EnvFilter::from_env(
                        "LOGKEYS_LOG",
                    )),
            );
            let flush = if let Ok(fp) = std::env::var("LOGKEYS_TRACE") {
                let chrome = tracing_chrome::ChromeLayerBuilder::new()
                    .file(fp)
                    .include_args(true)
                    .build();
                logger.with(chrome.0).init();
                // Return the chrome flush guard so that it is not dropped until the end
                Some(chrome.1)
            } else {
                logger.init();
                None
            };
            (flush, true)
        }
    };
    let output_mode = if debug {
        OutputMode::Debug
    } else if atty::is(atty::Stream::Stdout) {
        OutputMode::FastTerminal
    } else {
        OutputMode::Quiet
    };
    let env = Env::new_with_output(output_mode);
    Cli::parse().run(&env).map_err(|e| {
        // Ensure the exception happens on a new line
        if output_mode.inlined() {
            println!();
        }
        e
    })
}

fn print_report(report: &VerifyReport) {
    println!(
        "keyword sets: file1 {}, file2 {}, common {}, exclusive {}, matched {}",
        report.file1, report.file2, report.common, report.exclusive, report.matched
    );
}

fn print_summary(job: &Job, summary: &Summary) {
    for (path, stats) in [(&job.file1, &summary.file1), (&job.file2, &summary.file2)] {
        println!(
            "{}: {} keywords from {} lines",
            path.display(),
            stats.keywords,
            stats.lines
        );
    }
    println!(
        "matched:  {} keywords in {}",
        summary.matched,
        job.profile.matched.display()
    );
    println!(
        "mismatch: {} keywords in {}",
        summary.mismatch,
        job.profile.mismatch.display()
    );
    print_report(&summary.verify);
    println!(
        "Keyword extraction succeeded in {}",
        HumanTime::from(summary.elapsed).to_text_en(Accuracy::Precise, Tense::Present)
    );
}
