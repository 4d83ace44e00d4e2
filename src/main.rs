//! Mendyard CLI binary entry point.
//! Loads violations and configuration, delegates to the library, prints results.

mod cli;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use log::Level;
use mendyard::adapters::{
    FileLockManager, Flake8TextSource, JsonViolationSource, JsonlOutcomeSink, SourceOutput,
    ViolationSource,
};
use mendyard::api::errors::ApiError;
use mendyard::logging::{FactsEmitter, JsonlFileSink, JsonlSink, StderrAudit};
use mendyard::policy::{file::discover, MendyardConfig, Policy};
use mendyard::types::errors::Result;
use mendyard::types::Priority;
use mendyard::{Mendyard, RunOptions};

use cli::{Cli, Commands, InputArgs, InputFormat, OutputMode};

const EXIT_INPUT: i32 = 2;

fn error(msg: impl std::fmt::Display) {
    eprintln!("[error] {msg}");
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| {
        mendyard::types::errors::Error::new(mendyard::types::errors::ErrorKind::Io, e.to_string())
    })?;
    Ok(match root {
        Some(r) if r.is_absolute() => r,
        Some(r) => cwd.join(r),
        None => cwd,
    })
}

/// Defaults overlaid with `--config` or `<root>/mendyard.toml` when present.
fn load_policy(root: &Path, config: Option<&Path>) -> Result<Policy> {
    let mut policy = Policy::default();
    let path = config.map(Path::to_path_buf).or_else(|| discover(root));
    if let Some(p) = path {
        policy.merge_config(&MendyardConfig::load(&p)?);
    }
    Ok(policy)
}

fn load_violations(input: &InputArgs, root: &Path) -> Result<SourceOutput> {
    match input.format {
        InputFormat::Flake8 => Flake8TextSource::from_path(root, &input.violations)?.load(),
        InputFormat::Json => JsonViolationSource::from_path(root, &input.violations)?.load(),
    }
}

fn audit_for(mode: OutputMode) -> StderrAudit {
    StderrAudit {
        min_level: Some(match mode {
            OutputMode::Human => Level::Info,
            OutputMode::Json => Level::Warn,
        }),
    }
}

fn exit_for(e: &ApiError) -> i32 {
    match e {
        ApiError::PolicyViolation(_) | ApiError::Source(_) => EXIT_INPUT,
        other => other.exit_code(),
    }
}

struct RunArgs {
    input: InputArgs,
    max_batches: Option<usize>,
    priority: Option<Priority>,
    workers: Option<usize>,
    outcomes: Option<PathBuf>,
}

fn cmd_run<E: FactsEmitter>(facts: E, args: RunArgs) -> i32 {
    let root = match resolve_root(args.input.root.clone()) {
        Ok(r) => r,
        Err(e) => {
            error(e);
            return EXIT_INPUT;
        }
    };
    let mut policy = match load_policy(&root, args.input.config.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            error(e);
            return EXIT_INPUT;
        }
    };
    if let Some(w) = args.workers {
        policy.pool.workers = w;
    }
    if let Err(e) = policy.validate() {
        error(e);
        return EXIT_INPUT;
    }
    let loaded = match load_violations(&args.input, &root) {
        Ok(l) => l,
        Err(e) => {
            error(e);
            return EXIT_INPUT;
        }
    };

    let lock = FileLockManager::in_dir(&policy.backup_root(&root));
    let mut api = Mendyard::new(facts, audit_for(args.input.output), policy, root)
        .with_lock_manager(Box::new(lock));
    if let Some(p) = &args.outcomes {
        match JsonlOutcomeSink::create(p) {
            Ok(sink) => api = api.with_outcome_sink(Box::new(sink)),
            Err(e) => {
                error(format!("{}: {e}", p.display()));
                return EXIT_INPUT;
            }
        }
    }

    let batches = api.plan(loaded.violations);
    let opts = RunOptions {
        max_batches: args.max_batches,
        priority_filter: args.priority,
        run_id: None,
    };
    match api.run(batches, opts) {
        Ok(report) => {
            output::print_run(&report, &loaded.issues, args.input.output);
            i32::from(!report.is_success())
        }
        Err(ApiError::RestoreFailed { message, report }) => {
            output::print_run(&report, &loaded.issues, args.input.output);
            error(format!("restore failed, workspace may be inconsistent: {message}"));
            error(format!("recover with: mendyard rollback --run {}", report.run_id));
            mendyard::api::errors::exit_code_for(mendyard::api::errors::ErrorId::E_RESTORE_FAILED)
        }
        Err(e) => {
            error(&e);
            exit_for(&e)
        }
    }
}

fn cmd_plan(input: InputArgs) -> i32 {
    let prepared = resolve_root(input.root.clone()).and_then(|root| {
        let policy = load_policy(&root, input.config.as_deref())?;
        let loaded = load_violations(&input, &root)?;
        Ok((root, policy, loaded))
    });
    let (root, policy, loaded) = match prepared {
        Ok(p) => p,
        Err(e) => {
            error(e);
            return EXIT_INPUT;
        }
    };
    let api = Mendyard::new(JsonlSink, audit_for(input.output), policy, root);
    let batches = api.plan(loaded.violations);
    output::print_plan(&batches, &loaded.issues, input.output);
    0
}

fn cmd_rollback(run_id: &str, root: Option<PathBuf>, config: Option<&Path>, mode: OutputMode) -> i32 {
    let prepared = resolve_root(root).and_then(|root| {
        let policy = load_policy(&root, config)?;
        Ok((root, policy))
    });
    let (root, policy) = match prepared {
        Ok(p) => p,
        Err(e) => {
            error(e);
            return EXIT_INPUT;
        }
    };
    let lock = FileLockManager::in_dir(&policy.backup_root(&root));
    let api = Mendyard::new(JsonlSink, audit_for(mode), policy, root).with_lock_manager(Box::new(lock));
    match api.rollback_run(run_id) {
        Ok(report) => {
            output::print_rollback(&report, mode);
            if report.errors.is_empty() {
                0
            } else {
                mendyard::api::errors::exit_code_for(mendyard::api::errors::ErrorId::E_RESTORE_FAILED)
            }
        }
        Err(e) => {
            error(&e);
            exit_for(&e)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.cmd {
        Commands::Run {
            input,
            max_batches,
            priority,
            workers,
            outcomes,
            facts,
        } => {
            let args = RunArgs {
                input,
                max_batches,
                priority,
                workers,
                outcomes,
            };
            match facts {
                Some(path) => match JsonlFileSink::create(&path) {
                    Ok(sink) => cmd_run(sink, args),
                    Err(e) => {
                        error(format!("{}: {e}", path.display()));
                        EXIT_INPUT
                    }
                },
                None => cmd_run(JsonlSink, args),
            }
        }
        Commands::Plan { input } => cmd_plan(input),
        Commands::Rollback {
            run_id,
            root,
            config,
            output,
        } => cmd_rollback(&run_id, root, config.as_deref(), output),
    };
    std::process::exit(code);
}
