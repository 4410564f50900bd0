use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for snapback")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Everything CI runs: fmt, clippy, tests, docs
    Ci,
    /// Check formatting, or rewrite it with --fix
    Fmt {
        #[arg(long)]
        fix: bool,
    },
    /// Lint every target with warnings denied
    Clippy,
    /// Run unit tests and doc tests
    Test {
        /// Only test this package (snapback or snapback-common)
        #[arg(short, long)]
        package: Option<String>,
    },
    /// Build rustdoc with broken intra-doc links denied
    Doc,
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Task::Ci => {
            fmt(false)?;
            clippy()?;
            test(None)?;
            doc()?;
        }
        Task::Fmt { fix } => fmt(fix)?,
        Task::Clippy => clippy()?,
        Task::Test { package } => test(package.as_deref())?,
        Task::Doc => doc()?,
    }
    Ok(())
}

fn fmt(fix: bool) -> Result<()> {
    if fix {
        cargo(&["fmt", "--all"], &[])
    } else {
        cargo(&["fmt", "--all", "--", "--check"], &[])
    }
}

fn clippy() -> Result<()> {
    cargo(
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        &[],
    )
}

fn test(package: Option<&str>) -> Result<()> {
    match package {
        Some(package) => cargo(&["test", "--package", package], &[]),
        None => cargo(&["test", "--workspace"], &[]),
    }
}

fn doc() -> Result<()> {
    cargo(
        &["doc", "--workspace", "--no-deps"],
        &[("RUSTDOCFLAGS", "-D rustdoc::broken_intra_doc_links")],
    )
}

fn cargo(args: &[&str], env: &[(&str, &str)]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .envs(env.iter().copied())
        .status()
        .with_context(|| format!("failed to spawn cargo {}", args[0]))?;
    if !status.success() {
        bail!("cargo {} failed with {status}", args[0]);
    }
    Ok(())
}
