//! Build automation for workload-kube
//!
//! Usage: cargo xtask <command>
//!
//! Available commands:
//! - build: Build the project
//! - test: Run tests (unit, integration, or live-cluster)
//! - manifests: Render the manifests a create would apply
//! - dist: Create distribution packages
//! - ci: Run CI checks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BIN: &str = "workload-kube";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for workload-kube")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Suite {
    /// Unit and in-memory integration tests
    All,
    /// Only tests under tests/
    Integration,
    /// Ignored tests that need a reachable cluster (uses the current kubeconfig)
    Live,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long, value_enum, default_value = "all")]
        suite: Suite,
    },
    /// Print the Deployment/Service/Ingress a create would apply
    Manifests {
        name: String,
        image: String,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create distribution packages
    Dist {
        /// Target triple (e.g., x86_64-unknown-linux-gnu)
        #[arg(long)]
        target: Option<String>,
    },
    /// Run CI checks (format, clippy, test)
    Ci,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    sh.change_dir(project_root()?);

    match cli.command {
        Commands::Build { release } => build(&sh, release),
        Commands::Test { suite } => test(&sh, suite),
        Commands::Manifests { name, image, port } => manifests(&sh, &name, &image, port),
        Commands::Dist { target } => dist(&sh, target),
        Commands::Ci => ci(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    println!("🔨 Building {}...", BIN);

    if release {
        cmd!(sh, "cargo build --release").run()?;
        println!("✅ Release build completed: target/release/{}", BIN);
    } else {
        cmd!(sh, "cargo build").run()?;
        println!("✅ Debug build completed: target/debug/{}", BIN);
    }

    Ok(())
}

fn test(sh: &Shell, suite: Suite) -> Result<()> {
    println!("🧪 Running tests...");

    match suite {
        Suite::All => cmd!(sh, "cargo test --all").run()?,
        Suite::Integration => cmd!(sh, "cargo test --test '*'").run()?,
        Suite::Live => cmd!(sh, "cargo test --test live_cluster_test -- --ignored --test-threads=1")
            .run()?,
    }

    println!("✅ All tests passed");
    Ok(())
}

fn manifests(sh: &Shell, name: &str, image: &str, port: Option<u16>) -> Result<()> {
    let port_args: Vec<String> = port
        .map(|p| vec!["--port".to_string(), p.to_string()])
        .unwrap_or_default();

    cmd!(
        sh,
        "cargo run --quiet --bin {BIN} -- create {name} {image} {port_args...} --dry-run -o yaml"
    )
    .run()
    .context("Failed to render manifests")?;
    Ok(())
}

fn dist(sh: &Shell, target: Option<String>) -> Result<()> {
    println!("📦 Creating distribution package...");

    if let Some(ref target_triple) = target {
        cmd!(sh, "cargo build --release --target {target_triple}").run()?;
    } else {
        cmd!(sh, "cargo build --release").run()?;
    }

    let root = project_root()?;
    let dist_dir = root.join("dist");
    sh.create_dir(&dist_dir)?;

    let binary_src = match target {
        Some(ref target_triple) => root.join(format!("target/{}/release/{}", target_triple, BIN)),
        None => root.join(format!("target/release/{}", BIN)),
    };
    sh.copy_file(&binary_src, dist_dir.join(BIN))?;

    let version = env!("CARGO_PKG_VERSION");
    let archive_name = format!("{}-{}.tar.gz", BIN, version);

    cmd!(sh, "tar -czf {archive_name} -C dist {BIN}")
        .run()
        .context("Failed to create tarball")?;

    println!("✅ Distribution package created: {}", archive_name);
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    println!("🔍 Running CI checks...");

    println!("\n📝 Checking formatting...");
    cmd!(sh, "cargo fmt --all -- --check").run()?;

    println!("\n🔧 Running clippy...");
    cmd!(sh, "cargo clippy --all-targets --all-features -- -D warnings").run()?;

    println!("\n🧪 Running tests...");
    test(sh, Suite::All)?;

    println!("\n✅ All CI checks passed!");
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .map(Path::to_path_buf)
        .context("xtask must live one level below the workspace root")
}
