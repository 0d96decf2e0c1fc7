//! Binary entrypoint for `a11yguard`.
//!
//! Computes certificate digests for authoring the trusted identity, validates
//! identity files, and evaluates recorded device snapshots against the policy.
use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use a11y_trust::{CertificateDigest, Decision, Evaluator, TrustedIdentity, Verdict};
use clap::{Parser, Subcommand};
use logging::{LogArgs, audit::AuditLog, env_filter_from_spec};
use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*};

/// CLI error types.
mod error;
/// Snapshot-backed registry and file-backed certificate store.
mod snapshot;

use crate::{
    error::{Error, Result},
    snapshot::{FileCertificateStore, Snapshot},
};

/// Exit status for a blocked evaluation.
const EXIT_BLOCK: u8 = 2;

/// Number of decisions the audit trail retains.
const AUDIT_CAPACITY: usize = 256;

#[derive(Parser, Debug)]
#[command(
    name = "a11yguard",
    about = "Accessibility trust policy tooling",
    version
)]
/// Command-line interface for the `a11yguard` binary.
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,

    /// Logging controls
    #[command(flatten)]
    log: LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Print the lowercase SHA-256 digest of a signing certificate file.
    Digest {
        /// Raw certificate bytes (DER).
        path: PathBuf,
    },
    /// Validate and print the effective trusted identity.
    Identity {
        /// Identity file (defaults to the compiled-in TalkBack identity)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Evaluate a recorded device snapshot. Exits 0 on allow, 2 on block.
    Check {
        /// Snapshot file
        #[arg(long, value_name = "PATH")]
        snapshot: PathBuf,

        /// Identity file (defaults to the compiled-in TalkBack identity)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Print the decision audit trail
        #[arg(long)]
        audit: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let audit = AuditLog::new(AUDIT_CAPACITY);

    subscriber(&cli.log.spec(), &audit).try_init().ok();

    match run(&cli.command, &audit) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.pretty());
            ExitCode::FAILURE
        }
    }
}

/// Subscriber writing `spec`-filtered logs to stderr and every decision to `audit`.
///
/// The filter applies to the stderr layer only; the audit trail records each
/// decision whatever the log level.
fn subscriber(spec: &str, audit: &AuditLog) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .without_time()
                .with_writer(io::stderr)
                .with_filter(env_filter_from_spec(spec)),
        )
        .with(audit.layer())
}

/// Execute one command.
fn run(command: &Command, audit: &AuditLog) -> Result<ExitCode> {
    match command {
        Command::Digest { path } => {
            println!("{}", digest_file(path)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Identity { config } => {
            println!("{}", load_identity(config.as_deref())?.to_ron());
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            snapshot,
            config,
            audit: show_audit,
        } => {
            let verdict = check(snapshot, config.as_deref())?;
            println!("{}: {}", verdict.decision, verdict.reason);
            if *show_audit {
                for entry in audit.snapshot() {
                    println!("{}", entry.line);
                }
            }
            Ok(ExitCode::from(exit_status(verdict.decision)))
        }
    }
}

/// Digest of the certificate file at `path`.
fn digest_file(path: &Path) -> Result<CertificateDigest> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(CertificateDigest::of(&bytes))
}

/// The identity from `config`, or the compiled-in default.
fn load_identity(config: Option<&Path>) -> Result<TrustedIdentity> {
    Ok(match config {
        Some(p) => TrustedIdentity::load_from_path(p)?,
        None => TrustedIdentity::talkback(),
    })
}

/// Evaluate the snapshot at `snapshot` under the identity from `config`.
fn check(snapshot: &Path, config: Option<&Path>) -> Result<Verdict> {
    let identity = load_identity(config)?;
    let registry = Snapshot::load(snapshot)?;
    let evaluator = Evaluator::new(
        identity,
        Some(Arc::new(registry)),
        Arc::new(FileCertificateStore),
    );
    Ok(evaluator.verdict())
}

/// Process exit status for a decision.
fn exit_status(decision: Decision) -> u8 {
    match decision {
        Decision::Allow => 0,
        Decision::Block => EXIT_BLOCK,
    }
}

#[cfg(test)]
mod tests {
    use a11y_trust::Reason;
    use clap::CommandFactory;

    use super::*;

    /// Write a snapshot with one service whose certificate holds `cert`.
    fn write_single(dir: &Path, identifier: &str, cert: &[u8]) -> PathBuf {
        fs::write(dir.join("svc.der"), cert).unwrap();
        let snap = dir.join("snap.ron");
        fs::write(
            &snap,
            format!(
                "(services: Some([(identifier: \"{identifier}\", certificate: Some(\"svc.der\"))]))"
            ),
        )
        .unwrap();
        snap
    }

    /// Write an identity trusting `identifier` with the digest of `cert`.
    fn write_identity(dir: &Path, identifier: &str, cert: &[u8]) -> PathBuf {
        let id = TrustedIdentity::new(identifier, CertificateDigest::of(cert).to_hex()).unwrap();
        let path = dir.join("identity.ron");
        fs::write(&path, id.to_ron()).unwrap();
        path
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_verified_snapshot_allows() {
        let dir = tempfile::tempdir().unwrap();
        let snap = write_single(dir.path(), "com.trusted.assist", b"cert");
        let id = write_identity(dir.path(), "com.trusted.assist", b"cert");
        let v = check(&snap, Some(id.as_path())).unwrap();
        assert_eq!(v.reason, Reason::Verified);
    }

    #[test]
    fn check_default_identity_blocks_foreign_service() {
        let dir = tempfile::tempdir().unwrap();
        let snap = write_single(dir.path(), "com.evil.spy", b"cert");
        let v = check(&snap, None).unwrap();
        assert_eq!(
            v.reason,
            Reason::IdentityMismatch {
                found: "com.evil.spy".into()
            }
        );
        assert_eq!(exit_status(v.decision), EXIT_BLOCK);
    }

    #[test]
    fn check_unreadable_registry_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let snap = dir.path().join("snap.ron");
        fs::write(&snap, "(services: None)").unwrap();
        assert_eq!(
            check(&snap, None).unwrap().reason,
            Reason::RegistryUnavailable
        );
    }

    #[test]
    fn audit_records_allow_under_default_level() {
        let dir = tempfile::tempdir().unwrap();
        let snap = dir.path().join("snap.ron");
        fs::write(&snap, "(services: Some([]))").unwrap();
        let audit = AuditLog::new(AUDIT_CAPACITY);
        let spec = logging::compute_spec(false, false, None, None);

        let v = tracing::subscriber::with_default(subscriber(&spec, &audit), || {
            check(&snap, None).unwrap()
        });

        assert_eq!(v.decision, Decision::Allow);
        let entries = audit.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].reason, "no_active_service");
    }

    #[test]
    fn audit_records_verified_allow_under_default_level() {
        let dir = tempfile::tempdir().unwrap();
        let snap = write_single(dir.path(), "com.trusted.assist", b"cert");
        let id = write_identity(dir.path(), "com.trusted.assist", b"cert");
        let audit = AuditLog::new(AUDIT_CAPACITY);
        let spec = logging::compute_spec(false, false, None, None);

        tracing::subscriber::with_default(subscriber(&spec, &audit), || {
            check(&snap, Some(id.as_path())).unwrap()
        });

        let reasons: Vec<_> = audit.snapshot().into_iter().map(|e| e.reason).collect();
        assert_eq!(reasons, vec!["verified".to_string()]);
    }

    #[test]
    fn check_missing_snapshot_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            check(&dir.path().join("nope.ron"), None),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn digest_file_matches_library() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("c.der");
        fs::write(&p, b"abc").unwrap();
        assert_eq!(
            digest_file(&p).unwrap().to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
