//! SDK Regeneration
//!
//! Regenerates SDKs for several target languages from a single OpenAPI
//! document, decides whether each SDK deserves a new version, and records
//! every release in an append-only ledger.
//!
//! ## Features
//!
//! - **Version Reconciliation**: Three change signals (generator version, document
//!   version, document checksum) resolved into a single semver bump
//! - **Release Ledger**: `RELEASES.md`, human-readable and parsed back for release notes
//! - **Pluggable Ecosystems**: Release lines for Go, NPM, PyPI and Composer, extensible by table
//! - **Collaborators behind traits**: Generator binary, git repository, release API
//!
//! ## Layout
//!
//! ```text
//! {base}/
//! ├── openapi/            # downloaded remote documents
//! └── repo/               # SDK repository checkout
//!     ├── RELEASES.md     # release ledger
//!     ├── go/
//!     │   └── gen.yaml    # management metadata + SDK version
//!     └── typescript/
//!         └── gen.yaml
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod generator;
pub mod ledger;
pub mod metadata;
pub mod openapi;
pub mod outputs;
pub mod pipeline;
pub mod publish;
pub mod reconcile;
pub mod scm;
pub mod version;

pub use checksum::Checksum;
pub use config::{ActionConfig, TargetLanguage, Workspace};
pub use error::{RegenError, Result};
pub use generator::{Generator, SpeakeasyCli};
pub use ledger::{
    format_record, parse_last, Ecosystem, EcosystemTable, LanguageReleaseInfo, ReleaseLedger,
    ReleaseRecord,
};
pub use metadata::{GenConfig, ManagementMetadata};
pub use openapi::DocInfo;
pub use outputs::StepOutputs;
pub use pipeline::{Pipeline, RunSummary};
pub use publish::{GithubReleases, ReleasePublisher};
pub use reconcile::{decide, Recommendations, Signal, SignalSource};
pub use scm::{GitRepository, SourceControl};
pub use version::{parse_version, Bump};
