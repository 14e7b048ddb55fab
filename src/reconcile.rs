//! Version reconciliation
//!
//! Decides whether an SDK needs a new version, and which one, from three
//! independent signals:
//!
//! - **tool version**: the generator binary moved forward
//! - **doc version**: `info.version` of the OpenAPI document moved forward
//! - **doc checksum**: the document bytes changed
//!
//! Each signal recommends a [`Bump`]; recommendations are OR-ed per level and the
//! highest level wins. An empty previous value (first run) always recommends a
//! minor bump.

use semver::Version;
use tracing::{info, warn};

use crate::error::Result;
use crate::metadata::ManagementMetadata;
use crate::version::{parse_required, parse_version, Bump};

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    ToolVersion,
    DocVersion,
    DocChecksum,
}

/// A single bump recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub source: SignalSource,
    pub bump: Bump,
}

/// Per-level OR of every recommendation seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Recommendations {
    pub major: bool,
    pub minor: bool,
    pub patch: bool,
}

impl Recommendations {
    pub fn record(&mut self, bump: Bump) {
        match bump {
            Bump::Major => self.major = true,
            Bump::Minor => self.minor = true,
            Bump::Patch => self.patch = true,
            Bump::None => {}
        }
    }

    /// The single active bump, by precedence `Major > Minor > Patch`
    pub fn resolve(&self) -> Bump {
        if self.major {
            Bump::Major
        } else if self.minor {
            Bump::Minor
        } else if self.patch {
            Bump::Patch
        } else {
            Bump::None
        }
    }
}

impl FromIterator<Signal> for Recommendations {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        let mut recs = Self::default();
        for signal in iter {
            recs.record(signal.bump);
        }
        recs
    }
}

/// Compute the new SDK version, or `None` when nothing changed.
///
/// `current` holds the tool version, doc version and doc checksum of this run;
/// `previous` is the snapshot recorded by the last successful generation.
/// An empty `previous_sdk_version` starts from `0.0.0`.
pub fn decide(
    current: &ManagementMetadata,
    previous_sdk_version: &str,
    previous: &ManagementMetadata,
) -> Result<Option<Version>> {
    if current == previous {
        return Ok(None);
    }

    let signals = collect_signals(current, previous)?;
    let bump = signals.iter().copied().collect::<Recommendations>().resolve();

    let base = if previous_sdk_version.is_empty() {
        Version::new(0, 0, 0)
    } else {
        parse_required("sdk version", previous_sdk_version)?
    };

    if bump != Bump::None {
        info!("Bumping SDK {} version", bump);
    }

    Ok(Some(bump.apply(&base)))
}

/// Evaluate all three signals, returning the ones that recommended a bump.
///
/// Emits a warning when the doc version is not semver, and when the checksum
/// changed without the doc version moving forward.
pub fn collect_signals(
    current: &ManagementMetadata,
    previous: &ManagementMetadata,
) -> Result<Vec<Signal>> {
    let mut signals = Vec::new();
    let mut push = |source, bump| {
        if bump != Bump::None {
            signals.push(Signal { source, bump });
        }
    };

    push(SignalSource::ToolVersion, tool_version_signal(current, previous)?);

    let doc_bump = doc_version_signal(current, previous)?;
    push(SignalSource::DocVersion, doc_bump);
    let doc_version_moved = !previous.doc_version.is_empty() && doc_bump != Bump::None;

    let checksum_bump = checksum_signal(current, previous);
    push(SignalSource::DocChecksum, checksum_bump);

    if checksum_bump == Bump::Patch && !doc_version_moved {
        warn!("::warning title=checksum_changed::openapi checksum changed but version did not");
    }

    Ok(signals)
}

fn tool_version_signal(current: &ManagementMetadata, previous: &ManagementMetadata) -> Result<Bump> {
    if previous.tool_version.is_empty() {
        return Ok(Bump::Minor);
    }

    let prev = parse_required("config speakeasy version", &previous.tool_version)?;
    let cur = parse_required("speakeasy version", &current.tool_version)?;

    let bump = Bump::rank(&cur, &prev);
    if bump != Bump::None {
        info!(
            "Speakeasy version changed detected: {} > {}",
            previous.tool_version, current.tool_version
        );
    }
    Ok(bump)
}

fn doc_version_signal(current: &ManagementMetadata, previous: &ManagementMetadata) -> Result<Bump> {
    if previous.doc_version.is_empty() {
        return Ok(Bump::Minor);
    }

    // Document versioning is outside our control; fall back to the checksum.
    let Ok(cur) = parse_version(&current.doc_version) else {
        warn!("::warning title=invalid_version::openapi version is not a semver");
        return Ok(Bump::None);
    };
    let prev = parse_required("config openapi version", &previous.doc_version)?;

    let bump = Bump::rank(&cur, &prev);
    if bump != Bump::None {
        info!(
            "OpenAPI doc version changed detected: {} > {}",
            previous.doc_version, current.doc_version
        );
    }
    Ok(bump)
}

fn checksum_signal(current: &ManagementMetadata, previous: &ManagementMetadata) -> Bump {
    if previous.doc_checksum.is_empty() {
        return Bump::Minor;
    }
    if current.doc_checksum == previous.doc_checksum {
        return Bump::None;
    }

    info!(
        "OpenAPI doc checksum changed detected: {} > {}",
        previous.doc_checksum, current.doc_checksum
    );
    Bump::Patch
}
