//! One regeneration run across every target language
//!
//! For each language (in id order) the reconciler decides whether a new SDK
//! version is due. If so the SDK is regenerated; when that actually changed
//! files, the new management snapshot is recorded, a ledger block is appended,
//! the repository is committed and pushed and, optionally, a release is
//! published from the freshly re-read ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use semver::Version;
use tracing::{debug, info};

use crate::config::{ActionConfig, TargetLanguage};
use crate::error::Result;
use crate::generator::Generator;
use crate::ledger::{EcosystemTable, LanguageReleaseInfo, ReleaseLedger, ReleaseRecord};
use crate::metadata::{GenConfig, ManagementMetadata};
use crate::openapi::DocInfo;
use crate::outputs::StepOutputs;
use crate::publish::ReleasePublisher;
use crate::reconcile::decide;
use crate::scm::SourceControl;
use crate::version::parse_required;

/// What a run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Languages whose SDK changed, in id order
    pub regenerated: Vec<String>,
    pub release_version: Option<String>,
    pub commit: Option<String>,
    pub release_created: bool,
    pub outputs: StepOutputs,
}

/// Wires configuration and collaborators together for a single run
pub struct Pipeline<'a, G, S, P> {
    config: &'a ActionConfig,
    generator: &'a G,
    scm: &'a S,
    publisher: &'a P,
    ecosystems: EcosystemTable,
    invoked_at: DateTime<Utc>,
}

impl<'a, G, S, P> Pipeline<'a, G, S, P>
where
    G: Generator,
    S: SourceControl,
    P: ReleasePublisher,
{
    pub fn new(config: &'a ActionConfig, generator: &'a G, scm: &'a S, publisher: &'a P) -> Self {
        Self {
            config,
            generator,
            scm,
            publisher,
            ecosystems: EcosystemTable::default(),
            invoked_at: Utc::now(),
        }
    }

    pub fn with_ecosystems(mut self, ecosystems: EcosystemTable) -> Self {
        self.ecosystems = ecosystems;
        self
    }

    /// Fix the time used for the ledger title
    pub fn invoked_at(mut self, at: DateTime<Utc>) -> Self {
        self.invoked_at = at;
        self
    }

    pub fn run(&self) -> Result<RunSummary> {
        let workspace = &self.config.workspace;
        let tool_version = self.generator.tool_version()?.to_string();

        let repo = self.scm.clone_repo()?;
        let doc = DocInfo::load(&self.config.doc_location, workspace)?;
        let current = ManagementMetadata::new(
            tool_version.clone(),
            doc.version.clone(),
            doc.checksum.to_string(),
        );

        let mut targets = self.config.languages.clone();
        targets.sort_by(|a, b| a.language.cmp(&b.language));

        let mut summary = RunSummary::default();
        let mut regenerated: Vec<(TargetLanguage, GenConfig)> = Vec::new();

        for target in targets {
            let lang = target.language.as_str();
            let mut gen = GenConfig::load(workspace.gen_config_path(&target.dir))?;
            let previous_version = gen.sdk_version(lang);

            let Some(new_version) = decide(&current, &previous_version, &gen.management())? else {
                info!("No changes detected for {}", lang);
                continue;
            };
            info!("New version detected: {}", new_version);

            gen.set_sdk_version(lang, &new_version.to_string());
            gen.save()?;

            let out_dir = workspace.sdk_dir(&target.dir);
            info!("Generating {} SDK in {:?}", lang, out_dir);
            let output = self.generator.generate(&doc.path, lang, &out_dir)?;
            debug!("{}", output);

            summary.outputs.set(format!("{lang}_directory"), target.dir.clone());

            if self.scm.is_dirty(&repo, &target.dir)? {
                regenerated.push((target, gen));
            } else {
                gen.set_sdk_version(lang, &previous_version);
                gen.save()?;
                info!("Regenerating {} SDK did not result in any changes", lang);
            }
        }

        if !regenerated.is_empty() {
            let release_version = self.release_version(&regenerated)?;
            let mut languages = BTreeMap::new();

            for (target, gen) in &mut regenerated {
                let lang = target.language.as_str();
                gen.set_management(&current);
                gen.save()?;

                summary.outputs.set(format!("{lang}_regenerated"), "true");
                summary.regenerated.push(lang.to_string());
                languages.insert(
                    lang.to_string(),
                    LanguageReleaseInfo::new(
                        self.package_name(target, gen),
                        target.dir.clone(),
                        gen.sdk_version(lang),
                    ),
                );
            }

            let record = ReleaseRecord {
                title: self.invoked_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                doc_version: doc.version.clone(),
                doc_location: self.config.doc_location.clone(),
                tool_version: tool_version.clone(),
                languages,
            };

            let ledger = ReleaseLedger::new(workspace.ledger_path()).with_ecosystems(self.ecosystems.clone());
            ledger.append(&record)?;

            let message = format!(
                "ci: regenerated with OpenAPI Doc {}, Speakeasy CLI {}",
                doc.version, tool_version
            );
            let commit = self.scm.commit_and_push(&repo, &message)?;

            if self.config.create_release {
                let last = ledger.read_last()?;
                self.publisher.create_release(&release_version, &commit, &last)?;
                summary.release_created = true;
            }

            summary.release_version = Some(release_version);
            summary.commit = Some(commit);
        }

        if let Some(path) = &self.config.output_file {
            summary.outputs.write_to(path)?;
        }

        Ok(summary)
    }

    /// Go's SDK version when Go is a target, otherwise the highest regenerated version
    fn release_version(&self, regenerated: &[(TargetLanguage, GenConfig)]) -> Result<String> {
        if let Some(go) = self.config.languages.iter().find(|t| t.language == "go") {
            if let Some((_, gen)) = regenerated.iter().find(|(t, _)| t.language == "go") {
                return Ok(gen.sdk_version("go"));
            }
            let gen = GenConfig::load(self.config.workspace.gen_config_path(&go.dir))?;
            return Ok(gen.sdk_version("go"));
        }

        let mut best: Option<(Version, String)> = None;
        for (target, gen) in regenerated {
            let raw = gen.sdk_version(&target.language);
            let parsed = parse_required("sdk version", &raw)?;
            if best.as_ref().map_or(true, |(v, _)| parsed > *v) {
                best = Some((parsed, raw));
            }
        }

        Ok(best.map(|(_, raw)| raw).unwrap_or_default())
    }

    fn package_name(&self, target: &TargetLanguage, gen: &GenConfig) -> String {
        let monorepo = self
            .ecosystems
            .get(&target.language)
            .map(|eco| eco.monorepo_paths)
            .unwrap_or(false);

        if monorepo {
            let sub = target.dir.strip_prefix("./").unwrap_or(&target.dir);
            if sub.is_empty() || sub == "." {
                return self.config.repository.clone();
            }
            return format!("{}/{}", self.config.repository, sub);
        }

        gen.package_name(&target.language).unwrap_or_else(|| {
            self.config
                .repository
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        })
    }
}
