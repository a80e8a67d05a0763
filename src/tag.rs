//! The directive pipeline: parse → resolve → fetch → compose.
//!
//! [`Renderer`] owns the resolved configuration, the site roots and an
//! [`ImageBackend`]. Each call to [`Renderer::render`] is independent, so a
//! batch of directives runs in parallel on rayon's pool with no shared
//! mutable state beyond the output directory itself.
//!
//! Parsing and preset resolution ([`Renderer::prepare`]) happen before any
//! image is opened: a malformed directive or unknown preset never touches
//! the filesystem.

use crate::attrs::AttributeSet;
use crate::cache::{CacheError, CacheStats, CacheStatus, GenerationCache};
use crate::config::{DEFAULT_SOURCE, SiteConfig, register_keep_files};
use crate::directive::{Directive, DirectiveError};
use crate::imaging::{ImageBackend, Plan, Quality, RustBackend};
use crate::markup::{ComposedSource, Composition, compose};
use crate::size::{SizeError, SizeRequest, resolve_picture, resolve_size};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    #[error(transparent)]
    Size(#[from] SizeError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Site roots supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    /// Where source images are read from (joined with `config.source`).
    pub source_root: PathBuf,
    /// Where generated images are written (joined with `config.output`).
    pub dest_root: PathBuf,
}

impl SitePaths {
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
        }
    }
}

/// Which tag the directive was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// A single `<img>`; the size token names a preset or `WxH` pattern.
    Image,
    /// Responsive markup; the size token names a picture preset.
    Picture,
}

/// One source of a prepared directive, before any image is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSource {
    pub name: String,
    pub request: SizeRequest,
    pub media: Option<String>,
}

/// A parsed and resolved directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTag {
    pub directive: Directive,
    pub composition: Composition,
    /// Preset attributes with the directive's own merged on top.
    pub attrs: AttributeSet,
    pub sources: Vec<PlannedSource>,
}

/// What happened for one source of a rendered directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub name: String,
    pub url: String,
    pub plan: Plan,
    pub status: CacheStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub markup: String,
    pub outputs: Vec<SourceOutcome>,
}

/// Outcome of one directive in a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub directive: String,
    pub result: Result<Rendered, TagError>,
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub stats: CacheStats,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}

/// Renders directives against one site configuration.
pub struct Renderer<B = RustBackend> {
    site: SitePaths,
    config: SiteConfig,
    backend: B,
    cache: GenerationCache,
}

impl<B: ImageBackend> Renderer<B> {
    pub fn new(site: SitePaths, config: SiteConfig, backend: B) -> Self {
        let cache = GenerationCache::new(site.dest_root.clone(), config.output.clone());
        Self {
            site,
            config,
            backend,
            cache,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Add the output directory to the host's keep list. See [`register_keep_files`].
    pub fn register_keep_files(&self, keep: &mut Vec<String>) -> bool {
        register_keep_files(keep, &self.config)
    }

    /// Parse and resolve a directive without opening any image.
    pub fn prepare(&self, kind: TagKind, raw: &str) -> Result<PreparedTag, TagError> {
        let directive = Directive::parse(raw)?;
        let own_attrs = directive.attributes();
        let token = directive.size_token.as_deref();

        let (composition, attrs, sources) = match kind {
            TagKind::Image => {
                let preset = resolve_size(token, &self.config.presets)?;
                let source = PlannedSource {
                    name: DEFAULT_SOURCE.to_string(),
                    request: SizeRequest::from(&preset),
                    media: None,
                };
                (Composition::Img, preset.attr.merged(&own_attrs), vec![source])
            }
            TagKind::Picture => {
                let picture = resolve_picture(token, &self.config.pictures)?;
                let sources = picture
                    .sources
                    .iter()
                    .map(|(name, source)| PlannedSource {
                        name: name.to_string(),
                        request: SizeRequest::new(source.width, source.height),
                        media: source.media.clone(),
                    })
                    .collect();
                (
                    Composition::from(self.config.markup),
                    picture.attr.merged(&own_attrs),
                    sources,
                )
            }
        };

        Ok(PreparedTag {
            directive,
            composition,
            attrs,
            sources,
        })
    }

    /// Render one directive, generating any missing images.
    pub fn render(&self, kind: TagKind, raw: &str) -> Result<Rendered, TagError> {
        let prepared = self.prepare(kind, raw)?;
        let source_root = self.site.source_root.join(&self.config.source);
        let requests: Vec<SizeRequest> = prepared.sources.iter().map(|s| s.request).collect();

        let images = self.cache.fetch(
            &self.backend,
            &source_root,
            &prepared.directive.source_path,
            &requests,
            Quality::new(self.config.processing.quality),
        )?;

        let outputs: Vec<SourceOutcome> = prepared
            .sources
            .iter()
            .zip(images)
            .map(|(source, image)| SourceOutcome {
                name: source.name.clone(),
                url: self.url_for(&image.asset.relative_output_path),
                plan: image.plan,
                status: image.status,
            })
            .collect();

        let composed: Vec<ComposedSource> = prepared
            .sources
            .iter()
            .zip(&outputs)
            .map(|(source, outcome)| ComposedSource {
                name: source.name.clone(),
                url: outcome.url.clone(),
                media: source.media.clone(),
            })
            .collect();

        Ok(Rendered {
            markup: compose(prepared.composition, &prepared.attrs, &composed),
            outputs,
        })
    }

    /// Render every directive in parallel. Failures are collected, never fatal.
    pub fn render_batch<S: AsRef<str> + Sync>(
        &self,
        kind: TagKind,
        directives: &[S],
    ) -> BatchReport {
        let entries: Vec<BatchEntry> = directives
            .par_iter()
            .map(|raw| BatchEntry {
                directive: raw.as_ref().to_string(),
                result: self.render(kind, raw.as_ref()),
            })
            .collect();

        let mut stats = CacheStats::default();
        for entry in &entries {
            match &entry.result {
                Ok(rendered) => {
                    for outcome in &rendered.outputs {
                        stats.record(outcome.status);
                    }
                }
                Err(_) => stats.fail(),
            }
        }
        BatchReport { entries, stats }
    }

    /// Prefix a site-relative path with the configured base URL.
    fn url_for(&self, relative: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if base.is_empty() {
            relative.to_string()
        } else {
            format!("{base}/{}", relative.trim_start_matches('/'))
        }
    }
}
