//! Content-addressed generation cache.
//!
//! Resizing and encoding are the expensive part of rendering a directive.
//! This module makes every generated file a pure function of its inputs so
//! the work happens at most once per distinct output, across runs.
//!
//! # Design
//!
//! ## Identity
//!
//! A generated file is named
//!
//! ```text
//! {output}/{source subdirs}/{basename}-{W}x{H}-{digest}{ext}
//! ```
//!
//! where `digest` is the first six hex characters of a SHA-256 over the
//! *decoded* pixels (plus their dimensions). Decoded rather than raw file
//! bytes, so re-saving a file with different metadata doesn't bust the
//! cache, while any pixel edit does.
//!
//! The directory layout is the cache index: a file at the identity path is a
//! hit. There is no manifest to load, save, or corrupt.
//!
//! ## Writes
//!
//! A miss encodes into a temp file in the destination directory, then moves
//! it into place without clobbering. Two workers racing on one identity
//! both encode; the loser discards its copy. Existing files are never
//! modified or deleted, so stale identities accumulate until the user
//! cleans the output directory.

use crate::imaging::{
    BackendError, CropParams, DegenerateDimensions, ImageBackend, Plan, Quality, plan_dimensions,
};
use crate::size::SizeRequest;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of hex characters of the content hash used in file names.
pub const DIGEST_LEN: usize = 6;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Missing: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("can't size {}: {source}", .path.display())]
    DegenerateDimensions {
        path: PathBuf,
        source: DegenerateDimensions,
    },
    #[error("can't process {}: {source}", .path.display())]
    Codec { path: PathBuf, source: BackendError },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A decoded source, reduced to what naming needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Path relative to the configured source directory, see [`source_relative_path`].
    pub path: String,
    pub native_width: u32,
    pub native_height: u32,
    pub content_digest: String,
}

/// Where a generated file lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedAsset {
    /// Site-relative POSIX path with a leading `/`.
    pub relative_output_path: String,
    pub absolute_output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// The file already existed.
    Cached,
    /// The file was encoded by this call.
    Generated,
}

/// One planned and ensured output for a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    pub asset: GeneratedAsset,
    pub plan: Plan,
    pub status: CacheStatus,
}

/// SHA-256 over dimensions and decoded content, truncated to [`DIGEST_LEN`] hex chars.
pub fn content_digest(width: u32, height: u32, content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(content);
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(DIGEST_LEN);
    hex
}

/// Join path fragments into a clean absolute POSIX path.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment
/// (never climbing above the root), and the result always starts with `/`.
pub fn clean_url<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for part in parts {
        for segment in part.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
    }
    format!("/{}", segments.join("/"))
}

/// A directive's source path made relative to the source root.
///
/// Leading separators are dropped and `..` never climbs out, so
/// `/posters/a.jpg` and `posters/a.jpg` name the same file.
pub fn source_relative_path(source_path: &str) -> String {
    clean_url([source_path])
        .trim_start_matches('/')
        .to_string()
}

/// Maps (source, plan) pairs to files under the output directory.
#[derive(Debug, Clone)]
pub struct GenerationCache {
    output_root: PathBuf,
    relative_dir: String,
}

impl GenerationCache {
    /// `output_root` is the site destination; `relative_dir` the configured
    /// output directory inside it.
    pub fn new(output_root: impl Into<PathBuf>, relative_dir: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            relative_dir: relative_dir.into(),
        }
    }

    /// The generation identity of `source` at `plan`. Pure.
    pub fn identity(&self, source: &SourceImage, plan: &Plan) -> GeneratedAsset {
        let relative = source_relative_path(&source.path);
        let path = Path::new(&relative);
        let subdir = path
            .parent()
            .map(|p| p.to_string_lossy())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let name = format!(
            "{stem}-{}x{}-{}{ext}",
            plan.target_width, plan.target_height, source.content_digest
        );

        let relative_output_path =
            clean_url([self.relative_dir.as_str(), &*subdir, name.as_str()]);
        let absolute_output_path = self
            .output_root
            .join(relative_output_path.trim_start_matches('/'));
        GeneratedAsset {
            relative_output_path,
            absolute_output_path,
        }
    }

    /// Make sure the file for `source` at `plan` exists, encoding it on a miss.
    pub fn ensure<B: ImageBackend>(
        &self,
        backend: &B,
        image: &B::Image,
        source: &SourceImage,
        plan: &Plan,
        quality: Quality,
    ) -> Result<(GeneratedAsset, CacheStatus), CacheError> {
        let asset = self.identity(source, plan);
        let target = &asset.absolute_output_path;
        if target.exists() {
            debug!("cached {}", asset.relative_output_path);
            return Ok((asset, CacheStatus::Cached));
        }

        let dir = target.parent().unwrap_or(self.output_root.as_path());
        std::fs::create_dir_all(dir)?;
        let suffix = target
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let tmp = tempfile::Builder::new()
            .prefix(".tmp-")
            .suffix(&suffix)
            .tempfile_in(dir)?;

        if plan.was_clamped {
            warn!(
                "{} is {}x{}, smaller than the requested size; using {}x{} instead",
                source.path,
                source.native_width,
                source.native_height,
                plan.target_width,
                plan.target_height
            );
        }
        info!(
            "Generating {} ({}x{})",
            asset.relative_output_path, plan.target_width, plan.target_height
        );
        backend
            .cover_crop(
                image,
                &CropParams {
                    output: tmp.path().to_path_buf(),
                    width: plan.target_width,
                    height: plan.target_height,
                    quality,
                },
            )
            .map_err(|source_err| CacheError::Codec {
                path: PathBuf::from(&source.path),
                source: source_err,
            })?;

        match tmp.persist_noclobber(target) {
            Ok(_) => {}
            // Another worker finished the same identity first
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{} already written", asset.relative_output_path);
            }
            Err(e) => return Err(CacheError::Io(e.error)),
        }
        Ok((asset, CacheStatus::Generated))
    }

    /// Decode `source_path` once and ensure an output for each request.
    ///
    /// The decoded image is dropped before returning.
    pub fn fetch<B: ImageBackend>(
        &self,
        backend: &B,
        source_root: &Path,
        source_path: &str,
        requests: &[SizeRequest],
        quality: Quality,
    ) -> Result<Vec<CachedImage>, CacheError> {
        let relative = source_relative_path(source_path);
        let absolute = source_root.join(&relative);
        if !absolute.is_file() {
            warn!("Missing: {}", absolute.display());
            return Err(CacheError::SourceNotFound(absolute));
        }

        let image = backend
            .decode(&absolute)
            .map_err(|source| CacheError::Codec {
                path: absolute.clone(),
                source,
            })?;
        let dims = backend.dimensions(&image);
        let source = SourceImage {
            path: relative,
            native_width: dims.width,
            native_height: dims.height,
            content_digest: content_digest(dims.width, dims.height, &backend.content(&image)),
        };

        requests
            .iter()
            .map(|request| {
                let plan = plan_dimensions(
                    (source.native_width, source.native_height),
                    (request.width, request.height),
                )
                .map_err(|source| CacheError::DegenerateDimensions {
                    path: absolute.clone(),
                    source,
                })?;
                let (asset, status) = self.ensure(backend, &image, &source, &plan, quality)?;
                Ok(CachedImage {
                    asset,
                    plan,
                    status,
                })
            })
            .collect()
    }
}

/// Summary of cache activity for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub cached: u32,
    pub generated: u32,
    pub failed: u32,
}

impl CacheStats {
    pub fn record(&mut self, status: CacheStatus) {
        match status {
            CacheStatus::Cached => self.cached += 1,
            CacheStatus::Generated => self.generated += 1,
        }
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    pub fn merge(&mut self, other: &CacheStats) {
        self.cached += other.cached;
        self.generated += other.generated;
        self.failed += other.failed;
    }

    pub fn total(&self) -> u32 {
        self.cached + self.generated + self.failed
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cached == 0 && self.failed == 0 {
            return write!(f, "{} generated", self.generated);
        }
        write!(f, "{} cached, {} generated", self.cached, self.generated)?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} total)", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{capture_logs, list_files, write_file};
    use std::fs;
    use tempfile::TempDir;

    fn source(path: &str, digest: &str) -> SourceImage {
        SourceImage {
            path: path.to_string(),
            native_width: 800,
            native_height: 600,
            content_digest: digest.to_string(),
        }
    }

    fn plan(w: u32, h: u32) -> Plan {
        Plan {
            target_width: w,
            target_height: h,
            was_clamped: false,
        }
    }

    fn request(w: Option<u32>, h: Option<u32>) -> SizeRequest {
        SizeRequest::new(w, h)
    }

    // =========================================================================
    // content_digest
    // =========================================================================

    #[test]
    fn digest_is_six_hex_chars() {
        let d = content_digest(10, 10, b"pixels");
        assert_eq!(d.len(), DIGEST_LEN);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        assert_eq!(content_digest(10, 10, b"a"), content_digest(10, 10, b"a"));
        assert_ne!(content_digest(10, 10, b"a"), content_digest(10, 10, b"b"));
        assert_ne!(content_digest(10, 20, b"a"), content_digest(20, 10, b"a"));
    }

    // =========================================================================
    // clean_url
    // =========================================================================

    #[test]
    fn clean_url_joins_and_normalizes() {
        assert_eq!(clean_url(["generated", "", "a.jpg"]), "/generated/a.jpg");
        assert_eq!(clean_url(["/blog/", "/generated//x/", "a.jpg"]), "/blog/generated/x/a.jpg");
        assert_eq!(clean_url(["./generated", "./a.jpg"]), "/generated/a.jpg");
        assert_eq!(clean_url(["generated", "x/../a.jpg"]), "/generated/a.jpg");
    }

    #[test]
    fn clean_url_never_climbs_above_root() {
        assert_eq!(clean_url(["generated", "../../../etc/a.jpg"]), "/etc/a.jpg");
        assert_eq!(clean_url([""]), "/");
    }

    #[test]
    fn source_paths_are_made_relative() {
        assert_eq!(source_relative_path("posters/a.jpg"), "posters/a.jpg");
        assert_eq!(source_relative_path("/posters/a.jpg"), "posters/a.jpg");
        assert_eq!(source_relative_path("\\posters\\a.jpg"), "posters/a.jpg");
        assert_eq!(source_relative_path("./x/../a.jpg"), "a.jpg");
        assert_eq!(source_relative_path("../../etc/a.jpg"), "etc/a.jpg");
    }

    // =========================================================================
    // identity
    // =========================================================================

    #[test]
    fn identity_names_basename_dims_digest() {
        let cache = GenerationCache::new("/site", "generated");
        let asset = cache.identity(&source("posters/poster.jpg", "abc123"), &plan(400, 300));
        assert_eq!(
            asset.relative_output_path,
            "/generated/posters/poster-400x300-abc123.jpg"
        );
        assert_eq!(
            asset.absolute_output_path,
            PathBuf::from("/site/generated/posters/poster-400x300-abc123.jpg")
        );
    }

    #[test]
    fn identity_without_subdir_keeps_extension_case() {
        let cache = GenerationCache::new("/site", "img/out");
        let asset = cache.identity(&source("Poster.JPG", "0f0f0f"), &plan(10, 20));
        assert_eq!(asset.relative_output_path, "/img/out/Poster-10x20-0f0f0f.JPG");
    }

    #[test]
    fn identity_ignores_leading_separator() {
        let cache = GenerationCache::new("/site", "generated");
        assert_eq!(
            cache.identity(&source("/posters/poster.jpg", "abc123"), &plan(400, 300)),
            cache.identity(&source("posters/poster.jpg", "abc123"), &plan(400, 300)),
        );
    }

    #[test]
    fn identity_sensitive_to_width_height_digest() {
        let cache = GenerationCache::new("/site", "generated");
        let base = cache.identity(&source("a.jpg", "aaaaaa"), &plan(400, 300));
        assert_ne!(base, cache.identity(&source("a.jpg", "aaaaaa"), &plan(401, 300)));
        assert_ne!(base, cache.identity(&source("a.jpg", "aaaaaa"), &plan(400, 301)));
        assert_ne!(base, cache.identity(&source("a.jpg", "bbbbbb"), &plan(400, 300)));
        assert_eq!(base, cache.identity(&source("a.jpg", "aaaaaa"), &plan(400, 300)));
    }

    // =========================================================================
    // fetch
    // =========================================================================

    #[test]
    fn fetch_generates_then_hits() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write_file(&src.join("poster.jpg"), b"poster pixels");

        let backend = MockBackend::new();
        let cache = GenerationCache::new(&dest, "generated");

        let first = cache
            .fetch(&backend, &src, "poster.jpg", &[request(Some(400), None)], Quality::default())
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].status, CacheStatus::Generated);
        assert_eq!((first[0].plan.target_width, first[0].plan.target_height), (400, 300));
        assert!(first[0].asset.absolute_output_path.exists());

        let second = cache
            .fetch(&backend, &src, "poster.jpg", &[request(Some(400), None)], Quality::default())
            .unwrap();
        assert_eq!(second[0].status, CacheStatus::Cached);
        assert_eq!(second[0].asset, first[0].asset);
        assert_eq!(backend.crop_count(), 1);
    }

    #[test]
    fn same_source_and_size_yields_one_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write_file(&src.join("posters/poster.jpg"), b"poster pixels");

        let backend = MockBackend::new();
        // A fresh cache per directive, as across separate runs
        for _ in 0..2 {
            GenerationCache::new(&dest, "generated")
                .fetch(
                    &backend,
                    &src,
                    "posters/poster.jpg",
                    &[request(Some(400), Some(300))],
                    Quality::default(),
                )
                .unwrap();
        }

        let files = list_files(&dest);
        assert_eq!(files.len(), 1, "{files:?}");
        let expected = format!(
            "generated/posters/poster-400x300-{}.jpg",
            content_digest(800, 600, b"poster pixels")
        );
        assert!(files[0].ends_with(&expected), "{files:?}");
    }

    #[test]
    fn fetch_decodes_once_for_many_requests() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write_file(&src.join("hero.jpg"), b"hero");

        let backend = MockBackend::with_dimensions(1200, 800);
        let cache = GenerationCache::new(tmp.path().join("dest"), "generated");
        let results = cache
            .fetch(
                &backend,
                &src,
                "hero.jpg",
                &[request(Some(1200), None), request(Some(600), None)],
                Quality::new(80),
            )
            .unwrap();

        assert_eq!(results.len(), 2);
        let decodes = backend
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Decode(_)))
            .count();
        assert_eq!(decodes, 1);
        let crops: Vec<(u32, u32, u32)> = backend
            .get_operations()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Crop {
                    width,
                    height,
                    quality,
                    ..
                } => Some((width, height, quality)),
                _ => None,
            })
            .collect();
        assert_eq!(crops, [(1200, 800, 80), (600, 400, 80)]);
    }

    #[test]
    fn fetch_clamps_without_upscaling() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write_file(&src.join("small.jpg"), b"small");

        let backend = MockBackend::new();
        let cache = GenerationCache::new(tmp.path().join("dest"), "generated");
        let results = cache
            .fetch(
                &backend,
                &src,
                "small.jpg",
                &[request(Some(2000), Some(1000))],
                Quality::default(),
            )
            .unwrap();

        assert!(results[0].plan.was_clamped);
        assert!(results[0].asset.relative_output_path.contains("-800x400-"));
    }

    #[test]
    fn clamp_warning_only_when_generating() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write_file(&src.join("small.jpg"), b"small");

        let backend = MockBackend::new();
        let cache = GenerationCache::new(tmp.path().join("dest"), "generated");
        let fetch = || {
            cache
                .fetch(
                    &backend,
                    &src,
                    "small.jpg",
                    &[request(Some(2000), Some(1000))],
                    Quality::default(),
                )
                .unwrap()
        };

        let (first, logs) = capture_logs(fetch);
        assert_eq!(first[0].status, CacheStatus::Generated);
        assert!(logs.contains("smaller than the requested size"), "{logs}");
        assert!(logs.contains("small.jpg is 800x600"), "{logs}");

        let (second, logs) = capture_logs(fetch);
        assert_eq!(second[0].status, CacheStatus::Cached);
        assert!(second[0].plan.was_clamped);
        assert!(!logs.contains("smaller than the requested size"), "{logs}");
    }

    #[test]
    fn rooted_source_path_resolves_under_source_root() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write_file(&src.join("posters/poster.jpg"), b"poster");

        let backend = MockBackend::new();
        let cache = GenerationCache::new(tmp.path().join("dest"), "generated");
        let rooted = cache
            .fetch(&backend, &src, "/posters/poster.jpg", &[request(None, None)], Quality::default())
            .unwrap();
        let plain = cache
            .fetch(&backend, &src, "posters/poster.jpg", &[request(None, None)], Quality::default())
            .unwrap();

        assert_eq!(rooted[0].status, CacheStatus::Generated);
        assert_eq!(plain[0].status, CacheStatus::Cached);
        assert_eq!(rooted[0].asset, plain[0].asset);
        assert_eq!(
            backend.get_operations()[0],
            RecordedOp::Decode(src.join("posters/poster.jpg").display().to_string())
        );
    }

    #[test]
    fn escaping_source_path_is_not_found_outside_root() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write_file(&tmp.path().join("secret.jpg"), b"secret");

        let backend = MockBackend::new();
        let err = GenerationCache::new(tmp.path().join("dest"), "generated")
            .fetch(&backend, &src, "../secret.jpg", &[request(None, None)], Quality::default())
            .unwrap_err();

        assert!(matches!(&err, CacheError::SourceNotFound(p) if p == &src.join("secret.jpg")));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn fetch_missing_source_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let cache = GenerationCache::new(tmp.path().join("dest"), "generated");

        let err = cache
            .fetch(&backend, tmp.path(), "nope.jpg", &[request(None, None)], Quality::default())
            .unwrap_err();
        assert!(matches!(&err, CacheError::SourceNotFound(p) if p.ends_with("nope.jpg")));
        assert!(err.to_string().starts_with("Missing: "));
        assert!(backend.get_operations().is_empty());
        assert!(!tmp.path().join("dest").exists());
    }

    #[test]
    fn fetch_codec_failure_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write_file(&src.join("poster.jpg"), b"poster");

        let backend = MockBackend::failing();
        let err = GenerationCache::new(&dest, "generated")
            .fetch(&backend, &src, "poster.jpg", &[request(None, None)], Quality::default())
            .unwrap_err();

        assert!(matches!(err, CacheError::Codec { .. }));
        assert!(list_files(&dest).is_empty());
    }

    #[test]
    fn fetch_degenerate_plan_is_error() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write_file(&src.join("strip.jpg"), b"strip");

        let backend = MockBackend::with_dimensions(1000, 1);
        let err = GenerationCache::new(tmp.path().join("dest"), "generated")
            .fetch(&backend, &src, "strip.jpg", &[request(Some(10), None)], Quality::default())
            .unwrap_err();
        assert!(matches!(err, CacheError::DegenerateDimensions { .. }));
        assert_eq!(backend.crop_count(), 0);
    }

    #[test]
    fn existing_file_is_never_rewritten() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write_file(&src.join("poster.jpg"), b"poster");

        let backend = MockBackend::new();
        let cache = GenerationCache::new(&dest, "generated");
        let digest = content_digest(800, 600, b"poster");
        let asset = cache.identity(&source("poster.jpg", &digest), &plan(800, 600));
        write_file(&asset.absolute_output_path, b"hand-made");

        let results = cache
            .fetch(&backend, &src, "poster.jpg", &[request(None, None)], Quality::default())
            .unwrap();
        assert_eq!(results[0].status, CacheStatus::Cached);
        assert_eq!(fs::read(&asset.absolute_output_path).unwrap(), b"hand-made");
        assert_eq!(backend.crop_count(), 0);
    }

    #[test]
    fn changed_content_changes_identity() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        let backend = MockBackend::new();
        let cache = GenerationCache::new(&dest, "generated");

        write_file(&src.join("poster.jpg"), b"version one");
        let one = cache
            .fetch(&backend, &src, "poster.jpg", &[request(None, None)], Quality::default())
            .unwrap();
        write_file(&src.join("poster.jpg"), b"version two");
        let two = cache
            .fetch(&backend, &src, "poster.jpg", &[request(None, None)], Quality::default())
            .unwrap();

        assert_ne!(one[0].asset, two[0].asset);
        assert_eq!(two[0].status, CacheStatus::Generated);
        // The stale file is left alone
        assert_eq!(list_files(&dest).len(), 2);
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn stats_display_all_generated() {
        let stats = CacheStats {
            generated: 5,
            ..CacheStats::default()
        };
        assert_eq!(stats.to_string(), "5 generated");
    }

    #[test]
    fn stats_display_mixed() {
        let stats = CacheStats {
            cached: 3,
            generated: 2,
            failed: 0,
        };
        assert_eq!(stats.to_string(), "3 cached, 2 generated (5 total)");
    }

    #[test]
    fn stats_display_with_failures() {
        let stats = CacheStats {
            cached: 0,
            generated: 2,
            failed: 1,
        };
        assert_eq!(stats.to_string(), "0 cached, 2 generated, 1 failed (3 total)");
    }

    #[test]
    fn stats_record_and_merge() {
        let mut a = CacheStats::default();
        a.record(CacheStatus::Cached);
        a.record(CacheStatus::Generated);
        let mut b = CacheStats::default();
        b.fail();
        b.record(CacheStatus::Generated);

        a.merge(&b);
        assert_eq!(
            a,
            CacheStats {
                cached: 1,
                generated: 2,
                failed: 1
            }
        );
        assert_eq!(a.total(), 4);
    }
}
