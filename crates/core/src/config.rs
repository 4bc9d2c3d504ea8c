use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chunking: ChunkingConfig,
    pub sections: SectionConfig,
    pub cache: CacheConfig,
    pub source: SourceConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `FILINGDEX_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("FILINGDEX_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            chunking: ChunkingConfig::from_env_profiled(p),
            sections: SectionConfig::from_env_profiled(p),
            cache: CacheConfig::from_env_profiled(p),
            source: SourceConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:    chunk_size={}, overlap={}",
            self.chunking.chunk_size,
            self.chunking.overlap
        );
        tracing::info!(
            "  sections:    toc_max_gap={}, toc_min_run={}",
            self.sections.toc_max_gap,
            self.sections.toc_min_run
        );
        tracing::info!(
            "  cache:       capacity={}, build_timeout={}s",
            self.cache.capacity,
            self.cache.build_timeout_secs
        );
        tracing::info!(
            "  source:      base_url={}, data_dir={}, user_agent={}",
            self.source.edgar_base_url,
            self.source.data_dir.display(),
            if self.source.user_agent.is_some() { "(set)" } else { "(none)" }
        );
    }
}

// ── Chunking ──────────────────────────────────────────────────

pub const DEFAULT_CHUNK_SIZE: usize = 8000;

/// Default overlap: 5% of the chunk size.
pub fn default_overlap(chunk_size: usize) -> usize {
    chunk_size / 20
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters repeated from the previous chunk.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: default_overlap(DEFAULT_CHUNK_SIZE),
        }
    }
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let chunk_size = profiled_env_usize(p, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE);
        Self {
            chunk_size,
            overlap: profiled_env_usize(p, "CHUNK_OVERLAP", default_overlap(chunk_size)),
        }
    }
}

// ── Section identification ────────────────────────────────────

/// Tunables for telling table-of-contents listings apart from real headers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Two headers closer than this (in characters) count as one listing run.
    pub toc_max_gap: usize,
    /// Minimum run length of tightly packed, increasing headers to call it a listing.
    pub toc_min_run: usize,
    /// Characters after the item label searched for the item's title keyword.
    pub header_title_window: usize,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            toc_max_gap: 300,
            toc_min_run: 3,
            header_title_window: 160,
        }
    }
}

impl SectionConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            toc_max_gap: profiled_env_usize(p, "TOC_MAX_GAP", d.toc_max_gap),
            toc_min_run: profiled_env_usize(p, "TOC_MIN_RUN", d.toc_min_run),
            header_title_window: profiled_env_usize(
                p,
                "HEADER_TITLE_WINDOW",
                d.header_title_window,
            ),
        }
    }
}

// ── Document cache ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Parsed documents kept in memory.
    pub capacity: usize,
    /// Distinct (chunk_size, overlap) chunkings memoized per document.
    pub chunkings_per_document: usize,
    /// Upper bound on normalize + section + chunk for one request.
    pub build_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            chunkings_per_document: 8,
            build_timeout_secs: 30,
        }
    }
}

impl CacheConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            capacity: profiled_env_usize(p, "CACHE_CAPACITY", d.capacity),
            chunkings_per_document: profiled_env_usize(
                p,
                "CHUNKINGS_PER_DOCUMENT",
                d.chunkings_per_document,
            ),
            build_timeout_secs: profiled_env_u64(p, "BUILD_TIMEOUT_SECS", d.build_timeout_secs),
        }
    }
}

// ── Raw document sources ──────────────────────────────────────

pub const DEFAULT_EDGAR_BASE_URL: &str = "https://www.sec.gov/Archives/edgar/data";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Required by EDGAR for every request.
    pub user_agent: Option<String>,
    pub edgar_base_url: String,
    pub max_retries: u32,
    pub fetch_timeout_secs: u64,
    /// Root of the `{cik}/{accession}/{document}` tree for the file source.
    pub data_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            edgar_base_url: DEFAULT_EDGAR_BASE_URL.to_string(),
            max_retries: 3,
            fetch_timeout_secs: 30,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl SourceConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            user_agent: profiled_env_opt(p, "EDGAR_USER_AGENT")
                .or_else(|| profiled_env_opt(p, "SEC_EDGAR_USER_AGENT")),
            edgar_base_url: profiled_env_or(p, "EDGAR_BASE_URL", DEFAULT_EDGAR_BASE_URL),
            max_retries: profiled_env_u32(p, "FETCH_MAX_RETRIES", d.max_retries),
            fetch_timeout_secs: profiled_env_u64(p, "FETCH_TIMEOUT_SECS", d.fetch_timeout_secs),
            data_dir: PathBuf::from(profiled_env_or(p, "DATA_DIR", "data")),
        }
    }
}
