//! 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::application::config::ShellConfig;

/// 추가 설정 파일 경로를 지정하는 환경변수.
pub const CONFIG_ENV: &str = "CMDSHELL_CONFIG";

#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: ShellConfig,
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
}

/// 우선순위 경로를 순회해 JSON 설정을 병합한다.
/// 명시 경로(`--config`)가 존재하지 않으면 오류, 나머지 경로는 없으면 건너뛴다.
pub(crate) fn load_merged_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit
        && !path.exists()
    {
        bail!("config file not found: {}", path.display());
    }

    let mut paths = config_paths();
    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
    }
    merge_paths(dedup_paths(paths))
}

/// 낮은 우선순위 → 높은 우선순위 순서로 주어진 경로를 병합한다.
pub(crate) fn merge_paths(paths: Vec<PathBuf>) -> Result<LoadedConfig> {
    let mut merged = ShellConfig::default();
    let mut loaded_paths = Vec::new();

    for path in &paths {
        if !path.exists() {
            continue;
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let parsed: ShellConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
        merged.merge_from(parsed);
        debug!(path = %path.display(), "config loaded");
        loaded_paths.push(path.to_path_buf());
    }

    Ok(LoadedConfig {
        config: merged,
        searched_paths: paths,
        loaded_paths,
    })
}

/// 시스템 + 사용자 + 프로젝트 + 환경변수 경로 순으로 병합 경로를 구성한다.
pub fn config_paths() -> Vec<PathBuf> {
    // 낮은 우선순위 -> 높은 우선순위 순서로 병합됨.
    let mut paths = vec![PathBuf::from("/etc/cmdshell/config.json")];

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join("cmdshell").join("config.json"));
    }

    paths.push(PathBuf::from(".cmdshell/config.json"));

    if let Ok(path) = env::var(CONFIG_ENV) {
        paths.push(Path::new(&path).to_path_buf());
    }

    dedup_paths(paths)
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for p in paths {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}
