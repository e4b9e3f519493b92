//! 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::config::Config;

const CONFIG_ENV: &str = "COMMENTPILOT_CONFIG";
const PROJECT_CONFIG: &str = ".commentpilot/config.json";

#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: Config,
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
}

/// 우선순위 경로를 순회해 JSON 설정을 병합하고 환경변수를 적용한다.
/// 설정 파일이 하나도 없어도 기본값으로 동작한다(체크아웃된 트리에 파일을 만들지 않는다).
pub(crate) fn load_merged_config() -> Result<LoadedConfig> {
    let paths = config_paths();
    let mut loaded = load_from_paths(&paths)?;
    apply_env_overrides(&mut loaded.config, |name| env::var(name).ok());
    Ok(loaded)
}

pub(crate) fn load_from_paths(paths: &[PathBuf]) -> Result<LoadedConfig> {
    // 낮은 우선순위에서 높은 우선순위 순서로 병합한다.
    let mut merged = Config::default();
    let mut loaded_paths = Vec::new();

    for path in paths {
        if !path.exists() {
            continue;
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let parsed: Config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
        merged.merge_from(parsed);
        loaded_paths.push(path.to_path_buf());
    }

    Ok(LoadedConfig {
        config: merged,
        searched_paths: paths.to_vec(),
        loaded_paths,
    })
}

/// 실행 환경(GitHub Actions) 변수를 설정에 반영한다.
/// 모델은 환경값이 파일을 덮어쓰고, 엔드포인트는 파일에 값이 없을 때만 채운다.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(model) = non_empty("MODEL").or_else(|| non_empty("INPUT_MODEL")) {
        config.agent.model = Some(model);
    }

    let github = &mut config.github;
    if github.api_base.is_none() {
        github.api_base = non_empty("GITHUB_API_URL");
    }
    if github.graphql_url.is_none() {
        github.graphql_url = non_empty("GITHUB_GRAPHQL_URL");
    }
    if github.server_url.is_none() {
        github.server_url = non_empty("GITHUB_SERVER_URL");
    }
}

/// 시스템 + 사용자 + 프로젝트 + 명시 경로 순으로 병합 경로를 구성한다.
pub fn config_paths() -> Vec<PathBuf> {
    // 낮은 우선순위 -> 높은 우선순위 순서로 병합됨.
    let mut paths = vec![PathBuf::from("/etc/commentpilot/config.json")];

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join("commentpilot").join("config.json"));
    }

    paths.push(PathBuf::from(PROJECT_CONFIG));

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
