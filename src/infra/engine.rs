//! 体积对比引擎
//!
//! 通过子进程调用外部点云计算脚本，支持：
//! - 超时控制
//! - 结构化错误载荷解析
//! - 所有失败统一折叠为一个错误分类

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, error};

use crate::config::env::constants::ENGINE_TIMEOUT_SECS;

/// 引擎计算结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeDiff {
    pub volume_t1_m3: f64,
    pub volume_t2_m3: f64,
    pub volume_change_m3: f64,
}

/// 引擎错误
///
/// 引擎不可达、错误载荷、输出不可解析、退出码异常、超时
/// 全部折叠到这一个分类，调用方不区分对待
#[derive(Debug, Clone)]
pub struct EngineError {
    pub reason: String,
}

impl EngineError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for EngineError {}

/// 体积对比引擎接口
///
/// 状态机只依赖这个接口，具体引擎实现可以替换
#[async_trait]
pub trait VolumeDiffEngine: Send + Sync {
    /// 对比两个扫描文件的体积
    ///
    /// 每个 run 至多调用一次；不同 run 的调用相互独立，可并发
    async fn compute(
        &self,
        t1_path: &Path,
        t2_path: &Path,
        voxel_size: f64,
    ) -> Result<VolumeDiff, EngineError>;
}

/// Python 脚本引擎适配器
///
/// 执行 `python_bin volume_diff.py --t1 .. --t2 .. --voxel ..`，
/// 从 stdout 读取单个 JSON 对象
pub struct PythonVolumeDiff {
    python_bin: String,
    script_path: String,
    timeout: Duration,
}

/// 脚本 stdout 的 JSON 载荷
///
/// 正常输出带体积字段，失败输出带 error 字段（退出码 2）
#[derive(Debug, Deserialize)]
struct EngineOutput {
    #[serde(default)]
    error: Option<String>,
    #[serde(rename = "volumeT1M3", default)]
    volume_t1_m3: f64,
    #[serde(rename = "volumeT2M3", default)]
    volume_t2_m3: f64,
    #[serde(rename = "volumeChangeM3", default)]
    volume_change_m3: f64,
}

impl PythonVolumeDiff {
    /// 创建引擎适配器
    pub fn new(python_bin: impl Into<String>, script_path: impl Into<String>) -> Self {
        Self {
            python_bin: python_bin.into(),
            script_path: script_path.into(),
            timeout: Duration::from_secs(ENGINE_TIMEOUT_SECS),
        }
    }

    /// 使用自定义超时创建
    pub fn with_timeout(
        python_bin: impl Into<String>,
        script_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            python_bin: python_bin.into(),
            script_path: script_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl VolumeDiffEngine for PythonVolumeDiff {
    async fn compute(
        &self,
        t1_path: &Path,
        t2_path: &Path,
        voxel_size: f64,
    ) -> Result<VolumeDiff, EngineError> {
        let output = Command::new(&self.python_bin)
            .arg(&self.script_path)
            .arg("--t1")
            .arg(t1_path)
            .arg("--t2")
            .arg(t2_path)
            .arg("--voxel")
            .arg(voxel_size.to_string())
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = output => result.map_err(|e| {
                error!(error = %e, python = %self.python_bin, "Failed to spawn engine process");
                EngineError::new(format!("failed to spawn engine process: {}", e))
            })?,
            _ = tokio::time::sleep(self.timeout) => {
                error!(timeout_secs = self.timeout.as_secs(), "Engine timed out");
                return Err(EngineError::new(format!(
                    "timeout after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(code = ?output.status.code(), "Engine process finished");

        parse_engine_output(output.status.code(), &stdout, &stderr)
    }
}

/// 解析引擎进程的输出
///
/// 退出码 0 和 2 是脚本约定内的（2 = 结构化错误载荷），
/// 其他退出码直接视为失败
fn parse_engine_output(
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<VolumeDiff, EngineError> {
    match code {
        Some(0) | Some(2) => {}
        other => {
            return Err(EngineError::new(format!(
                "engine process failed: code={:?} stderr={}",
                other,
                stderr.trim()
            )));
        }
    }

    let parsed: EngineOutput = serde_json::from_str(stdout.trim()).map_err(|e| {
        EngineError::new(format!(
            "failed to parse engine output: {} out={} err={}",
            e,
            stdout.trim(),
            stderr.trim()
        ))
    })?;

    if let Some(error) = parsed.error {
        return Err(EngineError::new(error));
    }

    Ok(VolumeDiff {
        volume_t1_m3: parsed.volume_t1_m3,
        volume_t2_m3: parsed.volume_t2_m3,
        volume_change_m3: parsed.volume_change_m3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_output() {
        let out = r#"{"volumeT1M3": 100.0, "volumeT2M3": 108.0, "volumeChangeM3": 8.0, "voxelSizeM": 0.05}"#;
        let diff = parse_engine_output(Some(0), out, "").unwrap();
        assert_eq!(diff.volume_t1_m3, 100.0);
        assert_eq!(diff.volume_t2_m3, 108.0);
        assert_eq!(diff.volume_change_m3, 8.0);
    }

    #[test]
    fn test_parse_missing_fields_default_to_zero() {
        let diff = parse_engine_output(Some(0), "{}", "").unwrap();
        assert_eq!(diff.volume_t1_m3, 0.0);
        assert_eq!(diff.volume_t2_m3, 0.0);
    }

    #[test]
    fn test_parse_error_payload() {
        // 退出码 2 + error 字段是脚本的结构化失败路径
        let out = r#"{"error": "File not found: /tmp/t1.ply"}"#;
        let err = parse_engine_output(Some(2), out, "").unwrap_err();
        assert_eq!(err.reason, "File not found: /tmp/t1.ply");
    }

    #[test]
    fn test_parse_unexpected_exit_code() {
        let err = parse_engine_output(Some(1), "", "Traceback ...").unwrap_err();
        assert!(err.reason.contains("code=Some(1)"));
        assert!(err.reason.contains("Traceback"));
    }

    #[test]
    fn test_parse_malformed_output() {
        let err = parse_engine_output(Some(0), "not json at all", "").unwrap_err();
        assert!(err.reason.contains("failed to parse engine output"));
    }

    #[test]
    fn test_parse_killed_by_signal() {
        // 被信号终止时没有退出码
        let err = parse_engine_output(None, "", "").unwrap_err();
        assert!(err.reason.contains("code=None"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_engine_error() {
        let engine = PythonVolumeDiff::new("nonexistent_python_12345", "volume_diff.py");
        let err = engine
            .compute(Path::new("/tmp/a.ply"), Path::new("/tmp/b.ply"), 0.05)
            .await
            .unwrap_err();
        assert!(err.reason.contains("failed to spawn engine process"));
    }
}
