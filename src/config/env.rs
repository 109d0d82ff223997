//! 环境变量配置加载

use std::env;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 服务监听端口
    pub port: u16,
    /// Python 解释器路径
    pub python_bin: String,
    /// 体积对比脚本路径
    pub volume_diff_script: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4000);

        let python_bin = env::var("PYTHON_BIN").unwrap_or_else(|_| "python3".to_string());

        let volume_diff_script = env::var("VOLUME_DIFF_SCRIPT")
            .unwrap_or_else(|_| "python/volume_diff.py".to_string());

        Self {
            port,
            python_bin,
            volume_diff_script,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            python_bin: "python3".to_string(),
            volume_diff_script: "python/volume_diff.py".to_string(),
        }
    }
}

/// 全局常量
pub mod constants {
    /// 默认体素尺寸（米）- 5cm
    pub const DEFAULT_VOXEL_SIZE: f64 = 0.05;

    /// 外部引擎超时（秒）
    pub const ENGINE_TIMEOUT_SECS: u64 = 1800; // 30 分钟

    /// 事件广播通道容量
    pub const EVENT_CHANNEL_CAPACITY: usize = 256;

    /// 事件通道清扫间隔（秒）
    pub const EVENT_SWEEP_INTERVAL_SECS: u64 = 60;

    /// 启动时自动创建的演示项目名称
    pub const DEMO_PROJECT_NAME: &str = "Rothschild Towers";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnvConfig::default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.python_bin, "python3");
        assert_eq!(config.volume_diff_script, "python/volume_diff.py");
    }
}
