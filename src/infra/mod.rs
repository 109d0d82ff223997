//! 基础设施模块
//!
//! 外部计算引擎的调用封装

pub mod engine;

pub use engine::{PythonVolumeDiff, VolumeDiff, VolumeDiffEngine};
