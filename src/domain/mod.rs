//! 领域模型模块
//!
//! 项目、分区、扫描和对比任务的核心类型

pub mod project;
pub mod run;
pub mod scan;
pub mod zone;
