//! 运行时状态模块
//!
//! 管理应用状态、各实体存储和事件总线

pub mod app_state;
pub mod event_hub;
pub mod project_store;
pub mod run_store;
pub mod scan_store;
pub mod zone_store;

pub use app_state::AppState;
pub use event_hub::EventHub;
pub use project_store::ProjectStore;
pub use run_store::RunStore;
pub use scan_store::ScanStore;
pub use zone_store::ZoneStore;
