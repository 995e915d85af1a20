//! 数据库仓储层
//!
//! 维修单流转涉及的数据访问，封装 SQL 操作细节。
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 维修单变更与操作日志在同一事务中写入
//! - 定义 trait 接口以支持 mock 测试

mod log_repo;
mod repair_repo;
mod traits;

pub use log_repo::insert_log;
pub use repair_repo::RepairRepository;
pub use traits::*;
