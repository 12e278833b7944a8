//! 订单模块
//!
//! - [`engine`]: 创建、查询、状态流转
//! - [`cart`]: 购物车解析与金额核对
//! - [`number`]: 订单号生成
//! - [`transition`]: 状态机守卫

pub mod cart;
pub mod engine;
pub mod error;
pub mod number;
pub mod transition;

pub use engine::OrderEngine;
pub use error::OrderError;
