// src/drivers/mod.rs
// 声明同级目录下的子模块文件
pub mod buffer;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod plot;
pub mod source;
// 公开导出这些模块里的结构体，方便外部调用
pub use error::MonitorError;
pub use pipeline::Monitor;
pub use plot::{PlotState, PlotStyle};
pub use source::{open_replay, open_serial, LineSource};
