//! Label photo flow: upload photos, then poll the server-side scan job.
//! 标签照片流程：上传照片，然后轮询服务端扫描任务。

mod analysis;
mod error;
mod poll;

pub use analysis::LabelAnalysis;
pub use error::LabelAnalysisError;
pub use poll::{poll_until_done, PollOutcome, PollPolicy};
