pub mod schema;

pub use schema::{
    BrowserConfig, CaptureConfig, Config, HeaderConfig, PartitionMode, Viewport,
};
