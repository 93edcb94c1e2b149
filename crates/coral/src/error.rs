#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("viewport dimensions must be finite and positive: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("graph contains a duplicate node id: {node_id}")]
    DuplicateNode { node_id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
