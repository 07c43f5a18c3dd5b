use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store: API error: {0}")]
    Api(String),

    #[error("store: HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("store: decode error: {0}")]
    Decode(String),
}
