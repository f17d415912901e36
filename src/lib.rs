//! roomrec - semantic recommendation engine for small room catalogs.
//!
//! Ranks a caller-supplied catalog of rooms against a free-text query by
//! embedding both with a multilingual model and ordering by cosine
//! similarity. Embeddings are generated locally via fastembed (ONNX runtime);
//! queries in any script the model supports (including CJK) work without
//! extra preprocessing.
//!
//! # Architecture
//!
//! ```text
//! Query ----> Encoder --+
//!                       +--> Ranker --> Vec<Scored>
//! Catalog --> Encoder --+
//! ```
//!
//! - `embeddings`: fastembed wrapper, model lifecycle, shared process handle
//! - `rank`: pure cosine-similarity top-K ranking
//! - `catalog`: item and result records with pass-through display fields
//! - `recommend`: high-level service combining encoder and ranker
//!
//! # Example
//!
//! ```ignore
//! use roomrec::{embeddings, Config, Recommender};
//!
//! let config = Config::default();
//! let encoder = embeddings::shared(&config)?;
//! let recommender = Recommender::new(encoder);
//!
//! let results = recommender.recommend("找一個有溫泉的日式房間", &rooms, 3)?;
//! ```

pub mod catalog;
pub mod config;
pub mod embeddings;
pub mod rank;
pub mod recommend;

pub use catalog::{Item, Scored};
pub use config::Config;
pub use embeddings::{Encoder, EncoderError, EmbeddingModel};
pub use rank::{rank, RankError, Ranked};
pub use recommend::{RecommendError, Recommender};

/// Default embedding model (the multilingual model the catalog descriptions
/// were tuned against; 1024 dimensions)
pub const DEFAULT_MODEL: &str = "multilingual-e5-large";
