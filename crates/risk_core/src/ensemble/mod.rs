//! Embedded tree-ensemble classifier
//!
//! Evaluates a pre-trained, JSON-serialized ensemble (random forest or
//! boosted trees) exported with fixed-point thresholds and leaves.
//!
//! # Artifact format
//!
//! ```json
//! {
//!   "version": 1,
//!   "scale": 1000000,
//!   "post_scale": 1000000,
//!   "bias": 0,
//!   "objective": "probability",
//!   "threshold": 500000,
//!   "feature_names": ["LIMIT_BAL", "SEX", "..."],
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"id":0,"left":1,"right":2,"feature_idx":5,"threshold":500000,"leaf":null},
//!         {"id":1,"left":-1,"right":-1,"feature_idx":-1,"threshold":0,"leaf":120000},
//!         {"id":2,"left":-1,"right":-1,"feature_idx":-1,"threshold":0,"leaf":710000}
//!       ],
//!       "weight": 1000000
//!     }
//!   ]
//! }
//! ```
//!
//! # Usage
//!
//! ```rust
//! use credit_risk_core::ensemble::{EnsembleModel, Node, Tree, SCALE};
//!
//! let tree = Tree::new(
//!     vec![
//!         Node::internal(0, 0, SCALE / 2, 1, 2),
//!         Node::leaf(1, 100_000),
//!         Node::leaf(2, 900_000),
//!     ],
//!     SCALE,
//! );
//! let model = EnsembleModel::new(vec![tree], 0, vec![]);
//!
//! let score = model.score(&model.quantize(&[2.0]).unwrap()).unwrap();
//! assert_eq!(model.probability(score), 0.9);
//! ```

pub mod model;
pub mod tree;

pub use model::{load_model, EnsembleModel, Objective, FORMAT_VERSION, SCALE};
pub use tree::{Node, Traversal, Tree};
