mod load;
mod node;
mod tree;
mod universe;

pub use load::{UniverseTrees, load_universe_trees, parse_tree};
pub use node::{ContentType, KnowledgeNode};
pub use tree::{KnowledgeTree, TreeNode};
pub use universe::UniverseId;
