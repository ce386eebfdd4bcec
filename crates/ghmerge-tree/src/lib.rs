//! Whole-tree content fingerprinting.
//!
//! The fingerprint is the tamper-detection oracle around the
//! human-supervised build/test window: it is computed after the merge is
//! constructed, recomputed after verification, and any difference aborts
//! the session. It is also embedded in the final commit message as the
//! `Tree-SHA512:` trailer so the merge can be re-verified independently.
//!
//! Two commits fingerprint equal iff their (path, content) sets are
//! identical. File modes, timestamps, and on-disk iteration order do not
//! participate.

pub mod error;
pub mod fingerprint;

pub use error::{TreeError, TreeResult};
pub use fingerprint::{symlink_paths, tree_sha512};
