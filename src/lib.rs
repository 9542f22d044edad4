//! linkaudit: audit hyperlinks in text documents
//!
//! Two engines:
//! - verify: extract every URL from a document and probe them in parallel
//! - replace: search and rank replacement candidates for a dead URL

pub mod check;
pub mod extract;
pub mod http;
pub mod replace;
pub mod score;
pub mod strategy;
pub mod verify;

pub use check::{check_url, Category, CheckOutcome};
pub use extract::{extract_references, Reference};
pub use replace::{find_replacements, rank_candidates, ReplaceReport};
pub use score::{score_candidate, AuthorityTable, Candidate};
pub use verify::{verify_links, VerifiedLink, VerifyConfig, VerifyReport};
