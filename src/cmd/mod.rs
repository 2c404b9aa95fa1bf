//! CLI command implementations.
//!
//! Each command gets its own module:
//!
//! | Module   | Commands handled    |
//! |----------|---------------------|
//! | `serve`  | `serve`             |
//! | `db`     | `rebuild`, `seed`   |
//! | `verify` | `verify`            |

pub mod db;
pub mod serve;
pub mod verify;

pub use db::{cmd_rebuild, cmd_seed};
pub use serve::cmd_serve;
pub use verify::cmd_verify;
