//! Box Factory — inventory service back-end.
//!
//! ## Overview
//!
//! The factory subsystem serves the box inventory over REST from a Postgres
//! `box_factory.boxes` table, ships a self-contained search page, and
//! exposes the store primitives the verification harness uses to rebuild
//! and seed the database.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, CORS, ServerConfig)│
//! │ (browser)│ <─────── │    └─ api.rs  (route handlers, AppState)     │
//! └──────────┘          │         │                                    │
//!                       │         │ Arc<dyn BoxStore>                  │
//!                       │         v                                    │
//!                       │  store.rs  (BoxStore trait, MemoryStore)     │
//!                       │  pg.rs     (PgStore, box_factory schema)     │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module     | Responsibility                                       |
//! |------------|------------------------------------------------------|
//! | `models`   | Shared types: `BoxRecord`, `BoxPayload`, value enums |
//! | `embedded` | Statically embeds the search page (`rust-embed`)     |
//!
//! ## Typical Request Flow (search)
//!
//! 1. `GET /api/boxes?searchTerm=Red` → `api::search_boxes()`
//! 2. The handler passes the term to `BoxStore::search()`, which runs a
//!    case-insensitive substring match across size, material and color
//!    (`ILIKE` in Postgres, `contains` on lowercased fields in memory) and
//!    returns rows ordered by id.
//! 3. Rows serialize back as a JSON array; the embedded page renders one
//!    `.box-card` per element.

pub mod api;
pub mod embedded;
pub mod models;
pub mod pg;
pub mod server;
pub mod store;
