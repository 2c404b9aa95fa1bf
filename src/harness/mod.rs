//! End-to-end verification harness.
//!
//! `verify` runs these pieces in order against a live server: rebuild and
//! seed the database, probe the REST surface (including the CORS
//! preflight), then drive a real browser through the search page.
//!
//! | Module      | Responsibility                                       |
//! |-------------|------------------------------------------------------|
//! | `fixture`   | Schema rebuild + the canonical seed rows             |
//! | `probe`     | REST assertions over real HTTP (`ApiProbe`)          |
//! | `webdriver` | Minimal W3C WebDriver client                         |
//! | `ui`        | Search-page flow on top of `webdriver` (`BoxesPage`) |

pub mod fixture;
pub mod probe;
pub mod ui;
pub mod webdriver;
