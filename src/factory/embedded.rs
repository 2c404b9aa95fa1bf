//! Search page baked into the binary at build time.

use rust_embed::RustEmbed;

/// Everything under `ui/` ships inside the executable, so `serve` runs from
/// a bare binary with no asset directory next to it.
#[derive(RustEmbed)]
#[folder = "ui/"]
pub struct Assets;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_page_is_embedded() {
        let index = Assets::get("index.html").expect("index.html embedded");
        let html = String::from_utf8_lossy(&index.data);
        assert!(html.contains("search text"));
        assert!(html.contains("box-card"));
    }
}
