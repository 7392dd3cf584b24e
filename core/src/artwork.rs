/// Thumbnail token iTunes embeds in `artworkUrl100` links.
pub const THUMBNAIL_TOKEN: &str = "100x100bb";

pub const DEFAULT_ARTWORK_SIZE: u32 = 1200;

/// Rewrites an iTunes thumbnail URL to request a `size`x`size` rendition.
///
/// iTunes serves any square size from the same path, so the upscale is a plain
/// token substitution. URLs without the token are returned untouched.
pub fn upscale_artwork(url: &str, size: u32) -> String {
    if !url.contains(THUMBNAIL_TOKEN) {
        return url.to_string();
    }
    url.replace(THUMBNAIL_TOKEN, &format!("{size}x{size}bb"))
}
