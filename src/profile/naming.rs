//! File names used for images inside the export archive.

/// Longest extension kept from an image URL.
const MAX_EXT_LEN: usize = 6;

/// `img_<index>.<ext>`, with the extension guessed from the URL path.
///
/// ```
/// use storezip::profile::naming::image_file_name;
///
/// assert_eq!(image_file_name(3, "https://cdn.x/p/abc.jpeg?w=200"), "img_3.jpeg");
/// assert_eq!(image_file_name(1, ""), "img_1.png");
/// ```
pub fn image_file_name(index: usize, url: &str) -> String {
    format!("img_{}.{}", index, guess_extension(url))
}

/// Text after the last `.` of the URL's final path segment (query and
/// fragment removed), cut to six characters; `png` when there is none.
pub fn guess_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let file = path.rsplit('/').next().unwrap_or_default();
    let ext = file.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    let ext: String = ext.chars().take(MAX_EXT_LEN).collect();
    if ext.is_empty() { "png".to_string() } else { ext }
}

/// Name of the text entry written when an image could not be fetched.
pub fn failed_file_name(index: usize) -> String {
    format!("img_{}_failed.txt", index)
}

pub fn failed_message(url: &str) -> String {
    format!("Failed to fetch image: {}", url)
}
