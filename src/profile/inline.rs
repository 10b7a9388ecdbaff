//! CSV export that embeds every image as a `data:` URI.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::Profile;
use super::csv::to_csv_with_images;
use super::export::ImageSource;
use super::naming::guess_extension;

pub const CSV_WITH_IMAGES_FILE_NAME: &str = "extracted_profiles_with_images.csv";

const OCTET_STREAM: &str = "application/octet-stream";

/// Media type of `bytes`, sniffed from the magic number and falling back
/// to the extension of `reference`.
pub fn media_type(bytes: &[u8], reference: &str) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => return "image/png",
        [0xFF, 0xD8, 0xFF, ..] => return "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => return "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => return "image/webp",
        _ => {}
    }

    let has_extension = reference
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .is_some_and(|file| file.contains('.'));
    if !has_extension {
        return OCTET_STREAM;
    }

    match guess_extension(reference).to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => OCTET_STREAM,
    }
}

/// `data:<media type>;base64,<payload>` for image bytes fetched from
/// `reference`.
pub fn data_uri(bytes: &[u8], reference: &str) -> String {
    format!(
        "data:{};base64,{}",
        media_type(bytes, reference),
        STANDARD.encode(bytes)
    )
}

/// Fetch every profile's image and render the CSV with an `ImageDataURI`
/// column. References that already are `data:` URIs are kept verbatim; a
/// failed fetch leaves the cell empty. `on_progress(i, n)` runs before
/// image `i` of `n` is fetched.
pub async fn csv_with_images<S, P>(profiles: &[Profile], images: &S, mut on_progress: P) -> String
where
    S: ImageSource + ?Sized,
    P: FnMut(usize, usize),
{
    let total = profiles.len();
    let mut failed = 0usize;
    let mut uris = Vec::with_capacity(total);

    for (i, profile) in profiles.iter().enumerate() {
        on_progress(i + 1, total);
        let reference = profile.image.trim();

        let uri = if reference.is_empty() {
            String::new()
        } else if reference.starts_with("data:") {
            reference.to_string()
        } else {
            match images.image(reference).await {
                Some(bytes) => data_uri(&bytes, reference),
                None => {
                    failed += 1;
                    String::new()
                }
            }
        };
        uris.push(uri);
    }

    if failed > 0 {
        log::warn!("{} of {} images could not be embedded", failed, total);
    }
    to_csv_with_images(profiles, &uris)
}
