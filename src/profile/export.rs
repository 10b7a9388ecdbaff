use anyhow::Result;
use async_trait::async_trait;

use super::Profile;
use super::csv::to_csv;
use super::naming::{failed_file_name, failed_message, image_file_name};
use crate::io::Fetcher;
use crate::zip::ArchiveBuilder;

pub const CSV_FILE_NAME: &str = "extracted_profiles.csv";
pub const IMAGES_FOLDER: &str = "images";

/// Provider of image bytes for an export.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Bytes behind `reference`, or `None` if they could not be obtained.
    async fn image(&self, reference: &str) -> Option<Vec<u8>>;
}

#[async_trait]
impl ImageSource for Fetcher {
    async fn image(&self, reference: &str) -> Option<Vec<u8>> {
        self.fetch(reference).await
    }
}

/// The ZIP export of a set of profiles.
///
/// Layout: `extracted_profiles.csv` first, then `images/img_<n>.<ext>` for
/// every profile in row order (`n` starts at 1). A profile whose image
/// cannot be fetched gets `images/img_<n>_failed.txt` instead, so the
/// numbering always lines up with the CSV rows.
pub struct ExportBundle<'a> {
    profiles: &'a [Profile],
    include_images: bool,
}

impl<'a> ExportBundle<'a> {
    pub fn new(profiles: &'a [Profile]) -> Self {
        Self {
            profiles,
            include_images: true,
        }
    }

    /// Leave the `images/` folder out.
    pub fn without_images(mut self) -> Self {
        self.include_images = false;
        self
    }

    /// Gather all entries. `on_progress(i, n)` runs before image `i` of `n`
    /// is fetched.
    pub async fn collect<S, P>(&self, images: &S, mut on_progress: P) -> ArchiveBuilder
    where
        S: ImageSource + ?Sized,
        P: FnMut(usize, usize),
    {
        let mut zip = ArchiveBuilder::new();
        zip.file(CSV_FILE_NAME, to_csv(self.profiles));

        if !self.include_images {
            return zip;
        }

        let total = self.profiles.len();
        let mut failed = 0usize;
        let mut folder = zip.folder(IMAGES_FOLDER);
        for (i, profile) in self.profiles.iter().enumerate() {
            let index = i + 1;
            on_progress(index, total);
            log::info!("Fetching image {}/{}", index, total);

            match images.image(&profile.image).await {
                Some(bytes) => {
                    folder.file(&image_file_name(index, &profile.image), bytes);
                }
                None => {
                    failed += 1;
                    folder.file(&failed_file_name(index), failed_message(&profile.image));
                }
            }
        }

        if failed > 0 {
            log::warn!("{} of {} images could not be fetched", failed, total);
        }
        zip
    }

    /// Gather all entries and encode the archive.
    pub async fn build<S, P>(&self, images: &S, on_progress: P) -> Result<Vec<u8>>
    where
        S: ImageSource + ?Sized,
        P: FnMut(usize, usize),
    {
        let zip = self.collect(images, on_progress).await;
        Ok(zip.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedImages(HashMap<&'static str, Vec<u8>>);

    #[async_trait]
    impl ImageSource for FixedImages {
        async fn image(&self, reference: &str) -> Option<Vec<u8>> {
            self.0.get(reference).cloned()
        }
    }

    fn profiles() -> Vec<Profile> {
        vec![
            Profile {
                name: "Ana".into(),
                image: "https://x/ana.jpg?w=1".into(),
                ..Default::default()
            },
            Profile {
                name: "Bea".into(),
                image: "https://x/gone.webp".into(),
                ..Default::default()
            },
            Profile {
                name: "Cy".into(),
                ..Default::default()
            },
        ]
    }

    #[tokio::test]
    async fn lays_out_csv_then_images() {
        let images = FixedImages(HashMap::from([("https://x/ana.jpg?w=1", vec![0xFF, 0xD8])]));
        let profiles = profiles();
        let mut seen = Vec::new();
        let zip = ExportBundle::new(&profiles)
            .collect(&images, |i, n| seen.push((i, n)))
            .await;

        let names: Vec<&str> = zip.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "extracted_profiles.csv",
                "images/img_1.jpg",
                "images/img_2_failed.txt",
                "images/img_3_failed.txt",
            ]
        );
        assert_eq!(zip.entries()[1].content, vec![0xFF, 0xD8]);
        assert_eq!(
            zip.entries()[2].content,
            b"Failed to fetch image: https://x/gone.webp".to_vec()
        );
        assert_eq!(seen, [(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn csv_only_bundle() {
        let images = FixedImages(HashMap::new());
        let profiles = profiles();
        let zip = ExportBundle::new(&profiles)
            .without_images()
            .collect(&images, |_, _| {})
            .await;
        assert_eq!(zip.len(), 1);
        assert!(
            String::from_utf8_lossy(&zip.entries()[0].content).starts_with("Name,Location,Age")
        );
    }

    #[tokio::test]
    async fn build_encodes_archive() {
        let images = FixedImages(HashMap::new());
        let profiles = profiles();
        let bytes = ExportBundle::new(&profiles)
            .build(&images, |_, _| {})
            .await
            .unwrap();
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }
}
