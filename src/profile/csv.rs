//! CSV rendering of profile rows.
//!
//! Every cell is quoted and embedded quotes are doubled, so commas and
//! newlines in bios survive. Rows are joined by `\n` without a trailing
//! newline.

use super::Profile;

pub const HEADER: [&str; 5] = ["Name", "Location", "Age", "Bio", "ImageURL"];

/// Extra column of the CSV that embeds each image as a data URI.
pub const DATA_URI_COLUMN: &str = "ImageDataURI";

/// Media type for the CSV export.
pub const MEDIA_TYPE: &str = "text/csv;charset=utf-8";

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn row(profile: &Profile, extra: Option<&str>) -> String {
    [
        profile.name.as_str(),
        profile.location.as_str(),
        profile.age.as_str(),
        profile.bio.as_str(),
        profile.image.as_str(),
    ]
    .into_iter()
    .chain(extra)
    .map(quote)
    .collect::<Vec<_>>()
    .join(",")
}

pub fn to_csv(profiles: &[Profile]) -> String {
    let mut lines = Vec::with_capacity(profiles.len() + 1);
    lines.push(HEADER.join(","));
    lines.extend(profiles.iter().map(|p| row(p, None)));
    lines.join("\n")
}

/// Like [`to_csv`] with a trailing `ImageDataURI` column. `data_uris[i]`
/// belongs to `profiles[i]`; missing values leave the cell empty.
pub fn to_csv_with_images(profiles: &[Profile], data_uris: &[String]) -> String {
    let mut lines = Vec::with_capacity(profiles.len() + 1);
    lines.push(format!("{},{}", HEADER.join(","), DATA_URI_COLUMN));
    lines.extend(profiles.iter().enumerate().map(|(i, p)| {
        row(p, Some(data_uris.get(i).map(String::as_str).unwrap_or_default()))
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_only_when_empty() {
        assert_eq!(to_csv(&[]), "Name,Location,Age,Bio,ImageURL");
    }

    #[test]
    fn quotes_every_cell() {
        let profile = Profile {
            name: "Ana \"Banana\"".into(),
            age: "29".into(),
            bio: "likes, commas\nand lines".into(),
            image: "https://x/a.jpg".into(),
            ..Default::default()
        };
        assert_eq!(
            to_csv(&[profile]),
            "Name,Location,Age,Bio,ImageURL\n\
             \"Ana \"\"Banana\"\"\",\"\",\"29\",\"likes, commas\nand lines\",\"https://x/a.jpg\""
        );
    }

    #[test]
    fn data_uri_column() {
        let profiles = [
            Profile {
                name: "Ana".into(),
                image: "https://x/a.png".into(),
                ..Default::default()
            },
            Profile {
                name: "Bea".into(),
                ..Default::default()
            },
        ];
        let csv = to_csv_with_images(&profiles, &["data:image/png;base64,iVBORw0K".into()]);
        assert_eq!(
            csv,
            "Name,Location,Age,Bio,ImageURL,ImageDataURI\n\
             \"Ana\",\"\",\"\",\"\",\"https://x/a.png\",\"data:image/png;base64,iVBORw0K\"\n\
             \"Bea\",\"\",\"\",\"\",\"\",\"\""
        );
        assert_eq!(to_csv_with_images(&[], &[]), "Name,Location,Age,Bio,ImageURL,ImageDataURI");
    }
}
