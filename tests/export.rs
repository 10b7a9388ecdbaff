use std::io::{Cursor, Read};

use storezip::profile::csv::to_csv;
use storezip::profile::csv_with_images;
use storezip::{ExportBundle, Fetcher, ProfileSet};

#[tokio::test]
async fn bundle_holds_csv_and_local_images() {
    let dir = tempfile::tempdir().unwrap();
    let ana = dir.path().join("ana.jpg");
    std::fs::write(&ana, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

    let json = serde_json::json!([
        { "name": "Ana", "age": "29", "bio": "coffee, \"books\"", "image": ana.to_str().unwrap() },
        { "name": "Ana", "age": "29", "image": ana.to_str().unwrap() },
        { "name": "Bea", "image": dir.path().join("missing.png").to_str().unwrap() },
    ])
    .to_string();
    let profiles = ProfileSet::from_json(&json).unwrap();
    assert_eq!(profiles.len(), 2);

    let fetcher = Fetcher::new().unwrap();
    let bytes = ExportBundle::new(profiles.as_slice())
        .build(&fetcher, |_, _| {})
        .await
        .unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "extracted_profiles.csv",
            "images/img_1.jpg",
            "images/img_2_failed.txt"
        ]
    );

    let mut csv = String::new();
    archive
        .by_name("extracted_profiles.csv")
        .unwrap()
        .read_to_string(&mut csv)
        .unwrap();
    assert_eq!(csv, to_csv(profiles.as_slice()));
    assert!(csv.contains("\"coffee, \"\"books\"\"\""));

    let mut image = Vec::new();
    archive
        .by_name("images/img_1.jpg")
        .unwrap()
        .read_to_end(&mut image)
        .unwrap();
    assert_eq!(image, [0xFF, 0xD8, 0xFF, 0xE0]);

    let mut failed = String::new();
    archive
        .by_name("images/img_2_failed.txt")
        .unwrap()
        .read_to_string(&mut failed)
        .unwrap();
    assert!(failed.starts_with("Failed to fetch image: "));
    assert!(failed.ends_with("missing.png"));
}

#[tokio::test]
async fn csv_with_inlined_images() {
    let dir = tempfile::tempdir().unwrap();
    let face = dir.path().join("face.png");
    std::fs::write(&face, b"\x89PNG\r\n\x1a\n").unwrap();

    let json = serde_json::json!([
        { "name": "Ana", "image": face.to_str().unwrap() },
        { "name": "Bea", "image": "data:image/gif;base64,R0lGODlh" },
        { "name": "Cy", "image": dir.path().join("missing.png").to_str().unwrap() },
    ])
    .to_string();
    let profiles = ProfileSet::from_json(&json).unwrap();

    let fetcher = Fetcher::new().unwrap();
    let csv = csv_with_images(profiles.as_slice(), &fetcher, |_, _| {}).await;
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with(",ImageDataURI"));
    assert!(lines[1].ends_with(",\"data:image/png;base64,iVBORw0KGgo=\""));
    assert!(lines[2].ends_with(",\"data:image/gif;base64,R0lGODlh\""));
    assert!(lines[3].ends_with(",\"\""));
}
