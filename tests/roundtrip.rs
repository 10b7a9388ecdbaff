use std::io::{Cursor, Read};
use std::sync::Arc;

use storezip::zip::{ArchiveEntry, ZipExtractor, crc32, encode, encoded_len};
use storezip::MemoryReader;

fn sample_entries() -> Vec<ArchiveEntry> {
    vec![
        ArchiveEntry::new("extracted_profiles.csv", "Name,Location,Age,Bio,ImageURL\n\"Ana\",\"\",\"29\",\"\",\"\""),
        ArchiveEntry::new("images/img_1.jpg", (0..=255u8).cycle().take(5000).collect::<Vec<_>>()),
        ArchiveEntry::new("images/img_2_failed.txt", "Failed to fetch image: https://x/b.png"),
        ArchiveEntry::new("empty.bin", Vec::new()),
        ArchiveEntry::new("nested/dir/notes.txt", "line one\nline two"),
    ]
}

fn size_law(entries: &[ArchiveEntry]) -> usize {
    entries
        .iter()
        .map(|e| (30 + e.name.len() + e.content.len()) + (46 + e.name.len()))
        .sum::<usize>()
        + 22
}

#[test]
fn standard_reader_recovers_every_entry() {
    let entries = sample_entries();
    let bytes = encode(&entries).unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), entries.len());

    for (i, expected) in entries.iter().enumerate() {
        let mut file = archive.by_index(i).unwrap();
        assert_eq!(file.name(), expected.name);
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);
        assert_eq!(file.size(), expected.content.len() as u64);
        assert_eq!(file.compressed_size(), expected.content.len() as u64);
        assert_eq!(file.crc32(), crc32(&expected.content));

        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(content, expected.content);
    }
}

#[test]
fn standard_reader_opens_empty_archive() {
    let bytes = encode(&[]).unwrap();
    assert_eq!(bytes.len(), 22);
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 0);
}

#[test]
fn two_entry_scenario() {
    let entries = [
        ArchiveEntry::new("a.txt", "hi"),
        ArchiveEntry::new("b.txt", Vec::new()),
    ];
    let bytes = encode(&entries).unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
    let mut a = String::new();
    archive.by_name("a.txt").unwrap().read_to_string(&mut a).unwrap();
    assert_eq!(a, "hi");
    let mut b = String::new();
    archive.by_name("b.txt").unwrap().read_to_string(&mut b).unwrap();
    assert_eq!(b, "");
    assert_eq!(archive.by_index(1).unwrap().crc32(), 0);

    let rt = tokio::runtime::Runtime::new().unwrap();
    let listed = rt
        .block_on(ZipExtractor::new(Arc::new(MemoryReader::new(bytes))).list_files())
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].lfh_offset, 0);
    assert_eq!(listed[1].lfh_offset, 37);
}

#[test]
fn signatures_and_size_law() {
    let entries = sample_entries();
    let bytes = encode(&entries).unwrap();

    assert_eq!(&bytes[..4], &0x04034b50u32.to_le_bytes());
    assert_eq!(&bytes[bytes.len() - 22..][..4], &0x06054b50u32.to_le_bytes());
    assert_eq!(bytes.len(), size_law(&entries));
    assert_eq!(encoded_len(&entries), bytes.len() as u64);
}

#[test]
fn encoding_is_deterministic() {
    let entries = sample_entries();
    assert_eq!(encode(&entries).unwrap(), encode(&entries).unwrap());

    let mut reordered = entries.clone();
    reordered.swap(0, 1);
    assert_ne!(encode(&entries).unwrap(), encode(&reordered).unwrap());
}

#[tokio::test]
async fn own_reader_verifies_archive() {
    let entries = sample_entries();
    let bytes = encode(&entries).unwrap();
    let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(bytes)));

    let listed = extractor.list_files().await.unwrap();
    let names: Vec<&str> = listed.iter().map(|e| e.file_name.as_str()).collect();
    let expected: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, expected);

    let mut offset = 0u64;
    for (entry, input) in listed.iter().zip(&entries) {
        assert_eq!(entry.lfh_offset, offset);
        assert_eq!(entry.last_mod_time, 0);
        assert_eq!(entry.last_mod_date, 0);
        assert_eq!(extractor.extract_to_memory(entry).await.unwrap(), input.content);
        offset += 30 + input.name.len() as u64 + input.content.len() as u64;
    }

    let report = extractor.verify().await.unwrap();
    assert!(report.is_ok());
    assert_eq!(report.ok.len(), entries.len());
}

#[tokio::test]
async fn utf8_names_round_trip_through_own_reader() {
    let name = "ünïcødé/名前.txt";
    let bytes = encode(&[ArchiveEntry::new(name, "utf-8 name")]).unwrap();
    assert_eq!(bytes.len(), size_law(&[ArchiveEntry::new(name, "utf-8 name")]));

    let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(bytes)));
    let listed = extractor.list_files().await.unwrap();
    assert_eq!(listed[0].file_name, name);
    assert_eq!(extractor.extract_to_memory(&listed[0]).await.unwrap(), b"utf-8 name");
}

#[tokio::test]
async fn duplicate_names_are_both_readable() {
    let entries = [
        ArchiveEntry::new("same.txt", "first"),
        ArchiveEntry::new("same.txt", "second"),
    ];
    let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(encode(&entries).unwrap())));
    let listed = extractor.list_files().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(extractor.extract_to_memory(&listed[0]).await.unwrap(), b"first");
    assert_eq!(extractor.extract_to_memory(&listed[1]).await.unwrap(), b"second");
}

#[tokio::test]
async fn corrupted_content_fails_verification() {
    let entries = [
        ArchiveEntry::new("a.txt", "hello"),
        ArchiveEntry::new("b.txt", "world"),
    ];
    let mut bytes = encode(&entries).unwrap();
    // first content byte of b.txt
    let b_data = (30 + 5 + 5) + 30 + 5;
    bytes[b_data] ^= 0x20;

    let report = ZipExtractor::new(Arc::new(MemoryReader::new(bytes)))
        .verify()
        .await
        .unwrap();
    assert_eq!(report.ok, ["a.txt"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "b.txt");
    assert!(report.failed[0].1.contains("CRC-32 mismatch"));
}

#[tokio::test]
async fn rejects_non_archives() {
    let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(b"not a zip file at all".to_vec())));
    assert!(extractor.list_files().await.is_err());

    let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(Vec::new())));
    assert!(extractor.list_files().await.is_err());
}

#[tokio::test]
async fn finds_eocd_behind_comment() {
    let mut bytes = encode(&[ArchiveEntry::new("a.txt", "hi")]).unwrap();
    let eocd = bytes.len() - 22;
    let comment = b"exported by storezip";
    bytes[eocd + 20..eocd + 22].copy_from_slice(&(comment.len() as u16).to_le_bytes());
    bytes.extend_from_slice(comment);

    let listed = ZipExtractor::new(Arc::new(MemoryReader::new(bytes)))
        .list_files()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].file_name, "a.txt");
}

#[tokio::test]
async fn full_entry_count_is_not_mistaken_for_zip64() {
    let entries: Vec<ArchiveEntry> = (0..u16::MAX as usize)
        .map(|i| ArchiveEntry::new(format!("{:x}", i), Vec::new()))
        .collect();
    let bytes = encode(&entries).unwrap();
    assert_eq!(&bytes[bytes.len() - 12..bytes.len() - 10], &[0xFF, 0xFF]);

    let archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
    assert_eq!(archive.len(), entries.len());

    let report = ZipExtractor::new(Arc::new(MemoryReader::new(bytes)))
        .verify()
        .await
        .unwrap();
    assert!(report.is_ok());
    assert_eq!(report.ok.len(), u16::MAX as usize);
}

#[tokio::test]
async fn rejects_archive_with_zip64_locator() {
    // ZIP64 locator followed by an EOCD whose counts carry the sentinels
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x07064b50u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 16]);
    bytes.extend_from_slice(&0x06054b50u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 4]);
    bytes.extend_from_slice(&[0xFF; 4]);
    bytes.extend_from_slice(&[0u8; 10]);
    assert_eq!(bytes.len(), 20 + 22);

    let err = ZipExtractor::new(Arc::new(MemoryReader::new(bytes)))
        .list_files()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ZIP64"));
}
