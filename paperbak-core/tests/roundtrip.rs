use std::fs;
use std::io::Cursor;

use paperbak_core::digest::DigestKind;
use paperbak_core::export::{CodeNaming, DirectoryExporter, Exporter, PaginatedExporter};
use paperbak_core::import::{Importer, TextScanner};
use paperbak_core::progress::NoProgress;
use paperbak_core::reconstruct::Reconstructor;
use paperbak_core::sequencer::ChunkSequencer;
use paperbak_core::text::TextCodec;
use paperbak_core::{BackupOptions, RestoreOptions, backup, decode_frame, restore};
use proptest::prelude::*;

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

#[test]
fn directory_backup_then_restore() {
    let tmp = tempfile::tempdir().unwrap();
    let codes = tmp.path().join("codes");
    let data = sample(1000);

    let opts = BackupOptions {
        chunk_size: 64,
        digest: Some(DigestKind::Sha256),
        ..Default::default()
    };
    let exp = Exporter::Directory(DirectoryExporter::new(&codes, CodeNaming::default()).unwrap());
    let b = backup(&data[..], data.len() as u64, exp, &opts, &mut NoProgress).unwrap();
    assert_eq!(b.frames, 16);
    assert_eq!(fs::read_dir(&codes).unwrap().count(), 16);

    // One code never made it back from the scanner.
    fs::remove_file(codes.join("qr-0003.txt")).unwrap();
    let importer = Importer::for_path(&codes, "qr-*.txt");
    let ropts = RestoreOptions {
        digest: Some(DigestKind::Sha256),
        ..Default::default()
    };
    let (_, r) = restore(
        importer.images().unwrap(),
        &TextScanner,
        Cursor::new(Vec::new()),
        &ropts,
        &mut NoProgress,
    )
    .unwrap();
    assert_eq!(r.frames_applied, 15);
    assert_eq!(r.gaps.len(), 1);
    assert_eq!((r.gaps[0].start, r.gaps[0].end), (128, 192));
    assert_ne!(r.digest, b.digest);
}

#[test]
fn paginated_document_restores_bit_exact() {
    let tmp = tempfile::tempdir().unwrap();
    let doc = tmp.path().join("backup.txt");
    let out = tmp.path().join("restored.bin");
    let data = sample(777);

    for codec in [TextCodec::Base85, TextCodec::Base64, TextCodec::Hex] {
        let opts = BackupOptions {
            chunk_size: 100,
            codec,
            digest: Some(DigestKind::Blake3),
        };
        let exp = Exporter::Paginated(PaginatedExporter::new(&doc, 8, 3, true).unwrap());
        let b = backup(&data[..], data.len() as u64, exp, &opts, &mut NoProgress).unwrap();

        let sink = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&out)
            .unwrap();
        let ropts = RestoreOptions {
            codec,
            digest: Some(DigestKind::Blake3),
            require_complete: true,
            ..Default::default()
        };
        let (_, r) = restore(
            Importer::SingleImage(doc.clone()).images().unwrap(),
            &TextScanner,
            sink,
            &ropts,
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(r.frames_applied, 8);
        assert_eq!(r.rejected.total(), 0);
        assert_eq!(r.digest, b.digest);
        assert_eq!(fs::read(&out).unwrap(), data);
    }
}

#[test]
fn codes_from_the_wrong_codec_are_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let doc = tmp.path().join("backup.txt");
    let exp = Exporter::Paginated(PaginatedExporter::new(&doc, 1, 6, true).unwrap());
    let opts = BackupOptions {
        codec: TextCodec::Hex,
        ..Default::default()
    };
    backup(&b"ABCDEFGH"[..], 8, exp, &opts, &mut NoProgress).unwrap();

    // Hex text is valid base85 but decodes to garbage.
    let (sink, r) = restore(
        Importer::SingleImage(doc).images().unwrap(),
        &TextScanner,
        Cursor::new(Vec::new()),
        &RestoreOptions::default(),
        &mut NoProgress,
    )
    .unwrap();
    assert_eq!(r.frames_applied, 0);
    assert_eq!(r.rejected.total(), 1);
    assert!(sink.into_inner().is_empty());
}

proptest! {
    #[test]
    fn any_permutation_rebuilds_the_file(
        (data, order) in proptest::collection::vec(any::<u8>(), 1..600)
            .prop_flat_map(|d| {
                let n = d.len().div_ceil(16);
                (Just(d), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
            }),
    ) {
        let frames: Vec<Vec<u8>> = ChunkSequencer::new(&data[..], 16)
            .unwrap()
            .map(|c| c.map(|c| c.to_frame()))
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(frames.len(), order.len());

        let mut rec = Reconstructor::new(Cursor::new(Vec::new()));
        for &i in &order {
            let f = decode_frame(&frames[i]).unwrap();
            rec.apply(&f.payload, f.offset).unwrap();
        }
        prop_assert_eq!(rec.finish().unwrap().into_inner(), data);
    }

    #[test]
    fn applying_twice_equals_once(
        payload in proptest::collection::vec(any::<u8>(), 0..64),
        offset in 0u32..256,
    ) {
        let mut once = Reconstructor::new(Cursor::new(Vec::new()));
        once.apply(&payload, offset).unwrap();
        let mut twice = Reconstructor::new(Cursor::new(Vec::new()));
        twice.apply(&payload, offset).unwrap();
        twice.apply(&payload, offset).unwrap();
        prop_assert_eq!(once.finish().unwrap().into_inner(), twice.finish().unwrap().into_inner());
    }
}
