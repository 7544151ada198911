use gsea_core::codec::rle::RunLength;
use gsea_core::codec::{Codec, resolve};
use gsea_core::error::CodecError;
use gsea_core::walk::{PathPair, Walker};
use gsea_core::{Action, Algorithm, KeyMaterial, Outcome, RunRequest, TransformOptions, run};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use walkdir::WalkDir;

// ---------- helpers ----------

fn request(input: &Path, tag: &str, action: Action, algorithm: Algorithm) -> RunRequest {
    RunRequest {
        input: input.to_path_buf(),
        output_name: tag.to_string(),
        action,
        algorithm: Some(algorithm),
        key: None,
        options: TransformOptions::default(),
    }
}

fn with_key(mut req: RunRequest, pass: &str) -> RunRequest {
    req.key = Some(KeyMaterial::from_passphrase(pass).unwrap());
    req
}

/// (files, directories) below `root`, root excluded.
fn census(root: &Path) -> (usize, usize) {
    let mut files = 0;
    let mut dirs = 0;
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.unwrap();
        if entry.file_type().is_dir() {
            dirs += 1;
        } else if entry.file_type().is_file() {
            files += 1;
        }
    }
    (files, dirs)
}

fn build_tree(root: &Path) {
    fs::create_dir_all(root.join("sub/deeper")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("a.txt"), b"AAAABBC").unwrap();
    fs::write(root.join("notes"), b"no extension at all").unwrap();
    fs::write(root.join("sub/b.bin"), [0u8, 0, 0, 1, 2, 3, 255, 255]).unwrap();
    fs::write(root.join("sub/deeper/c.tar.gz"), b"nested nested nested").unwrap();
    fs::write(root.join("sub/deeper/zero"), b"").unwrap();
}

// ---------- scenarios ----------

#[test]
fn compress_tree_with_rle() {
    let tmp = tempdir().unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir_all(docs.join("sub")).unwrap();
    fs::write(docs.join("a.txt"), b"AAAABBC").unwrap();
    fs::write(docs.join("sub/b.bin"), [7u8, 7, 7, 9]).unwrap();

    let report = run(&request(&docs, "out", Action::Compress, Algorithm::Rle)).unwrap();
    assert!(report.is_success(), "{:?}", report.report.failures);
    assert_eq!(report.output, tmp.path().join("docs_out"));

    let a = fs::read(tmp.path().join("docs_out/aComprimido.dat")).unwrap();
    assert_eq!(RunLength.decode(&a).unwrap(), b"AAAABBC");
    let b = fs::read(tmp.path().join("docs_out/sub_out/bComprimido.dat")).unwrap();
    assert_eq!(RunLength.decode(&b).unwrap(), vec![7, 7, 7, 9]);

    assert_eq!(report.report.files_ok, 2);
    assert_eq!(report.report.dirs_ok, 2);
    assert_eq!(report.report.bytes_in, 11);
}

#[test]
fn single_file_encrypt_does_not_recurse() {
    let tmp = tempdir().unwrap();
    let plain = tmp.path().join("plain.txt");
    fs::write(&plain, b"attack at dawn").unwrap();

    let report = run(&with_key(
        request(&plain, "sealed.bin", Action::Encrypt, Algorithm::Aes),
        "secret",
    ))
    .unwrap();
    assert!(report.is_success());
    assert_eq!(report.report.files_ok, 1);
    assert_eq!(report.report.dirs_ok, 0);
    // Input plus exactly one output, nothing else created.
    assert_eq!(census(tmp.path()), (2, 0));

    let key = KeyMaterial::from_passphrase("secret").unwrap();
    let codec = resolve(Action::Decrypt, Algorithm::Aes, Some(&key)).unwrap();
    let sealed = fs::read(tmp.path().join("sealed.bin")).unwrap();
    assert_eq!(codec.decode(&sealed).unwrap(), b"attack at dawn");
}

#[test]
fn tree_shape_is_mirrored() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data");
    build_tree(&root);

    for algorithm in [Algorithm::Huffman, Algorithm::Rle, Algorithm::Zstd] {
        let tag = format!("{algorithm}");
        let report = run(&request(&root, &tag, Action::Compress, algorithm)).unwrap();
        assert!(report.is_success(), "{algorithm}: {:?}", report.report.failures);
        assert_eq!(census(&report.output), census(&root), "{algorithm}");
        assert!(report.output.join(format!("sub_{tag}/deeper_{tag}/cComprimido.dat")).is_file());
        assert!(report.output.join(format!("empty_{tag}")).is_dir());
    }
}

#[test]
fn compress_then_decompress_restores_content() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data");
    build_tree(&root);

    let packed = run(&request(&root, "z", Action::Compress, Algorithm::Huffman)).unwrap();
    assert!(packed.is_success());
    let unpacked = run(&request(&packed.output, "u", Action::Decompress, Algorithm::Huffman)).unwrap();
    assert!(unpacked.is_success(), "{:?}", unpacked.report.failures);

    let out = &unpacked.output;
    assert_eq!(out, &tmp.path().join("data_z_u"));
    assert_eq!(
        fs::read(out.join("aComprimido_Descomprimido.desconocido")).unwrap(),
        b"AAAABBC"
    );
    assert_eq!(
        fs::read(out.join("sub_z_u/deeper_z_u/cComprimido_Descomprimido.desconocido")).unwrap(),
        b"nested nested nested"
    );
    assert_eq!(
        fs::read(out.join("sub_z_u/deeper_z_u/zeroComprimido_Descomprimido.desconocido")).unwrap(),
        b""
    );
}

#[test]
fn encrypt_then_decrypt_every_cipher() {
    for algorithm in [Algorithm::Aes, Algorithm::Vigenere, Algorithm::Xor] {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("data");
        build_tree(&root);

        let sealed = run(&with_key(request(&root, "enc", Action::Encrypt, algorithm), "k3y")).unwrap();
        assert!(sealed.is_success(), "{algorithm}");
        assert!(sealed.output.join("a_Cifrado.enc").is_file());

        let opened = run(&with_key(request(&sealed.output, "dec", Action::Decrypt, algorithm), "k3y")).unwrap();
        assert!(opened.is_success(), "{algorithm}: {:?}", opened.report.failures);
        assert_eq!(
            fs::read(opened.output.join("sub_enc_dec/b_Cifrado_Descifrado.dec")).unwrap(),
            vec![0u8, 0, 0, 1, 2, 3, 255, 255],
            "{algorithm}"
        );
    }
}

#[test]
fn wrong_key_is_reported_per_file() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data");
    build_tree(&root);

    let sealed = run(&with_key(request(&root, "enc", Action::Encrypt, Algorithm::Aes), "right")).unwrap();
    let opened = run(&with_key(
        request(&sealed.output, "dec", Action::Decrypt, Algorithm::Aes),
        "wrong",
    ))
    .unwrap();

    assert!(!opened.is_success());
    assert_eq!(opened.report.files_failed, 5);
    assert_eq!(opened.report.files_ok, 0);
    assert!(opened.report.failures.iter().all(|f| f.reason.contains("key mismatch")));
    // Directories are still mirrored; failed files leave nothing behind.
    assert_eq!(census(&opened.output), (0, 3));
}

// ---------- failure isolation ----------

#[test]
fn bad_sibling_does_not_stop_the_others() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("rle");
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("good.dat"), [3u8, b'x', 1, b'y']).unwrap();
    fs::write(root.join("bad.dat"), [1u8, 2, 3]).unwrap();
    fs::write(root.join("sub/fine.dat"), [2u8, b'z']).unwrap();

    let report = run(&request(&root, "plain", Action::Decompress, Algorithm::Rle)).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.report.files_ok, 2);
    assert_eq!(report.report.files_failed, 1);
    assert_eq!(report.report.failures.len(), 1);
    assert!(report.report.failures[0].path.ends_with("bad.dat"));
    // The root holds the bad entry; only `sub` is clean.
    assert_eq!(report.report.dirs_ok, 1);
    assert_eq!(report.report.dirs_failed, 1);

    let out = &report.output;
    assert_eq!(fs::read(out.join("good_Descomprimido.desconocido")).unwrap(), b"xxxy");
    assert_eq!(fs::read(out.join("sub_plain/fine_Descomprimido.desconocido")).unwrap(), b"zz");
    assert!(!out.join("bad_Descomprimido.desconocido").exists());
}

#[cfg(unix)]
#[test]
fn symlinks_are_skipped_and_reported() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("links");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("real.txt"), b"real").unwrap();
    std::os::unix::fs::symlink(root.join("real.txt"), root.join("alias.txt")).unwrap();

    let report = run(&request(&root, "out", Action::Compress, Algorithm::Rle)).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.report.skipped, 1);
    assert_eq!(report.report.files_ok, 1);
    assert!(report.output.join("realComprimido.dat").is_file());
}

#[test]
fn existing_output_dir_needs_overwrite() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("docs");
    build_tree(&root);

    let first = run(&request(&root, "out", Action::Compress, Algorithm::Rle)).unwrap();
    assert!(first.is_success());

    let again = run(&request(&root, "out", Action::Compress, Algorithm::Rle)).unwrap();
    assert!(!again.is_success());
    assert_eq!(again.report.dirs_failed, 1);
    assert_eq!(again.report.files_ok, 0);

    let mut req = request(&root, "out", Action::Compress, Algorithm::Rle);
    req.options.overwrite = true;
    let forced = run(&req).unwrap();
    assert!(forced.is_success(), "{:?}", forced.report.failures);
    assert_eq!(forced.report.files_ok, 5);
}

/// Copies its input, except that it panics on the exact bytes `bad`.
struct PanicsOnBad;

impl Codec for PanicsOnBad {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rle
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        if input == b"bad" {
            panic!("codec blew up");
        }
        Ok(input.to_vec())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.encode(input)
    }
}

#[test]
fn panicking_worker_is_abnormal_and_fails_its_parents() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("r");
    fs::create_dir_all(root.join("s")).unwrap();
    fs::write(root.join("good.txt"), b"good").unwrap();
    fs::write(root.join("s/x"), b"bad").unwrap();
    fs::write(root.join("s/y"), b"fine").unwrap();

    let options = TransformOptions::default();
    let walker = Walker::new(&PanicsOnBad, Action::Compress, "o", &options);
    let out = tmp.path().join("r_o");
    let result = walker.walk(PathPair {
        input: root.clone(),
        output: out.clone(),
    });

    assert!(matches!(result.outcome, Outcome::Failed(_)));
    assert_eq!(result.report.abnormal, 1);
    assert_eq!(result.report.files_ok, 2);
    assert_eq!(result.report.dirs_ok, 0);
    assert_eq!(result.report.dirs_failed, 2);
    assert_eq!(result.report.failures.len(), 1);
    assert!(result.report.failures[0].abnormal);
    assert!(result.report.failures[0].reason.contains("codec blew up"));

    assert_eq!(fs::read(out.join("goodComprimido.dat")).unwrap(), b"good");
    assert_eq!(fs::read(out.join("s_o/yComprimido.dat")).unwrap(), b"fine");
    assert!(!out.join("s_o/xComprimido.dat").exists());
}

#[test]
fn unopenable_input_creates_no_output() {
    let tmp = tempdir().unwrap();
    let options = TransformOptions::default();
    let walker = Walker::new(&RunLength, Action::Compress, "o", &options);
    let out = tmp.path().join("ghost_o");
    let result = walker.walk(PathPair {
        input: tmp.path().join("ghost"),
        output: out.clone(),
    });

    assert!(matches!(result.outcome, Outcome::Failed(ref r) if r.starts_with("open failed")));
    assert_eq!(result.report.dirs_failed, 1);
    assert_eq!(result.report.dirs_ok, 0);
    assert!(!out.exists());
}

// ---------- naming ----------

#[test]
fn colliding_stems_get_distinct_outputs() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("clash");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), b"one").unwrap();
    fs::write(root.join("a.md"), b"two").unwrap();
    fs::write(root.join("a"), b"three").unwrap();

    let report = run(&request(&root, "out", Action::Compress, Algorithm::Rle)).unwrap();
    assert!(report.is_success());
    assert_eq!(census(&report.output), (3, 0));

    // Sorted order: "a", "a.md", "a.txt".
    let decoded = |name: &str| RunLength.decode(&fs::read(report.output.join(name)).unwrap()).unwrap();
    assert_eq!(decoded("aComprimido.dat"), b"three");
    assert_eq!(decoded("a~1Comprimido.dat"), b"two");
    assert_eq!(decoded("a~2Comprimido.dat"), b"one");
}

// ---------- scheduling ----------

#[test]
fn zero_permits_run_everything_inline() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data");
    build_tree(&root);

    let mut req = request(&root, "out", Action::Compress, Algorithm::Zstd);
    req.options.max_in_flight = 0;
    let report = run(&req).unwrap();
    assert!(report.is_success());
    // Every entry below the root: 5 files and 3 directories.
    assert_eq!(report.report.inline_fallbacks, 8);
    assert_eq!(census(&report.output), census(&root));
}

#[test]
fn one_thread_handles_deep_nesting() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("deep");
    let mut dir = root.clone();
    for level in 0..12 {
        dir = dir.join(format!("l{level}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("f.txt"), format!("level {level}")).unwrap();
    }

    let mut req = request(&root, "o", Action::Compress, Algorithm::Rle);
    req.options.threads = 1;
    req.options.max_in_flight = 2;
    let report = run(&req).unwrap();
    assert!(report.is_success());
    assert_eq!(report.report.files_ok, 12);
    assert_eq!(report.report.dirs_ok, 13);
}

#[test]
fn sequential_walker_matches_parallel_output() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data");
    build_tree(&root);

    let codec = RunLength;
    let options = TransformOptions::default();
    let walker = Walker::new(&codec, Action::Compress, "seq", &options).sequential();
    let result = walker.walk(PathPair {
        input: root.clone(),
        output: tmp.path().join("data_seq"),
    });
    assert!(result.outcome.is_success());
    assert_eq!(result.report.inline_fallbacks, 8);

    let parallel = run(&request(&root, "par", Action::Compress, Algorithm::Rle)).unwrap();
    assert_eq!(
        fs::read(tmp.path().join("data_seq/sub_seq/bComprimido.dat")).unwrap(),
        fs::read(parallel.output.join("sub_par/bComprimido.dat")).unwrap()
    );
}
