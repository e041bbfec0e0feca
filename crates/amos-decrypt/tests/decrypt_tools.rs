//! Decryption through the system tools scripts encrypt with

use amos_decrypt::{detect, DecryptError, Decryptor, Envelope, Method};
use amos_test_utils::has_program;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Run `program` with `input` on stdin, feeding it from a thread so large
/// inputs cannot stall against a full stdout pipe
fn run_with_input(program: &str, args: &[&str], input: &str) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;
    let mut stdin = child.stdin.take().unwrap();
    let input = input.to_string();
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));
    let output = child.wait_with_output().unwrap();
    writer.join().unwrap().unwrap();
    output.status.success().then(|| String::from_utf8(output.stdout).unwrap())
}

fn openssl_encrypt(plain: &str, key: &str) -> String {
    run_with_input("openssl", &["enc", "-aes-256-cbc", "-salt", "-base64", "-k", key], plain)
        .expect("openssl encryption succeeds")
}

fn large_report() -> String {
    (0..30_000)
        .map(|i| format!("line {i:05} of collected host output\n"))
        .collect()
}

#[tokio::test]
async fn aes_output_round_trips_through_openssl() {
    if !has_program("openssl") {
        return;
    }
    let cipher = openssl_encrypt("users: admin,guest\n", "s3cret");
    assert_eq!(detect(&cipher), Some(Method::Aes));

    let plain = Decryptor::new().decrypt(Method::Auto, &cipher, "s3cret").await.unwrap();
    assert_eq!(plain, "users: admin,guest\n");
}

#[tokio::test]
async fn aes_with_wrong_key_does_not_yield_plaintext() {
    if !has_program("openssl") {
        return;
    }
    let cipher = openssl_encrypt("users: admin,guest\n", "s3cret");
    let result = Decryptor::new().decrypt(Method::Aes, &cipher, "wrong").await;
    assert!(result.map_or(true, |plain| plain != "users: admin,guest\n"));
}

#[tokio::test]
async fn json_envelope_payload_decrypts() {
    let json = r#"{"timestamp": "2025-06-01", "procedure": "system_info", "encryption": {"enabled": true, "method": "xor"}, "data": ["XOR-ENCRYPTED:MTgwMDFhNDMwZTExNTk1NTBhMTExODprZQ=="]}"#;
    let envelope = Envelope::parse(json).unwrap();
    let plain = Decryptor::new()
        .decrypt(Method::Auto, &envelope.payload(), "key1")
        .await
        .unwrap();
    assert_eq!(plain, "secret data");
}

#[tokio::test]
async fn large_aes_payload_decrypts_within_deadline() {
    if !has_program("openssl") {
        return;
    }
    let plain = large_report();
    assert!(plain.len() > 512 * 1024);
    let cipher = openssl_encrypt(&plain, "s3cret");

    let decrypted = tokio::time::timeout(
        Duration::from_secs(60),
        Decryptor::new()
            .with_timeout(Duration::from_secs(30))
            .decrypt(Method::Aes, &cipher, "s3cret"),
    )
    .await
    .expect("decryption finishes")
    .unwrap();
    assert_eq!(decrypted.len(), plain.len());
    assert!(decrypted == plain);
}

#[tokio::test]
async fn tool_deadline_applies_to_whole_exchange() {
    if !has_program("openssl") {
        return;
    }
    let cipher = openssl_encrypt(&large_report(), "s3cret");
    let result = tokio::time::timeout(
        Duration::from_secs(30),
        Decryptor::new()
            .with_timeout(Duration::from_nanos(1))
            .decrypt(Method::Aes, &cipher, "s3cret"),
    )
    .await
    .expect("deadline fires instead of hanging");
    assert!(matches!(result, Err(DecryptError::TimedOut { tool: "openssl", .. })));
}

#[tokio::test]
async fn gpg_symmetric_output_round_trips() {
    if !has_program("gpg") {
        return;
    }
    let home = tempfile::tempdir().unwrap();
    std::env::set_var("GNUPGHOME", home.path());

    let Some(armored) = run_with_input(
        "gpg",
        &[
            "--batch",
            "--yes",
            "--quiet",
            "--pinentry-mode",
            "loopback",
            "--symmetric",
            "--armor",
            "--cipher-algo",
            "AES256",
            "--passphrase",
            "s3cret",
        ],
        "keychain: login.keychain-db\n",
    ) else {
        // gpg present but unable to run in this environment
        return;
    };
    assert_eq!(detect(&armored), Some(Method::Gpg));

    let plain = Decryptor::new().decrypt(Method::Auto, &armored, "s3cret").await.unwrap();
    assert_eq!(plain, "keychain: login.keychain-db\n");
}
