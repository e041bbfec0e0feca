//! Interactive decryption session
//!
//! Prompts for method, key and payload, decrypts, and repeats while the
//! user answers `y`. Generic over the streams so sessions can be scripted.

use crate::decryptor::Decryptor;
use crate::envelope::Envelope;
use crate::method::Method;
use std::io::{self, BufRead, Write};

const RULE_WIDTH: usize = 50;

/// Read one line without its terminator; `None` at end of input
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> io::Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;
    read_line(input)
}

/// Payload lines up to the first blank line after some data
fn read_payload<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut lines: Vec<String> = Vec::new();
    while let Some(line) = read_line(input)? {
        if line.trim().is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n").trim().to_string())
}

/// Run the session until the user stops or input ends; returns the number
/// of successful decryptions
///
/// # Errors
/// Returns error only when reading or writing the streams fails
pub async fn run_interactive<R: BufRead, W: Write>(
    decryptor: &Decryptor,
    mut input: R,
    mut out: W,
) -> io::Result<usize> {
    writeln!(out, "=== Interactive Decryption ===")?;
    writeln!(out, "Supported methods: aes, gpg, xor, auto")?;
    writeln!(out)?;

    let mut decrypted = 0;
    loop {
        let Some(method) = prompt(&mut input, &mut out, "Encryption method (aes/gpg/xor/auto) [auto]: ")? else {
            break;
        };
        let method = if method.trim().is_empty() {
            Method::Auto
        } else {
            match method.parse::<Method>() {
                Ok(method) => method,
                Err(e) => {
                    writeln!(out, "Error: {e}")?;
                    continue;
                }
            }
        };

        let Some(key) = prompt(&mut input, &mut out, "Decryption key: ")? else {
            break;
        };
        let key = key.trim().to_string();
        if key.is_empty() {
            writeln!(out, "Error: Key cannot be empty")?;
            continue;
        }

        writeln!(out, "Enter encrypted data (finish with an empty line):")?;
        let mut data = read_payload(&mut input)?;
        if data.is_empty() {
            writeln!(out, "Error: No data provided")?;
            continue;
        }

        if data.starts_with('{') {
            match Envelope::parse(&data) {
                Ok(envelope) => {
                    writeln!(out, "\n=== Metadata ===")?;
                    for (name, value) in envelope.metadata() {
                        writeln!(out, "{name}: {value}")?;
                    }
                    data = envelope.payload();
                }
                Err(e) => {
                    writeln!(out, "JSON parsing error: {e}")?;
                    continue;
                }
            }
        }

        match decryptor.decrypt(method, &data, &key).await {
            Ok(plain) => {
                writeln!(out, "\n=== Decrypted Data ===")?;
                writeln!(out, "{}", plain.trim_end_matches('\n'))?;
                writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
                decrypted += 1;
            }
            Err(e) => writeln!(out, "Decryption error: {e}")?,
        }

        let again = prompt(&mut input, &mut out, "\nDecrypt another? (y/N): ")?;
        if !again.is_some_and(|a| a.trim().eq_ignore_ascii_case("y")) {
            break;
        }
    }
    writeln!(out, "Exiting...")?;
    Ok(decrypted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    async fn session(script: &str) -> (usize, String) {
        let mut out = Vec::new();
        let count = run_interactive(&Decryptor::new(), Cursor::new(script.to_string()), &mut out)
            .await
            .unwrap();
        (count, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn decrypts_until_user_declines() {
        let (count, out) = session("xor\nk\nXOR-ENCRYPTED:MDMwMjpr\n\ny\nxor\nk\n0302\n\nn\n").await;
        assert_eq!(count, 2);
        assert_eq!(out.matches("=== Decrypted Data ===\nhi\n").count(), 2);
        assert!(out.ends_with("Exiting...\n"));
    }

    #[tokio::test]
    async fn envelope_metadata_is_shown() {
        let json = r#"{"jobId": "a1b2", "encryption": {"method": "xor"}, "data": ["XOR-ENCRYPTED:MDMwMjpr"]}"#;
        let (count, out) = session(&format!("\nk\n{json}\n\n")).await;
        assert_eq!(count, 1);
        assert!(out.contains("jobId: \"a1b2\""));
        assert!(out.contains("\nhi\n"));
    }

    #[tokio::test]
    async fn bad_answers_reprompt() {
        let (count, out) = session("rot13\nxor\n\nxor\nk\n\n\nzz\n\n").await;
        assert_eq!(count, 0);
        assert!(out.contains("Error: unsupported method: rot13"));
        assert!(out.contains("Error: Key cannot be empty"));
        assert!(out.contains("Decryption error: invalid hex data"));
    }
}
