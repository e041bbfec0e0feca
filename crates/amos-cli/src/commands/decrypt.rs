//! `decrypt`

use crate::style::{paint, Style};
use amos_decrypt::{run_interactive, DecryptError, Decryptor, Envelope, Method};
use anyhow::Context;
use std::path::PathBuf;

/// Options of one non-interactive decryption
#[derive(Debug)]
pub(crate) struct DecryptArgs {
    pub(crate) method: Method,
    pub(crate) key: String,
    pub(crate) data: Option<String>,
    pub(crate) file: Option<PathBuf>,
    pub(crate) json: bool,
}

/// Decrypt data from the command line or a file
pub(crate) async fn decrypt(args: DecryptArgs) -> anyhow::Result<bool> {
    let mut data = match (&args.file, args.data) {
        (Some(file), _) => std::fs::read_to_string(file)
            .map_err(|e| DecryptError::io_error(file, e))
            .context("failed to read encrypted data")?
            .trim()
            .to_string(),
        (None, Some(data)) => data,
        (None, None) => anyhow::bail!("either --data or --file is required"),
    };

    if args.json {
        let envelope = Envelope::parse(&data).context("JSON parsing error")?;
        eprintln!("{}", paint(Style::Bold, "=== Metadata ==="));
        for (name, value) in envelope.metadata() {
            eprintln!("{name}: {value}");
        }
        eprintln!();
        data = envelope.payload();
    }

    match Decryptor::new().decrypt(args.method, &data, &args.key).await {
        Ok(plain) => {
            println!("{}", plain.trim_end_matches('\n'));
            Ok(true)
        }
        Err(e) => {
            eprintln!("{} {e}", paint(Style::Red, "Decryption error:"));
            Ok(false)
        }
    }
}

/// Prompt-driven session on stdin/stdout
///
/// Terminal reads block, so the session runs on the blocking pool and
/// drives the async decryptor through the runtime handle.
pub(crate) async fn interactive() -> anyhow::Result<bool> {
    let handle = tokio::runtime::Handle::current();
    let session = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        handle.block_on(run_interactive(&Decryptor::new(), stdin.lock(), stdout.lock()))
    });
    session
        .await
        .context("interactive session aborted")?
        .context("interactive session failed")?;
    Ok(true)
}
