use amos_cli::{command, dispatch, logging};
use clap::error::ErrorKind;

#[tokio::main]
async fn main() {
    let matches = match command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };
    logging::init(matches.get_count("verbose"));

    let code = match dispatch(&matches).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            tracing::error!("{e:#}");
            1
        }
    };
    std::process::exit(code);
}
