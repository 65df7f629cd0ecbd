use std::process::ExitCode;

use glyph_trace::cli::parse_cli;
use glyph_trace::run::run;
use glyph_trace::telemetry::init_tracing;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let (cli, sources) = parse_cli();
    match run(cli, sources).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
