//! `cmdshell` 바이너리 진입점.

use cmdshell::interface::cli::{AppComposition, Cli, CliAction, run_shell};

#[tokio::main]
async fn main() {
    // 진단 로그는 stderr로 보내 명령 출력과 섞이지 않게 한다.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    match Cli::parse_action() {
        CliAction::InspectConfig(config_path) => {
            let composition = AppComposition::new(config_path);
            match composition.inspect_config_usecase().execute() {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("error: {err:#}");
                    std::process::exit(1);
                }
            }
        }
        CliAction::Run(options) => {
            let composition = AppComposition::new(options.config.clone());
            match run_shell(&composition, &options).await {
                Ok(code) => std::process::exit(code),
                Err(err) => {
                    eprintln!("error: {err:#}");
                    std::process::exit(1);
                }
            }
        }
    }
}
