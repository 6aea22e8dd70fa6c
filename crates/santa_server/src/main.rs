use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match santa_server::start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Logging may not be up yet when configuration fails.
            eprintln!("santa_server: {err}");
            log::error!("event=server_exit module=http status=error error={err}");
            ExitCode::FAILURE
        }
    }
}
