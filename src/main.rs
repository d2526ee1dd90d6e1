use std::process;

pub mod bot;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod event;
pub mod logging;
pub mod util;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    // Credentials are validated before any network traffic happens.
    if let Err(why) = config::SETTINGS.ensure_telegram_credentials() {
        logging::error_console(format!("{}", why));
        process::exit(1);
    }

    if let Err(why) = event::security_report::execute().await {
        logging::error_console(format!(
            "Failed to deliver the security report because {:?}",
            why
        ));
        process::exit(1);
    }
}
