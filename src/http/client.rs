use reqwest::Client;

use crate::config::Config;
use crate::error::AppError;

pub fn build_client(config: &Config) -> Result<Client, AppError> {
    let client = Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.as_str())
        .use_rustls_tls()
        .build()?;
    Ok(client)
}
