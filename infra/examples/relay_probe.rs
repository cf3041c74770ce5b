//! Send one test message through the delivery gateway
//!
//! Loads configuration from the environment (and `.env`), so the same binary
//! exercises the live tunnel when SSH credentials are present and the mock
//! otherwise.
//!
//! Usage:
//!   cargo run -p vr_infra --example relay_probe -- sms +19035550142
//!   cargo run -p vr_infra --example relay_probe -- email student@example.edu

use anyhow::{bail, Context};

use vr_core::services::verification::{email_body, sms_message, DeliveryServiceTrait, EMAIL_SUBJECT};
use vr_infra::DeliveryGateway;
use vr_shared::config::AppConfig;
use vr_shared::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    let mut args = std::env::args().skip(1);
    let channel = args.next().context("missing channel (sms|email)")?;
    let destination = args.next().context("missing destination")?;

    let gateway = DeliveryGateway::from_app_config(&config).context("failed to build delivery gateway")?;

    let delivered = match channel.as_str() {
        "sms" => {
            println!("SMS path: {}", if gateway.sms_is_live() { "live" } else { "mock" });
            gateway.send_sms(&destination, &sms_message("000000", None)).await
        }
        "email" => {
            println!("Email path: {}", if gateway.email_is_live() { "live" } else { "mock" });
            gateway
                .send_email(&destination, EMAIL_SUBJECT, &email_body("000000"))
                .await
        }
        other => bail!("unknown channel '{}', expected sms or email", other),
    };

    if !delivered {
        bail!("delivery failed, see logs");
    }

    println!("Delivered");
    Ok(())
}
