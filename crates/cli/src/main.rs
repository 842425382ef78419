mod cli;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Parser;

use micros_auth::{AuthConfig, Authenticator, Claims, Metadata, Payload};
use micros_observability::LogFormat;

use crate::cli::{Cli, Command, MintArgs};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    micros_observability::init_with(LogFormat::Pretty, level);

    let config = AuthConfig::from_env();
    let auth = Authenticator::from_config(&config).context("invalid MICROS_JWT_* configuration")?;

    match cli.command {
        Command::Mint(args) => println!("{}", mint(&auth, args)?),
        Command::Verify { token } => {
            let claims = auth
                .claims_from_jwt(&token)
                .map_err(|err| match err.token_error() {
                    Some(cause) => anyhow::anyhow!("token rejected: {cause}"),
                    None => anyhow::anyhow!("token rejected: {err}"),
                })?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Command::Header { token } => {
            for (key, value) in Metadata::from_jwt(&token).iter() {
                println!("{key}: {value}");
            }
        }
    }

    Ok(())
}

fn mint(auth: &Authenticator, args: MintArgs) -> anyhow::Result<String> {
    anyhow::ensure!(args.ttl_secs > 0, "--ttl-secs must be positive");

    let payload = args
        .fields
        .into_iter()
        .fold(Payload::new(args.id, args.group), |p, (k, v)| p.with_field(k, v));
    let subject = args
        .subject
        .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
    let claims = Claims::new(payload).with_roles(args.roles).with_id(subject);

    let expires_at = expiry_after(Utc::now(), args.ttl_secs)?;
    let token = auth.gen_token(&claims, expires_at)?;

    tracing::debug!(subject = %claims.id, %expires_at, "minted token");
    Ok(token)
}

/// `now + ttl_secs`, or an error when the result leaves chrono's range.
fn expiry_after(now: DateTime<Utc>, ttl_secs: i64) -> anyhow::Result<DateTime<Utc>> {
    Duration::try_seconds(ttl_secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .with_context(|| format!("--ttl-secs {ttl_secs} is out of range"))
}
