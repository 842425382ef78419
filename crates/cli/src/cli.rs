use clap::{Args, Parser, Subcommand};
use serde_json::Value;

/// Mint, verify and inspect micros bearer tokens.
///
/// Keys and issuer/audience come from the MICROS_JWT_* environment variables.
#[derive(Debug, Parser)]
#[command(name = "micros-token", version)]
pub struct Cli {
    /// Log human-readable output at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign a new token and print it.
    Mint(MintArgs),
    /// Verify a token and print its claims as JSON.
    Verify {
        token: String,
    },
    /// Print the authorization metadata line for a token.
    Header {
        token: String,
    },
}

#[derive(Debug, Args)]
pub struct MintArgs {
    /// Identity asserted in the payload.
    #[arg(long)]
    pub id: String,

    /// Primary group.
    #[arg(long)]
    pub group: String,

    /// Actor id used for identity authorization (defaults to a fresh UUID).
    #[arg(long)]
    pub subject: Option<String>,

    /// Additional role; repeatable.
    #[arg(long = "role")]
    pub roles: Vec<String>,

    /// Extension payload field as key=value; JSON values are parsed.
    #[arg(long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,

    /// Lifetime of the token in seconds.
    #[arg(long, default_value_t = 3600)]
    pub ttl_secs: i64,
}

pub fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in '{raw}'"));
    }

    if micros_auth::RESERVED_PAYLOAD_FIELDS.contains(&key) {
        return Err(format!("'{key}' is reserved; use --{key}"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fields() {
        assert_eq!(parse_field("tenant=acme").unwrap(), ("tenant".into(), json!("acme")));
        assert_eq!(parse_field("level=3").unwrap(), ("level".into(), json!(3)));
        assert_eq!(parse_field("tags=[\"a\"]").unwrap(), ("tags".into(), json!(["a"])));
        assert_eq!(parse_field("note=a=b").unwrap(), ("note".into(), json!("a=b")));
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
        assert!(parse_field("group=admin").is_err());
        assert!(parse_field(" id =root").is_err());
    }

    #[test]
    fn parses_mint_command() {
        let cli = Cli::try_parse_from([
            "micros-token",
            "mint",
            "--id",
            "alice",
            "--group",
            "billing",
            "--role",
            "ops",
            "--role",
            "viewer",
            "--field",
            "tenant=acme",
            "--ttl-secs",
            "60",
        ])
        .unwrap();

        let Command::Mint(args) = cli.command else {
            panic!("expected mint command");
        };
        assert_eq!(args.id, "alice");
        assert_eq!(args.roles, vec!["ops", "viewer"]);
        assert_eq!(args.fields, vec![("tenant".to_string(), json!("acme"))]);
        assert_eq!(args.ttl_secs, 60);
        assert!(args.subject.is_none());
    }

    #[test]
    fn huge_ttl_still_parses() {
        let cli = Cli::try_parse_from([
            "micros-token",
            "mint",
            "--id",
            "alice",
            "--group",
            "billing",
            "--ttl-secs",
            "9223372036854775807",
        ])
        .unwrap();

        let Command::Mint(args) = cli.command else {
            panic!("expected mint command");
        };
        assert_eq!(args.ttl_secs, i64::MAX);
    }
}
