use crate::plugins::registry::{ClientContext, CliPlugin};
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub struct SubDbCliPlugin;

impl SubDbCliPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl CliPlugin for SubDbCliPlugin {
    fn name(&self) -> &'static str {
        "subdb"
    }

    fn augment_command(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new("subdb_endpoint")
                .long("endpoint")
                .help_heading("SubDB")
                .help("Lookup service base URL")
                .num_args(1),
        )
        .arg(
            Arg::new("subdb_user_agent")
                .long("user-agent")
                .help_heading("SubDB")
                .help("Client identification sent as User-Agent")
                .num_args(1),
        )
        .arg(
            Arg::new("subdb_timeout_secs")
                .long("timeout-secs")
                .help_heading("SubDB")
                .help("Per-request timeout in seconds (0 = none)")
                .default_value("0")
                .num_args(1),
        )
    }

    fn apply_matches(&self, matches: &ArgMatches, ctx: &mut ClientContext) -> anyhow::Result<()> {
        if let Some(s) = matches.get_one::<String>("subdb_endpoint") {
            ctx.endpoint = Url::parse(s).map_err(|e| anyhow::anyhow!("invalid endpoint {s}: {e}"))?;
        }
        if let Some(ua) = matches.get_one::<String>("subdb_user_agent") {
            ctx.user_agent = ua.clone();
        }
        if let Some(s) = matches.get_one::<String>("subdb_timeout_secs") {
            ctx.timeout_secs = s.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ClientContext {
        let plugin = SubDbCliPlugin::new();
        let cmd = plugin.augment_command(Command::new("test"));
        let matches = cmd.try_get_matches_from(args).unwrap();
        let mut ctx = ClientContext::subdb_defaults().unwrap();
        plugin.apply_matches(&matches, &mut ctx).unwrap();
        ctx
    }

    #[test]
    fn test_defaults_kept() {
        let ctx = parse(&["test"]);
        assert_eq!(ctx.endpoint.as_str(), "http://api.thesubdb.com/");
        assert_eq!(ctx.timeout_secs, 0);
    }

    #[test]
    fn test_overrides() {
        let ctx = parse(&[
            "test",
            "--endpoint",
            "http://sandbox.thesubdb.com/",
            "--user-agent",
            "SubDB/1.0 (me)",
            "--timeout-secs",
            "5",
        ]);
        assert_eq!(ctx.endpoint.host_str(), Some("sandbox.thesubdb.com"));
        assert_eq!(ctx.user_agent, "SubDB/1.0 (me)");
        assert_eq!(ctx.timeout_secs, 5);
    }
}
