//! `wks login` — validate a token and save credentials.

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;

use wikiscope_gitlab::GitLabClient;

use crate::config::{self, AuthConfig};
use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// GitLab instance URL.
    #[arg(long, default_value = "https://gitlab.com")]
    pub url: String,

    /// Personal access token (read_api scope). Falls back to the
    /// WIKISCOPE_TOKEN environment variable.
    #[arg(long, env = "WIKISCOPE_TOKEN", hide_env_values = true)]
    pub token: String,
}

pub async fn run_login(args: &LoginArgs, output: OutputMode) -> Result<()> {
    let client = GitLabClient::new(&args.url, &args.token)
        .context("could not construct GitLab client")?;

    let valid = client
        .validate_token()
        .await
        .with_context(|| format!("could not reach {}", args.url))?;
    if !valid {
        bail!("GitLab rejected the token — check its scopes and expiry");
    }

    config::save_auth(&AuthConfig {
        gitlab_url: args.url.clone(),
        token: args.token.clone(),
    })?;
    info!(url = %args.url, "credentials saved");
    render_success(output, &format!("logged in to {}", args.url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: LoginArgs,
    }

    #[test]
    fn url_defaults_to_gitlab_com() {
        let w = Wrapper::parse_from(["test", "--token", "glpat-x"]);
        assert_eq!(w.args.url, "https://gitlab.com");
        assert_eq!(w.args.token, "glpat-x");
    }
}
