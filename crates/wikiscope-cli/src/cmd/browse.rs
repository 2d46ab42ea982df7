//! `wks browse` — full-screen interactive project browser.

use anyhow::Result;
use clap::Args;

use crate::tui;

#[derive(Args, Debug)]
pub struct BrowseArgs {}

/// Launch the TUI over the durable cache and saved credentials.
pub async fn run_browse(_args: &BrowseArgs) -> Result<()> {
    let browser = super::open_browser()?;
    let client = super::client()?;
    tui::browse::run_browse(browser, client).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: BrowseArgs,
    }

    #[test]
    fn browse_takes_no_arguments() {
        assert!(Wrapper::try_parse_from(["test"]).is_ok());
        assert!(Wrapper::try_parse_from(["test", "extra"]).is_err());
    }
}
