//! `streamflix fetch` command handler.
//!
//! Client-tier access: list resources degrade to an empty page on failure,
//! detail resources and upstream 429s are reported as errors.

use anyhow::{anyhow, Result};

use streamflix::config::Config;
use streamflix::tmdb::{FailurePolicy, TmdbGateway, TmdbResource};

pub(crate) async fn cmd_fetch(
    config: &Config,
    resource: &str,
    args: &[String],
    compact: bool,
) -> Result<()> {
    let resource = TmdbResource::from_args(resource, args).ok_or_else(|| {
        anyhow!(
            "Unknown or incomplete resource '{}'.\n\
             Try: trending, popular, tv-popular, tv-top-rated, tv-on-the-air,\n  \
             tv-airing-today, genre <id>, movie <id>, tv <id>, season <show> <n>, search <text>",
            resource
        )
    })?;

    let gateway = TmdbGateway::from_config(config)?;
    let body = match gateway.resolve(&resource, FailurePolicy::Propagate).await {
        Ok(body) => body,
        Err(e) if e.is_rate_limited() => {
            return Err(anyhow!("TMDB rate limit reached, try again in a few seconds: {e}"))
        }
        Err(e) => return Err(anyhow!("Failed to fetch {resource}: {e}")),
    };

    let rendered = if compact {
        serde_json::to_string(&body)?
    } else {
        serde_json::to_string_pretty(&body)?
    };
    println!("{rendered}");
    Ok(())
}
