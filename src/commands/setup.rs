//! `setup` — reconcile the environment.
//!
//! `--check-only` runs the same pass without installing anything (missing
//! tools only get hints, the registry still starts when docker is usable)
//! and exits by readiness.

use anyhow::Result;

use super::Toolbox;
use crate::config::Config;
use crate::output::OutputContext;

pub fn run(config: &Config, ctx: &OutputContext, dry_run: bool, check_only: bool) -> Result<bool> {
    let toolbox = Toolbox::new(ctx, dry_run);
    let manager = toolbox.environment(config, ctx);

    let ok = manager.setup(!check_only);

    if check_only {
        let ready = manager.status().ready;
        if ready {
            ctx.success("Environment is ready");
        } else {
            ctx.warn("Environment is not ready - run 'ocm-demo setup' to fix it");
        }
        return Ok(ready);
    }

    Ok(ok)
}
