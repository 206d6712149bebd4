//! `cleanup` — tear down what setup created.

use anyhow::Result;

use super::Toolbox;
use crate::config::Config;
use crate::output::OutputContext;

pub fn run(config: &Config, ctx: &OutputContext, dry_run: bool) -> Result<bool> {
    let toolbox = Toolbox::new(ctx, dry_run);
    Ok(toolbox.environment(config, ctx).cleanup())
}
