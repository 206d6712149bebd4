//! `list` — enumerate the available examples.
//!
//! Deliberately not gated on environment readiness; browsing what exists
//! must work on a fresh machine.

use anyhow::Result;

use super::Toolbox;
use crate::config::Config;
use crate::demo::DemoRunner;
use crate::output::OutputContext;

pub fn run(config: &Config, ctx: &OutputContext) -> Result<bool> {
    let toolbox = Toolbox::new(ctx, false);
    let demo = DemoRunner::new(toolbox.runner(), config, ctx, false);

    let examples = demo.list_available_examples();
    if examples.is_empty() {
        ctx.warn(&format!(
            "No examples found in {}",
            config.examples_dir().display()
        ));
        return Ok(true);
    }

    ctx.header("Available examples");
    for name in examples {
        println!("  {name}");
    }
    Ok(true)
}
