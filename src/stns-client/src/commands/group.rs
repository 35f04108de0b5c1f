use crate::commands::print_json;
use anyhow::Context;
use clap::Parser;
use stns_core::Stns;

#[derive(Parser)]
pub struct GroupOpts {
    #[arg(long, conflicts_with = "id")]
    name: Option<String>,

    #[arg(long)]
    id: Option<i64>,
}

pub fn exec(stns: &Stns, opts: GroupOpts) -> anyhow::Result<()> {
    match (opts.name, opts.id) {
        (Some(name), _) => print_json(
            &stns
                .get_group_by_name(&name)
                .with_context(|| format!("Failed to look up group '{name}'"))?,
        ),
        (None, Some(id)) => print_json(
            &stns
                .get_group_by_id(id)
                .with_context(|| format!("Failed to look up group {id}"))?,
        ),
        (None, None) => print_json(&stns.list_groups().context("Failed to list groups")?),
    }
}
