use crate::commands::print_json;
use anyhow::Context;
use clap::Parser;
use stns_core::Stns;

#[derive(Parser)]
pub struct UserOpts {
    #[arg(long, conflicts_with = "id")]
    name: Option<String>,

    #[arg(long)]
    id: Option<i64>,
}

pub fn exec(stns: &Stns, opts: UserOpts) -> anyhow::Result<()> {
    match (opts.name, opts.id) {
        (Some(name), _) => print_json(
            &stns
                .get_user_by_name(&name)
                .with_context(|| format!("Failed to look up user '{name}'"))?,
        ),
        (None, Some(id)) => print_json(
            &stns
                .get_user_by_id(id)
                .with_context(|| format!("Failed to look up user {id}"))?,
        ),
        (None, None) => print_json(&stns.list_users().context("Failed to list users")?),
    }
}
