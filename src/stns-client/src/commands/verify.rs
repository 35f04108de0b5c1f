use crate::commands::print_json;
use clap::Parser;
use serde_json::json;
use stns_core::Stns;

#[derive(Parser)]
pub struct VerifyOpts {
    #[arg(long)]
    user: String,

    #[arg(long)]
    message: String,

    /// Signature JSON as printed by `sign`.
    #[arg(long)]
    signature: String,
}

pub fn exec(stns: &Stns, opts: VerifyOpts) -> anyhow::Result<()> {
    stns.verify_with_user(
        &opts.user,
        opts.message.as_bytes(),
        opts.signature.as_bytes(),
    )?;
    print_json(&json!({ "user": opts.user, "verified": true }))
}
