use crate::commands::print_json;
use clap::Parser;
use serde_json::json;
use stns_core::Stns;

#[derive(Parser)]
pub struct AuthenticateOpts {
    #[arg(long)]
    user: String,

    /// The challenge code the user signed.
    #[arg(long)]
    code: String,

    /// Signature JSON over the code.
    #[arg(long)]
    signature: String,
}

pub fn exec(stns: &Stns, opts: AuthenticateOpts) -> anyhow::Result<()> {
    stns.authenticate(&opts.user, opts.code.as_bytes(), opts.signature.as_bytes())?;
    print_json(&json!({ "user": opts.user, "authenticated": true }))
}
