use anyhow::Context;
use clap::Parser;
use stns_core::Stns;

#[derive(Parser)]
pub struct ChallengeOpts {
    #[arg(long)]
    user: String,
}

/// Stores a fresh code for the user and prints it.
pub fn exec(stns: &Stns, opts: ChallengeOpts) -> anyhow::Result<()> {
    let code = stns
        .create_user_challenge_code(&opts.user)
        .with_context(|| format!("Failed to issue a challenge code for '{}'", opts.user))?;
    println!("{}", String::from_utf8_lossy(code.as_bytes()));
    Ok(())
}
