use anyhow::Context;
use clap::Parser;
use stns_core::Stns;

#[derive(Parser)]
pub struct SignOpts {
    /// The message to sign, e.g. a challenge code.
    message: String,
}

/// Prints the signature in its JSON wire form.
pub fn exec(stns: &Stns, opts: SignOpts) -> anyhow::Result<()> {
    let signature = stns.sign(opts.message.as_bytes()).with_context(|| {
        format!(
            "Failed to sign with {}",
            stns.signer().key_path().display()
        )
    })?;
    println!("{}", String::from_utf8_lossy(&signature));
    Ok(())
}
