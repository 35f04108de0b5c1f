use clap::Subcommand;
use stns_core::Stns;

mod authenticate;
mod challenge;
mod group;
mod sign;
mod user;
mod verify;

#[derive(Subcommand)]
pub enum StnsCommand {
    /// Looks up users. Lists all of them without a filter.
    User(user::UserOpts),
    /// Looks up groups. Lists all of them without a filter.
    Group(group::GroupOpts),
    /// Signs a message with the configured private key.
    Sign(sign::SignOpts),
    /// Verifies a signature against a user's registered public keys.
    Verify(verify::VerifyOpts),
    /// Issues a challenge code for a user.
    Challenge(challenge::ChallengeOpts),
    /// Checks a signed challenge code and consumes it.
    Authenticate(authenticate::AuthenticateOpts),
}

pub fn exec(stns: &Stns, cmd: StnsCommand) -> anyhow::Result<()> {
    match cmd {
        StnsCommand::User(v) => user::exec(stns, v),
        StnsCommand::Group(v) => group::exec(stns, v),
        StnsCommand::Sign(v) => sign::exec(stns, v),
        StnsCommand::Verify(v) => verify::exec(stns, v),
        StnsCommand::Challenge(v) => challenge::exec(stns, v),
        StnsCommand::Authenticate(v) => authenticate::exec(stns, v),
    }
}

pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
