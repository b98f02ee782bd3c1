//! Smoke probe for `umgmt_core`.
//!
//! Lists the accounts of a passwd file (default `/etc/passwd`) and the ids
//! the next new account would get.

use std::process::ExitCode;
use umgmt_core::{DbConfig, LogTarget, PasswdFile, UserDb};

fn main() -> ExitCode {
    if let Err(err) = umgmt_core::init_logging(umgmt_core::default_log_level(), LogTarget::Stderr) {
        eprintln!("umgmt: {err}");
        return ExitCode::FAILURE;
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("umgmt: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = match std::env::args_os().nth(1) {
        Some(path) => PasswdFile::new(path),
        None => PasswdFile::system(),
    };

    let mut db = UserDb::with_config(DbConfig::system()?);
    db.load_from(&store)?;
    log::debug!("event=cli_list module=cli status=ok records={}", db.len());

    for user in &db {
        println!("{:>6} {:>6} {}", user.uid, user.gid, user.name);
    }
    println!("next uid={} gid={}", db.new_uid()?, db.new_gid()?);
    println!("umgmt_core version={}", umgmt_core::core_version());
    Ok(())
}
