mod config;
mod console;
mod data;
mod session;
mod stats;

use session::Session;

fn main() {
    env_logger::init();

    let stdin = std::io::stdin();
    let mut session = Session::new(stdin.lock(), std::io::stdout(), config::DEFAULT_DATA_DIR);

    // A failed load ends the session but is not a failed run.
    if let Err(err) = session.run() {
        log::error!("session ended: {err:#}");
        eprintln!("Error: {err:#}");
    }
}
