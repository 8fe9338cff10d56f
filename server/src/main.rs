use std::{env, io};

use glucose_server::{Mode, ServerConfig};

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let mode = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => Mode::default(),
    };
    let config = ServerConfig::from_env()?;

    glucose_server::run(mode, config, &mut io::stdout()).await?;
    Ok(())
}
