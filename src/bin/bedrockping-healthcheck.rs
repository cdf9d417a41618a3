//! Exits non-zero unless the given URL answers with a 2xx status.
//! Used as the container health check, e.g. `bedrockping-healthcheck http://localhost:8080/api/127.0.0.1`.

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(url), None) = (args.next(), args.next()) else {
        return Err("`bedrockping-healthcheck` requires exactly one argument.".into());
    };
    reqwest::get(url).await?.error_for_status()?;
    println!("Health check succeeded");
    Ok(())
}
