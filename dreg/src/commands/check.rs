//! `dreg check`: confirm the registry speaks the V2 API.

use std::io::Write;

use ociclient::Registry;
use tracing::debug;

use crate::error::Result;

pub async fn run<R, W>(registry: &R, out: &mut W) -> Result<()>
where
    R: Registry + ?Sized,
    W: Write,
{
    registry.check_api().await?;
    debug!("Registry answered the V2 API check");

    writeln!(out, "OK")?;
    Ok(())
}
