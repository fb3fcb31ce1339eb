use std::fs;
use std::path::Path;

use tracing::{debug, info};

use dtmf_au::codec::au::{self, AudioContainer, Header};

use crate::Result;

pub(crate) fn read_header(path: &Path) -> Result<Header> {
    let bytes = fs::read(path)?;
    Ok(au::read_header(&bytes)?)
}

pub(crate) fn read_container(path: &Path) -> Result<AudioContainer> {
    let bytes = fs::read(path)?;
    debug!("{}: read {} bytes", path.display(), bytes.len());

    Ok(au::decode(&bytes)?)
}

pub(crate) fn write_container(path: &Path, container: &AudioContainer) -> Result<()> {
    let bytes = au::encode(container)?;
    fs::write(path, &bytes)?;

    info!("{}: wrote {} samples at {}Hz", path.display(), container.samples.len(), container.sample_rate);
    Ok(())
}

///////////////////////////////////////////////////////////////////////
