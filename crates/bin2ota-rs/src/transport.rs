use std::{fs, path::Path};

use bin2ota_core::transport::{to_base64, to_json};
use log::info;

use crate::output::write_output;

pub fn base64<P1: AsRef<Path>, P2: AsRef<Path>>(
    input_path: &P1,
    output_path: &P2,
) -> Result<(), Box<dyn std::error::Error>> {
    let container = fs::read(input_path.as_ref())?;
    let encoded = to_base64(&container);

    info!("Writing {} base64 characters", encoded.len());
    write_output(output_path.as_ref(), encoded.as_bytes())
}

pub fn json<P1: AsRef<Path>, P2: AsRef<Path>>(
    input_path: &P1,
    output_path: &P2,
    chunk_size: u32,
    delay: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let container = fs::read(input_path.as_ref())?;
    let encoded = to_json(&container, chunk_size, delay)?;

    info!("Using chunks of {} bytes every {} ms", chunk_size, delay);
    write_output(output_path.as_ref(), encoded.as_bytes())
}
