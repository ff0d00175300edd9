use std::{fs, path::Path};

use bin2ota_core::lzss;
use log::info;

use crate::output::write_output;

pub fn lzss<P1: AsRef<Path>, P2: AsRef<Path>>(
    input_path: &P1,
    output_path: &P2,
    decode: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = fs::read(input_path.as_ref())?;

    let output = if decode {
        lzss::decode(&input)
    } else {
        lzss::encode(&input)
    };

    info!("{} -> {} bytes", input.len(), output.len());
    write_output(output_path.as_ref(), &output)
}
