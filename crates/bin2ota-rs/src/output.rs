use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use log::LevelFilter;
use pbr::{ProgressBar, Units};

/// Granularity of the progress bar updates
const WRITE_CHUNK: usize = 4096;

/// Writes `contents` to `output_path`, removing the file again if any write fails.
pub fn write_output(
    output_path: &Path,
    contents: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    let should_print_progress = log::max_level() >= LevelFilter::Info;

    let result = if should_print_progress {
        let mut pb = ProgressBar::new(contents.len() as u64);
        pb.set_units(Units::Bytes);
        pb.show_speed = false;

        let result = contents.chunks(WRITE_CHUNK).try_for_each(|chunk| -> io::Result<()> {
            writer.write_all(chunk)?;
            pb.add(chunk.len() as u64);
            Ok(())
        });
        pb.finish();
        println!();
        result
    } else {
        writer.write_all(contents)
    };

    // flush and close before a possible remove
    let result = result.and_then(|_| {
        writer
            .into_inner()
            .map(drop)
            .map_err(|e| e.into_error())
    });

    if let Err(err) = result {
        fs::remove_file(output_path)?;
        return Err(Box::new(err));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn writes_whole_file() {
        let path = env::temp_dir().join(format!("bin2ota-output-{}.bin", std::process::id()));
        let contents: Vec<u8> = (0..=255).cycle().take(3 * WRITE_CHUNK + 5).collect();

        write_output(&path, &contents).unwrap();
        assert_eq!(fs::read(&path).unwrap(), contents);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_directory_fails_without_output() {
        let path = env::temp_dir()
            .join(format!("bin2ota-missing-{}", std::process::id()))
            .join("out.ota");

        assert!(write_output(&path, b"container").is_err());
        assert!(!path.exists());
    }
}
