use crate::error::Result;
use crate::results::SeedSite;
use std::io::Read;
use std::path::Path;

/// Default column delimiter of the seed file
pub const DEFAULT_DELIMITER: u8 = b';';

/// Reads seed sites from a delimited file with a `url` column
pub fn read_seeds<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<SeedSite>> {
    let file = std::fs::File::open(path)?;
    read_seeds_from(file, delimiter)
}

/// Reads seed sites from any reader; other columns are ignored and blank URLs skipped
pub fn read_seeds_from<R: Read>(reader: R, delimiter: u8) -> Result<Vec<SeedSite>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut seeds = Vec::new();
    for row in rdr.deserialize::<SeedSite>() {
        let seed = row?;
        if seed.url.is_empty() {
            continue;
        }
        seeds.push(seed);
    }

    ::log::debug!("Read {} seed sites", seeds.len());
    Ok(seeds)
}
