use sha1::{Digest, Sha1};
use std::fs::File;
use std::io;
use std::path::Path;

/// Hex SHA-1 of a file's contents, identifying exactly which results file
/// a report was produced from.
pub fn file_sha1(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sha1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detail.xml");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            file_sha1(&path).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }
}
