use std::{fmt::Debug, fs::{self, File}, io::{self, Read, Write}, path::{Path, PathBuf}};

use atomic_write_file::AtomicWriteFile;
use postcard::{from_bytes, to_allocvec};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored data could not be encoded or decoded: {0}")]
    Encoding(#[from] postcard::Error),
    #[error("stored text is not valid UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

/// Files under a base directory, one file per key.
pub trait RawStorage {
    fn get_base_path(&self) -> &PathBuf;

    fn get_path<P: AsRef<Path>>(&self, original_path: P) -> Result<PathBuf, StorageError> {
        let path = self.get_base_path().join(original_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path.canonicalize().unwrap_or(path))
    }

    fn raw_write<P: AsRef<Path>>(&self, file_path: P, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.get_path(file_path)?;
        debug!("Storing data to file {:?}", path.as_path());
        let mut file = AtomicWriteFile::options().open(path)?;
        file.write_all(bytes)?;
        file.commit()?;
        Ok(())
    }

    fn raw_read<P: AsRef<Path>>(&self, file_path: P) -> Result<Vec<u8>, StorageError> {
        let path = self.get_path(file_path)?;
        debug!("Loading data from file {:?}", path.as_path());
        let mut bytes: Vec<u8> = vec![];
        File::options()
            .read(true)
            .open(path)?
            .read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn raw_store<P: AsRef<Path>>(
        &self,
        file_path: P,
        data: &impl Serialize,
    ) -> Result<(), StorageError> {
        let bytes = to_allocvec(data)?;
        self.raw_write(file_path, &bytes)
    }

    fn raw_load<P: AsRef<Path>, T: DeserializeOwned>(
        &self,
        file_path: P,
    ) -> Result<T, StorageError> {
        let bytes = self.raw_read(file_path)?;
        Ok(from_bytes(&bytes)?)
    }

    fn raw_remove<P: AsRef<Path>>(&self, file_path: P) -> Result<(), StorageError> {
        let path = self.get_path(file_path)?;
        Ok(fs::remove_file(path)?)
    }
}

/// Fail-soft layer over [`RawStorage`]: errors are logged, never returned.
pub trait GeneralStorage : RawStorage {
    fn store<P: AsRef<Path> + Debug>(&self, file_path: &P, data: &impl Serialize) -> bool {
        if let Err(err) = self.raw_store(file_path, data) {
            error!("Unexpected error while trying to store data to file {file_path:?}: {err}");
            false
        } else {
            true
        }
    }

    fn load<P: AsRef<Path> + Debug, T: DeserializeOwned>(&self, file_path: &P) -> Option<T> {
        match self.raw_load(file_path) {
            Ok(data) => Some(data),
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                error!("Unexpected error while trying to load data from file {file_path:?}: {err}");
                None
            }
        }
    }

    /// Text value stored under `key`, like `localStorage.getItem`.
    fn get_item<P: AsRef<Path> + Debug>(&self, key: &P) -> Option<String> {
        match self.raw_read(key).and_then(|bytes| Ok(String::from_utf8(bytes)?)) {
            Ok(text) => Some(text),
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                error!("Unexpected error while trying to read key {key:?}: {err}");
                None
            }
        }
    }

    fn set_item<P: AsRef<Path> + Debug>(&self, key: &P, value: &str) -> bool {
        if let Err(err) = self.raw_write(key, value.as_bytes()) {
            error!("Unexpected error while trying to write key {key:?}: {err}");
            false
        } else {
            true
        }
    }

    /// Removing a missing file counts as success.
    fn remove<P: AsRef<Path> + Debug>(&self, file_path: &P) -> bool {
        match self.raw_remove(file_path) {
            Ok(()) => true,
            Err(err) if err.is_not_found() => true,
            Err(err) => {
                error!("Unexpected error while trying to remove file {file_path:?}: {err}");
                false
            }
        }
    }
}
