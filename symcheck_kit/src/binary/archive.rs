//! Firmware dump archives
//!
//! Each release has a `<release>.tar.xz` archive containing the firmware's
//! libraries at their install paths.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use xz2::read::XzDecoder;

use super::{BinaryImage, BinaryProvider, Fetched, ProviderError};
use crate::catalog::Release;

/// Lexically clean a path
///
/// Drops `.` components and redundant separators and resolves `..` against
/// the preceding component, so `./usr//lib/../lib/x.so` becomes
/// `usr/lib/x.so`. Leading `..` components that cannot be resolved are
/// kept.
pub fn normalize_path(path: &str) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last().copied() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Read the archive member matching `library` out of an xz-compressed tar
///
/// Returns `Ok(None)` if no member matches. Decompression and tar errors, and
/// a member shorter than its header claims, are returned as I/O errors.
pub fn extract_member<R: Read>(reader: R, library: &str) -> std::io::Result<Option<Vec<u8>>> {
    let wanted = normalize_path(library);
    let mut archive = tar::Archive::new(XzDecoder::new(reader));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        if normalize_path(&name) != wanted {
            continue;
        }

        // The header size is untrusted; read what is actually there.
        let expected = entry.size();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        if data.len() as u64 != expected {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("{}: truncated, {} of {} bytes", name, data.len(), expected),
            ));
        }
        return Ok(Some(data));
    }

    Ok(None)
}

fn archive_name(release: &Release) -> String {
    format!("{}.tar.xz", release)
}

fn read_binary<R: Read>(
    reader: R,
    release: &Release,
    library: &str,
) -> Result<Fetched, ProviderError> {
    let data = extract_member(reader, library).map_err(|source| ProviderError::Archive {
        release: release.to_string(),
        source,
    })?;

    match data {
        Some(data) => {
            let image = BinaryImage::new(release.clone(), library, data);
            log::debug!(
                "{}@{}: {} bytes, sha256 {}",
                library,
                release,
                image.data.len(),
                image.sha256
            );
            Ok(Fetched::Binary(image))
        }
        None => Err(ProviderError::MemberNotFound {
            release: release.to_string(),
            library: library.to_string(),
        }),
    }
}

/// Fetches dump archives over HTTP
pub struct HttpArchiveProvider {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpArchiveProvider {
    /// `base_url` is joined with `<release>.tar.xz`; a trailing `/` is added
    /// if missing
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            base_url,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn url_for(&self, release: &Release) -> String {
        format!("{}{}", self.base_url, archive_name(release))
    }
}

impl BinaryProvider for HttpArchiveProvider {
    fn fetch(&mut self, release: &Release, library: &str) -> Result<Fetched, ProviderError> {
        let url = self.url_for(release);
        log::debug!("fetching {}", url);

        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => {
                log::debug!("{}: not found", url);
                return Ok(Fetched::NotAvailable);
            }
            Err(ureq::Error::Status(status, _)) => {
                return Err(ProviderError::Status {
                    release: release.to_string(),
                    url,
                    status,
                });
            }
            Err(e) => {
                return Err(ProviderError::Transport {
                    release: release.to_string(),
                    url,
                    source: Box::new(e),
                });
            }
        };

        if response.status() != 200 {
            return Err(ProviderError::Status {
                release: release.to_string(),
                url,
                status: response.status(),
            });
        }

        read_binary(response.into_reader(), release, library)
    }
}

/// Reads dump archives from a local directory
pub struct DirectoryArchiveProvider {
    dir: PathBuf,
}

impl DirectoryArchiveProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, release: &Release) -> PathBuf {
        self.dir.join(archive_name(release))
    }
}

impl BinaryProvider for DirectoryArchiveProvider {
    fn fetch(&mut self, release: &Release, library: &str) -> Result<Fetched, ProviderError> {
        let path = self.path_for(release);
        log::debug!("reading {}", path.display());

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Fetched::NotAvailable);
            }
            Err(source) => return Err(ProviderError::Open { path, source }),
        };

        read_binary(BufReader::new(file), release, library)
    }
}

// ============================================================================
// Tests
// ============================================================================
