use crate::error::RustyOdsError;
use crate::helpers::zip::EntryReader;
use crate::helpers::zip::OdsPackage;
use crate::match_xml_events;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

/// ODS file MIME type identifier
const MIME_TYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";
/// Accepted file extensions
const EXTENSIONS: [&str; 2] = ["ods", "zip"];

/// Error types raised while opening an ODS package
#[derive(Error, Debug)]
pub enum OdsError {
    #[error("Specified ODS file '{0}' does not exist")]
    FileNotFound(String),

    #[error("Wrong file format '{0}', must end in .ods or .zip")]
    FileExtension(String),

    /// Invalid ODS MIME type detected in file
    #[error("Invalid ODS MIME type")]
    MimeType,

    #[error("Missing content.xml in '{0}'")]
    ContentMissing(String),

    #[error("ODS file '{0}' is password protected")]
    PasswordProtected(String),
}

/// An opened OpenDocument spreadsheet package
pub struct OdsDocument<RS: Read + Seek> {
    /// Name of the ODS file
    pub name: String,
    /// ZIP archive containing the ODS file contents
    zip: ZipArchive<RS>,
}

impl OdsDocument<BufReader<File>> {
    /// Opens an ODS file from disk and validates its format
    ///
    /// # Arguments
    /// * `file_name` - Path of the ODS file
    ///
    /// # Returns
    /// * `Result<Self, RustyOdsError>` - ODS document or error
    pub fn open(file_name: &str) -> Result<Self, RustyOdsError> {
        check_extension(file_name)?;
        let path = Path::new(file_name);
        if !path.is_file() {
            Err(OdsError::FileNotFound(file_name.to_owned()))?;
        }
        Self::from_reader(file_name, BufReader::new(File::open(path)?))
    }
}

impl<RS: Read + Seek> OdsDocument<RS> {
    /// Opens an ODS package from any seekable reader
    pub fn from_reader(name: &str, reader: RS) -> Result<Self, RustyOdsError> {
        let mut zip = ZipArchive::new(reader)?;
        check_mime(&mut zip)?;
        if is_password_protected(&mut zip)? {
            Err(OdsError::PasswordProtected(name.to_owned()))?;
        }
        Ok(OdsDocument {
            name: name.to_owned(),
            zip,
        })
    }

    /// Returns a token source over the decompressed `content.xml`
    pub fn tokens(&'_ mut self) -> Result<EntryReader<'_, RS>, RustyOdsError> {
        self.zip.content(&self.name)
    }
}

/// Checks that the file name carries an `ods` or `zip` extension (case-insensitive)
fn check_extension(file_name: &str) -> Result<(), RustyOdsError> {
    let accepted = Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| EXTENSIONS.iter().any(|accepted| extension.eq_ignore_ascii_case(accepted)));
    if !accepted {
        Err(OdsError::FileExtension(file_name.to_owned()))?;
    }
    Ok(())
}

/// Validates the declared media type; a package without one is accepted
fn check_mime<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(), RustyOdsError> {
    if zip.mime_type()?.is_some_and(|mime| mime != MIME_TYPE) {
        Err(OdsError::MimeType)?;
    }
    Ok(())
}

/// Checks if the ODS file is password protected by examining the manifest
///
/// # Arguments
/// * `zip` - ZIP archive to check
///
/// # Returns
/// * `Result<bool, RustyOdsError>` - True if password protected, false otherwise
fn is_password_protected<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<bool, RustyOdsError> {
    let Some(mut reader) = zip.manifest()? else {
        return Ok(false);
    };
    let mut in_file_entry = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == QName(b"manifest:file-entry") => in_file_entry = true,
        Event::End(event) if event.name() == QName(b"manifest:file-entry") => in_file_entry = false,
        Event::Start(event) if in_file_entry && event.name() == QName(b"manifest:encryption-data") => {
            return Ok(true);
        }
    });
    Ok(false)
}
