//! Entry access for OpenDocument packages.
//!
//! Entry names are matched case-insensitively and without regard to the
//! separator style, since some writers store `META-INF\manifest.xml`.

use crate::error::RustyOdsError;
use crate::helpers::xml::XmlReader;
use crate::spreadsheet::ods::OdsError;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::ZipArchive;

/// Entry holding the package media type
pub(crate) const MIMETYPE: &str = "mimetype";
/// Entry holding the document body
pub(crate) const CONTENT: &str = "content.xml";
/// Entry holding the package manifest
pub(crate) const MANIFEST: &str = "META-INF/manifest.xml";

/// XML token reader over a decompressed package entry
pub type EntryReader<'a, RS> = XmlReader<BufReader<ZipFile<'a, RS>>>;

pub(crate) trait OdsPackage<RS: Read + Seek> {
    /// Looks up an entry by name
    fn entry(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, RustyOdsError>;

    /// Reads the declared media type with surrounding whitespace trimmed,
    /// `None` when the package has no `mimetype` entry
    fn mime_type(&mut self) -> Result<Option<Vec<u8>>, RustyOdsError>;

    fn manifest(&'_ mut self) -> Result<Option<EntryReader<'_, RS>>, RustyOdsError>;

    /// Opens `content.xml`; `package` names the file in the error when it is missing
    fn content(&'_ mut self, package: &str) -> Result<EntryReader<'_, RS>, RustyOdsError>;
}

impl<RS: Read + Seek> OdsPackage<RS> for ZipArchive<RS> {
    fn entry(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, RustyOdsError> {
        let wanted = name.replace('\\', "/");
        let index = self
            .file_names()
            .find(|stored| stored.replace('\\', "/").eq_ignore_ascii_case(&wanted))
            .and_then(|stored| self.index_for_name(stored));
        match index {
            Some(index) => Ok(Some(self.by_index(index)?)),
            None => Ok(None),
        }
    }

    fn mime_type(&mut self) -> Result<Option<Vec<u8>>, RustyOdsError> {
        let Some(mut file) = self.entry(MIMETYPE)? else {
            return Ok(None);
        };
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(Some(buffer.trim_ascii().to_vec()))
    }

    fn manifest(&'_ mut self) -> Result<Option<EntryReader<'_, RS>>, RustyOdsError> {
        Ok(self.entry(MANIFEST)?.map(|file| XmlReader::new(BufReader::new(file))))
    }

    fn content(&'_ mut self, package: &str) -> Result<EntryReader<'_, RS>, RustyOdsError> {
        let file = self
            .entry(CONTENT)?
            .ok_or_else(|| OdsError::ContentMissing(package.to_owned()))?;
        Ok(XmlReader::new(BufReader::new(file)))
    }
}
