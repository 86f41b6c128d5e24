//! In-memory EPUB fixtures.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::write::FileOptions;

pub const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Builder for small EPUB archives.
pub struct EpubFixture {
    opf_path: String,
    files: Vec<(String, Vec<u8>)>,
    container: String,
}

impl EpubFixture {
    pub fn new() -> Self {
        Self {
            opf_path: "OEBPS/content.opf".to_string(),
            files: Vec::new(),
            container: CONTAINER.to_string(),
        }
    }

    pub fn container(mut self, xml: &str) -> Self {
        self.container = xml.to_string();
        self
    }

    pub fn opf(mut self, path: &str, xml: &str) -> Self {
        self.opf_path = path.to_string();
        self.files.push((path.to_string(), xml.as_bytes().to_vec()));
        self
    }

    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.as_bytes().to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

        writer.start_file("mimetype", stored).unwrap();
        writer.write_all(b"application/epub+zip").unwrap();
        writer.start_file("META-INF/container.xml", deflated).unwrap();
        writer.write_all(self.container.as_bytes()).unwrap();
        for (path, content) in &self.files {
            writer.start_file(path.as_str(), deflated).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

pub fn chapter(title: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{}</title></head>
<body><h1>{}</h1><p>{}</p></body>
</html>"#,
        title, heading, body
    )
}

/// Three chapters whose manifest order differs from the spine order.
pub fn moby_dick() -> EpubFixture {
    let opf = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Moby Dick</dc:title>
    <dc:creator>Herman Melville</dc:creator>
  </metadata>
  <manifest>
    <item id="c3" href="text/ch3.xhtml" media-type="application/xhtml+xml"/>
    <item id="c1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="c2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="c1"/>
    <itemref idref="c2"/>
    <itemref idref="c3"/>
  </spine>
</package>"#;

    EpubFixture::new()
        .opf("OEBPS/content.opf", opf)
        .file("OEBPS/text/ch3.xhtml", &chapter("", "The Spouter-Inn", "Entering that gable-ended Spouter-Inn."))
        .file("OEBPS/text/ch1.xhtml", &chapter("Loomings", "Chapter 1", "Call me Ishmael."))
        .file("OEBPS/text/ch2.xhtml", &chapter("The Carpet-Bag", "Chapter 2", "I stuffed a shirt or two."))
}
